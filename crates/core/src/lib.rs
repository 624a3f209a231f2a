pub mod answer;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod retriever;

pub use answer::{chat, door_schedule, CHAT_TOP_K, DOOR_SCHEDULE_TOP_K};
pub use embeddings::{
    build_vector_index, load_vector_index, Embedder, OpenAiEmbedder, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_OPENAI_BASE_URL,
};
pub use error::{EmbeddingError, IndexError, IngestError};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use index::{write_json_atomic, TextIndex, TEXT_INDEX_FILE, VECTOR_INDEX_FILE};
pub use ingest::{
    discover_pdf_files, ingest_folder, ingest_to_file, IngestionOptions, IngestionReport,
    SkippedPdf,
};
pub use models::{
    ChatResponse, Citation, DoorScheduleResponse, DoorScheduleRow, EmbeddedChunk, ScoredHit,
    TextChunk,
};
pub use retriever::DEFAULT_TOP_K;
