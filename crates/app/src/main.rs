mod server;

use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_qa_core::{
    build_vector_index, extract_page_texts, ingest_to_file, IndexError, IngestionOptions,
    LopdfExtractor, OpenAiEmbedder, TextIndex, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_TOP_K, TEXT_INDEX_FILE, VECTOR_INDEX_FILE,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Page text index written by `ingest` and read by `serve`.
    #[arg(long, env = "PDF_QA_TEXT_INDEX", default_value = TEXT_INDEX_FILE, global = true)]
    text_index: PathBuf,

    /// Vector index written by `embed`.
    #[arg(long, env = "PDF_QA_VECTOR_INDEX", default_value = VECTOR_INDEX_FILE, global = true)]
    vector_index: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Extract per-page text from every PDF in a folder into the text index.
    Ingest {
        /// Folder that contains the PDFs (not searched recursively).
        #[arg(long, env = "PDF_QA_DOCS_DIR", default_value = "docs")]
        folder: PathBuf,
        /// Skip PDFs that cannot be opened instead of aborting the run.
        #[arg(long, default_value_t = false)]
        skip_unreadable: bool,
    },
    /// Attach an embedding vector to every indexed page.
    Embed {
        /// API key for the embedding provider.
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_api_key: String,
        /// Base URL for OpenAI-compatible endpoints.
        #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
        openai_base_url: String,
        /// Embedding model identifier.
        #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
        model: String,
    },
    /// Serve the health, chat and door-schedule endpoints.
    Serve {
        /// Address to bind the HTTP server to.
        #[arg(long, env = "PDF_QA_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
        /// Origins allowed by CORS. Repeat for several.
        #[arg(
            long = "allowed-origin",
            env = "PDF_QA_ALLOWED_ORIGINS",
            value_delimiter = ',',
            default_values_t = server::DEFAULT_ALLOWED_ORIGINS.map(String::from)
        )]
        allowed_origins: Vec<String>,
    },
    /// Keyword search over the text index.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Number of pages to return.
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Print a short text preview of every page of one PDF.
    Preview {
        /// PDF to inspect.
        #[arg(long)]
        file: PathBuf,
        /// Characters shown per page.
        #[arg(long, default_value = "300")]
        max_chars: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    match cli.command {
        Command::Ingest {
            folder,
            skip_unreadable,
        } => {
            let options = IngestionOptions {
                skip_unreadable_files: skip_unreadable,
            };
            let report =
                ingest_to_file(&folder, &cli.text_index, &LopdfExtractor, options, |path| {
                    let name = path.file_name().unwrap_or(path.as_os_str());
                    println!("Processing: {}", name.to_string_lossy());
                })?;

            for skipped in &report.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
            }
            if report.files_processed == 0 {
                warn!(folder = %folder.display(), "no pdf files found");
            }

            println!(
                "\nIngestion complete. Saved {} chunks to {} at {}",
                report.index.len(),
                cli.text_index.display(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Embed {
            openai_api_key,
            openai_base_url,
            model,
        } => {
            let text_index = cli.text_index.clone();
            let vector_index = cli.vector_index.clone();

            // the blocking HTTP client must not run on the async runtime
            let written = tokio::task::spawn_blocking(move || {
                let embedder = OpenAiEmbedder::new(openai_api_key, &openai_base_url, model)?;
                build_vector_index(&text_index, &vector_index, &embedder, |i, total, chunk| {
                    println!(
                        "Embedding {i}/{total} -> {} (page {})",
                        chunk.file_name, chunk.page
                    );
                })
            })
            .await??;

            println!(
                "\nEmbeddings created for {written} chunks. Saved to {}",
                cli.vector_index.display()
            );
        }
        Command::Serve {
            bind,
            allowed_origins,
        } => {
            let index = Arc::new(load_index_or_empty(&cli.text_index)?);
            let cors = server::cors_layer(&allowed_origins)?;
            server::serve(bind, server::router(index, cors)).await?;
        }
        Command::Search { query, top_k } => {
            let index = TextIndex::load(&cli.text_index)?;
            let hits = index.search(&query, top_k);

            println!("query: {query}");
            if hits.is_empty() {
                println!("no matching pages");
            }
            for hit in hits {
                println!(
                    "[{}] score={} file={} page={}",
                    hit.chunk.id, hit.score, hit.chunk.file_name, hit.chunk.page
                );
                println!("  {}", preview_line(&hit.chunk.text, 200));
            }
        }
        Command::Preview { file, max_chars } => {
            println!("Looking for PDF at: {}", file.display());
            let pages = extract_page_texts(&file)?;
            println!("Total number of pages: {}", pages.len());

            for page in pages {
                let preview = preview_line(&page.text, max_chars);
                println!("\n--- Page {} ---", page.number);
                if preview.trim().is_empty() {
                    println!("[No text extracted]");
                } else {
                    println!("{preview}");
                }
            }
        }
    }

    Ok(())
}

/// The server still starts without an index; every query then finds nothing.
fn load_index_or_empty(path: &Path) -> Result<TextIndex, IndexError> {
    match TextIndex::load(path) {
        Ok(index) => {
            info!(chunks = index.len(), path = %path.display(), "loaded text index");
            Ok(index)
        }
        Err(IndexError::NotFound(_)) => {
            warn!(path = %path.display(), "text index not found, run `pdf-qa ingest` first; serving an empty index");
            Ok(TextIndex::default())
        }
        Err(error) => Err(error),
    }
}

fn preview_line(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
