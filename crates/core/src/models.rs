use serde::{Deserialize, Serialize};

/// One page of extracted text. The unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: u64,
    pub file_name: String,
    pub page: u32,
    pub text: String,
}

impl TextChunk {
    pub fn citation(&self) -> Citation {
        Citation {
            file_name: self.file_name.clone(),
            page: self.page,
        }
    }
}

/// A text chunk with the vector returned by the embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    #[serde(flatten)]
    pub chunk: TextChunk,
    pub embedding: Vec<f32>,
}

/// A chunk that matched at least one query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredHit<'a> {
    pub chunk: &'a TextChunk,
    pub score: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub file_name: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorScheduleRow {
    pub file_name: String,
    pub page: u32,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorScheduleResponse {
    pub rows: Vec<DoorScheduleRow>,
    pub citations: Vec<Citation>,
    pub note: String,
}
