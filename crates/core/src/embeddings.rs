use crate::error::{EmbeddingError, IndexError};
use crate::index::{read_json, write_json_atomic};
use crate::models::{EmbeddedChunk, TextChunk};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub trait Embedder {
    fn model(&self) -> &str;
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Blocking client for OpenAI-compatible `/embeddings` endpoints. Sends one
/// input per request and never retries.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        let api_key = api_key.into().trim().to_string();
        let model = model.into().trim().to_string();
        if api_key.is_empty() {
            return Err(EmbeddingError::InvalidArgument(
                "missing embedding API key (set OPENAI_API_KEY)".to_string(),
            ));
        }
        if model.is_empty() {
            return Err(EmbeddingError::InvalidArgument(
                "missing embedding model name".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            endpoint: embeddings_endpoint(base_url)?,
            api_key,
            model,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn embeddings_endpoint(base_url: &str) -> Result<Url, EmbeddingError> {
    let endpoint = format!("{}/embeddings", base_url.trim().trim_end_matches('/'));
    Ok(Url::parse(&endpoint)?)
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: EmbeddingResponse = response.json()?;
        first_embedding(payload)
    }
}

fn first_embedding(payload: EmbeddingResponse) -> Result<Vec<f32>, EmbeddingError> {
    payload
        .data
        .into_iter()
        .next()
        .map(|entry| entry.embedding)
        .ok_or_else(|| EmbeddingError::Malformed("response contained no embeddings".to_string()))
}

/// Embeds every chunk of the text index in order, one request at a time,
/// then writes the vector index. The first failure aborts the run and
/// leaves `vector_path` untouched.
pub fn build_vector_index<E, F>(
    text_path: &Path,
    vector_path: &Path,
    embedder: &E,
    mut on_progress: F,
) -> Result<usize, EmbeddingError>
where
    E: Embedder + ?Sized,
    F: FnMut(usize, usize, &TextChunk),
{
    let chunks: Vec<TextChunk> = read_json(text_path)?;
    let total = chunks.len();

    let mut records = Vec::with_capacity(total);
    for (position, chunk) in chunks.into_iter().enumerate() {
        on_progress(position + 1, total, &chunk);
        let embedding = embedder.embed(&chunk.text)?;
        records.push(EmbeddedChunk { chunk, embedding });
    }

    write_json_atomic(vector_path, &records, false)?;
    Ok(records.len())
}

/// Loads a vector index written by [`build_vector_index`].
pub fn load_vector_index(path: &Path) -> Result<Vec<EmbeddedChunk>, IndexError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::{
        build_vector_index, embeddings_endpoint, first_embedding, load_vector_index, Embedder,
        EmbeddingResponse, OpenAiEmbedder,
    };
    use crate::error::{EmbeddingError, IndexError};
    use crate::models::TextChunk;
    use crate::TextIndex;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    /// Embeds text as `[len]` and fails on any text containing `fail_on`.
    struct LengthEmbedder {
        fail_on: Option<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl LengthEmbedder {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Embedder for LengthEmbedder {
        fn model(&self) -> &str {
            "length"
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.borrow_mut().push(text.to_string());
            if self.fail_on.is_some_and(|needle| text.contains(needle)) {
                return Err(EmbeddingError::Api {
                    status: 500,
                    body: "upstream failure".to_string(),
                });
            }
            Ok(vec![text.len() as f32])
        }
    }

    fn sample_index() -> TextIndex {
        TextIndex::from_chunks(vec![
            TextChunk {
                id: 0,
                file_name: "a.pdf".to_string(),
                page: 1,
                text: "Door".to_string(),
            },
            TextChunk {
                id: 1,
                file_name: "a.pdf".to_string(),
                page: 2,
                text: "Window schedule".to_string(),
            },
        ])
    }

    #[test]
    fn missing_text_index_asks_for_ingestion() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = build_vector_index(
            &dir.path().join("index_text.json"),
            &dir.path().join("index_vectors.json"),
            &LengthEmbedder::new(None),
            |_, _, _| {},
        );

        let error = result.expect_err("missing index must fail");
        assert!(matches!(
            error,
            EmbeddingError::Index(IndexError::NotFound(_))
        ));
        assert!(error.to_string().contains("ingest"));
        Ok(())
    }

    #[test]
    fn vectors_are_attached_in_index_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let text_path = dir.path().join("index_text.json");
        let vector_path = dir.path().join("index_vectors.json");
        sample_index().save(&text_path)?;
        let embedder = LengthEmbedder::new(None);

        let mut progress = Vec::new();
        let written = build_vector_index(&text_path, &vector_path, &embedder, |i, total, chunk| {
            progress.push((i, total, chunk.page));
        })?;

        assert_eq!(written, 2);
        assert_eq!(progress, vec![(1, 2, 1), (2, 2, 2)]);
        assert_eq!(*embedder.calls.borrow(), vec!["Door", "Window schedule"]);

        let records = load_vector_index(&vector_path)?;
        assert_eq!(records[0].chunk, sample_index().chunks()[0]);
        assert_eq!(records[0].embedding, vec![4.0]);
        assert_eq!(records[1].embedding, vec![15.0]);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&vector_path)?)?;
        assert_eq!(raw[1]["file_name"], "a.pdf");
        assert_eq!(raw[1]["text"], "Window schedule");
        assert_eq!(raw[1]["id"], 1);
        Ok(())
    }

    #[test]
    fn provider_failure_aborts_without_output() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let text_path = dir.path().join("index_text.json");
        let vector_path = dir.path().join("index_vectors.json");
        sample_index().save(&text_path)?;
        fs::write(&vector_path, "previous")?;
        let embedder = LengthEmbedder::new(Some("Window"));

        let result = build_vector_index(&text_path, &vector_path, &embedder, |_, _, _| {});

        assert!(matches!(result, Err(EmbeddingError::Api { status: 500, .. })));
        assert_eq!(fs::read_to_string(&vector_path)?, "previous");
        Ok(())
    }

    #[test]
    fn openai_embedder_requires_key_and_model() {
        assert!(matches!(
            OpenAiEmbedder::new("  ", super::DEFAULT_OPENAI_BASE_URL, "m"),
            Err(EmbeddingError::InvalidArgument(_))
        ));
        assert!(matches!(
            OpenAiEmbedder::new("sk-test", super::DEFAULT_OPENAI_BASE_URL, ""),
            Err(EmbeddingError::InvalidArgument(_))
        ));
        assert!(matches!(
            OpenAiEmbedder::new("sk-test", "not a url", "m"),
            Err(EmbeddingError::Url(_))
        ));
    }

    #[test]
    fn endpoint_appends_embeddings_path() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/v1/")?.as_str(),
            "https://api.openai.com/v1/embeddings"
        );
        Ok(())
    }

    #[test]
    fn empty_response_is_malformed() -> Result<(), Box<dyn std::error::Error>> {
        let payload: EmbeddingResponse = serde_json::from_str(r#"{"data": []}"#)?;
        assert!(matches!(
            first_embedding(payload),
            Err(EmbeddingError::Malformed(_))
        ));

        let payload: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"embedding": [0.5, -1.0], "index": 0}]}"#)?;
        assert_eq!(first_embedding(payload)?, vec![0.5, -1.0]);
        Ok(())
    }
}
