use crate::error::IndexError;
use crate::models::{ScoredHit, TextChunk};
use crate::retriever;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const TEXT_INDEX_FILE: &str = "index_text.json";
pub const VECTOR_INDEX_FILE: &str = "index_vectors.json";

/// Page chunks in ingestion order. Read-only once constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextIndex {
    chunks: Vec<TextChunk>,
}

impl TextIndex {
    pub fn from_chunks(chunks: Vec<TextChunk>) -> Self {
        Self { chunks }
    }

    pub fn load(path: &Path) -> Result<Self, IndexError> {
        read_json(path).map(Self::from_chunks)
    }

    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        write_json_atomic(path, &self.chunks, true)
    }

    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Keyword search; see [`retriever::search`].
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredHit<'_>> {
        retriever::search(&self.chunks, query, k)
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IndexError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(IndexError::NotFound(path.to_path_buf()))
        }
        Err(error) => return Err(error.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Serializes `value` next to `path` and renames it into place, so the
/// target is either the previous content or the complete new one.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), IndexError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let staged = NamedTempFile::new_in(&parent)?;
    {
        let mut writer = BufWriter::new(staged.as_file());
        if pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer.flush()?;
    }
    staged.as_file().sync_all()?;

    staged.persist(path).map_err(|source| IndexError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_json_atomic, TextIndex};
    use crate::error::IndexError;
    use crate::models::TextChunk;
    use std::fs;
    use tempfile::tempdir;

    fn chunk(id: u64, page: u32, text: &str) -> TextChunk {
        TextChunk {
            id,
            file_name: "a.pdf".to_string(),
            page,
            text: text.to_string(),
        }
    }

    #[test]
    fn missing_index_reports_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = TextIndex::load(&dir.path().join("index_text.json"));

        match result {
            Err(IndexError::NotFound(path)) => {
                assert!(path.ends_with("index_text.json"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn saved_index_uses_flat_record_layout() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("index_text.json");
        let index = TextIndex::from_chunks(vec![chunk(0, 1, "Door D-101"), chunk(1, 3, "Lobby")]);

        index.save(&path)?;

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(
            raw,
            serde_json::json!([
                {"id": 0, "file_name": "a.pdf", "page": 1, "text": "Door D-101"},
                {"id": 1, "file_name": "a.pdf", "page": 3, "text": "Lobby"}
            ])
        );
        assert_eq!(TextIndex::load(&path)?, index);
        Ok(())
    }

    #[test]
    fn atomic_write_replaces_previous_content() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("out.json");
        fs::write(&path, "stale")?;

        write_json_atomic(&path, &vec![1, 2, 3], false)?;

        assert_eq!(fs::read_to_string(&path)?, "[1,2,3]");
        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn malformed_index_is_a_serialization_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("index_text.json");
        fs::write(&path, "{not json")?;

        assert!(matches!(
            TextIndex::load(&path),
            Err(IndexError::Serialization(_))
        ));
        Ok(())
    }
}
