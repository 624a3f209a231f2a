use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    /// Returns every page of the document in page order. Pages without a
    /// readable text layer come back with empty text.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let pages = document
            .get_pages()
            .into_keys()
            .map(|page_no| PageText {
                number: page_no,
                // a page that fails to decode is treated as blank
                text: document.extract_text(&[page_no]).unwrap_or_default(),
            })
            .collect();

        Ok(pages)
    }
}

pub fn extract_page_texts(path: &Path) -> Result<Vec<PageText>, IngestError> {
    LopdfExtractor.extract_pages(path)
}
