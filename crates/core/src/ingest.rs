use crate::{IngestError, PdfExtractor, TextChunk, TextIndex};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// PDFs directly inside `folder`, sorted by path.
pub fn discover_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.into_path());
        }
    }

    files.sort_unstable();
    Ok(files)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestionOptions {
    /// Record PDFs that cannot be opened in `skipped_files` instead of
    /// aborting the run.
    pub skip_unreadable_files: bool,
}

#[derive(Debug)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub index: TextIndex,
    pub files_processed: usize,
    pub skipped_files: Vec<SkippedPdf>,
}

/// Builds one chunk per non-blank page of every PDF in `folder`. Ids are
/// assigned from 0 across all files in enumeration order. A file that cannot
/// be opened fails the whole run unless `options.skip_unreadable_files` is
/// set, in which case it is reported in `skipped_files`.
pub fn ingest_folder<E, F>(
    folder: &Path,
    extractor: &E,
    options: IngestionOptions,
    mut on_file: F,
) -> Result<IngestionReport, IngestError>
where
    E: PdfExtractor + ?Sized,
    F: FnMut(&Path),
{
    let files = discover_pdf_files(folder)?;

    let mut chunks = Vec::new();
    let mut skipped_files = Vec::new();
    let mut next_id = 0u64;

    for path in &files {
        on_file(path);

        let build_result = (|| {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
            let pages = extractor.extract_pages(path)?;
            Ok::<_, IngestError>((file_name.to_string(), pages))
        })();

        let (file_name, pages) = match build_result {
            Ok(extracted) => extracted,
            Err(error) if !options.skip_unreadable_files => {
                return Err(IngestError::UnreadableFile {
                    path: path.clone(),
                    reason: error.to_string(),
                });
            }
            Err(error) => {
                skipped_files.push(SkippedPdf {
                    path: path.clone(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        for page in pages {
            let text = page.text.trim();
            if text.is_empty() {
                continue;
            }

            chunks.push(TextChunk {
                id: next_id,
                file_name: file_name.clone(),
                page: page.number,
                text: text.to_string(),
            });
            next_id += 1;
        }
    }

    Ok(IngestionReport {
        index: TextIndex::from_chunks(chunks),
        files_processed: files.len(),
        skipped_files,
    })
}

/// Runs [`ingest_folder`] and replaces `output` with the complete index.
/// Nothing is written when the run fails.
pub fn ingest_to_file<E, F>(
    folder: &Path,
    output: &Path,
    extractor: &E,
    options: IngestionOptions,
    on_file: F,
) -> Result<IngestionReport, IngestError>
where
    E: PdfExtractor + ?Sized,
    F: FnMut(&Path),
{
    let report = ingest_folder(folder, extractor, options, on_file)?;
    report.index.save(output)?;
    Ok(report)
}
