// Document ingestion
// Reads every supported file in a directory into per-page text documents


use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{QaError, Result};

/// Where a piece of text came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentSource {
    pub path: PathBuf,
    /// 1-based page number for paginated formats
    pub page: Option<u32>,
}

impl fmt::Display for DocumentSource {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "{} (page {})", self.path.display(), page),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Raw text loaded from one source file (or one page of it)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: DocumentSource,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    /// Detect the format from the file extension, case-insensitively
    #[inline]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Load every supported document in `directory`.
///
/// Files are visited in file name order and pages in page order. Files that
/// cannot be parsed are skipped with a warning; a missing or unreadable
/// directory is an error.
#[inline]
pub fn load_directory<P: AsRef<Path>>(directory: P) -> Result<Vec<Document>> {
    let directory = directory.as_ref();
    info!("Loading documents from directory: {}", directory.display());

    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    let mut skipped = 0usize;

    for path in paths {
        let Some(format) = DocumentFormat::from_path(&path) else {
            debug!("Ignoring unsupported file: {}", path.display());
            continue;
        };

        match load_file(&path, format) {
            Ok(file_documents) => {
                debug!(
                    "Loaded {} documents from {}",
                    file_documents.len(),
                    path.display()
                );
                documents.extend(file_documents);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} unreadable files", skipped);
    }
    info!("Loaded {} documents", documents.len());

    Ok(documents)
}

/// Load a single file, returning one document per non-empty page
#[inline]
pub fn load_file(path: &Path, format: DocumentFormat) -> Result<Vec<Document>> {
    match format {
        DocumentFormat::Pdf => load_pdf(path),
        DocumentFormat::PlainText => load_plain_text(path),
    }
}

fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| QaError::Document(format!("Failed to parse PDF: {}", e)))?;

    let mut documents = Vec::new();
    for page in pdf.get_pages().into_keys() {
        let text = pdf.extract_text(&[page]).map_err(|e| {
            QaError::Document(format!("Failed to extract text from page {}: {}", page, e))
        })?;

        if text.trim().is_empty() {
            debug!("Page {} of {} has no text", page, path.display());
            continue;
        }

        documents.push(Document {
            source: DocumentSource {
                path: path.to_path_buf(),
                page: Some(page),
            },
            text,
        });
    }

    Ok(documents)
}

fn load_plain_text(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| QaError::Document("File is not valid UTF-8".to_string()))?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Document {
        source: DocumentSource {
            path: path.to_path_buf(),
            page: None,
        },
        text,
    }])
}
