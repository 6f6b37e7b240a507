//! Document intake. Turns uploaded PDF/DOCX bytes into plain text.
//!
//! Extraction is synchronous and CPU-bound. Callers in async context run it
//! on the blocking pool (see `documents::ingest`). Failures are permanent:
//! the same bytes always fail the same way, so nothing here is retried.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod docx;
pub mod pdf;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_MSWORD: &str = "application/msword";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Please upload PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Document is empty")]
    EmptyInput,

    #[error("Document is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to extract text from {format}: {message}")]
    Extraction {
        format: DocumentFormat,
        message: String,
    },
}

/// Closed set of formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_mime(mime: &str) -> Result<Self, ExtractError> {
        // Strip parameters such as "; charset=binary"
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            MIME_PDF => Ok(DocumentFormat::Pdf),
            MIME_DOCX | MIME_MSWORD => Ok(DocumentFormat::Docx),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_extension(ext: &str) -> Result<Self, ExtractError> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "doc" => Ok(DocumentFormat::Docx),
            other => Err(ExtractError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Resolves the format of an upload. A recognised MIME type wins; generic
    /// types like `application/octet-stream` fall back to the file extension.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Result<Self, ExtractError> {
        let by_mime = content_type.map(Self::from_mime);
        if let Some(Ok(format)) = by_mime {
            return Ok(format);
        }

        let by_extension = filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| Self::from_extension(ext));

        let mime_error = by_mime.and_then(Result::err);
        match by_extension {
            Some(Ok(format)) => Ok(format),
            Some(Err(e)) => Err(mime_error.unwrap_or(e)),
            None => Err(mime_error
                .unwrap_or_else(|| ExtractError::UnsupportedFormat("unknown".to_string()))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw uploaded document. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Bytes,
    format: DocumentFormat,
}

impl Document {
    pub fn new(bytes: Bytes, format: DocumentFormat) -> Self {
        Self { bytes, format }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Rejects documents above the configured upload limit.
pub fn check_size(document: &Document, limit: usize) -> Result<(), ExtractError> {
    if document.len() > limit {
        return Err(ExtractError::TooLarge {
            size: document.len(),
            limit,
        });
    }
    Ok(())
}

/// Extracts plain text from a document according to its declared format.
pub fn extract_text(document: &Document) -> Result<String, ExtractError> {
    if document.is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    match document.format() {
        DocumentFormat::Pdf => pdf::extract(document.bytes()),
        DocumentFormat::Docx => docx::extract(document.bytes()),
    }
}
