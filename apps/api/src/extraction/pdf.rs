use std::panic::{self, AssertUnwindSafe};

use super::{DocumentFormat, ExtractError};

/// Extracts text from an in-memory PDF.
///
/// `pdf_extract` panics on some malformed inputs instead of returning an
/// error, so the call is isolated and a panic is reported as a corrupt file.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    match outcome {
        Ok(Ok(text)) => {
            tracing::debug!("PDF parsed: {} bytes -> {} chars", bytes.len(), text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(ExtractError::Extraction {
            format: DocumentFormat::Pdf,
            message: e.to_string(),
        }),
        Err(_) => Err(ExtractError::Extraction {
            format: DocumentFormat::Pdf,
            message: "malformed PDF structure".to_string(),
        }),
    }
}
