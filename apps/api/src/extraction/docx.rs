//! DOCX text extraction.
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml`.
//! Text runs are `<w:t>` elements, paragraphs end at `</w:p>`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{DocumentFormat, ExtractError};

const BODY_PART: &str = "word/document.xml";

/// Upper bound on the decompressed body. The upload limit only bounds the
/// compressed container.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_body_part(bytes, MAX_BODY_BYTES)?;
    body_xml_to_text(&xml)
}

fn read_body_part(bytes: &[u8], limit: usize) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(extraction_error)?;
    let part = archive.by_name(BODY_PART).map_err(extraction_error)?;

    let declared = usize::try_from(part.size()).unwrap_or(usize::MAX);
    if declared > limit {
        return Err(ExtractError::TooLarge {
            size: declared,
            limit,
        });
    }

    // The declared size comes from the archive itself, so cap the read too.
    let mut raw = Vec::new();
    part.take(limit as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(extraction_error)?;
    if raw.len() > limit {
        return Err(ExtractError::TooLarge {
            size: raw.len(),
            limit,
        });
    }

    String::from_utf8(raw).map_err(extraction_error)
}

fn body_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event().map_err(extraction_error)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                let run = e.unescape().map_err(extraction_error)?;
                text.push_str(&run);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn extraction_error(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Extraction {
        format: DocumentFormat::Docx,
        message: e.to_string(),
    }
}

/// Builds a minimal DOCX container around the given paragraphs.
#[cfg(test)]
pub(crate) fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(BODY_PART, zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
