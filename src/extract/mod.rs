
use anyhow::{Context, Result};
use docx_rs::DocumentChild;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read a file's textual content as a single string.
///
/// PDF and DOCX get format-aware extraction; everything else is read as
/// UTF-8 with undecodable bytes replaced. Extraction failures are logged and
/// yield an empty string so a batch run can skip the file and keep going.
#[inline]
pub fn extract_text(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let result = match extension.as_str() {
        "pdf" => extract_pdf(path),
        "docx" => extract_docx(path),
        _ => extract_plain(path),
    };

    match result {
        Ok(text) => {
            debug!(
                "Extracted {} chars from {}",
                text.chars().count(),
                path.display()
            );
            text
        }
        Err(e) => {
            warn!("Failed to extract text from {}: {:#}", path.display(), e);
            String::new()
        }
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    // the PDF parser panics on some malformed inputs instead of returning
    // Err; treat a panic like any other extraction failure
    match std::panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(parsed) => parsed
            .with_context(|| format!("Failed to extract PDF text from {}", path.display())),
        Err(_) => Err(anyhow::anyhow!(
            "PDF parser panicked on {}",
            path.display()
        )),
    }
}

fn extract_docx(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read DOCX file {}", path.display()))?;
    let docx = docx_rs::read_docx(&bytes)
        .with_context(|| format!("Failed to parse DOCX file {}", path.display()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph.raw_text()),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn extract_plain(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
