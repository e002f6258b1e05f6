use std::path::Path;

use common::error::AppError;
use lopdf::Document;
use tracing::debug;

const MIN_TEXT_LEN: usize = 150;
const MIN_ASCII_RATIO: f64 = 0.7;
const MIN_LETTER_RATIO: f64 = 0.3;

/// Extracts the text layer of a PDF and normalizes it for chunking.
///
/// Extraction runs on the blocking pool; the result is rejected when the
/// text layer is missing or too noisy to index.
pub async fn extract_pdf_text(file_path: &Path) -> Result<String, AppError> {
    let pdf_bytes = tokio::fs::read(file_path).await?;

    validate_page_count(pdf_bytes.clone()).await?;

    let extraction = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&pdf_bytes).map(|s| s.trim().to_string())
    })
    .await?
    .map_err(|err| AppError::Processing(format!("Failed to extract text from PDF: {err}")))?;

    if extraction.is_empty() {
        return Err(AppError::Processing(
            "PDF contains no extractable text layer".into(),
        ));
    }

    if !looks_good_enough(&extraction) {
        return Err(AppError::Processing(
            "PDF text layer is too noisy to index".into(),
        ));
    }

    debug!(chars = extraction.len(), "Extracted PDF text layer");

    Ok(reflow_text(&extraction))
}

/// Parses the PDF structure to confirm it has at least one page, keeping the
/// work off the async executor.
async fn validate_page_count(pdf_bytes: Vec<u8>) -> Result<(), AppError> {
    let page_count = tokio::task::spawn_blocking(move || -> Result<usize, AppError> {
        let document = Document::load_mem(&pdf_bytes)
            .map_err(|err| AppError::Processing(format!("Failed to parse PDF: {err}")))?;
        Ok(document.get_pages().len())
    })
    .await??;

    if page_count == 0 {
        return Err(AppError::Processing("PDF appears to have no pages".into()));
    }

    Ok(())
}

/// Heuristic that determines whether extracted text looks like well-formed prose.
fn looks_good_enough(text: &str) -> bool {
    if text.len() < MIN_TEXT_LEN {
        return false;
    }

    let total_chars = text.chars().count() as f64;
    if total_chars == 0.0 {
        return false;
    }

    let ascii_chars = text.chars().filter(|c| c.is_ascii()).count() as f64;
    if ascii_chars / total_chars < MIN_ASCII_RATIO {
        return false;
    }

    let letters = text.chars().filter(|c| c.is_alphabetic()).count() as f64;
    letters / total_chars > MIN_LETTER_RATIO
}

/// Joins hard-wrapped paragraph text while preserving structural lines.
fn reflow_text(input: &str) -> String {
    let mut paragraphs = Vec::new();
    let mut buffer: Vec<String> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            continue;
        }

        if is_structural_line(trimmed) {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            paragraphs.push(trimmed.to_string());
            continue;
        }

        buffer.push(trimmed.to_string());
    }

    if !buffer.is_empty() {
        paragraphs.push(buffer.join(" "));
    }

    paragraphs.join("\n\n")
}

/// Detects whether a line should remain on its own after reflowing.
fn is_structural_line(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with('-')
        || line.starts_with('*')
        || line.starts_with('>')
        || line.starts_with('|')
        || line
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
            && line.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_good_enough_short_text() {
        assert!(!looks_good_enough("too short"));
    }

    #[test]
    fn test_looks_good_enough_ascii_text() {
        let text = "This is a reasonably long ASCII text that should pass the heuristic. \
        It contains multiple sentences and a decent amount of letters to satisfy the threshold.";
        assert!(looks_good_enough(text));
    }

    #[test]
    fn test_looks_good_enough_rejects_symbol_noise() {
        let noise = "%%%% #### @@@@ 0101 ++++ ---- ".repeat(20);
        assert!(!looks_good_enough(&noise));
    }

    #[test]
    fn test_reflow_text_joins_wrapped_paragraphs() {
        let input = "Item one\nItem two\n\n- Bullet\n- Another";
        let output = reflow_text(input);
        assert!(output.contains("Item one Item two"));
        assert!(output.contains("- Bullet"));
    }

    #[test]
    fn test_reflow_text_keeps_numbered_lines() {
        let input = "1. First step\n2. Second step";
        let output = reflow_text(input);
        assert!(output.contains("1. First step"));
        assert!(output.contains("2. Second step"));
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf_bytes() {
        let staged = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .expect("failed to create temp file");
        std::fs::write(staged.path(), b"this is not a pdf").expect("failed to write bytes");

        let result = extract_pdf_text(staged.path()).await;
        assert!(matches!(result, Err(AppError::Processing(_))));
    }
}
