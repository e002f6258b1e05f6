use common::error::AppError;
use text_splitter::TextSplitter;

/// Splits extracted document text into chunks sized within the configured
/// character bounds.
pub fn prepare_chunks(text: &str, min_chars: usize, max_chars: usize) -> Result<Vec<String>, AppError> {
    if min_chars == 0 || max_chars == 0 || min_chars > max_chars {
        return Err(AppError::Validation(
            "invalid chunk character bounds; ensure 0 < min <= max".into(),
        ));
    }

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "cannot chunk empty document text".into(),
        ));
    }

    let splitter = TextSplitter::new(min_chars..max_chars);
    let chunks: Vec<String> = splitter.chunks(text).map(str::to_owned).collect();

    if chunks.is_empty() {
        return Err(AppError::Processing(
            "chunking produced no chunks from non-empty text".into(),
        ));
    }

    Ok(chunks)
}
