//! Fixed-width text chunking for the synthesis API.
//!
//! The remote speech API caps the input length per request, so extracted
//! text is split into contiguous slices before synthesis. Splitting is
//! deliberately plain: no sentence detection, no overlap. Chunk boundaries
//! are counted in characters rather than bytes so multibyte text never
//! splits mid-character.

/// Split `text` into contiguous chunks of at most `max_chars` characters.
///
/// Chunks preserve order, do not overlap, and concatenate back to `text`
/// exactly; every chunk except possibly the last has length `max_chars`.
/// An empty input yields no chunks.
///
/// `max_chars` must be positive; configuration validation guarantees this
/// for all production callers.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    debug_assert!(max_chars > 0, "chunk size must be greater than zero");
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(text[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}
