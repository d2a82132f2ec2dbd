//! Sliding-window text chunker used at ingestion time.
//!
//! Chunks are the unit of retrieval: fixed-size windows with overlap, snapped
//! to sentence boundaries so a chunk does not cut mid-sentence. Offsets are
//! char offsets, not byte offsets.

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Split `text` into overlapping chunks of at most `size` chars.
///
/// When the window end falls before the end of the text, the last 20% of the
/// window is scanned backwards for a `". "` sentence terminator and the
/// boundary moves to just after the period. Each chunk is whitespace-trimmed.
/// The next window starts at `end - overlap`. Empty input yields no chunks.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < size);

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = start + size;

        if end < chars.len() {
            let search_start = end - size / 5;
            if let Some(pos) = rfind_sentence_end(&chars, search_start, end) {
                end = pos + 1;
            }
        }

        let slice_end = end.min(chars.len());
        let chunk: String = chars[start..slice_end].iter().collect();
        chunks.push(chunk.trim().to_string());

        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

/// Last position of `". "` starting in `[from, to)`, requiring both chars to
/// fit before `to`.
fn rfind_sentence_end(chars: &[char], from: usize, to: usize) -> Option<usize> {
    if to < 2 || from + 2 > to {
        return None;
    }
    (from..=to - 2)
        .rev()
        .find(|&i| chars[i] == '.' && chars[i + 1] == ' ')
}
