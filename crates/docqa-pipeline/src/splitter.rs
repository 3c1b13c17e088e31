//! Fixed-size character chunking.
//!
//! The window is counted in characters, not words or sentences, so
//! splitting is deterministic given identical input text.

/// Window size in characters.
pub const CHUNK_SIZE: usize = 800;
/// Characters shared between consecutive chunks.
pub const CHUNK_OVERLAP: usize = 80;

pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < chunk_size);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end >= chars.len() {
            break;
        }
        start = end - overlap;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split_text("hello world", CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn chunks_overlap_by_the_configured_amount() {
        let text: String = ('a'..='z').cycle().take(2000).collect();
        let chunks = split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(CHUNK_SIZE - CHUNK_OVERLAP).collect();
            let head: String = pair[1].chars().take(CHUNK_OVERLAP).collect();
            assert_eq!(tail, head, "consecutive chunks must share the overlap window");
        }
    }

    #[test]
    fn splitting_is_deterministic() {
        let text: String = "The sky is blue. The grass is green. ".repeat(60);
        let first = split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        let second = split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let text: String = "héllo wörld ".repeat(100);
        let chunks = split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        let rebuilt_len: usize = chunks.iter().map(|c| c.chars().count()).sum();
        assert!(rebuilt_len >= text.chars().count());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= CHUNK_SIZE);
        }
    }
}
