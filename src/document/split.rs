pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

/// Splits text into retrieval chunks of at most `CHUNK_SIZE` characters,
/// stepping by `CHUNK_SIZE - CHUNK_OVERLAP` so consecutive chunks share
/// exactly `CHUNK_OVERLAP` characters. The last chunk ends at the end of the
/// input and may be shorter. Counts are in chars, not bytes.
pub fn split_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= CHUNK_SIZE {
        return vec![text.to_string()];
    }

    let step = CHUNK_SIZE - CHUNK_OVERLAP;
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + CHUNK_SIZE).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let text = "a".repeat(1000);
        let chunks = split_text(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn empty_text_is_a_single_empty_chunk() {
        assert_eq!(split_text(""), vec!["".to_string()]);
    }

    #[test]
    fn consecutive_chunks_overlap_exactly() {
        let text: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = split_text(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - CHUNK_OVERLAP..].iter().collect();
            let head: String = next[..CHUNK_OVERLAP.min(next.len())].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn last_chunk_ends_at_input_end() {
        let text = "x".repeat(1801);
        let chunks = split_text(&text);
        let last = chunks.last().unwrap();
        assert!(text.ends_with(last));
        // starts: 0, 800, 1600 -> last covers 1600..1801
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.last().unwrap().chars().count(), 201);
    }

    #[test]
    fn all_chunks_bounded_by_chunk_size() {
        let text = "y".repeat(5432);
        for chunk in split_text(&text) {
            assert!(chunk.chars().count() <= CHUNK_SIZE);
        }
    }

    #[test]
    fn counts_chars_not_bytes() {
        let text = "é".repeat(1000);
        let chunks = split_text(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "日本語のテキスト。".repeat(300);
        let chunks = split_text(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let tail: String = prev[prev.len() - CHUNK_OVERLAP..].iter().collect();
            assert!(pair[1].starts_with(&tail));
        }
    }
}
