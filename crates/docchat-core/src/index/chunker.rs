//! Overlapping fixed-window chunking

use super::loader::PageText;
use serde::{Deserialize, Serialize};

/// Default chunk window, in characters
pub const CHUNK_SIZE_CHARS: usize = 1000;
/// Default overlap carried from the end of one chunk into the next
pub const CHUNK_OVERLAP_CHARS: usize = 200;

/// A window cut from a single page's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    pub text: String,
    /// Byte offset of the window within the page
    pub position: usize,
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the source document
    pub source: String,
    /// 1-based page number
    pub page: u32,
    /// Byte offset within the page text
    pub position: usize,
    /// Order of the chunk within the whole document
    pub seq: u32,
}

/// Unit of retrieval: a bounded span of document text plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Split `content` into windows of at most `chunk_size` characters that
/// overlap by roughly `overlap` characters, preferring to end a window on a
/// paragraph, sentence, line, or word break found in its last 30%.
pub fn chunk_by_chars(content: &str, chunk_size: usize, overlap: usize) -> Vec<TextWindow> {
    if content.is_empty() {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    // Byte offset of every character, plus the end of the text
    let offsets: Vec<usize> = content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect();
    let total = offsets.len() - 1;

    if total <= chunk_size {
        return vec![TextWindow {
            text: content.to_string(),
            position: 0,
        }];
    }

    let mut windows = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        let mut chunk_end = end;

        if end < total {
            let search_start = start + (chunk_size * 70 / 100);

            if search_start > start && search_start < end {
                let region_start = offsets[search_start];
                let region = &content[region_start..offsets[end]];

                let break_at = region
                    .rfind("\n\n")
                    .map(|pos| pos + 2)
                    .or_else(|| region.rfind(". ").map(|pos| pos + 2))
                    .or_else(|| region.rfind('\n').map(|pos| pos + 1))
                    .or_else(|| region.rfind(' ').map(|pos| pos + 1));

                if let Some(pos) = break_at {
                    // Breaks are ASCII, so the byte offset always starts a character
                    chunk_end = offsets.partition_point(|&b| b < region_start + pos);
                }
            }
        }

        windows.push(TextWindow {
            text: content[offsets[start]..offsets[chunk_end]].to_string(),
            position: offsets[start],
        });

        if chunk_end >= total {
            break;
        }

        let next = chunk_end.saturating_sub(overlap);
        start = if next > start { next } else { chunk_end };
    }

    windows
}

/// Chunk every page of a document, numbering chunks across pages.
///
/// Pages are chunked independently so every chunk belongs to exactly one
/// page. Whitespace-only windows are dropped.
pub fn chunk_pages(
    pages: &[PageText],
    source: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut seq: u32 = 0;

    for page in pages {
        for window in chunk_by_chars(&page.text, chunk_size, overlap) {
            if window.text.trim().is_empty() {
                continue;
            }
            chunks.push(Chunk {
                text: window.text,
                metadata: ChunkMetadata {
                    source: source.to_string(),
                    page: page.number,
                    position: window.position,
                    seq,
                },
            });
            seq += 1;
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chunk_small_content() {
        let content = "Small content.";
        let chunks = chunk_by_chars(content, 100, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, content);
        assert_eq!(chunks[0].position, 0);
    }

    #[test]
    fn test_chunk_empty_content() {
        assert!(chunk_by_chars("", 100, 20).is_empty());
    }

    #[test]
    fn test_chunk_prefers_paragraph_breaks() {
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_by_chars(content, 22, 5);
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].text, "First paragraph.\n\n");
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let content = "word ".repeat(600);
        let chunks = chunk_by_chars(&content, 1000, 200);
        assert!(chunks.len() >= 3);
        for pair in chunks.windows(2) {
            let prev_end = pair[0].position + pair[0].text.len();
            assert!(pair[1].position < prev_end, "chunks must overlap");
            assert!(prev_end - pair[1].position <= 200);
        }
    }

    #[test]
    fn test_chunk_handles_unicode() {
        let content = "Hello 世界! This is a test with emoji 🎉 and special chars ─ here.";
        let chunks = chunk_by_chars(content, 20, 5);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn test_window_size_counts_characters() {
        let content = "é".repeat(3000);
        let chunks = chunk_by_chars(&content, 1000, 200);
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert_eq!(chunks[1].position, "é".repeat(800).len());
        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
        }
    }

    #[test]
    fn test_break_search_with_multibyte_text() {
        let content = format!("{} {}", "日".repeat(80), "本".repeat(80));
        let chunks = chunk_by_chars(&content, 100, 10);
        assert_eq!(chunks[0].text, format!("{} ", "日".repeat(80)));
    }

    #[test]
    fn test_chunk_pages_keeps_provenance() {
        let pages = vec![
            PageText::new(1, "Alpha page text."),
            PageText::new(2, "   \n  "),
            PageText::new(3, "Gamma page text."),
        ];
        let chunks = chunk_pages(&pages, "doc.pdf", 1000, 200);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.page, 1);
        assert_eq!(chunks[0].metadata.seq, 0);
        assert_eq!(chunks[1].metadata.page, 3);
        assert_eq!(chunks[1].metadata.seq, 1);
        assert_eq!(chunks[1].metadata.source, "doc.pdf");
    }

    #[test]
    fn test_chunk_pages_all_blank() {
        let pages = vec![PageText::new(1, ""), PageText::new(2, "\n\n")];
        assert!(chunk_pages(&pages, "scan.pdf", 1000, 200).is_empty());
    }

    proptest! {
        #[test]
        fn windows_cover_content_in_order(
            content in "\\PC{0,400}",
            chunk_size in 1usize..120,
            overlap_frac in 0usize..100,
        ) {
            let overlap = chunk_size * overlap_frac / 100;
            let windows = chunk_by_chars(&content, chunk_size, overlap);

            if content.is_empty() {
                prop_assert!(windows.is_empty());
            } else {
                prop_assert_eq!(windows[0].position, 0);
                let last = windows.last().unwrap();
                prop_assert_eq!(last.position + last.text.len(), content.len());

                let mut prev: Option<&TextWindow> = None;
                for w in &windows {
                    prop_assert!(!w.text.is_empty());
                    prop_assert_eq!(&content[w.position..w.position + w.text.len()], w.text.as_str());
                    if let Some(p) = prev {
                        prop_assert!(w.position > p.position);
                        prop_assert!(w.position <= p.position + p.text.len());
                    }
                    prev = Some(w);
                }
            }
        }
    }
}
