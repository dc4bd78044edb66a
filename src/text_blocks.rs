//! Text-block bookkeeping for streamed output.
//!
//! Every text-bearing agent event is one observation `(parts, block id,
//! last chunk)`. The machine turns observations into well-formed
//! `text-start` / `text-delta`* / `text-end` runs per block id.
//!
//! # Rules
//!
//! - First observation with text for an id → `text-start`, then `text-delta`.
//! - Every further observation with text for an open id → one `text-delta`
//!   carrying that observation's text parts joined by a single space.
//! - An observation without text parts emits no delta; when it is the last
//!   chunk of an open block it still closes the block.
//! - Last chunk → `text-end`, block closed.
//! - [`TextBlocks::flush`] closes every block still open. A second flush
//!   emits nothing.
//!
//! Non-text parts are never projected.

use std::collections::HashSet;

use crate::prompt::StreamPart;
use crate::types::Part;

/// Open text blocks of one exchange.
#[derive(Debug, Default)]
pub struct TextBlocks {
    open: HashSet<String>,
}

impl TextBlocks {
    /// A machine with no open block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the block is currently open.
    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// Number of open blocks.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Feed one observation, appending the resulting parts to `out`.
    pub fn observe(&mut self, parts: &[Part], id: &str, last_chunk: bool, out: &mut Vec<StreamPart>) {
        let texts: Vec<&str> = parts.iter().filter_map(Part::as_text).collect();

        if !texts.is_empty() {
            if self.open.insert(id.to_string()) {
                out.push(StreamPart::text_start(id));
            }
            out.push(StreamPart::text_delta(id, texts.join(" ")));
        }

        if last_chunk && self.open.remove(id) {
            out.push(StreamPart::text_end(id));
        }
    }

    /// Close every open block, appending one `text-end` per block to `out`.
    ///
    /// Ids are closed in sorted order so the output is deterministic.
    pub fn flush(&mut self, out: &mut Vec<StreamPart>) {
        let mut ids: Vec<String> = self.open.drain().collect();
        ids.sort();
        out.extend(ids.into_iter().map(StreamPart::text_end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileContent, FileWithUri};

    fn text(s: &str) -> Part {
        Part::text(s)
    }

    fn file() -> Part {
        Part::File {
            file: FileContent::Uri(FileWithUri {
                uri: "https://example.com/chart.png".to_string(),
                mime_type: Some("image/png".to_string()),
                name: None,
            }),
            metadata: None,
        }
    }

    #[test]
    fn one_block_start_deltas_end() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[text("<s1>")], "a1", false, &mut out);
        blocks.observe(&[text("<s2>")], "a1", false, &mut out);
        blocks.observe(&[text("<s3>")], "a1", true, &mut out);

        assert_eq!(
            out,
            vec![
                StreamPart::text_start("a1"),
                StreamPart::text_delta("a1", "<s1>"),
                StreamPart::text_delta("a1", "<s2>"),
                StreamPart::text_delta("a1", "<s3>"),
                StreamPart::text_end("a1"),
            ]
        );
        assert_eq!(blocks.open_count(), 0);
    }

    #[test]
    fn text_parts_are_joined_with_a_space() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[text("Hello,"), file(), text("World!")], "m1", true, &mut out);
        assert_eq!(out[1], StreamPart::text_delta("m1", "Hello, World!"));
    }

    #[test]
    fn empty_observation_still_closes_open_block() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[text("a")], "a1", false, &mut out);
        blocks.observe(&[], "a1", true, &mut out);
        assert_eq!(
            out,
            vec![
                StreamPart::text_start("a1"),
                StreamPart::text_delta("a1", "a"),
                StreamPart::text_end("a1"),
            ]
        );
    }

    #[test]
    fn empty_observation_never_opens_a_block() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[file()], "a1", false, &mut out);
        blocks.observe(&[], "a2", true, &mut out);
        assert!(out.is_empty());
        assert_eq!(blocks.open_count(), 0);
    }

    #[test]
    fn interleaved_blocks_are_tracked_independently() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[text("x")], "a", false, &mut out);
        blocks.observe(&[text("y")], "b", false, &mut out);
        blocks.observe(&[text("z")], "a", true, &mut out);
        assert!(!blocks.is_open("a"));
        assert!(blocks.is_open("b"));
        assert_eq!(out.iter().filter(|p| matches!(p, StreamPart::TextStart { .. })).count(), 2);
    }

    #[test]
    fn flush_closes_open_blocks_once() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[text("x")], "b", false, &mut out);
        blocks.observe(&[text("y")], "a", false, &mut out);
        out.clear();

        blocks.flush(&mut out);
        assert_eq!(out, vec![StreamPart::text_end("a"), StreamPart::text_end("b")]);

        out.clear();
        blocks.flush(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn block_can_reopen_after_end() {
        let mut blocks = TextBlocks::new();
        let mut out = Vec::new();
        blocks.observe(&[text("one")], "m", true, &mut out);
        blocks.observe(&[text("two")], "m", true, &mut out);
        assert_eq!(out.len(), 6);
    }
}
