//! Block extraction.
//!
//! Groups consecutive comment lines of a file into annotation blocks. A block ends at the first
//! blank or non-comment line, and a block-start marker (`##`) in the middle of a comment run
//! starts a new block. What a block documents is decided by its content, see [`BlockKind`].

use crate::grammar::{Classification, LineClassifier, Tag};

/// One classified comment line inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    /// 1-based line number in the source file
    pub number: usize,
    /// Tag that starts the line, if any
    pub tag: Option<Tag>,
    /// Comment text without the comment prefix
    pub text: String,
    /// Text after the tag marker (same as `text` for untagged lines)
    pub rest: String,
}

impl CommentLine {
    pub fn is(&self, tag: Tag) -> bool {
        self.tag == Some(tag)
    }

    /// Untagged comment line
    pub fn is_plain(&self) -> bool {
        self.tag.is_none()
    }
}

/// What an annotation block documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Contains `@resource`; sets the resource context for following endpoint blocks
    Resource,
    /// Contains `@path`
    Endpoint,
    /// Contains `@model` / `@!model`
    Model,
    /// Plain commentary, ignored
    Commentary,
}

/// A run of consecutive comment lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub lines: Vec<CommentLine>,
}

impl Block {
    /// Line number of the first line of the block
    pub fn start_line(&self) -> usize {
        self.lines.first().map_or(0, |l| l.number)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.lines.iter().any(|l| l.is(tag))
    }

    /// Index of the first line starting with `tag`
    pub fn position(&self, tag: Tag) -> Option<usize> {
        self.lines.iter().position(|l| l.is(tag))
    }

    pub fn kind(&self) -> BlockKind {
        if self.contains(Tag::Resource) {
            BlockKind::Resource
        } else if self.contains(Tag::Path) {
            BlockKind::Endpoint
        } else if self.contains(Tag::Model) {
            BlockKind::Model
        } else {
            BlockKind::Commentary
        }
    }
}

/// Contents of every `open ... close` group in `text`, in order.
pub(crate) fn enclosed_groups(text: &str, open: char, close: char) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut remaining = text;
    while let Some(start) = remaining.find(open) {
        let after = &remaining[start + open.len_utf8()..];
        match after.find(close) {
            Some(end) => {
                groups.push(after[..end].trim());
                remaining = &after[end + close.len_utf8()..];
            }
            None => break,
        }
    }
    groups
}

/// Contents of the first `open ... close` group in `text`.
pub(crate) fn first_enclosed(text: &str, open: char, close: char) -> Option<&str> {
    enclosed_groups(text, open, close).into_iter().next()
}

/// Splits a file into annotation blocks, in source order.
pub fn extract_blocks(classifier: &LineClassifier, source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<CommentLine> = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let line = match classifier.classify(raw) {
            Classification::NotComment => {
                if !current.is_empty() {
                    blocks.push(Block {
                        lines: std::mem::take(&mut current),
                    });
                }
                continue;
            }
            Classification::Plain(text) => CommentLine {
                number,
                tag: None,
                text: text.to_string(),
                rest: text.to_string(),
            },
            Classification::Tagged { tag, body, rest } => CommentLine {
                number,
                tag: Some(tag),
                text: body.to_string(),
                rest: rest.to_string(),
            },
        };

        if line.is(Tag::BlockStart) && !current.is_empty() {
            blocks.push(Block {
                lines: std::mem::take(&mut current),
            });
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(Block { lines: current });
    }

    blocks
}
