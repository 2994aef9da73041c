use std::collections::VecDeque;
use std::fmt;

use crate::feeds::FeedItem;

pub const INVALID_SELECTION: &str = "Invalid selection.";

/// A finished block of display text. Lines may carry `http(s)://` links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputBlock {
    lines: Vec<String>,
}

impl OutputBlock {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::new(text.into().lines().map(ToOwned::to_owned).collect())
    }

    pub fn invalid_selection() -> Self {
        Self::message(INVALID_SELECTION)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Hyperlinks embedded in the block, in reading order.
    pub fn links(&self) -> Vec<&str> {
        self.lines
            .iter()
            .flat_map(|line| line.split_whitespace())
            .filter(|token| token.starts_with("http://") || token.starts_with("https://"))
            .collect()
    }
}

impl fmt::Display for OutputBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// What a dispatched command produced: text for the log, or a page to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Block(OutputBlock),
    OpenUrl { url: String, label: String },
}

impl Outcome {
    pub fn block(&self) -> Option<&OutputBlock> {
        match self {
            Outcome::Block(block) => Some(block),
            Outcome::OpenUrl { .. } => None,
        }
    }
}

impl From<OutputBlock> for Outcome {
    fn from(block: OutputBlock) -> Self {
        Outcome::Block(block)
    }
}

/// Line accumulator used while a block is being produced.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    lines: Vec<String>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title line followed by a dashed rule of the given width.
    pub fn heading(mut self, title: impl Into<String>, rule: usize) -> Self {
        self.lines.push(title.into());
        self.lines.push("-".repeat(rule));
        self
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(self) -> Self {
        self.line("")
    }

    /// `NN. title` followed by indented detail lines; empty details are skipped.
    pub fn numbered(&mut self, position: usize, title: &str, details: &[&str]) {
        self.lines.push(format!("{position:>2}. {title}"));
        for detail in details.iter().filter(|d| !d.is_empty()) {
            self.lines.push(format!("    {detail}"));
        }
    }

    pub fn feed_items(mut self, items: &[FeedItem]) -> Self {
        for (idx, item) in items.iter().enumerate() {
            self.numbered(idx + 1, &item.title, &[item.pub_date.as_str(), item.link.as_str()]);
        }
        self
    }

    pub fn build(self) -> OutputBlock {
        OutputBlock::new(self.lines)
    }
}

/// Display history, newest first. Blocks are only ever added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputLog {
    blocks: VecDeque<OutputBlock>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: OutputBlock) {
        self.blocks.push_front(block);
    }

    pub fn newest(&self) -> Option<&OutputBlock> {
        self.blocks.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
