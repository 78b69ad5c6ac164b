use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A location in a source file.
///
/// `line` and `column` are 1-based; `column` counts Unicode scalar values.
/// `offset` is the byte offset from the start of the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub file: Arc<str>,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(file: Arc<str>, offset: usize, line: u32, column: u32) -> Self {
        Position {
            file,
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A 0-based line/character pair, as editors count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub character: u32,
}

const SPARSE_POSITION_INTERVAL: usize = 64;

/// Maps byte offsets and line numbers back into the source text.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    line_starts: Vec<usize>,
    sparse_line_index: Vec<u32>,
}

impl SourceLocator {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, ch)| ch == b'\n')
                .map(|(i, _)| i + 1),
        );

        let mut sparse_line_index = vec![0; source.len() / SPARSE_POSITION_INTERVAL + 1];
        let mut line = 0;
        for (i, entry) in sparse_line_index.iter_mut().enumerate() {
            while line + 1 < line_starts.len()
                && line_starts[line + 1] <= i * SPARSE_POSITION_INTERVAL
            {
                line += 1;
            }
            *entry = line as u32;
        }
        SourceLocator {
            line_starts,
            sparse_line_index,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of the 1-based `line`, without its line terminator.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(source.len(), |&next| next - 1);
        let text = source.get(start..end)?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    fn line_of(&self, index: usize) -> usize {
        let bucket = (index / SPARSE_POSITION_INTERVAL).min(self.sparse_line_index.len() - 1);
        let mut line = self.sparse_line_index[bucket] as usize;
        while line + 1 < self.line_starts.len() && self.line_starts[line + 1] <= index {
            line += 1;
        }
        line
    }

    pub fn position_general<F>(&self, source: &str, index: usize, counter: F) -> LineCol
    where
        F: FnOnce(&str) -> u32,
    {
        let index = index.min(source.len());
        let line = self.line_of(index);
        let line_beginning = self.line_starts[line];
        let character = source
            .get(line_beginning..index)
            .map_or(0, counter);
        LineCol {
            line: line as u32,
            character,
        }
    }

    pub fn position_utf8(&self, source: &str, index: usize) -> LineCol {
        self.position_general(source, index, |line| line.len() as u32)
    }

    pub fn position_utf16(&self, source: &str, index: usize) -> LineCol {
        self.position_general(source, index, |line| {
            line.chars().map(|ch| ch.len_utf16() as u32).sum()
        })
    }
}
