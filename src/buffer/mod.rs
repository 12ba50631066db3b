//! Prompt buffer model
//!
//! The buffer is plain `\n`-delimited text. [`Document`] parses it once into
//! typed [`Line`] records, operators rewrite individual lines, and `Display`
//! joins them back. Untouched lines round-trip byte for byte.

pub mod line;
pub mod section;
pub mod weight;

use std::fmt;

pub use line::{classify, Line, LineKind, PromptLine, COMMENT_PREFIX};
pub use section::{partition, Section};
pub use weight::{WeightBounds, WeightedBody};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(Line::parse).collect(),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Replace the line at `index` with `f(line)`; out-of-range is a no-op.
    pub fn update(&mut self, index: usize, f: impl FnOnce(&Line) -> Line) {
        if let Some(line) = self.lines.get_mut(index) {
            *line = f(line);
        }
    }

    /// Apply `f` to every line.
    pub fn map_lines(&mut self, mut f: impl FnMut(&Line) -> Line) {
        for line in &mut self.lines {
            *line = f(line);
        }
    }

    pub fn sections(&self) -> Vec<Section> {
        partition(&self.lines)
    }

    /// Indices of prompt lines (not blank, sentinel or separator) in `range`.
    pub fn eligible_in(&self, range: std::ops::Range<usize>) -> Vec<usize> {
        range
            .filter(|&index| self.lines.get(index).is_some_and(Line::is_eligible))
            .collect()
    }

    pub fn has_active_prompt(&self) -> bool {
        self.lines.iter().any(Line::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_active()).count()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line.raw())?;
        }
        Ok(())
    }
}
