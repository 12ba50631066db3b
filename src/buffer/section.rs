//! Section partitioner
//!
//! Blank lines split the buffer into sections. Each blank line is its own
//! separator section; every maximal run of non-blank lines is one content
//! section. The ranges tile `0..lines.len()` with no gaps or overlaps.

use std::ops::Range;

use super::Line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Separator(usize),
    Content(Range<usize>),
}

impl Section {
    pub fn range(&self) -> Range<usize> {
        match self {
            Section::Separator(index) => *index..*index + 1,
            Section::Content(range) => range.clone(),
        }
    }
}

pub fn partition(lines: &[Line]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut start = None;

    for (index, line) in lines.iter().enumerate() {
        if line.is_blank() {
            if let Some(begin) = start.take() {
                sections.push(Section::Content(begin..index));
            }
            sections.push(Section::Separator(index));
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        sections.push(Section::Content(begin..lines.len()));
    }

    sections
}
