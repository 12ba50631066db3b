//! Random pickup (`/R` directive)
//!
//! Each content section is handled on its own: a count is drawn from the
//! selection range, that many eligible lines are chosen uniformly without
//! replacement and activated, and every other eligible line is deactivated.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::{Document, Line, Section};
use crate::diagnostics::Diagnostic;
use crate::error::SelectorError;
use crate::tags::RandomSpec;

/// How many lines a section should end up with active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRange {
    /// Uniform count in `min..=max`
    Span { min: usize, max: usize },
    /// Raw value uniform in `-misses..=max`; negatives select nothing
    MissWeighted { misses: usize, max: usize },
}

impl Default for SelectionRange {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl SelectionRange {
    pub const SINGLE: SelectionRange = SelectionRange::Span { min: 1, max: 1 };

    /// Parse the text after `R`.
    ///
    /// | selector | range |
    /// |---|---|
    /// | `""` / `r` | `[1,1]` |
    /// | `N` | `[N,N]` |
    /// | `N-M`, `-M` | `[N or 0, M]` |
    /// | `-N-M` | miss-weighted `[-N, M]` |
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let selector = selector.trim();
        if selector.is_empty() || selector.eq_ignore_ascii_case("r") {
            return Ok(Self::SINGLE);
        }

        let not_numeric = || SelectorError::NotNumeric(selector.to_string());
        match selector.matches('-').count() {
            0 => {
                let count = parse_count(selector).ok_or_else(not_numeric)?;
                Ok(Self::Span {
                    min: count,
                    max: count,
                })
            }
            1 => {
                let (low, high) = selector.split_once('-').ok_or_else(not_numeric)?;
                let min = if low.is_empty() {
                    0
                } else {
                    parse_count(low).ok_or_else(not_numeric)?
                };
                let max = parse_count(high).ok_or_else(not_numeric)?;
                if min > max {
                    return Err(SelectorError::Inverted(selector.to_string()));
                }
                Ok(Self::Span { min, max })
            }
            2 => {
                let rest = selector
                    .strip_prefix('-')
                    .ok_or_else(|| SelectorError::TooManyDashes(selector.to_string()))?;
                let (misses, max) = rest.split_once('-').ok_or_else(not_numeric)?;
                let misses = parse_count(misses).ok_or_else(not_numeric)?;
                let max = parse_count(max).ok_or_else(not_numeric)?;
                // Draws come from `0..=misses + max`.
                if misses.checked_add(max).is_none() {
                    return Err(SelectorError::TooLarge(selector.to_string()));
                }
                Ok(Self::MissWeighted { misses, max })
            }
            _ => Err(SelectorError::TooManyDashes(selector.to_string())),
        }
    }

    /// Range for an entity's `R` tag; malformed selectors fall back to a
    /// single pick and report why.
    pub fn resolve(spec: Option<&RandomSpec>) -> (Self, Option<Diagnostic>) {
        let Some(spec) = spec else {
            return (Self::SINGLE, None);
        };
        match Self::parse(spec.selector()) {
            Ok(range) => (range, None),
            Err(err) => (Self::SINGLE, Some(Diagnostic::from(&err))),
        }
    }

    /// Number of lines to activate in a section with `valid` eligible lines.
    pub fn draw<R: Rng + ?Sized>(&self, valid: usize, rng: &mut R) -> usize {
        match *self {
            Self::Span { min, max } => {
                let max = max.min(valid);
                let min = min.min(max);
                if min == max {
                    min
                } else {
                    rng.gen_range(min..=max)
                }
            }
            Self::MissWeighted { misses, max } => {
                // Offsets below `misses` are the negative (empty) outcomes.
                let Some(top) = misses.checked_add(max) else {
                    return 0;
                };
                rng.gen_range(0..=top).saturating_sub(misses).min(valid)
            }
        }
    }
}

fn parse_count(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Run random pickup over every content section of `doc`.
///
/// Returns how many sections had at least one eligible line.
pub fn pick_sections<R: Rng + ?Sized>(
    doc: &mut Document,
    range: &SelectionRange,
    rng: &mut R,
) -> usize {
    let mut touched = 0;

    for section in doc.sections() {
        let Section::Content(span) = section else {
            continue;
        };
        let eligible = doc.eligible_in(span);
        if eligible.is_empty() {
            continue;
        }
        touched += 1;

        let count = range.draw(eligible.len(), rng);
        let chosen: Vec<usize> = eligible.choose_multiple(rng, count).copied().collect();
        debug!(
            eligible = eligible.len(),
            count,
            ?chosen,
            "random pickup for section"
        );

        for index in eligible {
            if chosen.contains(&index) {
                doc.update(index, Line::activated);
            } else {
                doc.update(index, Line::deactivated);
            }
        }
    }

    touched
}

/// Buffer-level random pickup.
pub fn random_pickup<R: Rng + ?Sized>(buffer: &str, range: &SelectionRange, rng: &mut R) -> String {
    let mut doc = Document::parse(buffer);
    pick_sections(&mut doc, range, rng);
    doc.to_string()
}
