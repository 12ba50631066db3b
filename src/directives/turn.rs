//! Turn scheduler (`/T` directive)
//!
//! Every trigger shows exactly one prompt line. The label carries the cursor
//! (`current`, 1-based line position), how many triggers a line is held for
//! (`max_exec`) and how many it has been held so far (`count`).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::{Document, Line};
use crate::error::StateError;
use crate::tags::{replace_tags, Tag, TurnSpec};

/// Validated turn state; every field is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    current: u32,
    max_exec: u32,
    count: u32,
}

impl TryFrom<TurnSpec> for TurnState {
    type Error = StateError;

    fn try_from(spec: TurnSpec) -> Result<Self, Self::Error> {
        for (field, value) in [
            ("current", spec.current),
            ("max_exec", spec.max_exec),
            ("count", spec.count),
        ] {
            if value < 1 {
                return Err(StateError::Turn { field, value });
            }
        }
        Ok(Self {
            current: spec.current,
            max_exec: spec.max_exec,
            count: spec.count,
        })
    }
}

impl From<TurnState> for TurnSpec {
    fn from(state: TurnState) -> Self {
        TurnSpec {
            current: state.current,
            max_exec: state.max_exec,
            count: state.count,
        }
    }
}

impl TurnState {
    /// State after showing the line at 1-based position `activated_at` in a
    /// buffer of `total` lines.
    ///
    /// The cursor moves past the line only when the hold counter wraps;
    /// otherwise it stays pinned on the line just shown.
    pub fn advance(self, activated_at: u32, total: u32) -> Self {
        if self.count >= self.max_exec {
            Self {
                current: if activated_at >= total { 1 } else { activated_at + 1 },
                count: 1,
                ..self
            }
        } else {
            Self {
                current: activated_at,
                count: self.count.saturating_add(1),
                ..self
            }
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRewrite {
    pub label: String,
    pub buffer: String,
    /// 0-based index of the line left active, if any line was eligible
    pub activated: Option<usize>,
    pub state: TurnState,
}

/// Deactivate every prompt, then activate the first eligible line at or after
/// the cursor (wrapping). Returns the activated index.
pub fn take_turn(doc: &mut Document, state: TurnState) -> Option<usize> {
    doc.map_lines(Line::deactivated);

    let total = doc.len();
    if total == 0 {
        return None;
    }
    let start = (state.current - 1) as usize;
    let found = (0..total)
        .map(|step| (start + step) % total)
        .find(|&index| doc.get(index).is_some_and(Line::is_eligible))?;

    doc.update(found, Line::activated);
    Some(found)
}

/// Run one turn for `label`/`buffer` with the label's turn spec.
pub fn apply(label: &str, buffer: &str, spec: TurnSpec) -> Result<TurnRewrite, StateError> {
    let state = TurnState::try_from(spec)?;
    let mut doc = Document::parse(buffer);

    let activated = take_turn(&mut doc, state);
    let next = match activated {
        Some(index) => state.advance(index as u32 + 1, doc.len() as u32),
        // Nothing eligible: the buffer stays fully inactive and the cursor holds.
        None => state,
    };
    debug!(?activated, ?next, "turn taken");

    let token = TurnSpec::from(next).token();
    Ok(TurnRewrite {
        label: replace_tags(label, |tag| matches!(tag, Tag::Turn(_)), Some(&token)),
        buffer: doc.to_string(),
        activated,
        state: next,
    })
}
