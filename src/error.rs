//! Typed failure model.
//!
//! These errors never escape the public directive API: callers convert them to
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s and fall back to the
//! conservative default for the failing entity.

use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// A label whose `/token` sequence is not a valid tag set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("tag '/{token}' is not a recognised directive")]
    UnknownToken { token: String, tokens: Vec<String> },
}

/// An `R` selector value that does not describe a usable range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("selector '{0}' is not numeric")]
    NotNumeric(String),

    #[error("selector '{0}' has inverted bounds")]
    Inverted(String),

    #[error("selector '{0}' has too many dashes")]
    TooManyDashes(String),

    #[error("selector '{0}' is out of range")]
    TooLarge(String),
}

/// Scheduler state carried in a label that cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("turn state {field} must be at least 1, got {value}")]
    Turn { field: &'static str, value: u32 },

    #[error("chaos-multi state {field} must be at least 1, got {value}")]
    Chaos { field: &'static str, value: u32 },
}

impl From<&SelectorError> for Diagnostic {
    fn from(err: &SelectorError) -> Self {
        Diagnostic::warning(
            DiagnosticCode::MalformedSelector,
            format!("{err}; falling back to a single pick"),
        )
    }
}

impl From<&StateError> for Diagnostic {
    fn from(err: &StateError) -> Self {
        let code = match err {
            StateError::Turn { .. } => DiagnosticCode::InvalidTurnState,
            StateError::Chaos { .. } => DiagnosticCode::InvalidChaosState,
        };
        Diagnostic::warning(code, err.to_string())
    }
}
