//! Advisory Diagnostics
//!
//! Single diagnostic type used by tag parsing, selector resolution and the
//! schedulers. Nothing in this crate fails an entity batch: every problem is
//! recorded as a diagnostic, logged through `tracing`, and processing moves on.

use serde::{Deserialize, Serialize};

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Info,
}

/// Diagnostic codes for categorizing issues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // =========================================================================
    // Label errors
    // =========================================================================
    MalformedTagSet,
    MalformedSelector,
    InvalidTurnState,
    InvalidChaosState,

    // =========================================================================
    // Scheduling notes
    // =========================================================================
    DirectiveConflict,
    NoEligibleLines,
    AlreadyInactive,
}

/// A diagnostic message, optionally tied to the entity whose label produced it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl Diagnostic {
    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            entity: None,
        }
    }

    /// Create an info diagnostic
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            entity: None,
        }
    }

    /// Attach the entity (usually its label) the diagnostic is about
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }

    /// Forward to `tracing` at the level matching the severity.
    pub fn emit(&self) {
        let entity = self.entity.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Warning => {
                tracing::warn!(code = ?self.code, entity, "{}", self.message)
            }
            Severity::Info => tracing::info!(code = ?self.code, entity, "{}", self.message),
        }
    }
}

// =============================================================================
// Convenience Builders
// =============================================================================

/// Tag set rejected as a whole because one token is outside the grammar
pub fn malformed_tags(raw_tokens: &[String], bad: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::MalformedTagSet,
        format!(
            "invalid tag '/{}' in '/{}'; separate tags with '/'",
            bad,
            raw_tokens.join("/")
        ),
    )
}

/// Turn tag wins over chaos tags on the same label
pub fn directive_conflict(label: &str) -> Diagnostic {
    Diagnostic::info(
        DiagnosticCode::DirectiveConflict,
        "/T takes precedence over /C and /CM; chaos scheduling skipped",
    )
    .with_entity(label)
}

/// Bare `/C` and counted `/CM` on the same label
pub fn chaos_form_conflict(label: &str, used: &str) -> Diagnostic {
    Diagnostic::info(
        DiagnosticCode::DirectiveConflict,
        format!("both /C and /CM present; using the first one (/{used})"),
    )
    .with_entity(label)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_creation() {
        let diag = Diagnostic::warning(DiagnosticCode::MalformedSelector, "bad range");
        assert!(diag.is_warning());
        assert_eq!(diag.message, "bad range");
        assert!(diag.entity.is_none());
    }

    #[test]
    fn test_info_not_warning() {
        let diag = Diagnostic::info(DiagnosticCode::NoEligibleLines, "nothing to pick");
        assert!(!diag.is_warning());
    }

    #[test]
    fn test_malformed_tags_message() {
        let raw = vec!["R2a".to_string(), "v".to_string()];
        let diag = malformed_tags(&raw, "R2a");
        assert_eq!(diag.code, DiagnosticCode::MalformedTagSet);
        assert!(diag.message.contains("/R2a/v"));
    }

    #[test]
    fn test_entity_serialization_skipped_when_absent() {
        let diag = Diagnostic::info(DiagnosticCode::AlreadyInactive, "done");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(!json.contains("entity"));

        let json = serde_json::to_string(&diag.with_entity("Styles /a")).unwrap();
        assert!(json.contains("Styles /a"));
    }
}
