//! prompt-switch: tag-directed prompt line activation
//!
//! A prompt buffer is plain text, one prompt fragment per line; a line is
//! active unless it starts with `//`. Entities pair such a buffer with a label
//! whose trailing `/tokens` pick behaviours:
//! - `/R<selector>` random pickup per section
//! - `/T...` turn-taking, one line per trigger
//! - `/C`, `/CM...` re-roll random pickup every N triggers
//! - `/a`, `/r`, `/v` exemptions from group operators
//!
//! Everything here is synchronous and host-agnostic; hosts plug in through
//! [`host::EntityHost`] and drive triggers through [`engine::Engine`].

pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod directives;
pub mod engine;
pub mod error;
pub mod host;
pub mod render;
pub mod tags;

// Re-export commonly used types
pub use buffer::{Document, Line, LineKind, PromptLine, Section, WeightBounds, WeightedBody};
pub use config::{ConfigLoader, EngineConfig};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use directives::{ChaosRewrite, SelectionRange, TurnRewrite, TurnState};
pub use engine::{DeactivateOutcome, Engine, RandomizeOutcome, RunContext, TriggerReport};
pub use error::{SelectorError, StateError, TagError};
pub use host::{Entity, EntityHost, Workspace};
pub use render::assemble_prompt;
pub use tags::{parse_tags, ChaosForm, ChaosSpec, RandomSpec, Tag, TagSet, TurnSpec};
