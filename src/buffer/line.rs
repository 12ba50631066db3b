//! Line classifier and typed line record.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::weight::{WeightBounds, WeightedBody};

/// Comment prefix written when deactivating a line
pub const COMMENT_PREFIX: &str = "// ";

/// Internally generated marker line; never toggled
static SENTINEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//\s*disabled phrase\s*\d{14}$").unwrap());

/// Decorative `// , //` separator with optional annotation text
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^//\s*,\s*//(.*)$").unwrap());

/// Leading `//` plus the whitespace after it
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^//\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineKind {
    Blank,
    Sentinel,
    /// `note` is `None` for a plain divider
    Separator { note: Option<String> },
    Prompt(PromptLine),
}

/// Structural view of a prompt line:
/// `indent` `marker` `segment` `gap` `comment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptLine {
    pub active: bool,
    pub indent: String,
    /// Leading `//` and following whitespace; empty when active
    pub marker: String,
    /// Weighted-body segment, before the first inline `//`
    pub segment: String,
    pub gap: String,
    /// From the first inline `//` to the end, verbatim
    pub comment: String,
}

impl PromptLine {
    pub fn weighted(&self) -> WeightedBody {
        WeightedBody::decode(&self.segment)
    }

    /// Text after the indent and comment marker.
    fn content(&self) -> String {
        format!("{}{}{}", self.segment, self.gap, self.comment)
    }

    fn render(&self, segment: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.indent, self.marker, segment, self.gap, self.comment
        )
    }
}

/// Classify one buffer line.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() {
        return LineKind::Blank;
    }
    if SENTINEL_RE.is_match(trimmed) {
        return LineKind::Sentinel;
    }
    if let Some(caps) = SEPARATOR_RE.captures(trimmed) {
        let note = caps
            .get(1)
            .map(|m| m.as_str().trim())
            .filter(|note| !note.is_empty())
            .map(str::to_string);
        return LineKind::Separator { note };
    }

    let indent = &line[..line.len() - trimmed.len()];
    let (marker, rest) = match MARKER_RE.find(trimmed) {
        Some(m) => (m.as_str(), &trimmed[m.end()..]),
        None => ("", trimmed),
    };
    let (body, comment) = match rest.find("//") {
        Some(at) => rest.split_at(at),
        None => (rest, ""),
    };
    let segment = body.trim_end();

    LineKind::Prompt(PromptLine {
        active: marker.is_empty(),
        indent: indent.to_string(),
        marker: marker.to_string(),
        segment: segment.to_string(),
        gap: body[segment.len()..].to_string(),
        comment: comment.to_string(),
    })
}

/// One buffer line: raw text plus its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    raw: String,
    kind: LineKind,
}

impl Line {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = classify(&raw);
        Self { raw, kind }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    pub fn prompt(&self) -> Option<&PromptLine> {
        match &self.kind {
            LineKind::Prompt(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }

    /// Prompt lines are the only lines any operator may rewrite.
    pub fn is_eligible(&self) -> bool {
        self.prompt().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.prompt().is_some_and(|p| p.active)
    }

    /// Strip one leading comment marker; the indentation goes with it.
    /// Active and non-prompt lines are returned unchanged.
    pub fn activated(&self) -> Line {
        match self.prompt() {
            Some(prompt) if !prompt.active => Line::parse(prompt.content()),
            _ => self.clone(),
        }
    }

    /// Prefix `// ` after the indentation. Inactive and non-prompt lines are
    /// returned unchanged.
    pub fn deactivated(&self) -> Line {
        match self.prompt() {
            Some(prompt) if prompt.active => Line::parse(format!(
                "{}{}{}",
                prompt.indent,
                COMMENT_PREFIX,
                self.raw.trim_start()
            )),
            _ => self.clone(),
        }
    }

    pub fn toggled(&self) -> Line {
        if self.is_active() {
            self.deactivated()
        } else {
            self.activated()
        }
    }

    /// Rewrite the weighted body with `f`; lines without a body are unchanged.
    pub fn map_weight(&self, f: impl FnOnce(WeightedBody) -> WeightedBody) -> Line {
        match self.prompt() {
            Some(prompt) if !prompt.segment.is_empty() => {
                let body = f(prompt.weighted());
                Line::parse(prompt.render(&body.encode()))
            }
            _ => self.clone(),
        }
    }

    pub fn adjust_weight(&self, delta: f64, bounds: WeightBounds) -> Line {
        self.map_weight(|body| body.adjusted(delta, bounds))
    }

    pub fn reset_weight(&self) -> Line {
        self.map_weight(|body| body.reset())
    }
}
