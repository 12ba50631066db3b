//! Weight codec
//!
//! A prompt body may carry an emphasis weight as `(body:1.20)`, optionally
//! followed by a trailing comma. The comma always lives outside the parens.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `(inner : number)`; greedy inner so the last colon is the weight separator
static WEIGHTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\((.*)\s*:\s*([\d.\-]+)\s*\)\s*$").unwrap());

/// `(inner)` without a weight
static PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\((.*)\)\s*$").unwrap());

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Clamp range for weight adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self { min: -1.0, max: 2.0 }
    }
}

/// Decoded weighted-body segment of a prompt line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedBody {
    pub body: String,
    pub weight: f64,
    pub trailing_comma: bool,
}

impl WeightedBody {
    pub fn decode(segment: &str) -> Self {
        decode(segment)
    }

    pub fn encode(&self) -> String {
        encode(&self.body, self.weight, self.trailing_comma)
    }

    /// Apply `delta`, clamp to `bounds`, round to two decimals.
    pub fn adjusted(&self, delta: f64, bounds: WeightBounds) -> Self {
        let weight = (self.weight + delta).clamp(bounds.min, bounds.max);
        Self {
            weight: round2(weight),
            ..self.clone()
        }
    }

    /// Same body and comma, weight dropped.
    pub fn reset(&self) -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            ..self.clone()
        }
    }

    pub fn has_default_weight(&self) -> bool {
        is_default_weight(self.weight)
    }
}

/// Parse `segment` into body, weight and trailing comma.
pub fn decode(segment: &str) -> WeightedBody {
    let mut text = segment.trim();
    let mut trailing_comma = false;
    if let Some(stripped) = text.strip_suffix(',') {
        trailing_comma = true;
        text = stripped.trim_end();
    }

    let weighted = WEIGHTED_RE.captures(text).and_then(|caps| {
        let weight = caps.get(2)?.as_str().parse::<f64>().ok()?;
        Some((caps.get(1)?.as_str().trim(), weight))
    });

    let (mut body, weight) = match weighted {
        Some((inner, weight)) => (inner, weight),
        None => match PARENS_RE.captures(text).and_then(|caps| caps.get(1)) {
            Some(inner) => (inner.as_str().trim(), DEFAULT_WEIGHT),
            None => (text, DEFAULT_WEIGHT),
        },
    };

    // A comma written inside the parens belongs outside them.
    if let Some(stripped) = body.strip_suffix(',') {
        trailing_comma = true;
        body = stripped.trim_end();
    }

    // "()" and friends: keep the text rather than an empty body.
    if body.is_empty() {
        body = text;
    }

    WeightedBody {
        body: body.to_string(),
        weight,
        trailing_comma,
    }
}

/// Serialize; a weight that displays as `1.00` is written without parens.
pub fn encode(body: &str, weight: f64, trailing_comma: bool) -> String {
    let comma = if trailing_comma { "," } else { "" };
    if is_default_weight(weight) {
        format!("{body}{comma}")
    } else {
        format!("({body}:{}){comma}", format_weight(weight))
    }
}

/// Two-decimal display form used in labels and the encoded text.
pub fn format_weight(weight: f64) -> String {
    format!("{weight:.2}")
}

pub fn is_default_weight(weight: f64) -> bool {
    format_weight(weight) == "1.00"
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
