//! Tag lexer and typed tag set
//!
//! A label carries its directives as a trailing sequence of `/token`s, e.g.
//! `Styles /R1-3/a`. Tokens are extracted, whitespace-normalized, lowercased and
//! validated against the grammar in [`grammar`]. One bad token rejects the whole
//! set: the entity is then treated as untagged.

pub mod grammar;
pub mod label;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{malformed_tags, Diagnostic};
use crate::error::TagError;

pub use label::{replace_tags, tag_tokens, toggle_chaos_tag};

/// One directive carried by a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// `/a` - skipped by "deactivate all entities"
    DeactivateExempt,
    /// `/v` - skipped by the host's compact-view toggle
    CompactExempt,
    /// `/r`, `/R<selector>`
    Random(RandomSpec),
    /// `/c`, `/CM<max>-<count>`
    Chaos(ChaosSpec),
    /// `/T<current>M<max>-<count>`
    Turn(TurnSpec),
    /// `/compact` - display marker only
    Compact,
}

/// Raw selector of an `R` tag; resolved by [`crate::directives::SelectionRange`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomSpec {
    selector: String,
}

impl RandomSpec {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Text after the `r`; empty for a bare `/r`.
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Turn scheduler state as written in the label. Fields are validated (>= 1)
/// by the scheduler, not the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSpec {
    pub current: u32,
    pub max_exec: u32,
    pub count: u32,
}

impl TurnSpec {
    /// Canonical label token, without the leading slash.
    pub fn token(&self) -> String {
        format!("T{}M{}-{}", self.current, self.max_exec, self.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaosForm {
    /// `/c`: no counter surfaced in the label
    Bare,
    /// `/CM...`
    Counted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosSpec {
    pub form: ChaosForm,
    pub max_exec: u32,
    pub count: u32,
}

impl ChaosSpec {
    pub fn bare() -> Self {
        Self {
            form: ChaosForm::Bare,
            max_exec: 1,
            count: 1,
        }
    }

    /// Canonical label token, without the leading slash.
    pub fn token(&self) -> String {
        match self.form {
            ChaosForm::Bare => "C".to_string(),
            ChaosForm::Counted if self.max_exec == 1 => "CM".to_string(),
            ChaosForm::Counted => format!("CM{}-{}", self.max_exec, self.count),
        }
    }
}

/// A validated tag together with its normalized lowercase token text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagToken {
    pub text: String,
    pub tag: Tag,
}

/// Ordered, validated tags of one label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    tokens: Vec<TagToken>,
}

impl TagSet {
    /// Fail-closed parse: an invalid label yields an empty set plus a diagnostic.
    pub fn parse_or_empty(label: &str) -> (TagSet, Option<Diagnostic>) {
        match parse_tags(label) {
            Ok(tags) => (tags, None),
            Err(err) => {
                let diag = Diagnostic::from(&err).with_entity(label);
                diag.emit();
                (TagSet::default(), Some(diag))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tokens.iter().map(|t| &t.tag)
    }

    /// Normalized lowercase tokens in label order.
    pub fn tokens(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Exact membership test on the normalized token (e.g. `"a"`, `"r"`).
    pub fn has_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.tokens.iter().any(|t| t.text == key)
    }

    /// First `R` spec in label order.
    pub fn random(&self) -> Option<&RandomSpec> {
        self.iter().find_map(|tag| match tag {
            Tag::Random(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn turn(&self) -> Option<TurnSpec> {
        self.iter().find_map(|tag| match tag {
            Tag::Turn(spec) => Some(*spec),
            _ => None,
        })
    }

    /// First chaos tag in label order; a later tag of the other form is ignored.
    pub fn chaos(&self) -> Option<ChaosSpec> {
        self.iter().find_map(|tag| match tag {
            Tag::Chaos(spec) => Some(*spec),
            _ => None,
        })
    }

    /// True when both `/c` and a `/cm...` tag are present.
    pub fn has_mixed_chaos(&self) -> bool {
        let mut forms = self.iter().filter_map(|tag| match tag {
            Tag::Chaos(spec) => Some(spec.form),
            _ => None,
        });
        match forms.next() {
            Some(first) => forms.any(|form| form != first),
            None => false,
        }
    }
}

/// Extract and validate every `/token` in `label`.
///
/// Returns an empty set when the label has no tokens. Any token outside the
/// grammar rejects the whole label.
pub fn parse_tags(label: &str) -> Result<TagSet, TagError> {
    let raw: Vec<String> = tag_tokens(label.trim())
        .into_iter()
        .map(|(_, token)| normalize_token(token))
        .filter(|token| !token.is_empty())
        .collect();

    let mut tokens = Vec::with_capacity(raw.len());
    for token in &raw {
        let text = token.to_lowercase();
        match grammar::parse_token(&text) {
            Some(tag) => tokens.push(TagToken { text, tag }),
            None => {
                return Err(TagError::UnknownToken {
                    token: token.clone(),
                    tokens: raw.clone(),
                })
            }
        }
    }

    Ok(TagSet { tokens })
}

/// Fold full-width space, tab and newline runs to a single space, then trim.
fn normalize_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut in_run = false;
    for ch in token.chars() {
        if matches!(ch, '\u{3000}' | '\t' | '\n' | '\r') {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out.trim().to_string()
}

impl From<&TagError> for Diagnostic {
    fn from(err: &TagError) -> Self {
        match err {
            TagError::UnknownToken { token, tokens } => malformed_tags(tokens, token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_in_label_order() {
        let tags = parse_tags("Styles /R1-3/a /V").unwrap();
        assert_eq!(tags.tokens(), vec!["r1-3", "a", "v"]);
        assert!(tags.has_key("a"));
        assert!(tags.has_key("V"));
        assert_eq!(tags.random().map(|r| r.selector()), Some("1-3"));
    }

    #[test]
    fn test_no_tags() {
        assert!(parse_tags("Plain title").unwrap().is_empty());
        assert!(parse_tags("").unwrap().is_empty());
        assert!(parse_tags("dangling /").unwrap().is_empty());
    }

    #[test]
    fn test_without_spaces() {
        let tags = parse_tags("おまじない/r/a/C").unwrap();
        assert_eq!(tags.tokens(), vec!["r", "a", "c"]);
        assert_eq!(tags.chaos(), Some(ChaosSpec::bare()));
    }

    #[test]
    fn test_full_width_space_separates() {
        let tags = parse_tags("Scene\u{3000}/a\u{3000}/r").unwrap();
        assert_eq!(tags.tokens(), vec!["a", "r"]);
    }

    #[test]
    fn test_composite_token_rejects_everything() {
        let err = parse_tags("Mixed /R2a /v").unwrap_err();
        assert_eq!(
            err,
            TagError::UnknownToken {
                token: "R2a".into(),
                tokens: vec!["R2a".into(), "v".into()],
            }
        );

        let (tags, diag) = TagSet::parse_or_empty("Mixed /v/var");
        assert!(tags.is_empty());
        assert!(diag.is_some());
    }

    #[test]
    fn test_turn_and_chaos_lookup() {
        let tags = parse_tags("Pose /T2M3-1 /CM4-2").unwrap();
        assert_eq!(
            tags.turn(),
            Some(TurnSpec {
                current: 2,
                max_exec: 3,
                count: 1
            })
        );
        assert_eq!(tags.chaos().map(|c| (c.max_exec, c.count)), Some((4, 2)));
    }

    #[test]
    fn test_mixed_chaos_forms() {
        let tags = parse_tags("Mood /C/CM3-1").unwrap();
        assert!(tags.has_mixed_chaos());
        assert_eq!(tags.chaos(), Some(ChaosSpec::bare()));

        assert!(!parse_tags("Mood /CM3-1/CM2").unwrap().has_mixed_chaos());
        assert!(!parse_tags("Mood /C").unwrap().has_mixed_chaos());
        assert!(!parse_tags("Mood").unwrap().has_mixed_chaos());
    }

    #[test]
    fn test_canonical_tokens() {
        let turn = TurnSpec {
            current: 3,
            max_exec: 1,
            count: 1,
        };
        assert_eq!(turn.token(), "T3M1-1");

        let chaos = ChaosSpec {
            form: ChaosForm::Counted,
            max_exec: 3,
            count: 2,
        };
        assert_eq!(chaos.token(), "CM3-2");
        assert_eq!(
            ChaosSpec {
                max_exec: 1,
                ..chaos
            }
            .token(),
            "CM"
        );
        assert_eq!(ChaosSpec::bare().token(), "C");
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("\ta\t"), "a");
        assert_eq!(normalize_token(""), "");
    }
}
