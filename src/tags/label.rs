//! Label rewriting: locating, replacing and appending `/token`s.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::{grammar, Tag};

/// `/` followed by a maximal run of non-slash, non-whitespace characters
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/([^/\s]*)").unwrap());

/// Byte span (including the slash) and raw text of every tag token in `label`.
pub fn tag_tokens(label: &str) -> Vec<(Range<usize>, &str)> {
    TAG_RE
        .captures_iter(label)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            Some((whole.range(), token.as_str()))
        })
        .collect()
}

/// Remove every token whose tag satisfies `remove`, then append `replacement`
/// (a token without its slash) when given.
pub fn replace_tags(
    label: &str,
    remove: impl Fn(&Tag) -> bool,
    replacement: Option<&str>,
) -> String {
    let mut out = strip_tokens(label, |token| {
        grammar::parse_token(&token.trim().to_lowercase()).is_some_and(|tag| remove(&tag))
    });
    if let Some(token) = replacement {
        append_token(&mut out, token);
    }
    out
}

/// Add `/C` when the label has no bare `/c`; otherwise remove every bare `/c`.
pub fn toggle_chaos_tag(label: &str) -> String {
    let (tags, _) = super::TagSet::parse_or_empty(label);
    if tags.has_key("c") {
        strip_tokens(label, |token| token.trim().eq_ignore_ascii_case("c"))
            .trim_start()
            .to_string()
    } else {
        let mut out = label.trim().to_string();
        append_token(&mut out, "C");
        out
    }
}

fn strip_tokens(label: &str, remove: impl Fn(&str) -> bool) -> String {
    let mut out = String::with_capacity(label.len());
    let mut cursor = 0;

    for (span, token) in tag_tokens(label) {
        if !remove(token) {
            continue;
        }

        // Drop the whitespace before a token that stands on its own, so
        // "name /T /R2" becomes "name /R2" rather than "name  /R2".
        let stands_alone = label[span.end..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace);
        let start = if stands_alone {
            cursor + label[cursor..span.start].trim_end().len()
        } else {
            span.start
        };

        out.push_str(&label[cursor..start]);
        cursor = span.end;
    }
    out.push_str(&label[cursor..]);
    out.trim_end().to_string()
}

/// Append `/token`, glued to a preceding tag or separated from plain text by a space.
fn append_token(label: &mut String, token: &str) {
    let ends_with_tag = tag_tokens(label)
        .last()
        .is_some_and(|(span, text)| span.end == label.len() && !text.is_empty());
    if !label.is_empty() && !ends_with_tag {
        label.push(' ');
    }
    label.push('/');
    label.push_str(token);
}
