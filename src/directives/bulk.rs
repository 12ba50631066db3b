//! Whole-buffer and single-line operators.
//!
//! Sentinel, blank and separator lines are never rewritten by any of these.

use crate::buffer::{Document, Line, WeightBounds};

/// Deactivate everything if any prompt is active, otherwise activate everything.
///
/// One-way: from a mixed buffer the second application activates every line,
/// so it does not restore the original mix.
pub fn toggle_all(doc: &mut Document) {
    if doc.has_active_prompt() {
        doc.map_lines(Line::deactivated);
    } else {
        doc.map_lines(Line::activated);
    }
}

/// Idempotent.
pub fn force_all_inactive(doc: &mut Document) {
    doc.map_lines(Line::deactivated);
}

/// Drop every weight wrapper, keeping bodies, trailing commas and comments.
pub fn reset_all_weights(doc: &mut Document) {
    doc.map_lines(Line::reset_weight);
}

/// Flip one prompt line.
pub fn toggle_line(doc: &mut Document, index: usize) {
    doc.update(index, Line::toggled);
}

/// Nudge one line's weight by `delta`, clamped to `bounds`.
pub fn adjust_weight(doc: &mut Document, index: usize, delta: f64, bounds: WeightBounds) {
    doc.update(index, |line| line.adjust_weight(delta, bounds));
}

fn rewrite(text: &str, op: impl FnOnce(&mut Document)) -> String {
    let mut doc = Document::parse(text);
    op(&mut doc);
    doc.to_string()
}

pub fn toggle_all_prompts(text: &str) -> String {
    rewrite(text, toggle_all)
}

pub fn deactivate_prompt_text(text: &str) -> String {
    rewrite(text, force_all_inactive)
}

pub fn reset_weights_text(text: &str) -> String {
    rewrite(text, reset_all_weights)
}

pub fn toggle_line_text(text: &str, index: usize) -> String {
    rewrite(text, |doc| toggle_line(doc, index))
}

pub fn adjust_weight_text(text: &str, index: usize, delta: f64, bounds: WeightBounds) -> String {
    rewrite(text, |doc| adjust_weight(doc, index, delta, bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SENTINEL: &str = "// disabled phrase 20250101120000";

    #[test]
    fn test_toggle_all_deactivates_when_any_active() {
        let text = format!("a\n// b\n\n// , // note\n{SENTINEL}");
        assert_eq!(
            toggle_all_prompts(&text),
            format!("// a\n// b\n\n// , // note\n{SENTINEL}")
        );
    }

    #[test]
    fn test_toggle_all_activates_when_none_active() {
        let text = format!("  // a\n//b\n{SENTINEL}\n// , //");
        assert_eq!(toggle_all_prompts(&text), format!("a\nb\n{SENTINEL}\n// , //"));
    }

    #[test]
    fn test_toggle_all_is_one_way_from_mixed() {
        let mixed = "a\n// b";
        let once = toggle_all_prompts(mixed);
        let twice = toggle_all_prompts(&once);
        assert_eq!(once, "// a\n// b");
        assert_eq!(twice, "a\nb");
        assert_ne!(twice, mixed);
    }

    #[test]
    fn test_force_inactive_idempotent() {
        let text = "a\n  b\n// c\n\n(d:1.2), // e";
        let once = deactivate_prompt_text(text);
        assert_eq!(once, "// a\n  // b\n// c\n\n// (d:1.2), // e");
        assert_eq!(deactivate_prompt_text(&once), once);
    }

    #[test]
    fn test_reset_weights() {
        let text = "(a:1.20),\n// (b:0.50) // keep\n(c)\nd\n// , // (e:2.0)";
        assert_eq!(
            reset_weights_text(text),
            "a,\n// b // keep\nc\nd\n// , // (e:2.0)"
        );
    }

    #[test]
    fn test_toggle_single_line() {
        let text = format!("a\n{SENTINEL}\n// b");
        assert_eq!(toggle_line_text(&text, 0), format!("// a\n{SENTINEL}\n// b"));
        assert_eq!(toggle_line_text(&text, 1), text);
        assert_eq!(toggle_line_text(&text, 2), format!("a\n{SENTINEL}\nb"));
        assert_eq!(toggle_line_text(&text, 9), text);
    }

    #[test]
    fn test_adjust_single_weight() {
        let bounds = WeightBounds::default();
        assert_eq!(adjust_weight_text("a\nb,", 1, 0.1, bounds), "a\n(b:1.10),");
        assert_eq!(adjust_weight_text("(a:1.95)", 0, 0.1, bounds), "(a:2.00)");
        assert_eq!(adjust_weight_text("", 0, 0.1, bounds), "");
    }
}
