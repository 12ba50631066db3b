//! Chaos-multi scheduler (`/C`, `/CM` directives)
//!
//! Re-runs random pickup on the first of every `max_exec` triggers. Bare `/C`
//! rolls on every trigger and never surfaces a counter.

use rand::Rng;
use tracing::debug;

use super::random::{pick_sections, SelectionRange};
use crate::buffer::Document;
use crate::error::StateError;
use crate::tags::{replace_tags, ChaosForm, ChaosSpec, Tag};

#[derive(Debug, Clone, PartialEq)]
pub struct ChaosRewrite {
    pub label: String,
    pub buffer: String,
    /// Whether random pickup ran on this trigger
    pub rolled: bool,
    pub next: ChaosSpec,
}

fn validate(spec: &ChaosSpec) -> Result<(), StateError> {
    if spec.max_exec < 1 {
        return Err(StateError::Chaos {
            field: "max_exec",
            value: spec.max_exec,
        });
    }
    if spec.count < 1 {
        return Err(StateError::Chaos {
            field: "count",
            value: spec.count,
        });
    }
    Ok(())
}

/// Counter value for the trigger after `spec`.
pub fn next_count(spec: &ChaosSpec) -> u32 {
    if spec.count >= spec.max_exec {
        1
    } else {
        spec.count.saturating_add(1)
    }
}

pub fn apply<R: Rng + ?Sized>(
    label: &str,
    buffer: &str,
    spec: ChaosSpec,
    range: &SelectionRange,
    rng: &mut R,
) -> Result<ChaosRewrite, StateError> {
    validate(&spec)?;

    let rolled = spec.count == 1;
    let buffer = if rolled {
        let mut doc = Document::parse(buffer);
        pick_sections(&mut doc, range, rng);
        doc.to_string()
    } else {
        buffer.to_string()
    };

    let next = ChaosSpec {
        count: next_count(&spec),
        ..spec
    };
    debug!(rolled, count = spec.count, next = next.count, "chaos-multi trigger");

    let label = match spec.form {
        ChaosForm::Bare => label.to_string(),
        ChaosForm::Counted => replace_tags(
            label,
            |tag| matches!(tag, Tag::Chaos(c) if c.form == ChaosForm::Counted),
            Some(&next.token()),
        ),
    };

    Ok(ChaosRewrite {
        label,
        buffer,
        rolled,
        next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn counted(max_exec: u32, count: u32) -> ChaosSpec {
        ChaosSpec {
            form: ChaosForm::Counted,
            max_exec,
            count,
        }
    }

    #[test]
    fn test_counter_cycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let buffer = "a\nb\nc";
        let mut label = "Mood /CM3-1".to_string();
        let mut rolls = Vec::new();

        for expected in ["Mood /CM3-2", "Mood /CM3-3", "Mood /CM3-1", "Mood /CM3-2"] {
            let spec = crate::tags::parse_tags(&label).unwrap().chaos().unwrap();
            let out = apply(&label, buffer, spec, &SelectionRange::SINGLE, &mut rng).unwrap();
            assert_eq!(out.label, expected);
            rolls.push(out.rolled);
            label = out.label;
        }

        assert_eq!(rolls, vec![true, false, false, true]);
    }

    #[test]
    fn test_hold_leaves_buffer_alone() {
        let mut rng = StdRng::seed_from_u64(3);
        let buffer = "a\nb\nc";
        let out = apply("/CM2-2", buffer, counted(2, 2), &SelectionRange::SINGLE, &mut rng).unwrap();
        assert!(!out.rolled);
        assert_eq!(out.buffer, buffer);
        assert_eq!(out.label, "/CM2-1");
    }

    #[test]
    fn test_bare_c_rolls_every_time_and_keeps_label() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..3 {
            let out = apply(
                "Mood /C",
                "a\nb\nc",
                ChaosSpec::bare(),
                &SelectionRange::SINGLE,
                &mut rng,
            )
            .unwrap();
            assert!(out.rolled);
            assert_eq!(out.label, "Mood /C");
            assert_eq!(out.buffer.lines().filter(|l| !l.starts_with("//")).count(), 1);
        }
    }

    #[test]
    fn test_bare_cm_label() {
        let mut rng = StdRng::seed_from_u64(5);
        let out = apply("x /CM", "a", counted(1, 1), &SelectionRange::SINGLE, &mut rng).unwrap();
        assert_eq!(out.label, "x /CM");
    }

    #[test]
    fn test_invalid_state() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = apply("x /CM0", "a", counted(0, 1), &SelectionRange::SINGLE, &mut rng);
        assert_eq!(
            err,
            Err(StateError::Chaos {
                field: "max_exec",
                value: 0
            })
        );
    }

    #[test]
    fn test_count_above_max_self_heals() {
        assert_eq!(next_count(&counted(3, 5)), 1);
        assert_eq!(next_count(&counted(3, 2)), 3);
    }

    #[test]
    fn test_counter_at_u32_limit() {
        let max = u32::MAX;
        assert_eq!(next_count(&counted(max, max)), 1);
        assert_eq!(next_count(&counted(max, max - 1)), max);

        let mut rng = StdRng::seed_from_u64(8);
        let out = apply(
            "x /CM4294967295-4294967295",
            "a",
            counted(max, max),
            &SelectionRange::SINGLE,
            &mut rng,
        )
        .unwrap();
        assert!(!out.rolled);
        assert_eq!(out.label, "x /CM4294967295-1");
    }
}
