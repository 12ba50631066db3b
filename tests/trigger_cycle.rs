//! Engine trigger cycles over an in-memory workspace
//!
//! Run with: cargo test --test trigger_cycle

use std::io::Write;

use pretty_assertions::assert_eq;

use prompt_switch::{
    assemble_prompt, ConfigLoader, DeactivateOutcome, DiagnosticCode, Document, Engine, Entity,
    Workspace,
};

fn seeded_engine(seed: u64) -> Engine {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "seed: {seed}").unwrap();
    let config = ConfigLoader::new(file.path()).load().unwrap();
    Engine::new(config)
}

fn workspace() -> Workspace {
    serde_json::from_str(
        r#"[
            {"label": "Subject /T", "buffer": "cat\ndog\nfox"},
            {"label": "Mood /CM2-1/R1-2", "buffer": "calm\nangry\nsleepy\n\nrain\nsnow"},
            {"label": "Style /C /a", "buffer": "// oil\n// ink\n// disabled phrase 20240102030405"},
            {"label": "Broken /R2a", "buffer": "x\ny"},
            {"label": "Plain", "buffer": "a\n// b"}
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_three_triggers() {
    let engine = seeded_engine(11);
    let mut rng = engine.rng();
    let mut ws = workspace();
    let mut subjects = Vec::new();

    for _ in 0..3 {
        let report = engine.before_work(&mut ws, &mut rng);
        assert_eq!(report.turns, 1);
        // Mood and Style both carry chaos tags.
        assert_eq!(report.chaos_rolls + report.chaos_holds, 2);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MalformedTagSet));

        subjects.push(assemble_prompt(&ws.entities[0].buffer, None));
    }

    assert_eq!(subjects, vec!["cat, ", "dog, ", "fox, "]);
    assert_eq!(ws.entities[0].label, "Subject /T1M1-1");
    // CM2: roll, hold, roll
    assert_eq!(ws.entities[1].label, "Mood /R1-2/CM2-2");
    assert_eq!(ws.entities[2].label, "Style /C /a");
    // Untagged and unparseable entities are never touched by the hook.
    assert_eq!(ws.entities[3].buffer, "x\ny");
    assert_eq!(ws.entities[4].buffer, "a\n// b");
}

#[test]
fn test_chaos_pick_respects_sections_and_range() {
    let engine = seeded_engine(3);
    let mut rng = engine.rng();
    let mut ws = workspace();

    engine.before_work(&mut ws, &mut rng);

    let doc = Document::parse(&ws.entities[1].buffer);
    for range in [0..3, 4..6] {
        let active = doc
            .eligible_in(range)
            .into_iter()
            .filter(|&i| doc.get(i).is_some_and(|line| line.is_active()))
            .count();
        assert!((1..=2).contains(&active));
    }

    let style = Document::parse(&ws.entities[2].buffer);
    assert_eq!(style.active_count(), 1);
    assert_eq!(style.get(2).unwrap().raw(), "// disabled phrase 20240102030405");
}

#[test]
fn test_same_seed_same_outcome() {
    let run = |seed| {
        let engine = seeded_engine(seed);
        let mut rng = engine.rng();
        let mut ws = workspace();
        for _ in 0..4 {
            engine.before_work(&mut ws, &mut rng);
        }
        ws
    };
    assert_eq!(run(5), run(5));
}

#[test]
fn test_group_operators() {
    let engine = seeded_engine(1);
    let mut rng = engine.rng();
    let mut ws = workspace();

    assert_eq!(
        engine.deactivate_all_entities(&mut ws),
        DeactivateOutcome::Deactivated { entities: 4 }
    );
    // Style is exempt via /a and was already inactive anyway.
    assert!(ws
        .entities
        .iter()
        .all(|e| Document::parse(&e.buffer).active_count() == 0));
    assert_eq!(
        engine.deactivate_all_entities(&mut ws),
        DeactivateOutcome::AlreadyInactive
    );

    ws.entities.push(Entity::new("Keep /r", "k"));
    let outcome = engine.randomize_all_entities(&mut ws, &mut rng);
    // Every entity except the /r one; the broken label counts as untagged.
    assert_eq!(outcome.entities, 5);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::MalformedTagSet));
    assert_eq!(ws.entities[5].buffer, "k");
    assert_eq!(Document::parse(&ws.entities[3].buffer).active_count(), 1);
}
