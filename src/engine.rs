//! Trigger engine
//!
//! Runs the label-driven schedulers over every entity a host exposes, plus the
//! group operators that act across entities. A [`RunContext`] is created per
//! trigger and carries the diagnostics and the set of entities the turn
//! scheduler already handled; nothing survives between triggers except what is
//! written back into labels and buffers.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::buffer::Document;
use crate::config::EngineConfig;
use crate::diagnostics::{chaos_form_conflict, directive_conflict, Diagnostic, DiagnosticCode};
use crate::directives::{bulk, chaos, random, turn, SelectionRange};
use crate::host::EntityHost;
use crate::tags::TagSet;

/// Per-trigger bookkeeping.
#[derive(Debug)]
pub struct RunContext<Id> {
    diagnostics: Vec<Diagnostic>,
    turn_handled: HashSet<Id>,
}

impl<Id: Copy + Eq + std::hash::Hash> RunContext<Id> {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            turn_handled: HashSet::new(),
        }
    }

    pub fn record(&mut self, diag: Diagnostic) {
        diag.emit();
        self.diagnostics.push(diag);
    }

    pub fn mark_turn_handled(&mut self, id: Id) {
        self.turn_handled.insert(id);
    }

    pub fn turn_handled(&self, id: Id) -> bool {
        self.turn_handled.contains(&id)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<Id: Copy + Eq + std::hash::Hash> Default for RunContext<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one pre-execution trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerReport {
    pub turns: usize,
    pub chaos_rolls: usize,
    pub chaos_holds: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of "deactivate all entities".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeactivateOutcome {
    /// No non-exempt entity had an active line; nothing was written
    AlreadyInactive,
    Deactivated { entities: usize },
}

/// Outcome of "randomize all entities".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RandomizeOutcome {
    pub entities: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seeded generator when the config fixes a seed, otherwise one seeded from
    /// OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    // =========================================================================
    // Pre-execution hook
    // =========================================================================

    /// Run one trigger cycle: turn scheduling for every entity first, then
    /// chaos-multi for every entity the turn pass did not handle.
    pub fn before_work<H, R>(&self, host: &mut H, rng: &mut R) -> TriggerReport
    where
        H: EntityHost,
        R: Rng + ?Sized,
    {
        let mut ctx = RunContext::new();
        let mut report = TriggerReport::default();

        let entities: Vec<(H::Id, TagSet)> = host
            .entity_ids()
            .into_iter()
            .filter_map(|id| {
                let label = host.label(id)?;
                let (tags, diag) = TagSet::parse_or_empty(&label);
                if let Some(diag) = diag {
                    ctx.diagnostics.push(diag);
                }
                Some((id, tags))
            })
            .collect();

        for (id, tags) in &entities {
            if self.run_turn(host, &mut ctx, *id, tags) {
                report.turns += 1;
            }
        }

        for (id, tags) in &entities {
            if ctx.turn_handled(*id) {
                continue;
            }
            match self.run_chaos(host, &mut ctx, *id, tags, rng) {
                Some(true) => report.chaos_rolls += 1,
                Some(false) => report.chaos_holds += 1,
                None => {}
            }
        }

        report.diagnostics = ctx.into_diagnostics();
        info!(
            turns = report.turns,
            chaos_rolls = report.chaos_rolls,
            chaos_holds = report.chaos_holds,
            diagnostics = report.diagnostics.len(),
            "trigger cycle complete"
        );
        report
    }

    /// Returns true when a turn was applied. Any entity carrying a `T` tag is
    /// marked handled, even when its state was invalid.
    fn run_turn<H: EntityHost>(
        &self,
        host: &mut H,
        ctx: &mut RunContext<H::Id>,
        id: H::Id,
        tags: &TagSet,
    ) -> bool {
        let Some(spec) = tags.turn() else {
            return false;
        };
        ctx.mark_turn_handled(id);

        let (Some(label), Some(buffer)) = (host.label(id), host.buffer(id)) else {
            return false;
        };
        if tags.chaos().is_some() {
            ctx.record(directive_conflict(&label));
        }

        match turn::apply(&label, &buffer, spec) {
            Ok(out) => {
                if out.activated.is_none() {
                    ctx.record(
                        Diagnostic::info(
                            DiagnosticCode::NoEligibleLines,
                            "no eligible line for turn; buffer left inactive",
                        )
                        .with_entity(label.as_str()),
                    );
                }
                debug!(?id, label = %out.label, activated = ?out.activated, "turn applied");
                host.set_label(id, out.label);
                host.set_buffer(id, out.buffer);
                true
            }
            Err(err) => {
                ctx.record(Diagnostic::from(&err).with_entity(label.as_str()));
                false
            }
        }
    }

    /// `Some(rolled)` when chaos-multi ran for the entity.
    fn run_chaos<H, R>(
        &self,
        host: &mut H,
        ctx: &mut RunContext<H::Id>,
        id: H::Id,
        tags: &TagSet,
        rng: &mut R,
    ) -> Option<bool>
    where
        H: EntityHost,
        R: Rng + ?Sized,
    {
        let spec = tags.chaos()?;
        let label = host.label(id)?;
        let buffer = host.buffer(id)?;

        if tags.has_mixed_chaos() {
            ctx.record(chaos_form_conflict(&label, &spec.token()));
        }
        let (range, diag) = SelectionRange::resolve(tags.random());
        if let Some(diag) = diag {
            ctx.record(diag.with_entity(label.as_str()));
        }

        match chaos::apply(&label, &buffer, spec, &range, rng) {
            Ok(out) => {
                debug!(?id, label = %out.label, rolled = out.rolled, "chaos-multi applied");
                host.set_label(id, out.label);
                host.set_buffer(id, out.buffer);
                Some(out.rolled)
            }
            Err(err) => {
                ctx.record(Diagnostic::from(&err).with_entity(label.as_str()));
                None
            }
        }
    }

    // =========================================================================
    // Group operators
    // =========================================================================

    /// Force every prompt line inactive across all entities not tagged with the
    /// deactivate-exempt key. Does nothing when none of them has an active line.
    pub fn deactivate_all_entities<H: EntityHost>(&self, host: &mut H) -> DeactivateOutcome {
        let key = self.config.deactivate_exempt_key.as_str();
        let targets: Vec<(H::Id, Document)> = host
            .enumerate(|host, id| !has_exempt_key(host, id, key))
            .into_iter()
            .filter_map(|id| host.buffer(id).map(|buffer| (id, Document::parse(&buffer))))
            .collect();

        if !targets.iter().any(|(_, doc)| doc.has_active_prompt()) {
            Diagnostic::info(
                DiagnosticCode::AlreadyInactive,
                "all entities are already deactivated",
            )
            .emit();
            return DeactivateOutcome::AlreadyInactive;
        }

        let mut entities = 0;
        for (id, mut doc) in targets {
            if !doc.has_active_prompt() {
                continue;
            }
            bulk::force_all_inactive(&mut doc);
            host.set_buffer(id, doc.to_string());
            entities += 1;
        }
        info!(entities, "deactivated all entities");
        DeactivateOutcome::Deactivated { entities }
    }

    /// Random pickup with each entity's own `R` spec, over every entity that is
    /// neither muted nor tagged with the random-exempt key.
    pub fn randomize_all_entities<H, R>(&self, host: &mut H, rng: &mut R) -> RandomizeOutcome
    where
        H: EntityHost,
        R: Rng + ?Sized,
    {
        let key = self.config.random_exempt_key.as_str();
        let mut ctx = RunContext::<H::Id>::new();
        let mut entities = 0;

        for id in host.enumerate(|host, id| !host.is_muted(id)) {
            let (Some(label), Some(buffer)) = (host.label(id), host.buffer(id)) else {
                continue;
            };
            let (tags, diag) = TagSet::parse_or_empty(&label);
            if let Some(diag) = diag {
                ctx.diagnostics.push(diag);
            }
            if tags.has_key(key) {
                debug!(?id, "random-exempt entity skipped");
                continue;
            }

            let (range, diag) = SelectionRange::resolve(tags.random());
            if let Some(diag) = diag {
                ctx.record(diag.with_entity(label.as_str()));
            }
            host.set_buffer(id, random::random_pickup(&buffer, &range, rng));
            entities += 1;
        }

        info!(entities, "randomized all entities");
        RandomizeOutcome {
            entities,
            diagnostics: ctx.into_diagnostics(),
        }
    }
}

/// Tag check for bulk exclusion; unparseable labels count as untagged.
fn has_exempt_key<H: EntityHost>(host: &H, id: H::Id, key: &str) -> bool {
    host.label(id)
        .map(|label| TagSet::parse_or_empty(&label).0.has_key(key))
        .unwrap_or(false)
}
