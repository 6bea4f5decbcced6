//! Task graph: every step once, dependency edges respected.
//!
//! Steps are grouped into waves (Kahn levels). Steps inside a wave run in
//! parallel on rayon; waves run in order, so with the default edge the
//! sprite step completes before the style step starts.
//!
//! ```text
//! wave 0: markup  script  image  sprite  font
//! wave 1: style
//! ```

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{ConfigDiagnostics, ConfigError, FieldPath, PipelineConfig};
use crate::core::{AssetKind, BuildEvent};
use crate::pipeline::{Notifier, StepContext, TransformStep};

/// `(step, depends_on)`: the sprite step writes a partial the style step imports.
pub const DEFAULT_EDGES: &[(AssetKind, AssetKind)] = &[(AssetKind::Style, AssetKind::SpriteIcon)];

pub struct TaskGraph {
    steps: FxHashMap<AssetKind, TransformStep>,
    /// step → steps it waits for
    dependencies: FxHashMap<AssetKind, Vec<AssetKind>>,
    waves: Vec<Vec<AssetKind>>,
}

impl TaskGraph {
    /// One step per asset kind with the default edges.
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let steps = AssetKind::ALL
            .iter()
            .map(|&kind| TransformStep::for_kind(kind, config))
            .collect();
        Self::from_steps(steps, DEFAULT_EDGES)
    }

    /// Validate `edges` against `steps` and compute the waves.
    ///
    /// Edges naming a step that is not in the graph, self-edges and cycles
    /// are configuration errors.
    pub fn from_steps(
        steps: Vec<TransformStep>,
        edges: &[(AssetKind, AssetKind)],
    ) -> Result<Self, ConfigError> {
        let steps: FxHashMap<AssetKind, TransformStep> =
            steps.into_iter().map(|step| (step.kind(), step)).collect();

        let mut diag = ConfigDiagnostics::new();
        let mut dependencies: FxHashMap<AssetKind, Vec<AssetKind>> = FxHashMap::default();
        for &(step, depends_on) in edges {
            for kind in [step, depends_on] {
                if !steps.contains_key(&kind) {
                    diag.error(
                        FieldPath::new("steps"),
                        format!("dependency `{step} -> {depends_on}` names unknown step `{kind}`"),
                    );
                }
            }
            let deps = dependencies.entry(step).or_default();
            if !deps.contains(&depends_on) {
                deps.push(depends_on);
            }
        }
        diag.into_result()?;

        let waves = kahn_waves(&steps.keys().copied().collect::<Vec<_>>(), &dependencies)?;
        Ok(Self {
            steps,
            dependencies,
            waves,
        })
    }

    pub fn waves(&self) -> &[Vec<AssetKind>] {
        &self.waves
    }

    /// Steps `kind` waits for.
    pub fn dependencies(&self, kind: AssetKind) -> &[AssetKind] {
        self.dependencies.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn step(&self, kind: AssetKind) -> Option<&TransformStep> {
        self.steps.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Run every step exactly once, wave by wave.
    ///
    /// A failed step never stops the others, dependents included.
    pub fn run_all(&self, ctx: &StepContext, notifier: &dyn Notifier) -> BuildReport {
        let mut events = Vec::with_capacity(self.steps.len());
        for wave in &self.waves {
            let mut results: Vec<BuildEvent> = wave
                .par_iter()
                .filter_map(|kind| self.steps.get(kind))
                .map(|step| step.run(ctx, notifier))
                .collect();
            events.append(&mut results);
        }
        BuildReport { events }
    }

    /// Run a single step once, without its dependencies.
    pub fn run_step(
        &self,
        kind: AssetKind,
        ctx: &StepContext,
        notifier: &dyn Notifier,
    ) -> Option<BuildEvent> {
        self.steps.get(&kind).map(|step| step.run(ctx, notifier))
    }
}

/// Kahn topological levels, each level in `AssetKind` order.
fn kahn_waves(
    kinds: &[AssetKind],
    dependencies: &FxHashMap<AssetKind, Vec<AssetKind>>,
) -> Result<Vec<Vec<AssetKind>>, ConfigError> {
    let mut remaining: FxHashSet<AssetKind> = kinds.iter().copied().collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
        let mut wave: Vec<AssetKind> = remaining
            .iter()
            .copied()
            .filter(|kind| {
                dependencies
                    .get(kind)
                    .is_none_or(|deps| deps.iter().all(|d| !remaining.contains(d)))
            })
            .collect();

        if wave.is_empty() {
            let mut stuck: Vec<_> = remaining.iter().map(|k| k.step_name()).collect();
            stuck.sort_unstable();
            let mut diag = ConfigDiagnostics::new();
            diag.error(
                FieldPath::new("steps"),
                format!("dependency cycle between {}", stuck.join(", ")),
            );
            return Err(ConfigError::Diagnostics(diag));
        }

        wave.sort();
        for kind in &wave {
            remaining.remove(kind);
        }
        waves.push(wave);
    }

    Ok(waves)
}

/// Every event of one `run_all`.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub events: Vec<BuildEvent>,
}

impl BuildReport {
    pub fn failed(&self) -> impl Iterator<Item = &BuildEvent> {
        self.events.iter().filter(|e| !e.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn event(&self, kind: AssetKind) -> Option<&BuildEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests;
