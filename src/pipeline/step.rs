//! One transform step per asset kind.

use std::fs;
use std::path::{Path, PathBuf};

use super::transform::{font, image, markup, script, sprite, style};
use super::{Asset, Notifier, Stage, StepContext, StepError, commit};
use crate::config::PipelineConfig;
use crate::core::{AssetKind, BuildEvent, StepStats};
use crate::freshness::{is_output_fresh, mark_fresh};

/// Which sources an invocation considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
    /// Skip sources whose output is at least as new.
    Newer,
}

/// Stateless, re-entrant description of a step.
pub struct TransformStep {
    kind: AssetKind,
    stages: Vec<Box<dyn Stage>>,
    filter: Option<SourceFilter>,
    /// Replace the source extension on the destination (`main.scss` → `main.css`).
    dest_extension: Option<&'static str>,
    /// Skip `_`-prefixed sources (SCSS partials).
    skip_partials: bool,
}

impl TransformStep {
    /// The fixed pipeline for `kind`, configured from `config`.
    pub fn for_kind(kind: AssetKind, config: &PipelineConfig) -> Self {
        let step = Self {
            kind,
            stages: Vec::new(),
            filter: None,
            dest_extension: None,
            skip_partials: false,
        };
        match kind {
            AssetKind::Markup => step.with_stages(markup::stages(config)),
            AssetKind::Script => step.with_stages(script::stages(config)),
            AssetKind::Style => Self {
                dest_extension: Some("css"),
                skip_partials: true,
                ..step.with_stages(style::stages(config))
            },
            AssetKind::Image => Self {
                filter: Some(SourceFilter::Newer),
                ..step.with_stages(image::stages(config))
            },
            AssetKind::SpriteIcon => step.with_stages(sprite::stages(config)),
            AssetKind::Font => step.with_stages(font::stages(config)),
        }
    }

    fn with_stages(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages = stages;
        self
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.step_name()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run once, report to `notifier`, and return the event.
    ///
    /// Errors never escape: they become a failed event.
    pub fn run(&self, ctx: &StepContext, notifier: &dyn Notifier) -> BuildEvent {
        let event = match self.execute(ctx) {
            Ok((stats, written)) => BuildEvent::success(self.kind, stats, written),
            Err(e) => BuildEvent::failure(self.kind, e.to_string()),
        };
        notifier.notify(&event);
        event
    }

    fn execute(&self, ctx: &StepContext) -> Result<(StepStats, Vec<String>), StepError> {
        let spec = ctx.table.spec(self.kind);
        let sources = ctx
            .table
            .sources(self.kind)
            .map_err(|e| StepError::fs(&spec.source_base, e))?;

        let mut stats = StepStats::default();
        let mut batch = Vec::with_capacity(sources.len());
        for source in sources {
            if self.skip_partials && is_partial(&source) {
                continue;
            }
            let dest = self.dest_for(ctx, &source);
            if self.filter == Some(SourceFilter::Newer) && is_output_fresh(&source, &dest) {
                stats.skipped += 1;
                continue;
            }
            let contents = fs::read(&source).map_err(|e| StepError::fs(&source, e))?;
            batch.push(Asset::new(source, dest, contents));
        }

        if batch.is_empty() {
            return Ok((stats, Vec::new()));
        }

        for stage in &self.stages {
            batch = stage.apply(batch, ctx)?;
        }

        let report = commit(&batch)?;
        stats.written = report.written.len();
        stats.unchanged = report.unchanged.len();

        // identical outputs are not rewritten; refresh their mtime so the
        // next `newer` pass skips the source
        if self.filter == Some(SourceFilter::Newer) {
            for dest in &report.unchanged {
                if let Err(e) = mark_fresh(dest) {
                    crate::debug!(self.name(); "touch {}: {}", dest.display(), e);
                }
            }
        }

        let written = report
            .written
            .iter()
            .map(|path| display_path(ctx, path))
            .collect();
        Ok((stats, written))
    }

    fn dest_for(&self, ctx: &StepContext, source: &Path) -> PathBuf {
        let spec = ctx.table.spec(self.kind);
        let mut dest = spec.output_dir.join(ctx.table.relative_source(self.kind, source));
        if let Some(ext) = self.dest_extension {
            dest.set_extension(ext);
        }
        dest
    }
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// `/css/main.css` for build outputs, `src/img/sprite.png` for sources.
fn display_path(ctx: &StepContext, path: &Path) -> String {
    if let Ok(rel) = path.strip_prefix(ctx.table.build_root()) {
        return format!("/{}", rel.to_string_lossy().replace('\\', "/"));
    }
    path.strip_prefix(ctx.table.root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
