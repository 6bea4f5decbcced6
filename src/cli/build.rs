//! `kiln build` and `kiln step`: run the task graph once.

use std::time::Instant;

use anyhow::{Result, bail};

use super::BuildArgs;
use super::clean::clean_build_root;
use crate::core::{AssetKind, BuildEvent};
use crate::graph::{BuildReport, TaskGraph};
use crate::log;
use crate::logger::ProgressLine;
use crate::pipeline::{ConsoleNotifier, Notifier, StepContext};
use crate::utils::plural::plural_count;

/// Counts finished steps on the progress line, then forwards.
struct Progress<'a> {
    line: &'a ProgressLine,
    inner: &'a dyn Notifier,
}

impl Notifier for Progress<'_> {
    fn notify(&self, event: &BuildEvent) {
        self.line.inc();
        self.inner.notify(event);
    }
}

/// Run every step once.
///
/// Failed steps are reported, not escalated, unless `--strict` is set.
pub fn build_all(ctx: &StepContext, args: &BuildArgs) -> Result<BuildReport> {
    if args.clean {
        clean_build_root(&ctx.config)?;
    }

    let graph = TaskGraph::new(&ctx.config)?;
    let started = Instant::now();

    let line = ProgressLine::new("steps", graph.len());
    let console = ConsoleNotifier::build();
    let report = graph.run_all(
        ctx,
        &Progress {
            line: &line,
            inner: &console,
        },
    );
    line.finish();

    summarize(&report, started);
    let failed = report.failed().count();
    if args.strict && failed > 0 {
        bail!("{} failed", plural_count(failed, "step"));
    }
    Ok(report)
}

/// Run one step once, without its dependencies.
pub fn build_step(ctx: &StepContext, kind: AssetKind) -> Result<BuildEvent> {
    let graph = TaskGraph::new(&ctx.config)?;
    let Some(event) = graph.run_step(kind, ctx, &ConsoleNotifier::build()) else {
        bail!("no step named `{kind}`");
    };
    Ok(event)
}

fn summarize(report: &BuildReport, started: Instant) {
    let failed = report.failed().count();
    let elapsed = started.elapsed();
    if failed == 0 {
        log!("build"; "{} in {:.2?}", plural_count(report.events.len(), "step"), elapsed);
    } else {
        let names: Vec<_> = report.failed().map(|e| e.kind.step_name()).collect();
        log!("build"; "{} in {:.2?}, failed: {}",
            plural_count(report.events.len(), "step"), elapsed, names.join(", "));
    }
}
