//! Long-running commands: `dev`, `watch` and `serve`.

use anyhow::{Result, anyhow};

use super::serve::{ActorOptions, bind_server, spawn_actors, wait_for_shutdown};
use crate::config::PipelineConfig;
use crate::pipeline::StepContext;

/// Build once, then serve the build root and watch the sources.
///
/// The watcher subscribes before the initial build, and the HTTP server
/// binds only after it, so the first page load sees a complete build.
pub fn run_dev(ctx: StepContext) -> Result<()> {
    let serve = &ctx.config.serve;
    let options = ActorOptions {
        live_reload: serve.live_reload.then_some((serve.host, serve.reload_port)),
        initial_build: true,
    };
    let config = ctx.config.clone();
    let actors = spawn_actors(ctx, options)?;

    bind_server(&config)?.run()?;
    wait_for_shutdown(actors);
    Ok(())
}

/// Build once, then watch without a server.
pub fn run_watch(ctx: StepContext) -> Result<()> {
    let options = ActorOptions {
        live_reload: None,
        initial_build: true,
    };
    spawn_actors(ctx, options)?
        .join()
        .map_err(|_| anyhow!("watcher thread panicked"))?
}

/// Serve the build root as it is; no watching, no live reload.
pub fn run_serve(config: &PipelineConfig) -> Result<()> {
    bind_server(config)?.run()
}
