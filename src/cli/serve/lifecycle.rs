//! Server and actor lifecycle.

use std::net::{IpAddr, SocketAddr};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam::channel::{self, Receiver};
use tiny_http::Server;

use crate::actor::Coordinator;
use crate::core::register_shutdown_signal;
use crate::log;
use crate::pipeline::StepContext;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind `host:base_port`, moving up one port at a time while busy.
pub fn bind_with_retry(host: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match Server::http(SocketAddr::new(host, port)) {
            Ok(server) => {
                let addr = server
                    .server_addr()
                    .to_ip()
                    .unwrap_or_else(|| SocketAddr::new(host, port));
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

/// What the actor thread should do besides watching.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorOptions {
    /// Live-reload socket address.
    pub live_reload: Option<(IpAddr, u16)>,
    pub initial_build: bool,
}

/// Handle of the actor thread; yields the coordinator's result.
pub type ActorHandle = JoinHandle<Result<()>>;

/// Start the watch-mode actors on their own runtime thread.
///
/// Returns once the initial build (if requested) has finished, so callers
/// can bind the HTTP server afterwards. Fails when the coordinator stops
/// before it is ready (runtime, task graph or watcher startup).
pub fn spawn_actors(ctx: StepContext, options: ActorOptions) -> Result<ActorHandle> {
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_shutdown_signal(shutdown_tx);
    let (ready_tx, ready_rx) = channel::bounded::<()>(1);

    let handle = thread::spawn(move || -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        runtime.block_on(async move {
            let mut coordinator = Coordinator::new(ctx)
                .with_ready_signal(ready_tx)
                .with_shutdown_signal(shutdown_rx);
            if let Some((host, port)) = options.live_reload {
                coordinator = coordinator.with_live_reload(host, port);
            }
            if options.initial_build {
                coordinator = coordinator.with_initial_build();
            }
            coordinator.run().await
        })
    });

    await_ready(&ready_rx, handle)
}

/// Block until the actor thread signals ready, or surface why it stopped.
fn await_ready(ready_rx: &Receiver<()>, handle: ActorHandle) -> Result<ActorHandle> {
    if ready_rx.recv().is_ok() {
        return Ok(handle);
    }
    // sender dropped without a signal: the thread has ended
    match handle.join() {
        Ok(Ok(())) => Err(anyhow!("watcher stopped before it was ready")),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(anyhow!("watcher thread panicked")),
    }
}

/// Wait for the actor thread to wind down (max 2 seconds).
pub fn wait_for_shutdown(handle: ActorHandle) {
    for _ in 0..40 {
        if handle.is_finished() {
            match handle.join() {
                Ok(Err(e)) => log!("error"; "{:#}", e),
                Err(_) => log!("error"; "watcher thread panicked"),
                Ok(Ok(())) => {}
            }
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
