//! Development server with live reload.
//!
//! Serves the build root over tiny_http. HTML responses carry the
//! live-reload script once the WebSocket sideband is up.

mod content;
mod lifecycle;
mod path;
mod response;


pub use lifecycle::{ActorOptions, spawn_actors, wait_for_shutdown};

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use tiny_http::{Method, Request, Server};

use crate::config::PipelineConfig;
use crate::core::{is_shutdown, register_server};
use crate::embed::serve::LIVERELOAD_URL;
use crate::log;
use path::Lookup;

/// Port of the live-reload socket; 0 while live reload is off.
static RELOAD_PORT: AtomicU16 = AtomicU16::new(0);

/// Record the port the live-reload socket actually bound.
pub fn set_reload_port(port: u16) {
    RELOAD_PORT.store(port, Ordering::Relaxed);
}

fn reload_port() -> Option<u16> {
    match RELOAD_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    root: PathBuf,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.host, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    Ok(BoundServer {
        server,
        addr,
        root: config.build_root(),
    })
}

impl BoundServer {
    /// Run the request loop until the server is unblocked.
    pub fn run(self) -> Result<()> {
        log!("serve"; "http://{}", self.addr);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .context("failed to create request pool")?;

        let root = Arc::new(self.root);
        for request in self.server.incoming_requests() {
            let root = Arc::clone(&root);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &root) {
                    log!("serve"; "request error: {e:#}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    let port = reload_port();
    if let Some(port) = port
        && path::url_path(request.url()) == LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    match path::resolve_path(request.url(), root) {
        Lookup::File(file) => response::respond_file(request, &file, port),
        Lookup::Forbidden => response::respond_forbidden(request),
        Lookup::Missing => response::respond_not_found(request, root, port),
    }
}
