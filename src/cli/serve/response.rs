//! HTTP response handlers.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::content::maybe_inject_livereload;
use crate::utils::mime::{self, types};

/// Respond with a static file; HTML gets the live-reload script.
pub fn respond_file(request: Request, path: &Path, port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if let Some(range) = range_header(&request)
        && !mime::is_html(content_type)
    {
        return respond_range(request, path, content_type, &range);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_livereload(body, content_type, port);
    send_body(request, 200, content_type, body)
}

/// `206 Partial Content` for a single byte range, `416` when unsatisfiable.
fn respond_range(
    request: Request,
    path: &Path,
    content_type: &'static str,
    range: &str,
) -> Result<()> {
    let file_size = fs::metadata(path)?.len();
    let Some((start, end)) = parse_range(range, file_size) else {
        let response = Response::empty(StatusCode(416))
            .with_header(header("Content-Range", &format!("bytes */{file_size}")));
        request.respond(response)?;
        return Ok(());
    };

    let length = end - start + 1;
    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let reader: Box<dyn Read + Send> = if is_head(&request) {
        Box::new(std::io::empty())
    } else {
        Box::new(file.take(length))
    };

    let response = Response::new(
        StatusCode(206),
        vec![
            header("Content-Type", content_type),
            header("Content-Range", &format!("bytes {start}-{end}/{file_size}")),
            header("Accept-Ranges", "bytes"),
        ],
        reader,
        usize::try_from(length).ok(),
        None,
    );
    request.respond(response)?;
    Ok(())
}

/// Parse `bytes=start-end` into an inclusive byte range within the file.
fn parse_range(value: &str, file_size: u64) -> Option<(u64, u64)> {
    let spec = value.trim().strip_prefix("bytes=")?;
    // multiple ranges are not supported; serve the first
    let spec = spec.split(',').next()?.trim();
    let (start, end) = spec.split_once('-')?;
    let last = file_size.checked_sub(1)?;

    let (start, end) = match (start.trim(), end.trim()) {
        ("", "") => return None,
        ("", suffix) => {
            let suffix: u64 = suffix.parse().ok()?;
            if suffix == 0 {
                return None;
            }
            (file_size.saturating_sub(suffix), last)
        }
        (start, "") => (start.parse().ok()?, last),
        (start, end) => (start.parse().ok()?, end.parse::<u64>().ok()?.min(last)),
    };

    (start <= end).then_some((start, end))
}

fn range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Range"))
        .map(|h| h.value.to_string())
}

/// 404 with the build's own `404.html` when there is one.
pub fn respond_not_found(request: Request, root: &Path, port: Option<u16>) -> Result<()> {
    if let Ok(body) = fs::read(root.join("404.html")) {
        let body = maybe_inject_livereload(body, types::HTML, port);
        return send_body(request, 404, types::HTML, body);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

pub fn respond_forbidden(request: Request) -> Result<()> {
    send_body(request, 403, types::PLAIN, b"403 Forbidden".to_vec())
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = Response::from_data(b"405 Method Not Allowed".to_vec())
        .with_status_code(StatusCode(405))
        .with_header(header("Content-Type", types::PLAIN))
        .with_header(header("Allow", "GET, HEAD"));
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 while shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// The live-reload client with the socket port filled in.
pub fn respond_livereload_js(request: Request, port: u16) -> Result<()> {
    use crate::embed::serve::{LIVERELOAD_JS, LivereloadVars};

    let body = LIVERELOAD_JS.render(&LivereloadVars { reload_port: port });
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

fn is_head(request: &Request) -> bool {
    request.method() == &Method::Head
}

/// Full response; `HEAD` gets the same headers and no body.
fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let length = body.len();
    let body = if is_head(&request) { Vec::new() } else { body };
    let response = Response::new(
        StatusCode(status),
        vec![
            header("Content-Type", content_type),
            header("Accept-Ranges", "bytes"),
            header("Cache-Control", "no-cache"),
        ],
        std::io::Cursor::new(body),
        Some(length),
        None,
    );
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Header {
    // only called with static names and ASCII values
    Header::from_bytes(key.as_bytes(), value.as_bytes()).unwrap()
}
