//! Live-reload script injection.

use crate::embed::serve::script_tag;
use crate::utils::mime::is_html;

/// Inject the live-reload script into HTML bodies when a port is known.
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, port: Option<u16>) -> Vec<u8> {
    match port {
        Some(_) if is_html(content_type) => inject_before_body_end(&body, script_tag().as_bytes()),
        _ => body,
    }
}

/// Insert `script` before the last `</body>`, or append it when missing.
fn inject_before_body_end(content: &[u8], script: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}
