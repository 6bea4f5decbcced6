//! Live-reload message protocol.
//!
//! | type          | client action                               |
//! |---------------|---------------------------------------------|
//! | `reload`      | full page reload                            |
//! | `css`         | re-fetch matching stylesheets, no reload    |
//! | `error`       | show the error overlay                      |
//! | `clear_error` | hide the error overlay                      |
//! | `connected`   | none, handshake acknowledgement             |

use serde::{Deserialize, Serialize};

use crate::core::{AssetKind, BuildEvent, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HotReloadMessage {
    Reload {
        /// Step whose outputs changed.
        step: String,
    },
    Css {
        /// Stylesheet URL paths, e.g. `/css/main.css`.
        paths: Vec<String>,
    },
    Error {
        step: String,
        error: String,
    },
    ClearError,
    Connected {
        version: String,
    },
}

impl HotReloadMessage {
    pub fn reload(kind: AssetKind) -> Self {
        Self::Reload {
            step: kind.step_name().to_string(),
        }
    }

    pub fn css(paths: Vec<String>) -> Self {
        Self::Css { paths }
    }

    pub fn error(kind: AssetKind, error: impl Into<String>) -> Self {
        Self::Error {
            step: kind.step_name().to_string(),
            error: error.into(),
        }
    }

    pub fn clear_error() -> Self {
        Self::ClearError
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The message a successful `kind` run sends, if any.
    ///
    /// Sprite outputs are sources of other steps, so they reach the browser
    /// through those steps instead.
    pub fn for_success(event: &BuildEvent) -> Option<Self> {
        debug_assert!(matches!(event.outcome, Outcome::Success(_)));
        match event.kind {
            AssetKind::SpriteIcon => None,
            AssetKind::Style => Some(Self::css(
                event
                    .written
                    .iter()
                    .filter(|p| p.ends_with(".css"))
                    .cloned()
                    .collect(),
            )),
            kind => Some(Self::reload(kind)),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload","step":""}"#.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepStats;

    fn success(kind: AssetKind, written: &[&str]) -> BuildEvent {
        BuildEvent::success(
            kind,
            StepStats::default(),
            written.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            HotReloadMessage::clear_error().to_json(),
            r#"{"type":"clear_error"}"#
        );
        assert_eq!(
            HotReloadMessage::reload(AssetKind::Markup).to_json(),
            r#"{"type":"reload","step":"markup"}"#
        );
        assert_eq!(
            HotReloadMessage::error(AssetKind::Style, "boom").to_json(),
            r#"{"type":"error","step":"style","error":"boom"}"#
        );
    }

    #[test]
    fn test_style_success_sends_stylesheets() {
        let event = success(AssetKind::Style, &["/css/main.css", "/css/main.css.map"]);
        assert_eq!(
            HotReloadMessage::for_success(&event),
            Some(HotReloadMessage::css(vec!["/css/main.css".into()]))
        );
    }

    #[test]
    fn test_sprite_success_is_silent() {
        let event = success(AssetKind::SpriteIcon, &["src/img/sprite.png"]);
        assert_eq!(HotReloadMessage::for_success(&event), None);
    }

    #[test]
    fn test_other_steps_reload() {
        for kind in [
            AssetKind::Markup,
            AssetKind::Script,
            AssetKind::Image,
            AssetKind::Font,
        ] {
            assert_eq!(
                HotReloadMessage::for_success(&success(kind, &[])),
                Some(HotReloadMessage::reload(kind))
            );
        }
    }
}
