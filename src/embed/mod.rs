//! Embedded static resources.
//!
//! - `serve` - dev server resources (live-reload client)
//! - `sprite` - default stylesheet template for the sprite step

use std::marker::PhantomData;

/// Placeholder substitution for an embedded resource.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Embedded text with typed variable injection.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }

    pub const fn content(&self) -> &'static str {
        self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the injected script tag points at.
    pub const LIVERELOAD_URL: &str = "/__kiln/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub reload_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__KILN_RELOAD_PORT__", &self.reload_port.to_string())
        }
    }

    /// Live-reload client, minified by build.rs.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")));

    /// Script tag injected into served HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}" defer></script>"#)
    }
}

pub mod sprite {
    /// Default minijinja template for the generated sprite stylesheet.
    pub const SCSS_TEMPLATE: &str = include_str!("sprite/sprite.scss.jinja");
}
