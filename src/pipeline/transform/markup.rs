//! Page templates rendered to HTML.
//!
//! Pages live under the templates root and may `{% extends %}` or
//! `{% include %}` anything else there:
//!
//! ```text
//! src/templates/
//! ├── layouts/base.html
//! ├── partials/nav.html
//! └── pages/index.html     ← {% extends "layouts/base.html" %}
//! ```

use std::path::Path;
use std::sync::LazyLock;

use minijinja::{Environment, context, path_loader};
use regex::Regex;

use crate::config::PipelineConfig;
use crate::pipeline::{Asset, Stage, StepContext, TransformError, each};

pub fn stages(config: &PipelineConfig) -> Vec<Box<dyn Stage>> {
    let mut stages: Vec<Box<dyn Stage>> = vec![Box::new(RenderTemplate)];
    if config.markup.pretty {
        stages.push(Box::new(PrettyMarkup));
    }
    stages
}

/// Renders each page through a loader rooted at the templates dir.
pub struct RenderTemplate;

impl RenderTemplate {
    const NAME: &'static str = "render-template";
}

impl Stage for RenderTemplate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, batch: Vec<Asset>, ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        let templates = ctx.config.root_join(&ctx.config.paths.templates);

        // one environment per invocation so edited layouts are always re-read
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates));
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        let mode = ctx.config.mode.to_string();
        each(batch, |mut asset| {
            let name = template_name(&templates, &asset.source);
            let page = asset
                .source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            let html = env
                .render_named_str(&name, asset.text(Self::NAME)?, context! { page, mode })
                .map_err(|e| TransformError::new(Self::NAME, &asset.source, describe(&e)))?;

            asset.contents = html.into_bytes();
            Ok(vec![asset])
        })
    }
}

/// Loader-relative name, so errors and relative lookups match the loader.
fn template_name(templates: &Path, source: &Path) -> String {
    source
        .strip_prefix(templates)
        .unwrap_or(source)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Error text plus the template chain that led to it.
fn describe(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(&format!("\ncaused by: {inner}"));
        source = inner.source();
    }
    message
}

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip trailing whitespace, collapse blank-line runs, single final newline.
pub struct PrettyMarkup;

impl Stage for PrettyMarkup {
    fn name(&self) -> &'static str {
        "pretty-markup"
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let pretty = prettify(asset.text(self.name())?);
            asset.contents = pretty.into_bytes();
            Ok(vec![asset])
        })
    }
}

fn prettify(html: &str) -> String {
    let trimmed: Vec<&str> = html.lines().map(str::trim_end).collect();
    let joined = trimmed.join("\n");
    let collapsed = BLANK_RUNS.replace_all(joined.trim_matches('\n'), "\n\n");
    format!("{collapsed}\n")
}
