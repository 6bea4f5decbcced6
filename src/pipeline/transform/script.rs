//! Script bundling: include directives, then minification.
//!
//! ```js
//! //= vendor/jquery.js
//! // = partials/menu.js
//! ```
//!
//! Each directive line is replaced by the referenced file, resolved relative
//! to the including file and expanded recursively.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::minify::minify_js;
use crate::config::PipelineConfig;
use crate::pipeline::{Asset, Stage, StepContext, TransformError, each};

pub fn stages(config: &PipelineConfig) -> Vec<Box<dyn Stage>> {
    let mut stages: Vec<Box<dyn Stage>> = vec![Box::new(ResolveIncludes)];
    if config.script.minify {
        stages.push(Box::new(MinifyJs {
            mangle: config.script.mangle,
        }));
    }
    stages
}

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//\s*=\s*(\S.*?)\s*$").unwrap());

/// Expands `//= path` directives into one logical file.
pub struct ResolveIncludes;

impl ResolveIncludes {
    const NAME: &'static str = "resolve-includes";
}

impl Stage for ResolveIncludes {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let key = asset.source.canonicalize().unwrap_or_else(|_| asset.source.clone());
            let mut stack = vec![key];
            let expanded = expand(asset.text(Self::NAME)?, &asset.source, &mut stack)?;
            asset.contents = expanded.into_bytes();
            Ok(vec![asset])
        })
    }
}

/// Expand `source` (the text of `path`). `stack` holds the include chain.
fn expand(source: &str, path: &Path, stack: &mut Vec<PathBuf>) -> Result<String, TransformError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut out = String::with_capacity(source.len());

    for line in source.lines() {
        let Some(target) = INCLUDE.captures(line).and_then(|c| c.get(1)) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let included = dir.join(target.as_str());
        let key = included.canonicalize().map_err(|e| {
            TransformError::new(
                ResolveIncludes::NAME,
                path,
                format!("cannot include `{}`: {e}", target.as_str()),
            )
        })?;

        if stack.contains(&key) {
            let chain: Vec<String> = stack
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect();
            return Err(TransformError::new(
                ResolveIncludes::NAME,
                path,
                format!("include cycle: {}", chain.join(" -> ")),
            ));
        }

        let text = fs::read_to_string(&key).map_err(|e| {
            TransformError::new(ResolveIncludes::NAME, &key, format!("cannot read include: {e}"))
        })?;

        stack.push(key.clone());
        let nested = expand(&text, &key, stack)?;
        stack.pop();

        out.push_str(&nested);
        if !nested.ends_with('\n') {
            out.push('\n');
        }
    }

    Ok(out)
}

/// oxc minification of the bundled script.
pub struct MinifyJs {
    mangle: bool,
}

impl Stage for MinifyJs {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let code = minify_js(asset.text(self.name())?, self.mangle)
                .map_err(|e| TransformError::new(self.name(), &asset.source, e))?;
            asset.contents = code.into_bytes();
            Ok(vec![asset])
        })
    }
}
