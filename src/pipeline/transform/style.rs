//! SCSS compilation, vendor prefixes and minification.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::config::PipelineConfig;
use crate::config::section::parse_browser_version;
use crate::pipeline::{Asset, Stage, StepContext, TransformError, each};

pub fn stages(config: &PipelineConfig) -> Vec<Box<dyn Stage>> {
    let targets = browser_targets(config);
    vec![
        Box::new(CompileScss),
        Box::new(Autoprefix { targets }),
        Box::new(MinifyCss {
            targets,
            minify: config.style.minify,
            source_maps: config.source_maps_enabled(),
        }),
    ]
}

/// `[style] targets` as lightningcss browser targets.
pub fn browser_targets(config: &PipelineConfig) -> Targets {
    let mut browsers = Browsers::default();
    for (name, version) in &config.style.targets {
        let version = parse_browser_version(version);
        match name.as_str() {
            "android" => browsers.android = version,
            "chrome" => browsers.chrome = version,
            "edge" => browsers.edge = version,
            "firefox" => browsers.firefox = version,
            "ie" => browsers.ie = version,
            "ios_saf" => browsers.ios_saf = version,
            "opera" => browsers.opera = version,
            "safari" => browsers.safari = version,
            "samsung" => browsers.samsung = version,
            _ => {}
        }
    }
    Targets::from(browsers)
}

/// grass, with the entry's directory on the load path.
pub struct CompileScss;

impl CompileScss {
    const NAME: &'static str = "compile-scss";
}

impl Stage for CompileScss {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let entry_dir = asset.source.parent().unwrap_or(Path::new("."));
            let options = grass::Options::default()
                .load_path(entry_dir)
                .style(grass::OutputStyle::Expanded);

            let css = grass::from_string(asset.text(Self::NAME)?.to_owned(), &options)
                .map_err(|e| TransformError::new(Self::NAME, &asset.source, e.to_string()))?;
            asset.contents = css.into_bytes();
            Ok(vec![asset])
        })
    }
}

/// Adds and removes vendor prefixes for the configured targets.
pub struct Autoprefix {
    targets: Targets,
}

impl Stage for Autoprefix {
    fn name(&self) -> &'static str {
        "autoprefix"
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let code = prefix(asset.text(self.name())?, self.targets)
                .map_err(|e| TransformError::new(self.name(), &asset.source, e))?;
            asset.contents = code.into_bytes();
            Ok(vec![asset])
        })
    }
}

fn prefix(source: &str, targets: Targets) -> Result<String, String> {
    let mut sheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;
    let result = sheet
        .to_css(PrinterOptions {
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}

/// Final print. Optionally emits `<name>.css.map` next to the stylesheet.
pub struct MinifyCss {
    targets: Targets,
    minify: bool,
    source_maps: bool,
}

impl Stage for MinifyCss {
    fn name(&self) -> &'static str {
        "minify-css"
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let file_name = file_name(&asset.dest);
            let (mut code, map_json) = self
                .print(asset.text(self.name())?, &file_name)
                .map_err(|e| TransformError::new(self.name(), &asset.source, e))?;

            let Some(map_json) = map_json else {
                asset.contents = code.into_bytes();
                return Ok(vec![asset]);
            };

            code.push_str(&format!("\n/*# sourceMappingURL={file_name}.map */\n"));
            let map_dest = asset.dest.with_file_name(format!("{file_name}.map"));
            let map_asset = Asset::new(asset.source.clone(), map_dest, map_json.into_bytes());
            asset.contents = code.into_bytes();
            Ok(vec![asset, map_asset])
        })
    }
}

impl MinifyCss {
    /// Printed CSS and, with source maps on, the map JSON.
    fn print(&self, source: &str, file_name: &str) -> Result<(String, Option<String>), String> {
        let sheet = StyleSheet::parse(
            source,
            ParserOptions {
                filename: file_name.to_owned(),
                ..ParserOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        let mut map = None;
        if self.source_maps {
            let mut fresh = SourceMap::new("/");
            fresh.add_source(file_name);
            fresh
                .set_source_content(0, source)
                .map_err(|e| format!("{e:?}"))?;
            map = Some(fresh);
        }

        let code = sheet
            .to_css(PrinterOptions {
                minify: self.minify,
                targets: self.targets,
                source_map: map.as_mut(),
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?
            .code;

        let json = match map.as_mut() {
            Some(map) => Some(source_map_json(map, file_name)?),
            None => None,
        };
        Ok((code, json))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Source map v3 JSON for `file`.
fn source_map_json(map: &mut SourceMap, file: &str) -> Result<String, String> {
    let mut mappings = Vec::new();
    map.write_vlq(&mut mappings).map_err(|e| format!("{e:?}"))?;
    let mappings = String::from_utf8(mappings).map_err(|e| e.to_string())?;

    let json = serde_json::json!({
        "version": 3,
        "file": file,
        "sources": map.get_sources(),
        "sourcesContent": map.get_sources_content(),
        "names": map.get_names(),
        "mappings": mappings,
    });
    serde_json::to_string(&json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_browser_targets_from_config() {
        let config = test_parse_config("[style]\ntargets = { safari = \"12.1\", ie = \"11\" }");
        let targets = browser_targets(&config);
        let browsers = targets.browsers.unwrap();
        assert_eq!(browsers.safari, Some((12 << 16) | (1 << 8)));
        assert_eq!(browsers.ie, Some(11 << 16));
        assert_eq!(browsers.chrome, None);
    }

    #[test]
    fn test_stage_order() {
        let config = test_parse_config("");
        let names: Vec<_> = stages(&config).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["compile-scss", "autoprefix", "minify-css"]);
    }
}
