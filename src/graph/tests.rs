use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use tempfile::TempDir;

use super::*;
use crate::config::{test_config_at, test_parse_config};
use crate::pipeline::RecordingNotifier;

fn write(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn icon() -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn context(root: &Path) -> StepContext {
    let config = test_config_at(root, "");
    let table = config.path_table().unwrap();
    StepContext::new(Arc::new(config), Arc::new(table))
}

fn steps(kinds: &[AssetKind]) -> Vec<TransformStep> {
    let config = test_parse_config("");
    kinds
        .iter()
        .map(|&kind| TransformStep::for_kind(kind, &config))
        .collect()
}

fn diagnostics(err: ConfigError) -> String {
    match err {
        ConfigError::Diagnostics(diag) => diag.to_string(),
        other => panic!("expected diagnostics, got {other}"),
    }
}

#[test]
fn test_default_waves_put_style_after_sprite() {
    let graph = TaskGraph::new(&test_parse_config("")).unwrap();
    assert_eq!(
        graph.waves(),
        &[
            vec![
                AssetKind::Markup,
                AssetKind::Script,
                AssetKind::Image,
                AssetKind::SpriteIcon,
                AssetKind::Font,
            ],
            vec![AssetKind::Style],
        ]
    );
    assert_eq!(graph.dependencies(AssetKind::Style), &[AssetKind::SpriteIcon]);
    assert!(graph.dependencies(AssetKind::Markup).is_empty());
    assert_eq!(graph.len(), 6);
}

#[test]
fn test_cycle_is_config_error() {
    let err = TaskGraph::from_steps(
        steps(&[AssetKind::Style, AssetKind::SpriteIcon]),
        &[
            (AssetKind::Style, AssetKind::SpriteIcon),
            (AssetKind::SpriteIcon, AssetKind::Style),
        ],
    )
    .err()
    .unwrap();
    assert!(diagnostics(err).contains("dependency cycle between sprite, style"));
}

#[test]
fn test_self_edge_is_cycle() {
    let err = TaskGraph::from_steps(steps(&[AssetKind::Font]), &[(AssetKind::Font, AssetKind::Font)])
        .err()
        .unwrap();
    assert!(diagnostics(err).contains("dependency cycle"));
}

#[test]
fn test_dangling_edge_is_config_error() {
    let err = TaskGraph::from_steps(steps(&[AssetKind::Style]), DEFAULT_EDGES)
        .err()
        .unwrap();
    assert!(diagnostics(err).contains("unknown step `sprite`"));
}

#[test]
fn test_run_all_runs_every_step_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    write(&root, "src/img/icons/home.png", &icon());
    write(
        &root,
        "src/style/main.scss",
        b"@import \"partials/sprite\";\n.home { @include sprite($s-home); }\n",
    );
    write(&root, "src/templates/pages/index.html", b"<p>{{ page }}</p>\n");
    write(&root, "src/fonts/x.woff2", b"wOF2");

    let ctx = context(&root);
    let graph = TaskGraph::new(&ctx.config).unwrap();
    let notifier = RecordingNotifier::new();
    let report = graph.run_all(&ctx, &notifier);

    assert_eq!(report.events.len(), 6);
    assert_eq!(notifier.events().len(), 6);
    assert!(report.is_success(), "{:?}", report.failed().collect::<Vec<_>>());
    // style ran in the last wave, after the sprite partial existed
    assert_eq!(report.events.last().map(|e| e.kind), Some(AssetKind::Style));
    let css = fs::read_to_string(root.join("build/css/main.css")).unwrap();
    assert!(css.contains("sprite.png"));
    assert!(root.join("build/index.html").exists());
    assert!(root.join("build/fonts/x.woff2").exists());
}

#[test]
fn test_failed_step_does_not_stop_others() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    write(&root, "src/style/main.scss", b"body { color: ");
    write(&root, "src/js/main.js", b"var x = 1;\n");
    write(&root, "src/fonts/x.woff", b"wOFF");

    let ctx = context(&root);
    let graph = TaskGraph::new(&ctx.config).unwrap();
    let report = graph.run_all(&ctx, &RecordingNotifier::new());

    let failed: Vec<_> = report.failed().map(|e| e.kind).collect();
    assert_eq!(failed, vec![AssetKind::Style]);
    assert!(!report.is_success());
    assert!(report.event(AssetKind::Script).unwrap().is_success());
    assert!(root.join("build/js/main.js").exists());
    assert!(root.join("build/fonts/x.woff").exists());
}

#[test]
fn test_run_step_runs_only_that_step() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    write(&root, "src/fonts/x.woff", b"wOFF");
    write(&root, "src/js/main.js", b"var x = 1;\n");

    let ctx = context(&root);
    let graph = TaskGraph::new(&ctx.config).unwrap();
    let event = graph
        .run_step(AssetKind::Font, &ctx, &RecordingNotifier::new())
        .unwrap();
    assert!(event.is_success());
    assert!(root.join("build/fonts/x.woff").exists());
    assert!(!root.join("build/js").exists());
}
