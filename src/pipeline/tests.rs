//! Step scenarios against temporary project trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use image::{DynamicImage, Rgba, RgbaImage};
use tempfile::TempDir;

use super::*;
use crate::config::test_config_at;
use crate::core::{AssetKind, BuildEvent, BuildMode};

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    ctx: StepContext,
}

impl Fixture {
    fn new(files: &[(&str, &[u8])], toml: &str) -> Self {
        Self::with_mode(files, toml, BuildMode::Development)
    }

    fn with_mode(files: &[(&str, &[u8])], toml: &str, mode: BuildMode) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        for (path, contents) in files {
            write(&root.join(path), contents);
        }

        let mut config = test_config_at(&root, toml);
        config.mode = mode;
        config.validate().unwrap();
        let table = config.path_table().unwrap();

        Self {
            _temp: temp,
            root,
            ctx: StepContext::new(Arc::new(config), Arc::new(table)),
        }
    }

    fn run(&self, kind: AssetKind) -> BuildEvent {
        let notifier = RecordingNotifier::new();
        let event = TransformStep::for_kind(kind, &self.ctx.config).run(&self.ctx, &notifier);
        assert_eq!(notifier.events().len(), 1);
        event
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }
}

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

const LAYOUT: &[u8] = b"<!DOCTYPE html>
<html>
<head>
  <title>{% block title %}{% endblock %}</title>
</head>
<body>
  {% block content %}{% endblock %}


</body>
</html>
";

const INDEX: &[u8] = b"{% extends \"layouts/base.html\" %}
{% block title %}Home{% endblock %}
{% block content %}
  <h1>Hello from {{ page }}</h1>
  {% include \"partials/footer.html\" %}
{% endblock %}
";

const FOOTER: &[u8] = b"<footer>fin</footer>\n";

fn markup_tree() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("src/templates/layouts/base.html", LAYOUT),
        ("src/templates/partials/footer.html", FOOTER),
        ("src/templates/pages/index.html", INDEX),
    ]
}

// ============================================================================
// markup
// ============================================================================

#[test]
fn test_markup_expands_layout_and_prettifies() {
    let fx = Fixture::new(&markup_tree(), "");
    let event = fx.run(AssetKind::Markup);
    assert!(event.is_success(), "{:?}", event.error());

    let html = fx.read("build/index.html");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Home</title>"));
    assert!(html.contains("<h1>Hello from index</h1>"));
    assert!(html.contains("<footer>fin</footer>"));
    assert!(!html.contains("{%"));
    assert!(!html.contains("\n\n\n"));
    assert!(html.lines().all(|line| line == line.trim_end()));
    assert!(html.ends_with("</html>\n"));
    assert_eq!(event.written, vec!["/index.html".to_string()]);
}

#[test]
fn test_rerun_is_idempotent() {
    let fx = Fixture::new(&markup_tree(), "");
    fx.run(AssetKind::Markup);
    let first = fx.read("build/index.html");

    let event = fx.run(AssetKind::Markup);
    let stats = event.stats().unwrap();
    assert_eq!(stats.written, 0);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(fx.read("build/index.html"), first);
}

#[test]
fn test_missing_layout_fails_without_output() {
    let fx = Fixture::new(
        &[("src/templates/pages/index.html", b"{% extends \"layouts/nope.html\" %}")],
        "",
    );
    let event = fx.run(AssetKind::Markup);
    let message = event.error().unwrap();
    assert!(message.starts_with("render-template"));
    assert!(!fx.path("build/index.html").exists());
}

// ============================================================================
// style
// ============================================================================

#[test]
fn test_style_imports_partial_and_minifies() {
    let fx = Fixture::new(
        &[
            ("src/style/main.scss", b"@import \"partials/base\";\n"),
            (
                "src/style/partials/_base.scss",
                b"$accent: red;\nbody { color: $accent; }\n.btn { user-select: none; }\n",
            ),
        ],
        "",
    );
    let event = fx.run(AssetKind::Style);
    assert!(event.is_success(), "{:?}", event.error());

    let css = fx.read("build/css/main.css");
    assert!(css.contains("body{color:red}"), "{css}");
    assert!(css.contains("-webkit-user-select:none"), "{css}");
    assert!(!css.contains('\n'));
    // partials are not entry points
    assert!(!fx.path("build/css/_base.css").exists());
}

#[test]
fn test_style_failure_keeps_previous_output() {
    let fx = Fixture::new(&[("src/style/main.scss", b"body { color: red; }\n")], "");
    assert!(fx.run(AssetKind::Style).is_success());
    let before = fx.read("build/css/main.css");

    write(&fx.path("src/style/main.scss"), b"body { color: red;\n");
    let event = fx.run(AssetKind::Style);
    assert!(event.error().unwrap().starts_with("compile-scss"));
    assert_eq!(fx.read("build/css/main.css"), before);
}

#[test]
fn test_source_maps_in_development() {
    let files: &[(&str, &[u8])] = &[("src/style/main.scss", b"a { color: blue; }\n")];
    let toml = "[style]\nsource_maps = true";

    let dev = Fixture::new(files, toml);
    assert!(dev.run(AssetKind::Style).is_success());
    assert!(dev.read("build/css/main.css").contains("sourceMappingURL=main.css.map"));
    let map: serde_json::Value = serde_json::from_str(&dev.read("build/css/main.css.map")).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "main.css");

    let prod = Fixture::with_mode(files, toml, BuildMode::Production);
    assert!(prod.run(AssetKind::Style).is_success());
    assert!(!prod.read("build/css/main.css").contains("sourceMappingURL"));
    assert!(!prod.path("build/css/main.css.map").exists());
}

// ============================================================================
// sprite → style
// ============================================================================

const SPRITE_MAIN: &[u8] = b"@import \"partials/sprite\";\n.icon-home { @include sprite($s-home); }\n";

#[test]
fn test_sprite_then_style_references_sheet() {
    let fx = Fixture::new(
        &[
            ("src/img/icons/home.png", png(16, 16, [255, 0, 0, 255]).as_slice()),
            ("src/img/icons/mail.png", png(24, 12, [0, 0, 255, 255]).as_slice()),
            ("src/style/main.scss", SPRITE_MAIN),
        ],
        "",
    );

    let sprite = fx.run(AssetKind::SpriteIcon);
    assert!(sprite.is_success(), "{:?}", sprite.error());
    assert_eq!(sprite.stats().unwrap().written, 2);

    let sheet = image::open(fx.path("src/img/sprite.png")).unwrap();
    assert_eq!((sheet.width(), sheet.height()), (24, 16 + 100 + 12));

    let partial = fx.read("src/style/partials/sprite.scss");
    assert!(partial.contains("$s-home:"));
    assert!(partial.contains("$s-mail-offset-y: -116px;"));

    let style = fx.run(AssetKind::Style);
    assert!(style.is_success(), "{:?}", style.error());
    let css = fx.read("build/css/main.css");
    assert!(css.contains(".icon-home{"), "{css}");
    assert!(css.contains("sprite.png"), "{css}");
}

#[test]
fn test_sprite_ignores_hidden_files() {
    let fx = Fixture::new(
        &[
            ("src/img/icons/home.png", png(16, 16, [255, 0, 0, 255]).as_slice()),
            ("src/img/icons/.DS_Store", b"\0\0\0\x01Bud1"),
        ],
        "",
    );
    let event = fx.run(AssetKind::SpriteIcon);
    assert!(event.is_success(), "{:?}", event.error());
    assert!(!fx.read("src/style/partials/sprite.scss").contains("DS_Store"));
}

#[test]
fn test_style_before_sprite_fails_gracefully() {
    let fx = Fixture::new(&[("src/style/main.scss", SPRITE_MAIN)], "");
    let event = fx.run(AssetKind::Style);
    assert!(event.error().unwrap().starts_with("compile-scss"));
    assert!(!fx.path("build/css/main.css").exists());
}

#[test]
fn test_sprite_without_icons_writes_nothing() {
    let fx = Fixture::new(&[], "");
    let event = fx.run(AssetKind::SpriteIcon);
    assert_eq!(event.stats().unwrap().written, 0);
    assert!(!fx.path("src/img/sprite.png").exists());
}

// ============================================================================
// image
// ============================================================================

#[test]
fn test_image_skips_fresh_outputs() {
    let fx = Fixture::new(&[("src/img/logo.png", png(32, 32, [0, 128, 0, 255]).as_slice())], "");
    let first = fx.run(AssetKind::Image);
    assert_eq!(first.stats().unwrap().written, 1);

    let out = fx.path("build/img/logo.png");
    let future = SystemTime::now() + Duration::from_secs(3600);
    set_mtime(&out, future);

    let second = fx.run(AssetKind::Image);
    let stats = second.stats().unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.written, 0);
}

#[test]
fn test_image_never_publishes_staging_files() {
    let fx = Fixture::new(
        &[
            ("src/img/logo.png", png(8, 8, [0, 0, 0, 255]).as_slice()),
            ("src/img/.sprite.png.kiln-tmp", b"half-written"),
            ("src/img/.hidden.png", png(4, 4, [0, 0, 0, 255]).as_slice()),
        ],
        "",
    );
    let event = fx.run(AssetKind::Image);
    assert!(event.is_success(), "{:?}", event.error());
    assert_eq!(event.stats().unwrap().written, 1);
    assert!(fx.path("build/img/logo.png").exists());
    assert!(!fx.path("build/img/.sprite.png.kiln-tmp").exists());
    assert!(!fx.path("build/img/.hidden.png").exists());
}

#[test]
fn test_image_touched_source_becomes_fresh_again() {
    let fx = Fixture::new(&[("src/img/logo.png", png(32, 32, [0, 128, 0, 255]).as_slice())], "");
    assert_eq!(fx.run(AssetKind::Image).stats().unwrap().written, 1);

    let now = SystemTime::now();
    set_mtime(&fx.path("build/img/logo.png"), now - Duration::from_secs(3600));
    set_mtime(&fx.path("src/img/logo.png"), now - Duration::from_secs(60));

    let touched = fx.run(AssetKind::Image).stats().unwrap();
    assert_eq!((touched.written, touched.unchanged, touched.skipped), (0, 1, 0));

    let again = fx.run(AssetKind::Image).stats().unwrap();
    assert_eq!((again.unchanged, again.skipped), (0, 1));
}

#[test]
fn test_image_other_formats_pass_through() {
    let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
    let fx = Fixture::new(&[("src/img/mark.svg", svg)], "");
    assert!(fx.run(AssetKind::Image).is_success());
    assert_eq!(fs::read(fx.path("build/img/mark.svg")).unwrap(), svg);
}

#[test]
fn test_icons_are_not_images() {
    let fx = Fixture::new(&[("src/img/icons/home.png", png(8, 8, [1, 2, 3, 255]).as_slice())], "");
    fx.run(AssetKind::Image);
    assert!(!fx.path("build/img/icons").exists());
}

// ============================================================================
// script, font
// ============================================================================

#[test]
fn test_script_bundles_includes() {
    let fx = Fixture::new(
        &[
            ("src/js/main.js", b"//= partials/menu.js\nfunction boot() { openMenu(); }\nboot();\n"),
            ("src/js/partials/menu.js", b"function openMenu() { console.log(\"menu\"); }\n"),
        ],
        "",
    );
    let event = fx.run(AssetKind::Script);
    assert!(event.is_success(), "{:?}", event.error());

    let js = fx.read("build/js/main.js");
    assert!(js.contains("console.log(\"menu\")") || js.contains("console.log(`menu`)"), "{js}");
    assert!(!js.contains("//="));
    // only the entry point is built
    assert!(!fx.path("build/js/partials").exists());
}

#[test]
fn test_fonts_keep_subdirectories() {
    let fx = Fixture::new(
        &[
            ("src/fonts/a/b.woff", b"wOFF"),
            ("src/fonts/c.ttf", b"ttf"),
        ],
        "",
    );
    let event = fx.run(AssetKind::Font);
    assert_eq!(event.stats().unwrap().written, 2);
    assert_eq!(fs::read(fx.path("build/fonts/a/b.woff")).unwrap(), b"wOFF");
    assert_eq!(fs::read(fx.path("build/fonts/c.ttf")).unwrap(), b"ttf");
}

#[test]
fn test_stage_names_per_step() {
    let fx = Fixture::new(&[], "[markup]\npretty = false\n[script]\nminify = false");
    let names = |kind| TransformStep::for_kind(kind, &fx.ctx.config).stage_names();
    assert_eq!(names(AssetKind::Markup), vec!["render-template"]);
    assert_eq!(names(AssetKind::Script), vec!["resolve-includes"]);
    assert_eq!(names(AssetKind::Image), vec!["compress-image"]);
    assert_eq!(names(AssetKind::SpriteIcon), vec!["pack-sprites"]);
    assert!(names(AssetKind::Font).is_empty());
}
