//! Sprite sheet packing.
//!
//! All icons are packed into one PNG (in `[paths.sprite] output`) and an
//! SCSS partial describing every icon (in `sprite.stylesheet_dir`). Both
//! land in the source tree, where the image and style steps pick them up.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{Rgba, RgbaImage, imageops};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::config::{PipelineConfig, SpriteAlgorithm};
use crate::core::AssetKind;
use crate::embed::sprite::SCSS_TEMPLATE;
use crate::pipeline::{Asset, Stage, StepContext, TransformError};

pub fn stages(_config: &PipelineConfig) -> Vec<Box<dyn Stage>> {
    vec![Box::new(PackSprites)]
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// One icon's placement, as exposed to the stylesheet template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteEntry {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub offset_x: i64,
    pub offset_y: i64,
    pub width: u32,
    pub height: u32,
}

/// Packed layout: placements plus sheet size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub entries: Vec<SpriteEntry>,
    pub width: u32,
    pub height: u32,
}

/// Place icons (name, width, height) in input order.
pub fn layout(icons: &[(String, u32, u32)], algorithm: SpriteAlgorithm, padding: u32) -> Layout {
    let mut entries = Vec::with_capacity(icons.len());
    let (mut cursor, mut width, mut height) = (0u32, 0u32, 0u32);

    for (index, (name, w, h)) in icons.iter().enumerate() {
        let gap = if index == 0 { 0 } else { padding };
        let (x, y) = match algorithm {
            SpriteAlgorithm::TopDown => {
                let y = cursor + gap;
                cursor = y + h;
                width = width.max(*w);
                height = cursor;
                (0, y)
            }
            SpriteAlgorithm::LeftRight => {
                let x = cursor + gap;
                cursor = x + w;
                width = cursor;
                height = height.max(*h);
                (x, 0)
            }
        };
        entries.push(SpriteEntry {
            name: name.clone(),
            x,
            y,
            offset_x: -i64::from(x),
            offset_y: -i64::from(y),
            width: *w,
            height: *h,
        });
    }

    Layout {
        entries,
        width,
        height,
    }
}

/// `prefix` + file stem with anything outside `[A-Za-z0-9_-]` replaced by `-`.
pub fn sprite_name(prefix: &str, stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    format!("{prefix}{cleaned}")
}

pub struct PackSprites;

impl PackSprites {
    const NAME: &'static str = "pack-sprites";
}

impl Stage for PackSprites {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, batch: Vec<Asset>, ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        if batch.is_empty() {
            return Ok(batch);
        }
        let config = &ctx.config.sprite;
        let spec = ctx.table.spec(AssetKind::SpriteIcon);

        let mut images = Vec::with_capacity(batch.len());
        let mut icons = Vec::with_capacity(batch.len());
        for asset in &batch {
            let img = image::load_from_memory(&asset.contents)
                .map_err(|e| TransformError::new(Self::NAME, &asset.source, e.to_string()))?
                .to_rgba8();
            let stem = asset
                .source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            icons.push((sprite_name(&config.prefix, &stem), img.width(), img.height()));
            images.push(img);
        }

        let layout = layout(&icons, config.algorithm, config.padding);

        let mut sheet = RgbaImage::from_pixel(layout.width, layout.height, TRANSPARENT);
        for (entry, img) in layout.entries.iter().zip(&images) {
            imageops::replace(&mut sheet, img, i64::from(entry.x), i64::from(entry.y));
        }

        let image_dest = spec.output_dir.join(&config.image_name);
        let mut png = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive);
        image::DynamicImage::ImageRgba8(sheet)
            .write_with_encoder(encoder)
            .map_err(|e| TransformError::new(Self::NAME, &image_dest, e.to_string()))?;

        let stylesheet_dest = ctx
            .config
            .root_join(&config.stylesheet_dir)
            .join(&config.stylesheet_name);
        let scss = render_stylesheet(ctx, &layout)
            .map_err(|message| TransformError::new(Self::NAME, &stylesheet_dest, message))?;

        Ok(vec![
            Asset::new(spec.source_base.clone(), image_dest, png),
            Asset::new(spec.source_base.clone(), stylesheet_dest, scss.into_bytes()),
        ])
    }
}

fn render_stylesheet(ctx: &StepContext, layout: &Layout) -> Result<String, String> {
    let config = &ctx.config.sprite;
    let template = match &config.template {
        Some(path) => {
            let path = ctx.config.root_join(path);
            std::fs::read_to_string(&path)
                .map_err(|e| format!("cannot read template `{}`: {e}", path.display()))?
        }
        None => SCSS_TEMPLATE.to_owned(),
    };

    let spec = ctx.table.spec(AssetKind::SpriteIcon);
    let icon_dir = spec
        .source_base
        .strip_prefix(ctx.table.root())
        .unwrap_or(&spec.source_base)
        .to_string_lossy()
        .replace('\\', "/");

    let env = Environment::new();
    env.render_str(
        &template,
        context! {
            sprites => &layout.entries,
            total_width => layout.width,
            total_height => layout.height,
            image_url => &config.image_url,
            icon_dir => icon_dir,
        },
    )
    .map_err(|e| e.to_string())
}
