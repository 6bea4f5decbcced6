//! Lossless-ish image compression.
//!
//! PNGs are re-encoded with the strongest deflate setting and adaptive
//! filtering; JPEGs at `image.jpeg_quality`. Anything else, and any result
//! that is not smaller than its input, passes through unchanged.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageResult};

use crate::config::PipelineConfig;
use crate::pipeline::{Asset, Stage, StepContext, TransformError, each};

pub fn stages(config: &PipelineConfig) -> Vec<Box<dyn Stage>> {
    vec![Box::new(CompressImage {
        jpeg_quality: config.image.jpeg_quality,
        optimize_png: config.image.optimize_png,
    })]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Png,
    Jpeg,
}

fn format_of(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(Format::Png),
        "jpg" | "jpeg" => Some(Format::Jpeg),
        _ => None,
    }
}

pub struct CompressImage {
    jpeg_quality: u8,
    optimize_png: bool,
}

impl CompressImage {
    fn encode(&self, format: Format, img: &DynamicImage) -> ImageResult<Vec<u8>> {
        let mut out = Vec::new();
        match format {
            Format::Png => {
                let encoder =
                    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
                img.write_with_encoder(encoder)?;
            }
            Format::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
            }
        }
        Ok(out)
    }
}

impl Stage for CompressImage {
    fn name(&self) -> &'static str {
        "compress-image"
    }

    fn apply(&self, batch: Vec<Asset>, _ctx: &StepContext) -> Result<Vec<Asset>, TransformError> {
        each(batch, |mut asset| {
            let format = match format_of(&asset.source) {
                Some(Format::Png) if !self.optimize_png => return Ok(vec![asset]),
                Some(format) => format,
                None => return Ok(vec![asset]),
            };

            let fail = |e: image::ImageError| TransformError::new(self.name(), &asset.source, e.to_string());
            let img = image::load_from_memory(&asset.contents).map_err(fail)?;
            let encoded = self.encode(format, &img).map_err(fail)?;

            if encoded.len() < asset.contents.len() {
                asset.contents = encoded;
            }
            Ok(vec![asset])
        })
    }
}
