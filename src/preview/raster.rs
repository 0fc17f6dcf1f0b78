use std::path::Path;

use image::RgbaImage;

use crate::error::Result;

/// Decoded RGBA pixels ready for display.
pub type Raster = RgbaImage;

/// Decodes image files into rasters.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Raster>;
}

/// `ImageDecoder` backed by the `image` crate (format guessed from the extension).
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<Raster> {
        Ok(image::open(path)?.to_rgba8())
    }
}

/// Size of a `width`x`height` raster after fitting it inside a `max`x`max` box.
///
/// Aspect ratio is preserved and images are never enlarged.
pub fn thumbnail_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let max = max.max(1);
    let scale = |side: u32, longest: u32| -> u32 {
        ((side as f64 * max as f64 / longest as f64).round() as u32).max(1)
    };
    if width >= height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Downscale `raster` to fit inside `max`x`max`. Small rasters are returned untouched.
pub fn thumbnail(raster: Raster, max: u32) -> Raster {
    let (w, h) = thumbnail_dimensions(raster.width(), raster.height(), max);
    if (w, h) == raster.dimensions() {
        raster
    } else {
        image::imageops::thumbnail(&raster, w, h)
    }
}
