//! Load and save collaborators built on the `image` crate.
//!
//! Available when the `image-io` feature is enabled. The output format follows
//! the path extension; paths without one are written as PNG.

use crate::image::{Image, RgbaGrid};
use crate::util::{FilterError, FilterResult};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Decodes the file at `path` into an RGBA grid.
pub fn load_rgba<P: AsRef<Path>>(path: P) -> FilterResult<RgbaGrid> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| FilterError::Decode {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let rgba = img.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    RgbaGrid::from_raw(rgba.into_raw(), width, height)
}

/// Encodes `grid` to `path`.
pub fn save_rgba<P: AsRef<Path>>(grid: &RgbaGrid, path: P) -> FilterResult<()> {
    let path = path.as_ref();
    let encode_err = |reason: String| FilterError::Encode {
        path: path.display().to_string(),
        reason,
    };
    let width = u32::try_from(grid.width()).map_err(|err| encode_err(err.to_string()))?;
    let height = u32::try_from(grid.height()).map_err(|err| encode_err(err.to_string()))?;
    let buffer = RgbaImage::from_raw(width, height, grid.as_raw().to_vec())
        .ok_or_else(|| encode_err("pixel buffer does not match dimensions".to_string()))?;

    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let result = if format == ImageFormat::Jpeg {
        // JPEG has no alpha channel.
        image::DynamicImage::ImageRgba8(buffer)
            .to_rgb8()
            .save_with_format(path, format)
    } else {
        buffer.save_with_format(path, format)
    };
    result.map_err(|err| encode_err(err.to_string()))
}

/// Loads an image file; see [`Image::from_rgba`] for the layer layout.
pub fn load_image<P: AsRef<Path>>(path: P, keep_color: bool) -> FilterResult<Image> {
    let grid = load_rgba(path)?;
    Image::from_rgba(&grid, keep_color)
}

/// Saves an image file; see [`Image::to_rgba`] for the channel mapping.
pub fn save_image<P: AsRef<Path>>(image: &Image, path: P) -> FilterResult<()> {
    save_rgba(&image.to_rgba()?, path)
}
