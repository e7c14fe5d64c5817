//! Interleaved RGBA pixel grids and channel extraction.
//!
//! [`RgbaGrid`] is the exchange format with image codecs: `height` rows of
//! `width` pixels, four bytes per pixel in R, G, B, A order. Layers are
//! extracted per channel; grayscale is the integer mean of R, G and B.

use crate::image::{Channel, Image, Layer};
use crate::util::{FilterError, FilterResult};

const CHANNELS: usize = 4;

/// Decoded pixel grid, row-major, interleaved RGBA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaGrid {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl RgbaGrid {
    /// Wraps an interleaved buffer of `width * height * 4` bytes.
    pub fn from_raw(data: Vec<u8>, width: usize, height: usize) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidDimensions {
                rows: height,
                columns: width,
            });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or(FilterError::InvalidDimensions {
                rows: height,
                columns: width,
            })?;
        if data.len() != needed {
            return Err(FilterError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a grid from per-pixel colour values in row-major order.
    pub fn from_pixels(pixels: &[[u8; 4]], width: usize, height: usize) -> FilterResult<Self> {
        Self::from_raw(pixels.concat(), width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the RGBA value at `(row, column)`.
    pub fn pixel(&self, row: usize, column: usize) -> Option<[u8; 4]> {
        if row >= self.height || column >= self.width {
            return None;
        }
        let start = (row * self.width + column) * CHANNELS;
        let px = self.data.get(start..start + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Extracts one channel as a layer.
    ///
    /// `Channel::Grayscale` yields `(R + G + B) / 3` with integer division;
    /// alpha does not take part.
    pub fn extract_layer(&self, channel: Channel) -> FilterResult<Layer> {
        let data: Vec<u8> = match channel.rgba_offset() {
            Some(offset) => self
                .data
                .chunks_exact(CHANNELS)
                .map(|px| px[offset])
                .collect(),
            None => self
                .data
                .chunks_exact(CHANNELS)
                .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
                .collect(),
        };
        Layer::from_vec(channel, data, self.height, self.width)
    }
}

impl Image {
    /// Builds an image from a decoded grid.
    ///
    /// With `keep_color` the result holds the R, G, B and A layers in that
    /// order; otherwise it holds a single grayscale layer.
    pub fn from_rgba(grid: &RgbaGrid, keep_color: bool) -> FilterResult<Image> {
        let layers = if keep_color {
            Channel::RGBA
                .iter()
                .map(|&channel| grid.extract_layer(channel))
                .collect::<FilterResult<Vec<_>>>()?
        } else {
            vec![grid.extract_layer(Channel::Grayscale)?]
        };
        Image::new(layers)
    }

    /// Converts the image back to an encodable grid.
    ///
    /// The output is always opaque: alpha is 255 whatever the `A` layer
    /// holds. A single layer is broadcast to R, G and B. Otherwise the R, G and B
    /// layers are placed by channel tag and a missing colour channel is 0;
    /// `A` and `Grayscale` layers of a multi-layer image are not written.
    pub fn to_rgba(&self) -> FilterResult<RgbaGrid> {
        let pixel_count = self.rows() * self.columns();
        let mut data = vec![0u8; pixel_count * CHANNELS];
        for px in data.chunks_exact_mut(CHANNELS) {
            px[CHANNELS - 1] = u8::MAX;
        }

        if self.layer_depth() == 1 {
            let plane = self.layers()[0].as_slice();
            for (px, &value) in data.chunks_exact_mut(CHANNELS).zip(plane) {
                px[..3].fill(value);
            }
        } else {
            for channel in [Channel::R, Channel::G, Channel::B] {
                let offset = channel.rgba_offset().unwrap_or(0);
                if let Some(layer) = self.layer_by_channel(channel) {
                    for (px, &value) in data.chunks_exact_mut(CHANNELS).zip(layer.as_slice()) {
                        px[offset] = value;
                    }
                }
            }
        }

        RgbaGrid::from_raw(data, self.columns(), self.rows())
    }
}
