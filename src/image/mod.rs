//! Multi-layer images and their admissible output range.
//!
//! An [`Image`] owns an ordered list of [`Layer`]s that all share the same
//! dimensions. Grayscale images hold one layer, colour images hold the four
//! RGBA layers in that order. The row/column counts are cached from the
//! first layer and re-validated whenever a layer is replaced.

use crate::util::{FilterError, FilterResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod layer;
pub mod rgba;

pub use layer::{Channel, Layer};
pub use rgba::RgbaGrid;

/// Default lower bound of the output range.
pub const DEFAULT_MIN_VALUE: u8 = 0;
/// Default upper bound of the output range.
pub const DEFAULT_MAX_VALUE: u8 = 255;

/// Ordered collection of equally sized layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    layers: Vec<Layer>,
    rows: usize,
    columns: usize,
    min_value: u8,
    max_value: u8,
}

impl Image {
    /// Takes ownership of `layers` with the default `[0, 255]` range.
    pub fn new(layers: Vec<Layer>) -> FilterResult<Self> {
        Self::with_range(layers, DEFAULT_MIN_VALUE, DEFAULT_MAX_VALUE)
    }

    /// Takes ownership of `layers` with an explicit admissible range.
    pub fn with_range(layers: Vec<Layer>, min_value: u8, max_value: u8) -> FilterResult<Self> {
        if min_value > max_value {
            return Err(FilterError::InvalidRange {
                min: min_value,
                max: max_value,
            });
        }
        let expected = layers.first().ok_or(FilterError::EmptyImage)?.dims();
        for (index, layer) in layers.iter().enumerate().skip(1) {
            if layer.dims() != expected {
                return Err(FilterError::LayerShapeMismatch {
                    index,
                    expected,
                    got: layer.dims(),
                });
            }
        }
        Ok(Self {
            layers,
            rows: expected.0,
            columns: expected.1,
            min_value,
            max_value,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of layers.
    pub fn layer_depth(&self) -> usize {
        self.layers.len()
    }

    pub fn min_value(&self) -> u8 {
        self.min_value
    }

    pub fn max_value(&self) -> u8 {
        self.max_value
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// First layer carrying `channel`, if any.
    pub fn layer_by_channel(&self, channel: Channel) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.channel() == channel)
    }

    /// Pixel value at `(row, column)` of layer `layer`.
    pub fn get(&self, row: usize, column: usize, layer: usize) -> Option<u8> {
        self.layers.get(layer)?.get(row, column)
    }

    /// Writes a pixel value; returns `false` when any index is out of range.
    pub fn set(&mut self, row: usize, column: usize, layer: usize, value: u8) -> bool {
        match self.layers.get_mut(layer) {
            Some(target) => target.set(row, column, value),
            None => false,
        }
    }

    /// Replaces layer `index`, returning the old one.
    ///
    /// Replacing the only layer of an image may change its dimensions; otherwise
    /// the new layer must match the cached dimensions.
    pub fn replace_layer(&mut self, index: usize, layer: Layer) -> FilterResult<Layer> {
        let depth = self.layers.len();
        if index >= depth {
            return Err(FilterError::LayerIndexOutOfRange { index, depth });
        }
        if depth > 1 && layer.dims() != (self.rows, self.columns) {
            return Err(FilterError::LayerShapeMismatch {
                index,
                expected: (self.rows, self.columns),
                got: layer.dims(),
            });
        }
        let (rows, columns) = layer.dims();
        let old = std::mem::replace(&mut self.layers[index], layer);
        self.rows = rows;
        self.columns = columns;
        Ok(old)
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::{Channel, Image, Layer};
    use crate::util::FilterError;

    fn plane(channel: Channel, rows: usize, columns: usize) -> Layer {
        Layer::new(channel, rows, columns).unwrap()
    }

    #[test]
    fn caches_dimensions_from_first_layer() {
        let image = Image::new(vec![plane(Channel::R, 3, 4), plane(Channel::G, 3, 4)]).unwrap();
        assert_eq!((image.rows(), image.columns()), (3, 4));
        assert_eq!(image.layer_depth(), 2);
        assert_eq!((image.min_value(), image.max_value()), (0, 255));
    }

    #[test]
    fn replace_single_layer_updates_cache() {
        let mut image = Image::new(vec![plane(Channel::Grayscale, 2, 2)]).unwrap();
        image
            .replace_layer(0, plane(Channel::Grayscale, 5, 1))
            .unwrap();
        assert_eq!((image.rows(), image.columns()), (5, 1));
    }

    #[test]
    fn replace_rejects_bad_index() {
        let mut image = Image::new(vec![plane(Channel::Grayscale, 2, 2)]).unwrap();
        let err = image
            .replace_layer(1, plane(Channel::Grayscale, 2, 2))
            .unwrap_err();
        assert_eq!(err, FilterError::LayerIndexOutOfRange { index: 1, depth: 1 });
    }
}
