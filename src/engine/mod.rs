//! Kernel application over layers and images.
//!
//! [`Convolver`] binds a [`Kernel`] to a [`FilterConfig`]. Each layer is
//! convolved into a [`RawField`] on the configured backend, then normalized
//! into bytes. Layers are filtered independently and in order; the output
//! image keeps the channel tags of its input.

use crate::image::{Image, Layer};
use crate::kernel::Kernel;
use crate::trace::{filter_event, filter_span};
use crate::util::{FilterError, FilterResult};
use std::num::NonZeroUsize;

pub(crate) mod convolve;
pub mod normalize;
pub mod partition;
#[cfg(feature = "rayon")]
mod rayon;

pub use convolve::RawRange;
pub use normalize::{Normalization, RawField};

/// Treatment of mask cells that fall outside the layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderPolicy {
    /// Out-of-range cells contribute nothing; the mask shrinks at the edges.
    #[default]
    Skip,
    /// Out-of-range cells read the nearest edge pixel.
    Replicate,
}

/// Execution strategy for the convolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Scoped OS threads, one per row partition, spawned per call.
    #[default]
    Threads,
    /// Rayon global pool, one task per row.
    #[cfg(feature = "rayon")]
    Rayon,
}

/// Filtering parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    /// Rescale linearly when raw sums leave `[0, 255]`; otherwise truncate.
    pub apply_rescaling: bool,
    /// Lower bound of the output range.
    pub out_min: u8,
    /// Upper bound of the output range; also the truncation modulus.
    pub out_max: u8,
    pub border: BorderPolicy,
    /// Worker threads for [`Backend::Threads`]; `None` uses hardware concurrency.
    pub workers: Option<NonZeroUsize>,
    pub backend: Backend,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            apply_rescaling: true,
            out_min: 0,
            out_max: 255,
            border: BorderPolicy::Skip,
            workers: None,
            backend: Backend::Threads,
        }
    }
}

/// Applies one kernel to layers and images.
#[derive(Clone, Debug)]
pub struct Convolver {
    kernel: Kernel,
    config: FilterConfig,
}

impl Convolver {
    /// Creates a convolver with [`FilterConfig::default`].
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            config: FilterConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Raw weighted sums of `layer` before normalization.
    pub fn raw_field(&self, layer: &Layer) -> FilterResult<RawField> {
        match self.config.backend {
            Backend::Threads => {
                let workers = self
                    .config
                    .workers
                    .unwrap_or_else(partition::available_workers);
                partition::convolve_partitioned(layer, &self.kernel, self.config.border, workers)
            }
            #[cfg(feature = "rayon")]
            Backend::Rayon => Ok(rayon::convolve_rayon(
                layer,
                &self.kernel,
                self.config.border,
            )),
        }
    }

    /// Filters a single layer, keeping its channel tag.
    pub fn apply_layer(&self, layer: &Layer) -> FilterResult<Layer> {
        self.check_range()?;
        let _span = filter_span!("filter_layer", channel = ?layer.channel()).entered();

        let field = self.raw_field(layer)?;
        let range = field.range();
        let (bytes, mode) = normalize::normalize(
            &field,
            self.config.apply_rescaling,
            self.config.out_min,
            self.config.out_max,
        )?;
        let rescaled = mode == Normalization::Rescale;
        filter_event!(
            "layer_raw_range",
            min = range.min,
            max = range.max,
            rescaled = rescaled,
        );
        Layer::from_vec(layer.channel(), bytes, layer.rows(), layer.columns())
    }

    /// Filters every layer of `image` in order.
    ///
    /// Either every layer succeeds or the first error is returned; no partial
    /// image is produced.
    pub fn apply(&self, image: &Image) -> FilterResult<Image> {
        self.check_range()?;
        let _span = filter_span!("filter_image", layers = image.layer_depth()).entered();

        let layers = image
            .layers()
            .iter()
            .map(|layer| self.apply_layer(layer))
            .collect::<FilterResult<Vec<_>>>()?;
        Image::with_range(layers, self.config.out_min, self.config.out_max)
    }

    fn check_range(&self) -> FilterResult<()> {
        let FilterConfig {
            out_min, out_max, ..
        } = self.config;
        if out_min > out_max {
            return Err(FilterError::InvalidRange {
                min: out_min,
                max: out_max,
            });
        }
        Ok(())
    }
}

/// Filters one layer with default border and backend settings.
pub fn filter_layer(
    kernel: &Kernel,
    layer: &Layer,
    apply_rescaling: bool,
    out_min: u8,
    out_max: u8,
) -> FilterResult<Layer> {
    Convolver::new(kernel.clone())
        .with_config(FilterConfig {
            apply_rescaling,
            out_min,
            out_max,
            ..FilterConfig::default()
        })
        .apply_layer(layer)
}

/// Filters every layer of `image` with default border and backend settings.
pub fn filter_image(
    kernel: &Kernel,
    image: &Image,
    apply_rescaling: bool,
    out_min: u8,
    out_max: u8,
) -> FilterResult<Image> {
    Convolver::new(kernel.clone())
        .with_config(FilterConfig {
            apply_rescaling,
            out_min,
            out_max,
            ..FilterConfig::default()
        })
        .apply(image)
}

#[cfg(test)]
mod tests {
    use super::{Convolver, FilterConfig};
    use crate::image::{Channel, Image, Layer};
    use crate::kernel::Kernel;
    use crate::util::FilterError;

    #[test]
    fn output_keeps_channel_order_and_range() {
        let layers = Channel::RGBA
            .iter()
            .map(|&c| Layer::new(c, 3, 3).unwrap())
            .collect();
        let image = Image::new(layers).unwrap();
        let out = Convolver::new(Kernel::identity())
            .with_config(FilterConfig {
                out_max: 200,
                ..FilterConfig::default()
            })
            .apply(&image)
            .unwrap();
        let tags: Vec<Channel> = out.layers().iter().map(|l| l.channel()).collect();
        assert_eq!(tags, Channel::RGBA.to_vec());
        assert_eq!(out.max_value(), 200);
    }

    #[test]
    fn inverted_range_is_rejected_before_work() {
        let image = Image::new(vec![Layer::new(Channel::Grayscale, 2, 2).unwrap()]).unwrap();
        let err = Convolver::new(Kernel::identity())
            .with_config(FilterConfig {
                out_min: 10,
                out_max: 5,
                ..FilterConfig::default()
            })
            .apply(&image)
            .unwrap_err();
        assert_eq!(err, FilterError::InvalidRange { min: 10, max: 5 });
    }
}
