//! layerfilter applies 2-D convolution kernels to 8-bit layered images.
//!
//! An [`Image`] is an ordered set of [`Layer`]s (one grayscale plane or the
//! four RGBA planes). A [`Kernel`] is an odd square mask with a uniform
//! factor. [`Convolver`] computes raw weighted sums per layer, row-parallel
//! across scoped threads (or rayon with the `rayon` feature), and maps them
//! to bytes by linear rescaling or modulo truncation. File decoding and
//! encoding live behind the `image-io` feature.

pub mod engine;
pub mod image;
pub mod kernel;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use engine::{
    filter_image, filter_layer, Backend, BorderPolicy, Convolver, FilterConfig, Normalization,
    RawField, RawRange,
};
pub use crate::image::{Channel, Image, Layer, RgbaGrid};
pub use kernel::Kernel;
pub use util::{FilterError, FilterResult};
