//! Error types for layerfilter.

use thiserror::Error;

/// Result alias for layerfilter operations.
pub type FilterResult<T> = std::result::Result<T, FilterError>;

/// Errors that can occur while building images and kernels or filtering them.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FilterError {
    /// The image file could not be read or decoded.
    #[error("failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },
    /// The image file could not be encoded or written.
    #[error("failed to encode image {path}: {reason}")]
    Encode { path: String, reason: String },
    /// Linear rescaling is undefined for a constant raw field.
    #[error("linear rescaling is undefined: every raw value equals {value}")]
    DegenerateRange { value: f32 },
    /// Kernel masks must have an odd side so a center cell exists.
    #[error("kernel mask size must be odd, got {size}")]
    EvenMaskSize { size: usize },
    /// A flat weight list must describe a square mask.
    #[error("weight count {len} is not a perfect square")]
    NonSquareWeights { len: usize },
    /// A kernel needs at least one weight.
    #[error("kernel has no weights")]
    EmptyKernel,
    /// Kernel weights must be finite.
    #[error("kernel weight at index {index} is not finite")]
    NonFiniteWeight { index: usize },
    /// The kernel factor must be finite.
    #[error("kernel factor is not finite")]
    NonFiniteFactor,
    /// A layer does not match the dimensions of the first layer of an image.
    #[error("layer {index} is {got:?} (rows, columns), expected {expected:?}")]
    LayerShapeMismatch {
        index: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// An image needs at least one layer.
    #[error("image has no layers")]
    EmptyImage,
    /// Row or column counts are zero or overflow.
    #[error("invalid dimensions: {rows} rows x {columns} columns")]
    InvalidDimensions { rows: usize, columns: usize },
    /// Buffer length does not match the declared dimensions.
    #[error("buffer holds {got} elements, expected {needed}")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// Layer index is past the image depth.
    #[error("layer index {index} out of range for depth {depth}")]
    LayerIndexOutOfRange { index: usize, depth: usize },
    /// Output range is empty or cannot be used as a modulus.
    #[error("invalid output range [{min}, {max}]")]
    InvalidRange { min: u8, max: u8 },
    /// A convolution worker panicked.
    #[error("convolution worker for partition {partition} panicked")]
    WorkerPanicked { partition: usize },
}
