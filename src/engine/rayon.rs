//! Rayon row-parallel backend (feature-gated).
//!
//! Each output row is a rayon task; per-row extremes are reduced into the
//! field range. Output is bit-identical to the scoped-thread backend since
//! every cell is computed by the same routine.

use crate::engine::convolve::{convolve_rows, RawRange};
use crate::engine::normalize::RawField;
use crate::engine::BorderPolicy;
use crate::image::Layer;
use crate::kernel::Kernel;
use rayon::prelude::*;

/// Computes the raw field of `src` on the rayon global pool.
pub(crate) fn convolve_rayon(src: &Layer, kernel: &Kernel, border: BorderPolicy) -> RawField {
    let (rows, cols) = src.dims();
    let mut out = vec![0.0f32; rows * cols];
    let range = out
        .par_chunks_mut(cols)
        .enumerate()
        .map(|(row, chunk)| convolve_rows(src, kernel, border, row, chunk))
        .reduce(|| RawRange::EMPTY, RawRange::merge);
    RawField::from_parts(out, rows, cols, range)
}
