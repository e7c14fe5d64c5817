//! Per-pixel weighted sums.
//!
//! For output cell `(row, col)` the sum runs over mask offsets
//! `i, j in [-d, d]` with `d = radius`, pairing source cell
//! `(row + i, col + j)` with mask cell `(i + d, j + d)`. Each term is
//! `source * factor * weight`.

use crate::engine::BorderPolicy;
use crate::image::Layer;
use crate::kernel::Kernel;

/// Running extremes of raw sums.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawRange {
    pub min: f32,
    pub max: f32,
}

impl RawRange {
    /// Identity element for [`RawRange::merge`].
    pub const EMPTY: RawRange = RawRange {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    #[inline]
    pub(crate) fn include(&mut self, value: f32) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub(crate) fn merge(self, other: RawRange) -> RawRange {
        RawRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True when every raw value fits the byte range `[0, 255]`.
    pub fn fits_byte_range(&self) -> bool {
        self.min >= 0.0 && self.max <= u8::MAX as f32
    }
}

/// Raw sum for a single output cell.
pub(crate) fn pixel_sum(
    src: &Layer,
    kernel: &Kernel,
    border: BorderPolicy,
    row: usize,
    col: usize,
) -> f32 {
    let rows = src.rows() as isize;
    let cols = src.columns() as isize;
    let data = src.as_slice();
    let weights = kernel.weights();
    let size = kernel.size();
    let d = kernel.radius() as isize;
    let factor = kernel.effective_factor();

    let mut sum = 0.0f32;
    for i in -d..=d {
        let mut sr = row as isize + i;
        match border {
            BorderPolicy::Skip if sr < 0 || sr >= rows => continue,
            BorderPolicy::Replicate => sr = sr.clamp(0, rows - 1),
            BorderPolicy::Skip => {}
        }
        let src_row = &data[sr as usize * cols as usize..][..cols as usize];
        let mask_row = &weights[(i + d) as usize * size..][..size];
        for j in -d..=d {
            let mut sc = col as isize + j;
            match border {
                BorderPolicy::Skip if sc < 0 || sc >= cols => continue,
                BorderPolicy::Replicate => sc = sc.clamp(0, cols - 1),
                BorderPolicy::Skip => {}
            }
            sum += src_row[sc as usize] as f32 * factor * mask_row[(j + d) as usize];
        }
    }
    sum
}

/// Fills `out` with raw sums for consecutive rows starting at `first_row`.
///
/// `out.len()` must be a multiple of the layer width. Returns the extremes of
/// the values written.
pub(crate) fn convolve_rows(
    src: &Layer,
    kernel: &Kernel,
    border: BorderPolicy,
    first_row: usize,
    out: &mut [f32],
) -> RawRange {
    let cols = src.columns();
    let mut range = RawRange::EMPTY;
    for (offset, out_row) in out.chunks_exact_mut(cols).enumerate() {
        let row = first_row + offset;
        for (col, cell) in out_row.iter_mut().enumerate() {
            let value = pixel_sum(src, kernel, border, row, col);
            *cell = value;
            range.include(value);
        }
    }
    range
}
