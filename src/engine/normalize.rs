//! Mapping raw sums to output bytes.
//!
//! Two strategies exist. Linear rescaling maps `[raw_min, raw_max]` onto
//! `[out_min, out_max]` and saturates. Truncation wraps `round(raw)` modulo
//! `out_max`, so the result is always below `out_max`. Rescaling is only used
//! when it was requested *and* the raw sums left the byte range `[0, 255]`.
//! Rounding is half-to-even in both strategies.

use crate::engine::convolve::RawRange;
use crate::util::math::{round_half_even, wrap_mod};
use crate::util::{FilterError, FilterResult};

/// Dense row-major matrix of raw sums with its tracked extremes.
#[derive(Clone, Debug, PartialEq)]
pub struct RawField {
    data: Vec<f32>,
    rows: usize,
    columns: usize,
    range: RawRange,
}

impl RawField {
    /// Wraps raw sums, computing their extremes.
    pub fn new(data: Vec<f32>, rows: usize, columns: usize) -> FilterResult<Self> {
        if data.len() != rows * columns {
            return Err(FilterError::BufferSizeMismatch {
                needed: rows * columns,
                got: data.len(),
            });
        }
        let mut range = RawRange::EMPTY;
        for &value in &data {
            range.include(value);
        }
        Ok(Self::from_parts(data, rows, columns, range))
    }

    pub(crate) fn from_parts(data: Vec<f32>, rows: usize, columns: usize, range: RawRange) -> Self {
        Self {
            data,
            rows,
            columns,
            range,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn range(&self) -> RawRange {
        self.range
    }

    /// Raw value at `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.data.get(row * self.columns + column).copied()
    }
}

/// Strategy picked for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    Rescale,
    Truncate,
}

impl Normalization {
    /// Rescale only when requested and the raw range overflowed `[0, 255]`.
    pub fn select(apply_rescaling: bool, range: RawRange) -> Normalization {
        if apply_rescaling && !range.fits_byte_range() {
            Normalization::Rescale
        } else {
            Normalization::Truncate
        }
    }
}

/// Converts a raw field to bytes, returning the strategy used.
pub fn normalize(
    field: &RawField,
    apply_rescaling: bool,
    out_min: u8,
    out_max: u8,
) -> FilterResult<(Vec<u8>, Normalization)> {
    let mode = Normalization::select(apply_rescaling, field.range());
    let bytes = match mode {
        Normalization::Rescale => {
            linear_rescale(field.as_slice(), field.range(), out_min, out_max)?
        }
        Normalization::Truncate => truncate(field.as_slice(), out_max)?,
    };
    Ok((bytes, mode))
}

/// `clamp(round(scale * (raw - raw_min)) + out_min, out_min, out_max)` with
/// `scale = (out_max - out_min) / (raw_max - raw_min)`.
pub fn linear_rescale(
    values: &[f32],
    range: RawRange,
    out_min: u8,
    out_max: u8,
) -> FilterResult<Vec<u8>> {
    if out_min > out_max {
        return Err(FilterError::InvalidRange {
            min: out_min,
            max: out_max,
        });
    }
    if range.max == range.min {
        return Err(FilterError::DegenerateRange { value: range.min });
    }
    let raw_min = range.min as f64;
    let scale = (out_max as f64 - out_min as f64) / (range.max as f64 - raw_min);
    let lo = out_min as f64;
    let hi = out_max as f64;
    Ok(values
        .iter()
        .map(|&raw| {
            let scaled = (raw as f64 - raw_min) * scale;
            (round_half_even(scaled) + lo).clamp(lo, hi) as u8
        })
        .collect())
}

/// `round(raw) mod out_max`; values wrap instead of saturating.
pub fn truncate(values: &[f32], out_max: u8) -> FilterResult<Vec<u8>> {
    if out_max == 0 {
        return Err(FilterError::InvalidRange {
            min: 0,
            max: out_max,
        });
    }
    Ok(values
        .iter()
        .map(|&raw| wrap_mod(round_half_even(raw as f64), out_max))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{linear_rescale, normalize, truncate, Normalization, RawField};
    use crate::engine::convolve::RawRange;
    use crate::util::FilterError;

    #[test]
    fn in_range_values_are_truncated_even_when_rescale_requested() {
        let field = RawField::new(vec![0.0, 10.0, 254.6, 255.0], 2, 2).unwrap();
        let (bytes, mode) = normalize(&field, true, 0, 255).unwrap();
        assert_eq!(mode, Normalization::Truncate);
        assert_eq!(bytes, vec![0, 10, 0, 0]);
    }

    #[test]
    fn overflow_triggers_rescale() {
        let field = RawField::new(vec![-100.0, 0.0, 100.0, 300.0], 2, 2).unwrap();
        let (bytes, mode) = normalize(&field, true, 0, 255).unwrap();
        assert_eq!(mode, Normalization::Rescale);
        assert_eq!(bytes.first(), Some(&0));
        assert_eq!(bytes.last(), Some(&255));
    }

    #[test]
    fn rescale_disabled_wraps_negatives() {
        let field = RawField::new(vec![-1.0, 256.0], 1, 2).unwrap();
        let (bytes, mode) = normalize(&field, false, 0, 255).unwrap();
        assert_eq!(mode, Normalization::Truncate);
        assert_eq!(bytes, vec![254, 1]);
    }

    #[test]
    fn constant_field_cannot_be_rescaled() {
        let range = RawRange {
            min: 300.0,
            max: 300.0,
        };
        let err = linear_rescale(&[300.0, 300.0], range, 0, 255).unwrap_err();
        assert_eq!(err, FilterError::DegenerateRange { value: 300.0 });
    }

    #[test]
    fn rescale_honours_output_offset() {
        let range = RawRange {
            min: -10.0,
            max: 10.0,
        };
        let bytes = linear_rescale(&[-10.0, 0.0, 10.0], range, 100, 200).unwrap();
        assert_eq!(bytes, vec![100, 150, 200]);
    }

    #[test]
    fn zero_modulus_is_rejected() {
        let err = truncate(&[1.0], 0).unwrap_err();
        assert_eq!(err, FilterError::InvalidRange { min: 0, max: 0 });
    }
}
