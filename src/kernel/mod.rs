//! Convolution kernels.
//!
//! A [`Kernel`] is an odd-sized square mask of weights stored row-major,
//! plus a uniform factor multiplied into every term of the weighted sum.
//! When the apply-factor flag is cleared the factor is treated as 1.

use crate::util::math::square_side;
use crate::util::{FilterError, FilterResult};

/// Odd square mask of weights with a uniform factor.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
    apply_factor: bool,
    factor: f32,
}

impl Kernel {
    /// Creates a kernel from `size * size` row-major weights with factor 1.
    pub fn new(weights: Vec<f32>, size: usize) -> FilterResult<Self> {
        if size % 2 == 0 {
            return Err(FilterError::EvenMaskSize { size });
        }
        let needed = mask_len(size)?;
        if weights.len() != needed {
            return Err(FilterError::BufferSizeMismatch {
                needed,
                got: weights.len(),
            });
        }
        if let Some(index) = weights.iter().position(|w| !w.is_finite()) {
            return Err(FilterError::NonFiniteWeight { index });
        }
        Ok(Self {
            size,
            weights,
            apply_factor: true,
            factor: 1.0,
        })
    }

    /// Creates a kernel from nested rows, e.g. `[[0., 1., 0.], [1., -2., 1.], [0., 1., 0.]]`.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> FilterResult<Self> {
        let size = rows.len();
        let mut weights = Vec::with_capacity(size.saturating_mul(size));
        for row in rows {
            let row = row.as_ref();
            if row.len() != size {
                return Err(FilterError::NonSquareWeights {
                    len: size * row.len(),
                });
            }
            weights.extend_from_slice(row);
        }
        if weights.is_empty() {
            return Err(FilterError::EmptyKernel);
        }
        Self::new(weights, size)
    }

    /// Builds a kernel from a flat weight list whose length is a perfect square.
    ///
    /// The factor is derived as `1 / sum(|w|)`. An all-zero mask keeps factor 1.
    pub fn from_flat_weights(weights: &[f32]) -> FilterResult<Self> {
        let kernel = Self::square_from_flat(weights)?;
        let abs_sum: f32 = kernel.weights.iter().map(|w| w.abs()).sum();
        if abs_sum == 0.0 {
            return Ok(kernel);
        }
        kernel.with_factor(1.0 / abs_sum)
    }

    /// Builds a kernel from a flat weight list and a user divisor.
    ///
    /// The factor becomes `1 / divisor`; a zero divisor disables the factor.
    pub fn from_flat_weights_with_divisor(weights: &[f32], divisor: f32) -> FilterResult<Self> {
        let kernel = Self::square_from_flat(weights)?;
        if divisor == 0.0 {
            return Ok(kernel.without_factor());
        }
        kernel.with_factor(1.0 / divisor)
    }

    fn square_from_flat(weights: &[f32]) -> FilterResult<Self> {
        if weights.is_empty() {
            return Err(FilterError::EmptyKernel);
        }
        let size = square_side(weights.len()).ok_or(FilterError::NonSquareWeights {
            len: weights.len(),
        })?;
        Self::new(weights.to_vec(), size)
    }

    /// Sets an explicit factor and enables it.
    pub fn with_factor(mut self, factor: f32) -> FilterResult<Self> {
        if !factor.is_finite() {
            return Err(FilterError::NonFiniteFactor);
        }
        self.factor = factor;
        self.apply_factor = true;
        Ok(self)
    }

    /// Disables the factor; the stored value is kept but not applied.
    pub fn without_factor(mut self) -> Self {
        self.apply_factor = false;
        self
    }

    /// Side length of the mask.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the center cell to the mask edge, `(size - 1) / 2`.
    pub fn radius(&self) -> usize {
        (self.size - 1) / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at mask cell `(row, column)`.
    pub fn weight(&self, row: usize, column: usize) -> Option<f32> {
        if row >= self.size || column >= self.size {
            return None;
        }
        self.weights.get(row * self.size + column).copied()
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn applies_factor(&self) -> bool {
        self.apply_factor
    }

    /// Factor actually multiplied into each term.
    pub fn effective_factor(&self) -> f32 {
        if self.apply_factor {
            self.factor
        } else {
            1.0
        }
    }

    /// Single center weight of 1; leaves any layer unchanged.
    pub fn identity() -> Self {
        Self::fixed(vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0], 1.0)
    }

    /// Uniform `size x size` mean filter.
    pub fn box_blur(size: usize) -> FilterResult<Self> {
        let len = mask_len(size)?;
        let kernel = Self::new(vec![1.0; len], size)?;
        kernel.with_factor(1.0 / len as f32)
    }

    /// 4-neighbour Laplacian `{0,1,0},{1,-2,1},{0,1,0}`.
    pub fn laplacian() -> Self {
        Self::fixed(vec![0.0, 1.0, 0.0, 1.0, -2.0, 1.0, 0.0, 1.0, 0.0], 1.0)
    }

    /// 4-neighbour Laplacian with weights 4 and -16, normalized by `1/36`.
    pub fn laplacian_16() -> Self {
        Self::fixed(
            vec![0.0, 4.0, 0.0, 4.0, -16.0, 4.0, 0.0, 4.0, 0.0],
            1.0 / 36.0,
        )
    }

    /// 3x3 sharpen `{0,-1,0},{-1,5,-1},{0,-1,0}`.
    pub fn sharpen() -> Self {
        Self::fixed(vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0], 1.0)
    }

    fn fixed(weights: Vec<f32>, factor: f32) -> Self {
        Self {
            size: 3,
            weights,
            apply_factor: true,
            factor,
        }
    }
}

fn mask_len(size: usize) -> FilterResult<usize> {
    size.checked_mul(size).ok_or(FilterError::InvalidDimensions {
        rows: size,
        columns: size,
    })
}

#[cfg(test)]
mod tests {
    use super::Kernel;
    use crate::util::FilterError;

    #[test]
    fn flat_weights_derive_abs_sum_factor() {
        let kernel = Kernel::from_flat_weights(&[0.0, 4.0, 0.0, 4.0, -16.0, 4.0, 0.0, 4.0, 0.0])
            .unwrap();
        assert_eq!(kernel.size(), 3);
        assert_eq!(kernel.weight(1, 1), Some(-16.0));
        assert!((kernel.factor() - 1.0 / 36.0).abs() < 1e-9);
        assert!(kernel.applies_factor());
    }

    #[test]
    fn non_square_weight_count_is_rejected() {
        let err = Kernel::from_flat_weights(&[1.0; 8]).unwrap_err();
        assert_eq!(err, FilterError::NonSquareWeights { len: 8 });
    }

    #[test]
    fn even_mask_is_rejected() {
        let err = Kernel::from_flat_weights(&[1.0; 16]).unwrap_err();
        assert_eq!(err, FilterError::EvenMaskSize { size: 4 });
    }

    #[test]
    fn zero_divisor_disables_factor() {
        let kernel = Kernel::from_flat_weights_with_divisor(&[1.0; 9], 0.0).unwrap();
        assert!(!kernel.applies_factor());
        assert_eq!(kernel.effective_factor(), 1.0);

        let kernel = Kernel::from_flat_weights_with_divisor(&[1.0; 9], 9.0).unwrap();
        assert!((kernel.effective_factor() - 1.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        let err = Kernel::new(vec![0.0, f32::NAN, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0], 3)
            .unwrap_err();
        assert_eq!(err, FilterError::NonFiniteWeight { index: 1 });
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Kernel::from_rows(&[vec![1.0f32, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, FilterError::NonSquareWeights { .. }));
    }

    #[test]
    fn oversized_mask_is_an_error() {
        let err = Kernel::new(vec![1.0], usize::MAX).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidDimensions {
                rows: usize::MAX,
                columns: usize::MAX,
            }
        );
        assert!(Kernel::box_blur(usize::MAX).is_err());
    }
}
