//! Numeric helpers for kernel construction and normalization.

/// Returns the side of the square holding `len` cells, if `len` is a perfect square.
pub(crate) fn square_side(len: usize) -> Option<usize> {
    let mut side = (len as f64).sqrt() as usize;
    // Float sqrt may land one off for large inputs.
    while side * side > len {
        side -= 1;
    }
    while (side + 1) * (side + 1) <= len {
        side += 1;
    }
    (side * side == len).then_some(side)
}

/// Rounds to the nearest integer, ties to even.
pub(crate) fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Euclidean remainder of a rounded raw value, always in `[0, modulus)`.
pub(crate) fn wrap_mod(value: f64, modulus: u8) -> u8 {
    value.rem_euclid(modulus as f64) as u8
}
