//! Single-channel 8-bit planes.

use crate::util::{FilterError, FilterResult};

/// Semantic tag of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G,
    B,
    A,
    Grayscale,
}

impl Channel {
    /// Colour channels in RGBA interleave order.
    pub const RGBA: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    /// Offset of this channel inside an interleaved RGBA pixel, if it has one.
    pub fn rgba_offset(self) -> Option<usize> {
        match self {
            Channel::R => Some(0),
            Channel::G => Some(1),
            Channel::B => Some(2),
            Channel::A => Some(3),
            Channel::Grayscale => None,
        }
    }
}

/// Dense row-major byte plane with a channel tag.
///
/// The buffer length always equals `rows * columns`; values are plain bytes
/// regardless of the tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    channel: Channel,
    rows: usize,
    columns: usize,
    data: Vec<u8>,
}

impl Layer {
    /// Creates a zero-filled layer, used as a write target.
    pub fn new(channel: Channel, rows: usize, columns: usize) -> FilterResult<Self> {
        let len = plane_len(rows, columns)?;
        Ok(Self {
            channel,
            rows,
            columns,
            data: vec![0u8; len],
        })
    }

    /// Wraps an existing row-major buffer.
    pub fn from_vec(
        channel: Channel,
        data: Vec<u8>,
        rows: usize,
        columns: usize,
    ) -> FilterResult<Self> {
        let needed = plane_len(rows, columns)?;
        if data.len() != needed {
            return Err(FilterError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            channel,
            rows,
            columns,
            data,
        })
    }

    /// Builds a layer from nested rows; every row must have the same length.
    pub fn from_rows<R: AsRef<[u8]>>(channel: Channel, rows: &[R]) -> FilterResult<Self> {
        let columns = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(FilterError::BufferSizeMismatch {
                    needed: columns,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(channel, data, rows.len(), columns)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns `(rows, columns)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Returns the pixel at `(row, column)` if it is within bounds.
    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.data.get(row * self.columns + column).copied()
    }

    /// Writes the pixel at `(row, column)`; returns `false` when out of bounds.
    pub fn set(&mut self, row: usize, column: usize, value: u8) -> bool {
        if row >= self.rows || column >= self.columns {
            return false;
        }
        self.data[row * self.columns + column] = value;
        true
    }

    /// Returns row `row` as a contiguous slice.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        self.data.get(start..start + self.columns)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

fn plane_len(rows: usize, columns: usize) -> FilterResult<usize> {
    if rows == 0 || columns == 0 {
        return Err(FilterError::InvalidDimensions { rows, columns });
    }
    rows.checked_mul(columns)
        .ok_or(FilterError::InvalidDimensions { rows, columns })
}

#[cfg(test)]
mod tests {
    use super::{Channel, Layer};
    use crate::util::FilterError;

    #[test]
    fn new_layer_is_zero_filled() {
        let layer = Layer::new(Channel::G, 2, 3).unwrap();
        assert_eq!(layer.dims(), (2, 3));
        assert!(layer.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Layer::from_rows(Channel::R, &[vec![1u8, 2], vec![3u8]]).unwrap_err();
        assert_eq!(err, FilterError::BufferSizeMismatch { needed: 2, got: 1 });
    }

    #[test]
    fn get_and_set_respect_bounds() {
        let mut layer = Layer::from_rows(Channel::B, &[[1u8, 2], [3, 4]]).unwrap();
        assert_eq!(layer.get(1, 0), Some(3));
        assert_eq!(layer.get(2, 0), None);
        assert!(layer.set(0, 1, 9));
        assert!(!layer.set(0, 2, 9));
        assert_eq!(layer.row(0).unwrap(), &[1u8, 9]);
    }

    #[test]
    fn grayscale_has_no_rgba_offset() {
        assert_eq!(Channel::Grayscale.rgba_offset(), None);
        assert_eq!(Channel::A.rgba_offset(), Some(3));
    }
}
