//! Raw sensor value grid for one image.

use itertools::iproduct;
use ndarray::Array2;

use crate::error::{Error, Result};

/// Width x height raw sensor values, row-major.
///
/// Pixel index `i` maps to `(x = i % width, y = i / width)`.
/// The values are whatever the decoder produced: 16-bit
/// sensor counts for FLIR, signed temperature codes for DJI,
/// widened to `f64` for conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPixelGrid {
    values: Array2<f64>,
}

impl RawPixelGrid {
    /// Build a grid from a row-major value sequence,
    /// enforcing `values.len() == width * height`.
    pub fn from_raw_values(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != width * height {
            return Err(Error::ShapeMismatch {
                width,
                height,
                found: values.len(),
            });
        }
        let values = Array2::from_shape_vec((height, width), values)
            .map_err(|e| Error::decode(format!("raw grid shape: {}", e)))?;
        Ok(RawPixelGrid { values })
    }

    pub(crate) fn from_array(values: Array2<f64>) -> Self {
        RawPixelGrid { values }
    }

    pub fn width(&self) -> usize {
        self.values.dim().1
    }

    pub fn height(&self) -> usize {
        self.values.dim().0
    }

    /// Iterate `(x, y, raw)` in row-major order, x fastest.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        iproduct!(0..self.height(), 0..self.width())
            .map(move |(row, col)| (col, row, self.values[(row, col)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_must_match_dimensions() {
        match RawPixelGrid::from_raw_values(3, 2, vec![0.; 5]) {
            Err(Error::ShapeMismatch {
                width,
                height,
                found,
            }) => {
                assert_eq!((width, height, found), (3, 2, 5));
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn pixels_iterate_row_major_x_fastest() {
        let grid = RawPixelGrid::from_raw_values(3, 2, (0..6).map(f64::from).collect()).unwrap();
        let pixels: Vec<_> = grid.pixels().collect();
        assert_eq!(
            pixels,
            vec![
                (0, 0, 0.),
                (1, 0, 1.),
                (2, 0, 2.),
                (0, 1, 3.),
                (1, 1, 4.),
                (2, 1, 5.),
            ]
        );
    }
}
