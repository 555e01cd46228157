//! Pixel grids consumed by the fingerprint engines.

use crate::error::HashError;
use image::GrayImage;

/// Largest luminance sample a grid accepts (16-bit grayscale)
pub const MAX_SAMPLE: i32 = u16::MAX as i32;

/// Row-major matrix of luminance samples (typically 0-255, at most
/// [`MAX_SAMPLE`]).
///
/// Immutable once built; engines only read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    samples: Vec<i32>,
}

impl PixelGrid {
    /// Build a grid from raw row-major samples
    pub fn new(width: usize, height: usize, samples: Vec<i32>) -> Result<Self, HashError> {
        if width == 0 || height == 0 {
            return Err(HashError::InvalidGrid(format!(
                "grid must not be empty ({}x{})",
                width, height
            )));
        }
        if samples.len() != width * height {
            return Err(HashError::InvalidGrid(format!(
                "{} samples do not fill a {}x{} grid",
                samples.len(),
                width,
                height
            )));
        }
        if let Some(index) = samples.iter().position(|s| !(0..=MAX_SAMPLE).contains(s)) {
            return Err(HashError::InvalidGrid(format!(
                "sample {} at ({}, {}) is outside 0-{}",
                samples[index],
                index % width,
                index / width,
                MAX_SAMPLE
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a grid from rows of equal length
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, HashError>
    where
        R: AsRef<[i32]>,
    {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if let Some(ragged) = rows.iter().position(|row| row.as_ref().len() != width) {
            return Err(HashError::InvalidGrid(format!(
                "row {} has {} samples, expected {}",
                ragged,
                rows[ragged].as_ref().len(),
                width
            )));
        }
        let samples = rows.iter().flat_map(|row| row.as_ref().to_vec()).collect();
        Self::new(width, rows.len(), samples)
    }

    /// Build a grid from an 8-bit grayscale image
    pub fn from_gray(image: &GrayImage) -> Result<Self, HashError> {
        let samples = image.pixels().map(|p| i32::from(p[0])).collect();
        Self::new(image.width() as usize, image.height() as usize, samples)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.samples[y * self.width + x]
    }

    pub fn row(&self, y: usize) -> &[i32] {
        &self.samples[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.samples.chunks(self.width)
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Self {
        let samples = (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| (x, y)))
            .map(|(x, y)| self.get(x, y))
            .collect();
        Self {
            width: self.height,
            height: self.width,
            samples,
        }
    }

    /// Reverse every row (left-right mirror)
    pub fn mirror_horizontal(&self) -> Self {
        let samples = self
            .rows()
            .flat_map(|row| row.iter().rev().copied())
            .collect();
        Self {
            width: self.width,
            height: self.height,
            samples,
        }
    }

    pub fn describe_shape(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn from_rows_is_row_major() {
        let grid = PixelGrid::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(2, 0), 3);
        assert_eq!(grid.get(0, 1), 4);
        assert_eq!(grid.row(1), &[4, 5, 6]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows: Vec<Vec<i32>> = vec![vec![1, 2], vec![3]];
        assert!(matches!(
            PixelGrid::from_rows(&rows),
            Err(HashError::InvalidGrid(_))
        ));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let rows: Vec<Vec<i32>> = Vec::new();
        assert!(PixelGrid::from_rows(&rows).is_err());
        assert!(PixelGrid::new(2, 2, vec![1, 2, 3]).is_err());
    }

    #[test]
    fn out_of_range_samples_are_rejected() {
        assert!(matches!(
            PixelGrid::from_rows(&[[i32::MAX, -1], [0, 0]]),
            Err(HashError::InvalidGrid(_))
        ));
        assert!(PixelGrid::new(2, 1, vec![0, -1]).is_err());
        assert!(PixelGrid::new(2, 1, vec![0, MAX_SAMPLE + 1]).is_err());
        assert!(PixelGrid::new(2, 1, vec![0, MAX_SAMPLE]).is_ok());
    }

    #[test]
    fn transpose_swaps_axes() {
        let grid = PixelGrid::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        let transposed = grid.transpose();
        assert_eq!(transposed.describe_shape(), "2x3");
        assert_eq!(transposed.row(0), &[1, 4]);
        assert_eq!(transposed.row(2), &[3, 6]);
        assert_eq!(transposed.transpose(), grid);
    }

    #[test]
    fn mirror_reverses_rows() {
        let grid = PixelGrid::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        let mirrored = grid.mirror_horizontal();
        assert_eq!(mirrored.row(0), &[3, 2, 1]);
        assert_eq!(mirrored.row(1), &[6, 5, 4]);
    }

    #[test]
    fn from_gray_reads_luma() {
        let image: GrayImage = ImageBuffer::from_fn(3, 2, |x, y| Luma([(x + 10 * y) as u8]));
        let grid = PixelGrid::from_gray(&image).unwrap();
        assert_eq!(grid.row(0), &[0, 1, 2]);
        assert_eq!(grid.row(1), &[10, 11, 12]);
    }
}
