//! Importance-Difference Hash (IDHash) implementation.
//!
//! IDHash works on a square `size x size` grayscale grid (`size = 2^power`):
//! 1. Take cyclic horizontal differences along every row, then along every
//!    column (the last pixel is compared with the first)
//! 2. Threshold the absolute differences of each orientation at their median
//! 3. Emit an *importance* bit (`|d| >= median`) and a *difference* bit
//!    (`d < 0`) per cell
//!
//! The fingerprint packs four `size^2`-bit bands, most significant first:
//! row importance, column importance, row difference, column difference.
//! Comparison counts sign disagreements only where either image found the
//! gradient important.

use super::super::traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::core::fingerprint::Fingerprint;
use crate::core::grid::PixelGrid;
use crate::core::imaging::{pixelate_image, ImageSource};
use crate::core::median::median;
use crate::core::popcount::PopcountBackend;
use crate::error::{CompareError, HashError, Result};
use image::DynamicImage;

pub const DEFAULT_POWER: u32 = 3;
/// Largest supported power (64x64 grid, 16384-bit fingerprints)
pub const MAX_POWER: u32 = 6;

/// Storage size, in bytes, up to which a fingerprint is taken as `size = 8`
const SMALL_CLASS_MAX_BYTES: u64 = 32;
/// Shift that drops the difference bands of a `size = 8` fingerprint
const FAST_PATH_SHIFT: u32 = 128;

/// Grid side for a power, rejecting powers outside `1..=MAX_POWER`
pub fn side_for_power(power: u32) -> std::result::Result<u32, HashError> {
    if (1..=MAX_POWER).contains(&power) {
        Ok(1 << power)
    } else {
        Err(HashError::UnsupportedSize {
            parameter: "power",
            value: power,
            min: 1,
            max: MAX_POWER,
        })
    }
}

/// Cyclic adjacent differences of every row, flattened row-major
pub fn cyclic_differences(grid: &PixelGrid) -> Vec<i32> {
    grid.rows()
        .flat_map(|row| {
            let n = row.len();
            (0..n).map(move |c| row[c] - row[(c + 1) % n])
        })
        .collect()
}

/// (importance, difference) bands for one orientation
fn orientation_bands(grid: &PixelGrid) -> (Fingerprint, Fingerprint) {
    let diffs = cyclic_differences(grid);

    let mut magnitudes: Vec<u32> = diffs.iter().map(|d| d.unsigned_abs()).collect();
    magnitudes.sort_unstable();
    let threshold = median(&magnitudes).unwrap_or(0);

    let importance = Fingerprint::from_bits(diffs.iter().map(|d| d.unsigned_abs() >= threshold));
    let difference = Fingerprint::from_bits(diffs.iter().map(|&d| d < 0));
    (importance, difference)
}

/// Power whose `2^power` side matches a square grid, if any
fn power_for_grid(grid: &PixelGrid) -> Option<u32> {
    let side = grid.width();
    if !grid.is_square() || !side.is_power_of_two() {
        return None;
    }
    let power = side.trailing_zeros();
    (1..=MAX_POWER).contains(&power).then_some(power)
}

/// Fingerprint a square grid whose side is `2^power` for a supported power
pub fn fingerprint_grid(grid: &PixelGrid) -> std::result::Result<Fingerprint, HashError> {
    let power = power_for_grid(grid).ok_or_else(|| HashError::GridShape {
        expected: format!("square grid with side 2^p, p in 1..={}", MAX_POWER),
        actual: grid.describe_shape(),
    })?;
    let band_width = 1u32 << (2 * power);

    let (row_importance, row_difference) = orientation_bands(grid);
    let (column_importance, column_difference) = orientation_bands(&grid.transpose());

    Ok(Fingerprint::concat_bands(
        &[
            row_importance,
            column_importance,
            row_difference,
            column_difference,
        ],
        band_width,
    ))
}

/// Fingerprint a decoded image at grid side `size`
pub fn fingerprint_from_image(image: &DynamicImage, size: u32) -> Result<Fingerprint> {
    let grid = pixelate_image(image, size, size, None)?;
    Ok(fingerprint_grid(&grid)?)
}

/// Fingerprint an image source with grid side `2^power`
pub fn fingerprint(source: &ImageSource, power: u32) -> Result<Fingerprint> {
    let size = side_for_power(power)?;
    let image = source.load()?;
    let fingerprint = fingerprint_from_image(&image, size)?;
    tracing::debug!(source = %source.label(), power, bits = fingerprint.bit_len(), "computed IDHash");
    Ok(fingerprint)
}

/// Grid side inferred from storage size: `8` up to 32 bytes, `16` beyond.
///
/// The threshold is in bytes, so any two fingerprints of at most 256 bits
/// (say 21 and 41 bits wide) both land in class 8 and compare without a
/// size mismatch. Only powers 3 and 4 are told apart; use
/// [`distance_for_power`] when the power is known.
pub fn size_class(fingerprint: &Fingerprint) -> u32 {
    if fingerprint.byte_len() <= SMALL_CLASS_MAX_BYTES {
        8
    } else {
        16
    }
}

/// Distance with the grid size inferred from each fingerprint's magnitude
pub fn distance(a: &Fingerprint, b: &Fingerprint) -> std::result::Result<u32, CompareError> {
    let (size_a, size_b) = (size_class(a), size_class(b));
    if size_a == 8 && size_b == 8 {
        return Ok(distance3(a, b));
    }
    if size_a != size_b {
        return Err(CompareError::SizeMismatch {
            left: size_a,
            right: size_b,
        });
    }
    Ok(masked_distance(
        a,
        b,
        2 * size_a * size_a,
        PopcountBackend::Portable,
    ))
}

/// `popcount((a ^ b) & ((a | b) >> 128))`, the `size = 8` comparison.
///
/// Uses the hardware popcount when both operands are wider than a machine
/// word; results are identical to [`distance3_portable`].
pub fn distance3(a: &Fingerprint, b: &Fingerprint) -> u32 {
    let backend = if a.exceeds_word() && b.exceeds_word() {
        PopcountBackend::active()
    } else {
        PopcountBackend::Portable
    };
    masked_distance(a, b, FAST_PATH_SHIFT, backend)
}

pub fn distance3_portable(a: &Fingerprint, b: &Fingerprint) -> u32 {
    masked_distance(a, b, FAST_PATH_SHIFT, PopcountBackend::Portable)
}

/// Distance for fingerprints known to be taken with `power`
pub fn distance_for_power(
    a: &Fingerprint,
    b: &Fingerprint,
    power: u32,
) -> std::result::Result<u32, CompareError> {
    let size = side_for_power(power).map_err(|_| CompareError::UnsupportedPower { power })?;
    let max_bits = 4 * u64::from(size) * u64::from(size);
    for fingerprint in [a, b] {
        if fingerprint.bit_len() > max_bits {
            return Err(CompareError::FingerprintTooWide {
                bits: fingerprint.bit_len(),
                max: max_bits,
            });
        }
    }
    if size == 8 {
        return Ok(distance3(a, b));
    }
    Ok(masked_distance(
        a,
        b,
        2 * size * size,
        PopcountBackend::active(),
    ))
}

fn masked_distance(a: &Fingerprint, b: &Fingerprint, shift: u32, backend: PopcountBackend) -> u32 {
    let importance = &(a | b) >> shift;
    (&(a ^ b) & &importance).count_ones_with(backend)
}

/// Importance-Difference Hash (IDHash) hasher
#[derive(Debug, Clone)]
pub struct IdHasher {
    power: u32,
}

impl IdHasher {
    pub fn new(power: u32) -> Self {
        Self { power }
    }

    pub fn power(&self) -> u32 {
        self.power
    }
}

impl Default for IdHasher {
    fn default() -> Self {
        Self::new(DEFAULT_POWER)
    }
}

impl HashAlgorithm for IdHasher {
    fn hash_grid(&self, grid: &PixelGrid) -> std::result::Result<ImageHashValue, HashError> {
        let size = side_for_power(self.power)? as usize;
        if grid.width() != size || grid.height() != size {
            return Err(HashError::GridShape {
                expected: format!("{}x{}", size, size),
                actual: grid.describe_shape(),
            });
        }
        let fingerprint = fingerprint_grid(grid)?;
        Ok(ImageHashValue::new(
            fingerprint,
            HashAlgorithmKind::ImportanceDifference,
            self.power,
        ))
    }

    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue> {
        let size = side_for_power(self.power)?;
        let fingerprint = fingerprint_from_image(image, size)?;
        Ok(ImageHashValue::new(
            fingerprint,
            HashAlgorithmKind::ImportanceDifference,
            self.power,
        ))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::ImportanceDifference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::MAX_SAMPLE;

    /// Deterministic pseudo-random grid with plenty of ties
    fn noisy_grid(side: usize, seed: u32) -> PixelGrid {
        let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
        let samples = (0..side * side)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 16 * 16) as i32
            })
            .collect();
        PixelGrid::new(side, side, samples).unwrap()
    }

    #[test]
    fn cyclic_differences_wrap_around() {
        let grid = PixelGrid::from_rows(&[[1, 4], [10, 3]]).unwrap();
        assert_eq!(cyclic_differences(&grid), vec![-3, 3, 7, -7]);
    }

    #[test]
    fn two_by_two_fingerprint_matches_hand_computation() {
        let grid = PixelGrid::from_rows(&[[1, 4], [10, 3]]).unwrap();
        // rows: d = [-3, 3, 7, -7], |d| sorted [3, 3, 7, 7], median 7
        //   importance 0011, difference 1001
        // columns: [[1, 10], [4, 3]] -> d = [-9, 9, 1, -1], sorted [1, 1, 9, 9], median 9
        //   importance 1100, difference 1001
        let expected = 0b0011_1100_1001_1001u64;
        assert_eq!(fingerprint_grid(&grid).unwrap(), Fingerprint::from(expected));
    }

    #[test]
    fn uniform_grid_marks_everything_important() {
        let grid = PixelGrid::new(8, 8, vec![100; 64]).unwrap();
        let fingerprint = fingerprint_grid(&grid).unwrap();
        // median of all-zero magnitudes is 0, so both importance bands are full
        assert_eq!(fingerprint.count_ones(), 128);
        assert_eq!(fingerprint.bit_len(), 256);
    }

    #[test]
    fn non_square_grid_is_rejected() {
        let grid = PixelGrid::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        assert!(matches!(
            fingerprint_grid(&grid),
            Err(HashError::GridShape { .. })
        ));
    }

    #[test]
    fn unsupported_grid_sides_are_rejected() {
        for side in [1usize, 3, 12, 128] {
            let grid = PixelGrid::new(side, side, vec![7; side * side]).unwrap();
            assert!(
                matches!(fingerprint_grid(&grid), Err(HashError::GridShape { .. })),
                "side {side}"
            );
        }
        let largest = 1usize << MAX_POWER;
        let grid = PixelGrid::new(largest, largest, vec![7; largest * largest]).unwrap();
        // uniform grid: both importance bands full, both difference bands empty
        let fingerprint = fingerprint_grid(&grid).unwrap();
        assert_eq!(fingerprint.bit_len(), 4 * (largest * largest) as u64);
        assert_eq!(fingerprint.count_ones(), 2 * (largest * largest) as u32);
    }

    #[test]
    fn extreme_samples_hash_without_overflow() {
        let grid = PixelGrid::from_rows(&[[MAX_SAMPLE, 0], [0, MAX_SAMPLE]]).unwrap();
        // rows: d = [65535, -65535, -65535, 65535], all equally important
        // columns: same grid transposed
        let expected = 0b1111_1111_0110_0110u64;
        assert_eq!(fingerprint_grid(&grid).unwrap(), Fingerprint::from(expected));
    }

    #[test]
    fn small_fingerprints_share_a_size_class() {
        let a = Fingerprint::from((1u64 << 20) | 0b1010);
        let b = Fingerprint::from((1u64 << 40) | 0b0110);
        assert_eq!((a.bit_len(), b.bit_len()), (21, 41));
        assert_eq!((size_class(&a), size_class(&b)), (8, 8));
        assert_eq!(distance(&a, &b), Ok(0));
    }

    #[test]
    fn fingerprint_fits_four_bands() {
        for power in 1..=4u32 {
            let side = 1usize << power;
            let fingerprint = fingerprint_grid(&noisy_grid(side, power)).unwrap();
            assert!(fingerprint.bit_len() <= 4 * (side * side) as u64, "power {power}");
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let grid = noisy_grid(8, 7);
        assert_eq!(
            fingerprint_grid(&grid).unwrap(),
            fingerprint_grid(&grid.clone()).unwrap()
        );
    }

    #[test]
    fn power_out_of_range_is_rejected() {
        assert!(side_for_power(0).is_err());
        assert!(side_for_power(MAX_POWER + 1).is_err());
        assert_eq!(side_for_power(3), Ok(8));
    }

    #[test]
    fn size_class_splits_at_32_bytes() {
        let power3 = fingerprint_grid(&noisy_grid(8, 1)).unwrap();
        let power4 = fingerprint_grid(&noisy_grid(16, 1)).unwrap();
        assert_eq!(size_class(&power3), 8);
        assert_eq!(size_class(&power4), 16);
        assert_eq!(size_class(&Fingerprint::from(1u64)), 8);
    }

    #[test]
    fn self_distance_is_zero() {
        for side in [8usize, 16] {
            let fingerprint = fingerprint_grid(&noisy_grid(side, 3)).unwrap();
            assert_eq!(distance(&fingerprint, &fingerprint), Ok(0));
        }
    }

    #[test]
    fn distance_is_symmetric() {
        for side in [8usize, 16] {
            let a = fingerprint_grid(&noisy_grid(side, 11)).unwrap();
            let b = fingerprint_grid(&noisy_grid(side, 12)).unwrap();
            assert_eq!(distance(&a, &b), distance(&b, &a));
        }
    }

    #[test]
    fn mixed_sizes_are_rejected() {
        let small = fingerprint_grid(&noisy_grid(8, 5)).unwrap();
        let large = fingerprint_grid(&noisy_grid(16, 5)).unwrap();
        assert_eq!(
            distance(&small, &large),
            Err(CompareError::SizeMismatch { left: 8, right: 16 })
        );
        assert_eq!(
            distance(&large, &small),
            Err(CompareError::SizeMismatch { left: 16, right: 8 })
        );
    }

    #[test]
    fn distance3_counts_masked_sign_differences() {
        // importance bits live at 128.., difference bits below
        let a = &(&Fingerprint::from(0b11u64) << 128) | &Fingerprint::from(0b01u64);
        let b = &(&Fingerprint::from(0b01u64) << 128) | &Fingerprint::from(0b10u64);
        // xor low = 0b11, importance (a|b) = 0b11 -> 2
        assert_eq!(distance3(&a, &b), 2);
        let c = &(&Fingerprint::from(0b01u64) << 128) | &Fingerprint::from(0b10u64);
        let d = &(&Fingerprint::from(0b01u64) << 128) | &Fingerprint::from(0b00u64);
        // sign differs only at bit 1, which neither marks important
        assert_eq!(distance3(&c, &d), 0);
    }

    #[test]
    fn hardware_and_portable_paths_agree() {
        for seed in 0..20 {
            let a = fingerprint_grid(&noisy_grid(8, seed)).unwrap();
            let b = fingerprint_grid(&noisy_grid(8, seed + 100)).unwrap();
            assert!(a.exceeds_word() && b.exceeds_word());
            assert_eq!(distance3(&a, &b), distance3_portable(&a, &b));
        }
        let small_a = Fingerprint::from(0xf0u64);
        let small_b = Fingerprint::from(0x0fu64);
        assert_eq!(distance3(&small_a, &small_b), distance3_portable(&small_a, &small_b));
    }

    #[test]
    fn explicit_power_matches_inferred_distance() {
        let a = fingerprint_grid(&noisy_grid(16, 21)).unwrap();
        let b = fingerprint_grid(&noisy_grid(16, 22)).unwrap();
        assert_eq!(distance_for_power(&a, &b, 4), distance(&a, &b));

        let c = fingerprint_grid(&noisy_grid(8, 21)).unwrap();
        let d = fingerprint_grid(&noisy_grid(8, 22)).unwrap();
        assert_eq!(distance_for_power(&c, &d, 3), distance(&c, &d));
    }

    #[test]
    fn explicit_power_rejects_wider_fingerprints() {
        let large = fingerprint_grid(&noisy_grid(16, 2)).unwrap();
        let small = fingerprint_grid(&noisy_grid(8, 2)).unwrap();
        assert!(matches!(
            distance_for_power(&large, &small, 3),
            Err(CompareError::FingerprintTooWide { max: 256, .. })
        ));
        assert_eq!(
            distance_for_power(&small, &small, 0),
            Err(CompareError::UnsupportedPower { power: 0 })
        );
    }

    #[test]
    fn power_two_grid_works() {
        let fingerprint = fingerprint_grid(&noisy_grid(4, 9)).unwrap();
        assert!(fingerprint.bit_len() <= 64);
        assert_eq!(distance_for_power(&fingerprint, &fingerprint, 2), Ok(0));
    }

    #[test]
    fn hasher_checks_grid_against_power() {
        let hasher = IdHasher::default();
        assert!(hasher.hash_grid(&noisy_grid(16, 1)).is_err());
        let value = hasher.hash_grid(&noisy_grid(8, 1)).unwrap();
        assert_eq!(value.parameter(), DEFAULT_POWER);
        assert_eq!(hasher.kind(), HashAlgorithmKind::ImportanceDifference);
    }
}
