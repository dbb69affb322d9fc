//! Rank filters: Mean, Min, Max, Median, Variance.
//!
//! Each output sample is a statistic of the input samples inside a circular
//! neighborhood centered on it.
//!
//! ## Neighborhood
//!
//! The disc contains every offset `(dx, dy)` with `dx² + dy² <= r² + 1`.
//! The `+ 1` matches the disc used by the ImageJ rank filter family, so a
//! radius of 1 yields the 3x3 square and a radius of 2 a 21-pixel disc.
//! Offsets that fall outside the plane read the nearest edge sample, so every
//! output sample sees the full disc count.
//!
//! The radius is capped at the plane diagonal before the disc is built; a
//! larger disc only adds more copies of edge samples.

use ndarray::{Array2, ArrayView2};

use crate::stack::Sample;

/// Statistic taken over the neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Min,
    Max,
    Median,
    Variance,
}

/// Offsets of the circular neighborhood for `radius`.
///
/// # Arguments
/// * `radius` - Neighborhood radius in pixels (> 0); the disc holds about
///   `3.2 * r²` offsets, so callers bound it first
///
/// # Returns
/// `(dy, dx)` pairs in row-major order, always including `(0, 0)`
pub fn disc_offsets(radius: f64) -> Vec<(isize, isize)> {
    let r_sq = radius * radius + 1.0;
    let r_int = (r_sq + 1e-10).sqrt().floor() as isize;

    let mut offsets = Vec::new();
    for dy in -r_int..=r_int {
        for dx in -r_int..=r_int {
            let (fy, fx) = (dy as f64, dx as f64);
            if fx * fx + fy * fy <= r_sq {
                offsets.push((dy, dx));
            }
        }
    }
    offsets
}

/// Apply a rank filter to one plane.
///
/// # Arguments
/// * `input` - Plane samples, indexed `[[y, x]]`
/// * `radius` - Neighborhood radius in pixels
/// * `statistic` - Statistic written to each output sample
///
/// # Returns
/// Filtered plane with the same shape and sample type
pub fn rank_filter<T: Sample>(
    input: ArrayView2<T>,
    radius: f64,
    statistic: Statistic,
) -> Array2<T> {
    let (height, width) = input.dim();
    let mut output = Array2::<T>::default((height, width));
    if height == 0 || width == 0 {
        return output;
    }

    let diagonal = ((height * height + width * width) as f64).sqrt();
    let offsets = disc_offsets(radius.min(diagonal));
    let mut values: Vec<f64> = Vec::with_capacity(offsets.len());

    let (max_y, max_x) = (height as isize - 1, width as isize - 1);
    for y in 0..height {
        for x in 0..width {
            values.clear();
            for &(dy, dx) in &offsets {
                let sy = (y as isize + dy).clamp(0, max_y) as usize;
                let sx = (x as isize + dx).clamp(0, max_x) as usize;
                values.push(input[[sy, sx]].to_f64());
            }

            output[[y, x]] = T::from_f64(reduce(&mut values, statistic));
        }
    }

    output
}

/// Reduce the gathered neighborhood to one value.
///
/// `values` holds the full disc, which always has an odd count.
fn reduce(values: &mut [f64], statistic: Statistic) -> f64 {
    let n = values.len() as f64;
    match statistic {
        Statistic::Mean => values.iter().sum::<f64>() / n,
        Statistic::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Statistic::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Statistic::Median => {
            let mid = values.len() / 2;
            let (_, median, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            *median
        }
        Statistic::Variance => {
            let mean = values.iter().sum::<f64>() / n;
            let sum_sq = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
            sum_sq / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disc_radius_one_is_square() {
        let offsets = disc_offsets(1.0);
        assert_eq!(offsets.len(), 9);
        assert!(offsets.contains(&(-1, -1)));
        assert!(offsets.contains(&(1, 1)));
    }

    #[test]
    fn test_disc_radius_two() {
        // 5x5 minus the four corners
        let offsets = disc_offsets(2.0);
        assert_eq!(offsets.len(), 21);
        assert!(!offsets.contains(&(-2, -2)));
        assert!(offsets.contains(&(-2, -1)));
    }

    #[test]
    fn test_mean_u8_spreads_bright_pixel() {
        let mut img = Array2::<u8>::zeros((5, 5));
        img[[2, 2]] = 90;

        let result = rank_filter(img.view(), 1.0, Statistic::Mean);

        assert_eq!(result[[2, 2]], 10);
        assert_eq!(result[[1, 1]], 10);
        assert_eq!(result[[0, 0]], 0);
    }

    #[test]
    fn test_mean_at_corner_replicates_edge() {
        let mut img = Array2::<u8>::zeros((3, 3));
        img[[0, 0]] = 40;

        let result = rank_filter(img.view(), 1.0, Statistic::Mean);

        // Corner sample is read 4 times out of 9: 160 / 9 = 17.8
        assert_eq!(result[[0, 0]], 18);
        assert_eq!(result[[2, 2]], 0);
    }

    #[test]
    fn test_median_at_edge_uses_full_disc() {
        let mut img = Array2::<u16>::from_elem((4, 4), 10);
        img[[0, 0]] = 500;
        img[[0, 1]] = 500;

        let result = rank_filter(img.view(), 1.0, Statistic::Median);

        // Replicated row 0 gives 500 six times out of nine at (0, 0)
        assert_eq!(result[[0, 0]], 500);
        assert_eq!(result[[3, 3]], 10);
    }

    #[test]
    fn test_radius_larger_than_plane() {
        let mut img = Array2::<u8>::from_elem((4, 4), 7);
        img[[1, 2]] = 200;

        let huge = rank_filter(img.view(), 1e9, Statistic::Max);
        assert!(huge.iter().all(|&v| v == 200));

        let extreme = rank_filter(img.view(), i64::MAX as f64, Statistic::Median);
        assert_eq!(extreme.dim(), (4, 4));
    }

    #[test]
    fn test_empty_plane() {
        let img = Array2::<f32>::zeros((0, 5));
        assert_eq!(rank_filter(img.view(), 2.0, Statistic::Mean).dim(), (0, 5));
    }

    #[test]
    fn test_min_max_f32() {
        let mut img = Array2::<f32>::from_elem((3, 3), 0.5);
        img[[1, 1]] = 0.2;
        img[[0, 0]] = 0.9;

        let min = rank_filter(img.view(), 1.0, Statistic::Min);
        let max = rank_filter(img.view(), 1.0, Statistic::Max);

        assert!((min[[0, 1]] - 0.2).abs() < 1e-6);
        assert!((max[[1, 1]] - 0.9).abs() < 1e-6);
        assert!((max[[2, 2]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_median_removes_salt_noise() {
        let mut img = Array2::<u16>::from_elem((5, 5), 100);
        img[[2, 2]] = 60000;

        let result = rank_filter(img.view(), 1.0, Statistic::Median);

        assert_eq!(result[[2, 2]], 100);
    }

    #[test]
    fn test_variance_of_flat_plane_is_zero() {
        let img = Array2::<u8>::from_elem((4, 4), 77);
        let result = rank_filter(img.view(), 2.0, Statistic::Variance);
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_variance_u8_clamps() {
        let mut img = Array2::<u8>::zeros((3, 3));
        img[[1, 0]] = 255;
        img[[1, 1]] = 255;
        img[[1, 2]] = 255;

        let result = rank_filter(img.view(), 1.0, Statistic::Variance);

        // Population variance of three 255s and six 0s is 14450, clamped
        assert_eq!(result[[1, 1]], 255);
    }

    #[test]
    fn test_shape_preserved() {
        let img = Array2::<f32>::zeros((7, 3));
        let result = rank_filter(img.view(), 3.0, Statistic::Median);
        assert_eq!(result.dim(), (7, 3));
    }
}
