//! Morphology filters: Erode, Dilate, Open.
//!
//! Erosion and dilation are the Min and Max rank filters over the same disc
//! (see [`super::rank`]). Opening is erosion followed by dilation and
//! removes bright features smaller than the structuring element.

use ndarray::{Array2, ArrayView2};

use super::rank::{rank_filter, Statistic};
use crate::stack::Sample;

// ============================================================================
// Erode / Dilate
// ============================================================================

/// Apply erosion to a plane.
///
/// Erode takes the minimum value in the neighborhood,
/// making dark regions grow and bright regions shrink.
pub fn erode<T: Sample>(input: ArrayView2<T>, radius: f64) -> Array2<T> {
    rank_filter(input, radius, Statistic::Min)
}

/// Apply dilation to a plane.
///
/// Dilate takes the maximum value in the neighborhood,
/// making bright regions grow and dark regions shrink.
pub fn dilate<T: Sample>(input: ArrayView2<T>, radius: f64) -> Array2<T> {
    rank_filter(input, radius, Statistic::Max)
}

// ============================================================================
// Open
// ============================================================================

/// Morphological opening (erode then dilate).
///
/// # Arguments
/// * `input` - Plane samples, indexed `[[y, x]]`
/// * `radius` - Structuring element radius
///
/// # Returns
/// Opened plane with the same shape and sample type
pub fn open<T: Sample>(input: ArrayView2<T>, radius: f64) -> Array2<T> {
    let eroded = erode(input, radius);
    dilate(eroded.view(), radius)
}
