//! In-memory image stacks.
//!
//! An [`ImageStack`] is one series of a microscopy image: an ordered list of
//! 2D planes that share width, height and sample type. Filtering rewrites
//! sample values in place; plane count and geometry are fixed once the stack
//! has been built.
//!
//! ## Supported Sample Types
//!
//! | Type | Plane variant | Range |
//! |------|---------------|-------|
//! | u8 | `Plane::Gray8` | 0-255 |
//! | u16 | `Plane::Gray16` | 0-65535 |
//! | f32 | `Plane::Gray32Float` | unbounded |

use std::fmt;

use ndarray::Array2;

use crate::error::{Result, StackFilterError};

// ============================================================================
// Samples
// ============================================================================

/// Numeric sample stored in a plane.
///
/// Conversions go through `f64` so statistics (mean, variance) are computed
/// at full precision and rounded back into the sample's own range.
pub trait Sample: Copy + PartialOrd + Default + Send + Sync + 'static {
    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, rounding and clamping integer types to their range.
    fn from_f64(value: f64) -> Self;
}

impl Sample for u8 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round().clamp(0.0, u8::MAX as f64) as u8
    }
}

impl Sample for u16 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round().clamp(0.0, u16::MAX as f64) as u16
    }
}

impl Sample for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// Sample type of a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    F32,
}

impl SampleType {
    /// Pixel type name as used in OME-XML.
    pub fn ome_name(self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::U16 => "uint16",
            SampleType::F32 => "float",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ome_name())
    }
}

// ============================================================================
// Plane
// ============================================================================

/// A single 2D frame, indexed `[[y, x]]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Plane {
    Gray8(Array2<u8>),
    Gray16(Array2<u16>),
    Gray32Float(Array2<f32>),
}

impl Plane {
    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Plane::Gray8(data) => data.dim(),
            Plane::Gray16(data) => data.dim(),
            Plane::Gray32Float(data) => data.dim(),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Plane::Gray8(_) => SampleType::U8,
            Plane::Gray16(_) => SampleType::U16,
            Plane::Gray32Float(_) => SampleType::F32,
        }
    }

    /// Smallest and largest sample, `None` for an empty plane.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        match self {
            Plane::Gray8(data) => min_max_of(data),
            Plane::Gray16(data) => min_max_of(data),
            Plane::Gray32Float(data) => min_max_of(data),
        }
    }

    fn layout(&self) -> String {
        let (height, width) = self.dim();
        format!("{width}x{height} {}", self.sample_type())
    }
}

fn min_max_of<T: Sample>(data: &Array2<T>) -> Option<(f64, f64)> {
    data.iter().fold(None, |acc, &v| {
        let v = v.to_f64();
        match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        }
    })
}

// ============================================================================
// ImageStack
// ============================================================================

/// One series of an image: ordered planes of identical layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStack {
    name: String,
    planes: Vec<Plane>,
    display_range: Option<(f64, f64)>,
}

impl ImageStack {
    /// Build a stack, checking that every plane matches the first one.
    ///
    /// # Arguments
    /// * `name` - Series name, used in log lines and OME metadata
    /// * `planes` - Planes in slice order (may be empty)
    ///
    /// # Returns
    /// The stack, or `PlaneMismatch` naming the first inconsistent plane
    pub fn new(name: impl Into<String>, planes: Vec<Plane>) -> Result<Self> {
        if let Some(first) = planes.first() {
            let (dim, sample_type) = (first.dim(), first.sample_type());
            for (index, plane) in planes.iter().enumerate().skip(1) {
                if plane.dim() != dim || plane.sample_type() != sample_type {
                    return Err(StackFilterError::PlaneMismatch {
                        index,
                        expected: first.layout(),
                        found: plane.layout(),
                    });
                }
            }
        }

        Ok(ImageStack {
            name: name.into(),
            planes,
            display_range: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of planes (slices).
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// (height, width) shared by all planes, `None` for an empty stack.
    pub fn dim(&self) -> Option<(usize, usize)> {
        self.planes.first().map(Plane::dim)
    }

    pub fn sample_type(&self) -> Option<SampleType> {
        self.planes.first().map(Plane::sample_type)
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Mutable access for in-place filtering.
    ///
    /// Callers must keep each plane's geometry and sample type.
    pub fn planes_mut(&mut self) -> &mut [Plane] {
        &mut self.planes
    }

    /// Display range set by autoscaling, if any.
    pub fn display_range(&self) -> Option<(f64, f64)> {
        self.display_range
    }

    /// Set the display range to the min/max over all planes.
    ///
    /// Sample values are left untouched.
    pub fn autoscale(&mut self) {
        self.display_range = self
            .planes
            .iter()
            .filter_map(Plane::min_max)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)));
    }

    /// Append the planes of another stack with the same layout.
    pub(crate) fn concatenate(&mut self, other: ImageStack) -> Result<()> {
        if let (Some(first), Some(incoming)) = (self.planes.first(), other.planes.first()) {
            if first.dim() != incoming.dim() || first.sample_type() != incoming.sample_type() {
                return Err(StackFilterError::PlaneMismatch {
                    index: self.planes.len(),
                    expected: first.layout(),
                    found: incoming.layout(),
                });
            }
        }
        self.planes.extend(other.planes);
        Ok(())
    }
}
