//! Rank filter family and kernel lookup.
//!
//! ## Kernels
//!
//! | Name | Operation |
//! |------|-----------|
//! | MEAN | Mean of the disc |
//! | MIN | Minimum of the disc (erosion) |
//! | MAX | Maximum of the disc (dilation) |
//! | MEDIAN | Median of the disc |
//! | VARIANCE | Population variance of the disc |
//! | OPEN | MIN then MAX at the same radius |
//! | DESPECKLE | MEDIAN at radius 1, whatever radius is requested |
//!
//! Names are matched case-sensitively. `NONE` is not a kernel; it is the
//! explicit "leave the stack alone" selection handled by [`FilterSelection`].

pub mod morphology;
pub mod rank;

use std::fmt;

use crate::error::UnknownFilter;
use crate::stack::{Plane, Sample};
use ndarray::Array2;

use rank::{rank_filter, Statistic};

/// Radius used by DESPECKLE.
pub const DESPECKLE_RADIUS: f64 = 1.0;

/// Filter name meaning "no filtering".
pub const NO_FILTER: &str = "NONE";

/// A kernel of the rank filter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankKernel {
    Mean,
    Min,
    Max,
    Median,
    Variance,
    Open,
    Despeckle,
}

impl RankKernel {
    /// Every kernel, in registry order.
    pub const ALL: [RankKernel; 7] = [
        RankKernel::Mean,
        RankKernel::Min,
        RankKernel::Max,
        RankKernel::Median,
        RankKernel::Variance,
        RankKernel::Open,
        RankKernel::Despeckle,
    ];

    /// Look up a kernel by its canonical name.
    pub fn resolve(name: &str) -> Result<RankKernel, UnknownFilter> {
        match name {
            "MEAN" => Ok(RankKernel::Mean),
            "MIN" => Ok(RankKernel::Min),
            "MAX" => Ok(RankKernel::Max),
            "MEDIAN" => Ok(RankKernel::Median),
            "VARIANCE" => Ok(RankKernel::Variance),
            "OPEN" => Ok(RankKernel::Open),
            "DESPECKLE" => Ok(RankKernel::Despeckle),
            other => Err(UnknownFilter(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RankKernel::Mean => "MEAN",
            RankKernel::Min => "MIN",
            RankKernel::Max => "MAX",
            RankKernel::Median => "MEDIAN",
            RankKernel::Variance => "VARIANCE",
            RankKernel::Open => "OPEN",
            RankKernel::Despeckle => "DESPECKLE",
        }
    }

    /// Radius the kernel actually uses for a requested radius.
    pub fn effective_radius(self, radius: f64) -> f64 {
        match self {
            RankKernel::Despeckle => DESPECKLE_RADIUS,
            _ => radius,
        }
    }

    /// Filter one plane in place.
    ///
    /// Geometry and sample type of the plane are preserved.
    pub fn apply(self, plane: &mut Plane, radius: f64) {
        match plane {
            Plane::Gray8(data) => self.apply_samples(data, radius),
            Plane::Gray16(data) => self.apply_samples(data, radius),
            Plane::Gray32Float(data) => self.apply_samples(data, radius),
        }
    }

    fn apply_samples<T: Sample>(self, data: &mut Array2<T>, radius: f64) {
        let radius = self.effective_radius(radius);
        let filtered = match self {
            RankKernel::Mean => rank_filter(data.view(), radius, Statistic::Mean),
            RankKernel::Min => morphology::erode(data.view(), radius),
            RankKernel::Max => morphology::dilate(data.view(), radius),
            RankKernel::Median | RankKernel::Despeckle => {
                rank_filter(data.view(), radius, Statistic::Median)
            }
            RankKernel::Variance => rank_filter(data.view(), radius, Statistic::Variance),
            RankKernel::Open => morphology::open(data.view(), radius),
        };
        data.assign(&filtered);
    }
}

impl fmt::Display for RankKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the pipeline was asked to do with the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSelection {
    /// `NONE`: skip filtering.
    None,
    /// A kernel of the rank filter family.
    Kernel(RankKernel),
    /// A name outside the family; logged and skipped.
    Unknown(UnknownFilter),
}

impl FilterSelection {
    pub fn parse(name: &str) -> FilterSelection {
        if name == NO_FILTER {
            return FilterSelection::None;
        }
        match RankKernel::resolve(name) {
            Ok(kernel) => FilterSelection::Kernel(kernel),
            Err(unknown) => FilterSelection::Unknown(unknown),
        }
    }
}
