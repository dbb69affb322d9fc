//! Stackfilter
//!
//! Rank filtering of microscopy image stacks as a single workflow step:
//! open one series of an image, apply a rank filter to every plane, export
//! the result as an uncompressed OME-TIFF and write a JSON manifest with the
//! output location.
//!
//! ## Image Format
//! Stacks are ordered lists of single-channel planes of one sample type:
//! - `u8`: 8-bit (0-255)
//! - `u16`: 16-bit (0-65535)
//! - `f32`: 32-bit float
//!
//! Filtering never changes plane count, plane size or sample type.
//!
//! ## Flow
//! ```text
//! WFE_INPUT_JSON -> JobConfig -> ImagePipeline -> ImageIo::export -> OutputManifest
//!                                 |  open series
//!                                 |  slices::apply(RankKernel)
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod io;
pub mod job;
pub mod manifest;
pub mod naming;
pub mod pipeline;
pub mod slices;
pub mod stack;

pub use config::{JobConfig, RunSettings};
pub use error::{Result, StackFilterError, UnknownFilter};
pub use filters::{FilterSelection, RankKernel};
pub use io::{ExportParams, ImageIo, ImporterOptions};
pub use job::JobDriver;
pub use manifest::OutputManifest;
pub use pipeline::ImagePipeline;
pub use stack::{ImageStack, Plane, SampleType};
