//! Image I/O provider.
//!
//! The pipeline only needs two things from an imaging backend: open a file
//! into one stack per series, and export a stack to a container file. The
//! [`ImageIo`] trait is that seam; [`ome_tiff::OmeTiffIo`] is the implementation
//! used by the job binary.

pub mod ome_tiff;

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::stack::ImageStack;

/// Load options passed to [`ImageIo::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImporterOptions {
    /// Return every series, not only the first one.
    pub open_all_series: bool,
    /// Surface the container's OME-XML metadata.
    pub show_metadata: bool,
    /// Merge series of identical layout into one logical series.
    pub concatenate: bool,
    /// Set each stack's display range from its sample range.
    pub autoscale: bool,
}

impl ImporterOptions {
    /// The combination the filter pipeline always opens images with.
    pub const fn pipeline() -> Self {
        ImporterOptions {
            open_all_series: true,
            show_metadata: false,
            concatenate: true,
            autoscale: true,
        }
    }
}

/// Container format of an exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    OmeTiff,
}

impl ContainerFormat {
    /// Canonical file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::OmeTiff => "ome.tiff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Uncompressed,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Uncompressed => f.write_str("Uncompressed"),
        }
    }
}

/// Export parameters passed to [`ImageIo::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportParams {
    pub format: ContainerFormat,
    pub compression: Compression,
    /// Export without any interactive dialog.
    pub windowless: bool,
    /// Export regions of interest alongside the pixels.
    pub save_roi: bool,
}

impl ExportParams {
    /// Lossless, uncompressed OME-TIFF without ROIs.
    pub const fn ome_tiff() -> Self {
        ExportParams {
            format: ContainerFormat::OmeTiff,
            compression: Compression::Uncompressed,
            windowless: true,
            save_roi: false,
        }
    }
}

impl fmt::Display for ExportParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "windowless={} compression={} saveROI={}",
            self.windowless, self.compression, self.save_roi
        )
    }
}

/// Imaging backend used by the pipeline.
pub trait ImageIo {
    /// Open `path` into one stack per series.
    fn open(&self, path: &Path, options: &ImporterOptions) -> Result<Vec<ImageStack>>;

    /// Write `stack` to `path`.
    fn export(&self, stack: &ImageStack, path: &Path, params: &ExportParams) -> Result<()>;
}

impl<T: ImageIo + ?Sized> ImageIo for &T {
    fn open(&self, path: &Path, options: &ImporterOptions) -> Result<Vec<ImageStack>> {
        (**self).open(path, options)
    }

    fn export(&self, stack: &ImageStack, path: &Path, params: &ExportParams) -> Result<()> {
        (**self).export(stack, path, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_params_display() {
        assert_eq!(
            ExportParams::ome_tiff().to_string(),
            "windowless=true compression=Uncompressed saveROI=false"
        );
    }

    #[test]
    fn test_pipeline_importer_options() {
        let options = ImporterOptions::pipeline();
        assert!(options.open_all_series);
        assert!(!options.show_metadata);
        assert!(options.concatenate);
        assert!(options.autoscale);
    }
}
