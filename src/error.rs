//! Error types for the filter job.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a filter run.
#[derive(Debug, Error)]
pub enum StackFilterError {
    /// Job configuration is missing, unreadable or malformed.
    #[error("Invalid job configuration: {0}")]
    Config(String),

    /// Filter radius must be at least one pixel.
    #[error("Invalid filter radius: {0} (must be >= 1)")]
    InvalidRadius(i64),

    /// Planes of one stack disagree on geometry or sample type.
    #[error("Plane {index} is {found}, expected {expected}")]
    PlaneMismatch {
        /// Index of the offending plane.
        index: usize,
        /// Layout of the first plane.
        expected: String,
        /// Layout of the offending plane.
        found: String,
    },

    /// Requested series does not exist in the opened image.
    #[error("Series index {index} out of range ({available} series available)")]
    SeriesIndex {
        /// Requested index.
        index: usize,
        /// Number of series the image holds.
        available: usize,
    },

    /// Image file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Image container could not be decoded.
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// The path being decoded.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// Sample layout the pipeline cannot filter.
    #[error("Unsupported sample type in {path}: {description}")]
    UnsupportedSampleType {
        /// The path being decoded.
        path: PathBuf,
        /// Human-readable description of the layout.
        description: String,
    },

    /// Filtered stack could not be written.
    #[error("Failed to export {path}: {message}")]
    Export {
        /// Target path.
        path: PathBuf,
        /// Encoder or IO message.
        message: String,
    },

    /// Output manifest could not be written.
    #[error("Failed to write manifest {path}: {source}")]
    ManifestWrite {
        /// Manifest path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for filter job operations.
pub type Result<T> = std::result::Result<T, StackFilterError>;

/// Filter name that is not part of the rank filter family.
///
/// Not fatal: the pipeline logs it and continues with the unfiltered stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown filter type '{0}'")]
pub struct UnknownFilter(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StackFilterError::SeriesIndex {
            index: 5,
            available: 2,
        };
        assert_eq!(
            format!("{err}"),
            "Series index 5 out of range (2 series available)"
        );

        let err = StackFilterError::InvalidRadius(0);
        assert!(format!("{err}").contains("0"));

        let err = UnknownFilter("GAUSSIAN".to_string());
        assert_eq!(format!("{err}"), "Unknown filter type 'GAUSSIAN'");
    }
}
