//! Output manifest handed back to the workflow engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackFilterError};

/// `{"FILTERED_IMAGE": "<path>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputManifest {
    #[serde(rename = "FILTERED_IMAGE")]
    pub filtered_image_path: String,
}

impl OutputManifest {
    pub fn new(filtered_image: &Path) -> Self {
        OutputManifest {
            filtered_image_path: filtered_image.to_string_lossy().into_owned(),
        }
    }

    /// Write the manifest as JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let write_err = |source: std::io::Error| StackFilterError::ManifestWrite {
            path: PathBuf::from(path),
            source,
        };

        let json = serde_json::to_string(self).map_err(|e| write_err(e.into()))?;
        fs::write(path, json).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_workflow_key() {
        let manifest = OutputManifest::new(Path::new("/output/cells_FILTERED.ome.tiff"));
        assert_eq!(
            serde_json::to_string(&manifest).unwrap(),
            r#"{"FILTERED_IMAGE":"/output/cells_FILTERED.ome.tiff"}"#
        );
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("result.json");
        let err = OutputManifest::new(Path::new("x")).write(&path).unwrap_err();
        assert!(matches!(err, StackFilterError::ManifestWrite { .. }));
    }
}
