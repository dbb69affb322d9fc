//! Job configuration.
//!
//! The workflow engine passes job parameters as a JSON object in the
//! `WFE_INPUT_JSON` environment variable:
//!
//! ```json
//! {
//!   "IMAGEPATH": "/input/cells.ome.tif",
//!   "FILTERTYPE": "MEDIAN",
//!   "FILTER_RADIUS": 3,
//!   "WFE_output_params_file": "result.json"
//! }
//! ```
//!
//! snake_case keys (`image_path`, `filter_type`, `filter_radius`,
//! `output_params_filename`) are accepted as aliases. The radius may be
//! given as a number or a numeric string.

use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::error::{Result, StackFilterError};
use crate::filters::FilterSelection;

/// Environment variable holding the job JSON.
pub const INPUT_JSON_ENV: &str = "WFE_INPUT_JSON";

/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "STACKFILTER_OUTPUT_DIR";

/// Output directory used by the workflow container.
pub const DEFAULT_OUTPUT_DIR: &str = "/output";

/// Suffix appended to the output file stem.
pub const FILTERED_SUFFIX: &str = "_FILTERED";

/// Parameters of one filter job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    #[serde(rename = "IMAGEPATH", alias = "image_path")]
    pub image_path: String,

    #[serde(rename = "FILTERTYPE", alias = "filter_type")]
    pub filter_type: String,

    #[serde(
        rename = "FILTER_RADIUS",
        alias = "filter_radius",
        deserialize_with = "deserialize_radius"
    )]
    pub filter_radius: i64,

    #[serde(rename = "WFE_output_params_file", alias = "output_params_filename")]
    pub output_params_filename: String,
}

impl JobConfig {
    /// Parse and validate a job JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: JobConfig = serde_json::from_str(text)
            .map_err(|e| StackFilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the job JSON from [`INPUT_JSON_ENV`].
    pub fn from_env() -> Result<Self> {
        let text = std::env::var(INPUT_JSON_ENV)
            .map_err(|e| StackFilterError::Config(format!("{INPUT_JSON_ENV}: {e}")))?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.filter_radius < 1 {
            return Err(StackFilterError::InvalidRadius(self.filter_radius));
        }
        if self.image_path.is_empty() {
            return Err(StackFilterError::Config("IMAGEPATH is empty".to_string()));
        }
        if Path::new(&self.image_path).file_name().is_none() {
            return Err(StackFilterError::Config(format!(
                "IMAGEPATH has no file name: {}",
                self.image_path
            )));
        }
        if self.output_params_filename.is_empty() {
            return Err(StackFilterError::Config(
                "WFE_output_params_file is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn filter_selection(&self) -> FilterSelection {
        FilterSelection::parse(&self.filter_type)
    }
}

fn deserialize_radius<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Radius {
        Int(i64),
        Text(String),
    }

    match Radius::deserialize(deserializer)? {
        Radius::Int(value) => Ok(value),
        Radius::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("FILTER_RADIUS '{text}' is not an integer"))),
    }
}

/// Fixed settings of a run that do not come from the job JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Directory receiving the filtered image and the manifest.
    pub output_dir: PathBuf,
    pub suffix: String,
    /// Extension of the exported file, without leading dot.
    pub save_format: String,
    /// Series of the input image to process.
    pub series: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            suffix: FILTERED_SUFFIX.to_string(),
            save_format: crate::io::ContainerFormat::OmeTiff.extension().to_string(),
            series: 0,
        }
    }
}

impl RunSettings {
    /// Defaults, with the output directory taken from [`OUTPUT_DIR_ENV`] when set.
    pub fn from_env() -> Self {
        let mut settings = RunSettings::default();
        if let Some(dir) = std::env::var_os(OUTPUT_DIR_ENV).filter(|d| !d.is_empty()) {
            settings.output_dir = PathBuf::from(dir);
        }
        settings
    }
}
