//! One complete filter job: pipeline, export, manifest.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;

use crate::config::{JobConfig, RunSettings};
use crate::error::Result;
use crate::io::{ExportParams, ImageIo};
use crate::manifest::OutputManifest;
use crate::naming;
use crate::pipeline::ImagePipeline;

/// Runs a job from a validated [`JobConfig`].
#[derive(Debug, Clone)]
pub struct JobDriver<I> {
    io: I,
    settings: RunSettings,
}

impl<I: ImageIo> JobDriver<I> {
    pub fn new(io: I, settings: RunSettings) -> Self {
        JobDriver { io, settings }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Where the filtered image of `config` is written.
    pub fn output_image_path(&self, config: &JobConfig) -> PathBuf {
        naming::resolve(
            Path::new(&config.image_path),
            &self.settings.output_dir,
            &self.settings.suffix,
            &self.settings.save_format,
        )
    }

    /// Filter, export and write the manifest.
    ///
    /// Stops at the first failure; no manifest is written in that case and
    /// a partially exported image is left in place.
    pub fn run(&self, config: &JobConfig) -> Result<OutputManifest> {
        info!("Starting ...");
        info!("Filename               : {}", config.image_path);
        info!("Save Format used       : {}", self.settings.save_format);
        info!("------------  START IMAGE ANALYSIS ------------");

        let output_path = self.output_image_path(config);
        info!("Output image path      : {}", output_path.display());

        let start = Instant::now();
        let pipeline = ImagePipeline::new(
            &self.io,
            config.filter_selection(),
            config.filter_radius as f64,
        );
        let filtered = pipeline.run(Path::new(&config.image_path), self.settings.series)?;
        info!("Duration of whole Processing : {:?}", start.elapsed());

        let start = Instant::now();
        self.io
            .export(&filtered, &output_path, &ExportParams::ome_tiff())?;
        info!("Duration of saving as OME.TIFF : {:?}", start.elapsed());

        info!("Writing output JSON file ...");
        let manifest = OutputManifest::new(&output_path);
        manifest.write(&self.settings.output_dir.join(&config.output_params_filename))?;

        info!("Done.");
        Ok(manifest)
    }
}
