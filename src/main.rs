use std::process::ExitCode;

use anyhow::{Context, Result};
use log::error;

use stackfilter::io::ome_tiff::OmeTiffIo;
use stackfilter::{JobConfig, JobDriver, RunSettings};

fn run() -> Result<()> {
    let config = JobConfig::from_env().context("reading job configuration")?;
    let driver = JobDriver::new(OmeTiffIo::new(), RunSettings::from_env());

    let manifest = driver
        .run(&config)
        .with_context(|| format!("filtering {}", config.image_path))?;
    log::debug!("Manifest: {manifest:?}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
