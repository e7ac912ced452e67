use std::env;
use std::fs;
use std::path;

use crate::args;
use crate::error::Result;

/// Compile every style sheet once
#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub(crate) struct BuildArgs {
    /// Exit with an error when any style sheet fails to compile
    #[arg(long)]
    pub(crate) strict: bool,

    #[command(flatten, next_help_heading = "Config")]
    pub(crate) config: args::ConfigArgs,
}

impl BuildArgs {
    pub(crate) fn run(&self) -> Result<()> {
        let config = self.config.load_config()?;
        let config = sassline::Config::from_config(config)?;
        let pipeline = sassline::Pipeline::new(config)?;

        let report = build(&pipeline)?;
        if report.is_success() {
            log::info!("Build successful");
        } else if self.strict {
            anyhow::bail!(
                "{} of {} style sheets failed to compile",
                report.failed.len(),
                report.total()
            );
        } else {
            log::warn!(
                "Build finished with {} of {} style sheets failing",
                report.failed.len(),
                report.total()
            );
        }

        Ok(())
    }
}

pub(crate) fn build(pipeline: &sassline::Pipeline) -> Result<sassline::BuildReport> {
    let config = pipeline.config();
    log::info!(
        "Building from {} into {}",
        config.source.display(),
        config.destination.display()
    );
    pipeline.compile()
}

/// Remove the destination directory
#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub(crate) struct CleanArgs {
    #[command(flatten, next_help_heading = "Config")]
    pub(crate) config: args::ConfigArgs,
}

impl CleanArgs {
    pub(crate) fn run(&self) -> Result<()> {
        let config = self.config.load_config()?;
        let config = sassline::Config::from_config(config)?;

        clean(&config)
    }
}

pub(crate) fn clean(config: &sassline::Config) -> Result<()> {
    let cwd = env::current_dir().unwrap_or_else(|_| path::PathBuf::new());
    let destdir = match dunce::canonicalize(&config.destination) {
        Ok(destdir) => destdir,
        Err(e) => {
            log::debug!("No `{}` to clean", config.destination.display());
            log::debug!("{e}");
            return Ok(());
        }
    };
    if cwd.starts_with(&destdir) {
        anyhow::bail!(
            "Attempting to delete current directory ({}), \
             Cancelling the operation",
            destdir.display()
        );
    }

    fs::remove_dir_all(&destdir)?;

    log::info!("directory `{}` removed", destdir.display());

    Ok(())
}
