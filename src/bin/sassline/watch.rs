use std::time;

use crate::args;
use crate::build;
use crate::error::Result;

/// Compile, then recompile whenever a style sheet changes
#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub(crate) struct WatchArgs {
    /// Milliseconds of quiet before a burst of changes is compiled
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub(crate) debounce: u64,

    #[command(flatten, next_help_heading = "Config")]
    pub(crate) config: args::ConfigArgs,
}

impl WatchArgs {
    pub(crate) fn run(&self) -> Result<()> {
        let config = self.config.load_config()?;
        let config = sassline::Config::from_config(config)?;
        let pipeline = sassline::Pipeline::new(config)?;

        build::build(&pipeline)?;

        let options = sassline::WatchOptions {
            debounce: time::Duration::from_millis(self.debounce),
        };
        let watch = sassline::Watch::start(pipeline, options)?;
        log::info!("Ctrl-c to stop watching");
        watch.wait()
    }
}
