use crate::args;
use crate::error::Result;

/// Print project debug information
#[derive(Clone, Debug, PartialEq, Eq, clap::Subcommand)]
pub(crate) enum DebugCommands {
    /// Prints post-processed config
    Config {
        #[command(flatten, next_help_heading = "Config")]
        config: args::ConfigArgs,
    },

    /// Print the style sheets being watched, partials included
    Files {
        #[command(flatten, next_help_heading = "Config")]
        config: args::ConfigArgs,
    },
}

impl DebugCommands {
    pub(crate) fn run(&self) -> Result<()> {
        match self {
            Self::Config { config } => {
                let config = config.load_config()?;
                print!("{config}");
            }
            Self::Files { config } => {
                let config = config.load_config()?;
                let config = sassline::Config::from_config(config)?;
                let pipeline = sassline::Pipeline::new(config)?;
                for path in pipeline.source().iter() {
                    println!("{}", path?.rel_path);
                }
            }
        }

        Ok(())
    }
}
