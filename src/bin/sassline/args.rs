use std::env;
use std::io::Write as _;
use std::path;

use anyhow::Context as _;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub(crate) struct ConfigArgs {
    /// Config file to use [default: _sassline.yml]
    #[arg(short, long, value_name = "FILE")]
    pub(crate) config: Option<path::PathBuf>,

    /// Directory to look for the project in [default: current directory]
    #[arg(long, value_name = "DIR", conflicts_with = "config")]
    pub(crate) root: Option<path::PathBuf>,

    /// Site destination folder [default: ./static]
    #[arg(short, long, value_name = "DIR")]
    pub(crate) destination: Option<path::PathBuf>,

    /// Don't write source maps
    #[arg(long)]
    pub(crate) no_source_maps: bool,
}

impl ConfigArgs {
    pub(crate) fn load_config(&self) -> Result<sassline_config::Config> {
        let cwd = env::current_dir().context("Failed to read the current directory")?;

        // Fetch config information if available
        let mut config = if let Some(config_path) = self.config.as_deref() {
            sassline_config::Config::from_file(config_path).with_context(|| {
                anyhow::format_err!("Error reading config file {}", config_path.display())
            })?
        } else {
            let root = self
                .root
                .as_deref()
                .map(|root| cwd.join(root))
                .unwrap_or_else(|| cwd.clone());
            sassline_config::Config::from_cwd(root)?
        };

        config.abs_dest = self.destination.as_deref().map(|dest| cwd.join(dest));
        if self.no_source_maps {
            log::debug!("Overriding config `source_maps.enabled` with `false`");
            config.source_maps.enabled = false;
        }

        Ok(config)
    }
}

pub(crate) fn init_logging(level: log::LevelFilter) {
    let write_style = match colorchoice::ColorChoice::global() {
        colorchoice::ColorChoice::Auto => env_logger::WriteStyle::Auto,
        colorchoice::ColorChoice::AlwaysAnsi | colorchoice::ColorChoice::Always => {
            env_logger::WriteStyle::Always
        }
        colorchoice::ColorChoice::Never => env_logger::WriteStyle::Never,
    };

    let mut builder = env_logger::Builder::new();
    builder.write_style(write_style);
    builder.filter(None, level);
    builder.format(|f, record| {
        let style = level_style(record.level());
        let level = format!("[{}]", record.level()).to_lowercase();
        writeln!(f, "{style}{level:8}{style:#} {}", record.args())
    });
    builder.init();
}

fn level_style(level: log::Level) -> anstyle::Style {
    match level {
        log::Level::Error => anstyle::AnsiColor::Red
            .on_default()
            .effects(anstyle::Effects::BOLD),
        log::Level::Warn => anstyle::AnsiColor::Yellow.on_default(),
        log::Level::Info => anstyle::AnsiColor::Green.on_default(),
        log::Level::Debug => anstyle::AnsiColor::Blue.on_default(),
        log::Level::Trace => anstyle::AnsiColor::Cyan.on_default(),
    }
}
