#![allow(clippy::print_stdout)]

mod args;
mod build;
mod debug;
mod error;
mod watch;

use clap::Parser as _;
use proc_exit::prelude::*;

fn main() {
    human_panic::setup_panic!();
    let result = run();
    proc_exit::exit(result);
}

fn run() -> proc_exit::ExitResult {
    // clap's exit codes don't follow sysexits
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                proc_exit::sysexits::USAGE_ERR
            } else {
                proc_exit::Code::SUCCESS
            };
            return code.ok();
        }
    };

    cli.color.write_global();
    args::init_logging(cli.verbose.log_level_filter());

    let result = match cli.command {
        Some(command) => command.run(),
        None => cli.build.run(),
    };
    result.with_code(proc_exit::Code::FAILURE)?;

    Ok(())
}

/// Compile SCSS style sheets into CSS with source maps
#[derive(Debug, clap::Parser)]
#[command(about, version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    build: build::BuildArgs,

    #[command(flatten)]
    color: colorchoice_clap::Color,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::Subcommand)]
enum Command {
    Build(build::BuildArgs),
    Watch(watch::WatchArgs),
    Clean(build::CleanArgs),
    #[command(subcommand)]
    Debug(debug::DebugCommands),
}

impl Command {
    fn run(&self) -> error::Result<()> {
        match self {
            Self::Build(cmd) => cmd.run(),
            Self::Watch(cmd) => cmd.run(),
            Self::Clean(cmd) => cmd.run(),
            Self::Debug(cmd) => cmd.run(),
        }
    }
}

#[test]
fn verify_cli() {
    use clap::CommandFactory as _;
    Cli::command().debug_assert();
}
