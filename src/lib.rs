//! Compile a tree of SCSS style sheets into CSS with source maps, once or on every change.
//!
//! ```no_run
//! # fn main() -> sassline::Result<()> {
//! let raw = sassline_config::Config::from_cwd(std::env::current_dir()?)?;
//! let pipeline = sassline::Pipeline::new(sassline::Config::from_config(raw)?)?;
//! let report = pipeline.compile()?;
//! println!("{} style sheets failed", report.failed.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod sass;
pub mod source_map;
pub mod watch;

mod config;
mod files;

pub use crate::config::{Config, SourceMapOptions};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{BuildReport, Job, JobFailure, Pipeline};
pub use crate::watch::{Watch, WatchOptions};
