use std::cell::RefCell;
use std::io;
use std::path;

use anyhow::Context as _;
use sassline_config::SassOutputStyle;

use crate::error::Result;

/// Settings handed to `grass` for every compilation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SassCompiler {
    pub style: SassOutputStyle,
    /// Absolute directories searched after the importing file's own directory.
    pub load_paths: Vec<path::PathBuf>,
}

impl Default for SassCompiler {
    fn default() -> Self {
        Self {
            style: SassOutputStyle::Expanded,
            load_paths: Vec::new(),
        }
    }
}

/// Result of running one style sheet through `grass`.
#[derive(Debug)]
pub enum Compiled {
    Css {
        css: String,
        /// Every file the compiler read, entry point first.
        loaded: Vec<path::PathBuf>,
    },
    /// The compiler rejected the style sheet (bad syntax, unresolved import, ...).
    Rejected(Box<grass::Error>),
}

impl SassCompiler {
    /// Compile the style sheet at `file_path`.
    ///
    /// Errors are reserved for the entry file being unreadable; anything the compiler itself
    /// complains about is reported as [`Compiled::Rejected`].
    pub fn compile_file<F: AsRef<path::Path>>(&self, file_path: F) -> Result<Compiled> {
        self.compile_file_internal(file_path.as_ref())
    }

    fn compile_file_internal(&self, file_path: &path::Path) -> Result<Compiled> {
        let fs = TrackingFs::new(file_path);
        let options = grass::Options::default()
            .fs(&fs)
            .logger(&SassLogger)
            .style(match self.style {
                SassOutputStyle::Expanded => grass::OutputStyle::Expanded,
                SassOutputStyle::Compressed => grass::OutputStyle::Compressed,
            })
            .load_paths(&self.load_paths);

        let compiled = grass::from_path(file_path, &options);
        drop(options);
        if let Some(err) = fs.entry_error.into_inner() {
            return Err(err).with_context(|| format!("Could not read {}", file_path.display()));
        }
        let compiled = match compiled {
            Ok(css) => Compiled::Css {
                css,
                loaded: dedup(fs.loaded.into_inner()),
            },
            Err(err) => Compiled::Rejected(err),
        };
        Ok(compiled)
    }
}

fn dedup(paths: Vec<path::PathBuf>) -> Vec<path::PathBuf> {
    let mut seen = std::collections::HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Real filesystem access that remembers what the compiler loaded.
#[derive(Debug)]
struct TrackingFs<'p> {
    entry: &'p path::Path,
    loaded: RefCell<Vec<path::PathBuf>>,
    entry_error: RefCell<Option<io::Error>>,
}

impl<'p> TrackingFs<'p> {
    fn new(entry: &'p path::Path) -> Self {
        Self {
            entry,
            loaded: Default::default(),
            entry_error: Default::default(),
        }
    }
}

impl grass::Fs for TrackingFs<'_> {
    fn is_dir(&self, path: &path::Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &path::Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &path::Path) -> io::Result<Vec<u8>> {
        match std::fs::read(path) {
            Ok(content) => {
                self.loaded.borrow_mut().push(path.to_owned());
                Ok(content)
            }
            Err(err) => {
                if path == self.entry {
                    *self.entry_error.borrow_mut() = Some(io::Error::new(err.kind(), err.to_string()));
                }
                Err(err)
            }
        }
    }

    fn canonicalize(&self, path: &path::Path) -> io::Result<path::PathBuf> {
        dunce::canonicalize(path)
    }
}

/// Routes `@debug` and `@warn` through `log`.
#[derive(Debug)]
struct SassLogger;

impl grass::Logger for SassLogger {
    fn debug(&self, location: codemap::SpanLoc, message: &str) {
        log::debug!(
            "{}:{} {}",
            location.file.name(),
            location.begin.line + 1,
            message
        );
    }

    fn warn(&self, location: codemap::SpanLoc, message: &str) {
        log::warn!(
            "{}:{}:{} {}",
            location.file.name(),
            location.begin.line + 1,
            location.begin.column + 1,
            message
        );
    }
}
