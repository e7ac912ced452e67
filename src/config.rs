use std::path;

use anyhow::Context as _;

use crate::error::Result;
use crate::sass::SassCompiler;

/// Project settings with every path resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: path::PathBuf,
    pub source: path::PathBuf,
    pub pattern: String,
    pub ignore: Vec<String>,
    pub destination: path::PathBuf,
    pub sass: SassCompiler,
    pub source_maps: Option<SourceMapOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapOptions {
    /// Absolute directory receiving the `.css.map` files.
    pub directory: path::PathBuf,
    pub include_content: bool,
}

impl Config {
    pub fn from_config(source: sassline_config::Config) -> Result<Self> {
        let sassline_config::Config {
            root,
            source,
            pattern,
            destination,
            abs_dest,
            ignore,
            sass,
            source_maps,
        } = source;

        let root = dunce::canonicalize(&root)
            .with_context(|| format!("Failed to resolve project root `{}`", root.display()))?;
        // Symlinks resolved, matching the paths `notify` reports
        let source = resolve(&source.to_path(&root));
        let destination = resolve(&abs_dest.unwrap_or_else(|| destination.to_path(&root)));
        let load_paths = sass
            .load_paths
            .iter()
            .map(|p| root.join(p))
            .collect();
        let sass = SassCompiler {
            style: sass.style,
            load_paths,
        };
        let source_maps = source_maps.enabled.then(|| SourceMapOptions {
            directory: source_maps.directory.to_path(&destination),
            include_content: source_maps.include_content,
        });

        Ok(Self {
            root,
            source,
            pattern,
            ignore,
            destination,
            sass,
            source_maps,
        })
    }
}

/// Canonicalize the longest existing prefix of `path`, keeping the rest as written.
fn resolve(path: &path::Path) -> path::PathBuf {
    if let Ok(resolved) = dunce::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve(parent).join(name),
        _ => path.to_owned(),
    }
}
