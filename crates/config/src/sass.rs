use std::path;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct Sass {
    pub style: SassOutputStyle,
    /// Extra directories searched when resolving `@use` and `@import`.
    ///
    /// Relative entries are resolved against the project root.
    pub load_paths: Vec<path::PathBuf>,
}

impl Default for Sass {
    fn default() -> Self {
        Self {
            style: Default::default(),
            load_paths: vec![path::PathBuf::from("node_modules")],
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum SassOutputStyle {
    #[default]
    Expanded,
    Compressed,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct SourceMaps {
    pub enabled: bool,
    /// Where maps are written, relative to the destination.
    pub directory: crate::RelPath,
    /// Embed the original sources in `sourcesContent`.
    pub include_content: bool,
}

impl Default for SourceMaps {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: crate::RelPath::from_unchecked("sourcemaps"),
            include_content: false,
        }
    }
}
