//! Source Map Revision 3 documents for compiled style sheets.
//!
//! `grass` does not report output spans, so `mappings` is left empty; the map attributes each
//! style sheet to the exact set of files it was built from.

use std::path;

use anyhow::Context as _;

use crate::error::Result;
use crate::files;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize source map")
    }
}

/// Where a map and its style sheet live, for resolving the URLs inside both.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MapLayout<'a> {
    pub(crate) root: &'a path::Path,
    pub(crate) source_dir: &'a path::Path,
    pub(crate) css_path: &'a path::Path,
    pub(crate) map_path: &'a path::Path,
}

impl MapLayout<'_> {
    fn map_dir(&self) -> &path::Path {
        self.map_path.parent().unwrap_or(self.root)
    }

    fn css_dir(&self) -> &path::Path {
        self.css_path.parent().unwrap_or(self.root)
    }

    pub(crate) fn build(&self, loaded: &[path::PathBuf], include_content: bool) -> SourceMap {
        let file = files::relative_url(self.root, self.map_dir(), self.css_path);
        let mut source_root = files::relative_url(self.root, self.map_dir(), self.source_dir);
        if !source_root.is_empty() && !source_root.ends_with('/') {
            source_root.push('/');
        }
        let sources = loaded
            .iter()
            .map(|p| files::relative_url(self.root, self.source_dir, p))
            .collect();
        let sources_content = include_content.then(|| {
            loaded
                .iter()
                .map(|p| std::fs::read_to_string(p).ok())
                .collect()
        });

        SourceMap {
            version: 3,
            file,
            source_root: Some(source_root),
            sources,
            sources_content,
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    /// The comment appended to the style sheet pointing at its map.
    pub(crate) fn mapping_url_comment(&self) -> String {
        let url = files::relative_url(self.root, self.css_dir(), self.map_path);
        format!("/*# sourceMappingURL={url} */\n")
    }
}

/// Attach the map comment to `css`, keeping it on its own line.
pub(crate) fn link(mut css: String, comment: &str) -> String {
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }
    css.push_str(comment);
    css
}
