use crate::Result;
use crate::SourcePath;
use crate::Status;

/// The style sheets under `root` selected by a glob, minus ignored entries.
///
/// Nothing is cached: every call to [`Source::iter`] walks the tree again.
#[derive(Debug, Clone)]
pub struct Source {
    root: std::path::PathBuf,
    pattern: ignore::overrides::Override,
    ignore: ignore::gitignore::Gitignore,
}

impl Source {
    pub fn new<'i>(
        root: &std::path::Path,
        pattern: &str,
        ignores: impl IntoIterator<Item = &'i str>,
    ) -> Result<Self> {
        let mut matcher = ignore::overrides::OverrideBuilder::new(root);
        matcher.add(pattern).map_err(|e| {
            Status::new("Invalid source pattern")
                .with_source(e)
                .context_with(|c| c.insert("Pattern", pattern.to_owned()))
        })?;
        let pattern = matcher.build().map_err(|e| {
            Status::new("Invalid source pattern")
                .with_source(e)
                .context_with(|c| c.insert("Pattern", pattern.to_owned()))
        })?;

        let mut ignore = ignore::gitignore::GitignoreBuilder::new(root);
        ignore
            .add_line(None, ".*")
            .map_err(|e| Status::new("Invalid ignore entry").with_source(e))?;
        for line in ignores.into_iter() {
            ignore
                .add_line(None, line)
                .map_err(|e| Status::new("Invalid ignore entry").with_source(e))?;
        }
        let ignore = ignore
            .build()
            .map_err(|e| Status::new("Invalid ignore entry").with_source(e))?;

        let source = Self {
            root: root.to_owned(),
            pattern,
            ignore,
        };
        Ok(source)
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Whether `file` belongs to the source set, without touching the filesystem.
    pub fn includes_file(&self, file: &std::path::Path) -> bool {
        if !file.starts_with(&self.root) || file == self.root {
            return false;
        }
        let is_dir = false;
        self.matches_pattern(file) && self.includes_path(file, is_dir)
    }

    pub fn includes_dir(&self, dir: &std::path::Path) -> bool {
        let is_dir = true;
        self.includes_path(dir, is_dir)
    }

    /// Walk the source set.
    ///
    /// A missing root is an empty set; any other walk failure is yielded as an error.
    pub fn iter(&self) -> impl Iterator<Item = Result<SourcePath>> + '_ {
        walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| self.includes_entry(e))
            .filter_map(move |e| match e {
                Ok(e) => (e.file_type().is_file() && self.matches_pattern(e.path()))
                    .then(|| SourcePath::from_root(&self.root, e.path()))
                    .flatten()
                    .map(Ok),
                Err(e) if is_missing_root(&e) => None,
                Err(e) => {
                    let path = e.path().unwrap_or(&self.root).to_owned();
                    Some(Err(Status::new("Failed to read source")
                        .with_source(e)
                        .context_with(|c| c.insert("Path", path.display().to_string()))))
                }
            })
    }

    fn matches_pattern(&self, file: &std::path::Path) -> bool {
        match self.pattern.matched(file, false) {
            ignore::Match::Whitelist(_) => true,
            ignore::Match::None | ignore::Match::Ignore(_) => false,
        }
    }

    fn includes_path(&self, path: &std::path::Path, is_dir: bool) -> bool {
        if path == self.root {
            return true;
        }

        let parent = path.parent();
        if let Some(parent) = parent {
            if parent.starts_with(&self.root) && !self.includes_path(parent, true) {
                return false;
            }
        }

        self.includes_path_leaf(path, is_dir)
    }

    fn includes_path_leaf(&self, path: &std::path::Path, is_dir: bool) -> bool {
        match self.ignore.matched(path, is_dir) {
            ignore::Match::None => true,
            ignore::Match::Ignore(glob) => {
                log::trace!("{:?}: ignored {:?}", path, glob.original());
                false
            }
            ignore::Match::Whitelist(glob) => {
                log::trace!("{:?}: allowed {:?}", path, glob.original());
                true
            }
        }
    }

    fn includes_entry(&self, entry: &walkdir::DirEntry) -> bool {
        let file = entry.path();

        // Assumption: The parent paths will have been checked before we even get to this point.
        let is_dir = entry.file_type().is_dir();
        self.includes_path_leaf(file, is_dir)
    }
}

fn is_missing_root(err: &walkdir::Error) -> bool {
    err.depth() == 0
        && err
            .io_error()
            .map(|e| e.kind() == std::io::ErrorKind::NotFound)
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_includes_dir {
        ($root:expr, $ignores:expr, $test:expr, $included:expr) => {
            let root = $root;
            let ignores = $ignores.clone();
            let files = Source::new(std::path::Path::new(root), "**/*.scss", ignores).unwrap();
            assert_eq!(files.includes_dir(std::path::Path::new($test)), $included);
        };
    }
    macro_rules! assert_includes_file {
        ($root:expr, $pattern:expr, $ignores:expr, $test:expr, $included:expr) => {
            let root = $root;
            let ignores = $ignores.clone();
            let files = Source::new(std::path::Path::new(root), $pattern, ignores).unwrap();
            assert_eq!(files.includes_file(std::path::Path::new($test)), $included);
        };
    }

    fn touch(root: &std::path::Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn files_includes_root_dir() {
        assert_includes_dir!("/usr/site/sass", &[], "/usr/site/sass", true);
    }

    #[test]
    fn files_includes_child_dir() {
        assert_includes_dir!("/usr/site/sass", &[], "/usr/site/sass/child", true);
    }

    #[test]
    fn files_ignores_hidden_dir() {
        assert_includes_dir!("/usr/site/sass", &[], "/usr/site/sass/.cache", false);
    }

    #[test]
    fn files_includes_matching_file() {
        assert_includes_file!(
            "/usr/site/sass",
            "**/*.scss",
            &[],
            "/usr/site/sass/main.scss",
            true
        );
    }

    #[test]
    fn files_includes_nested_matching_file() {
        assert_includes_file!(
            "/usr/site/sass",
            "**/*.scss",
            &[],
            "/usr/site/sass/pages/home/main.scss",
            true
        );
    }

    #[test]
    fn files_excludes_other_extensions() {
        assert_includes_file!(
            "/usr/site/sass",
            "**/*.scss",
            &[],
            "/usr/site/sass/main.css",
            false
        );
    }

    #[test]
    fn files_excludes_outside_root() {
        assert_includes_file!(
            "/usr/site/sass",
            "**/*.scss",
            &[],
            "/usr/site/static/main.scss",
            false
        );
    }

    #[test]
    fn files_anchored_pattern() {
        assert_includes_file!(
            "/usr/site/sass",
            "/pages/*.scss",
            &[],
            "/usr/site/sass/pages/home.scss",
            true
        );
        assert_includes_file!(
            "/usr/site/sass",
            "/pages/*.scss",
            &[],
            "/usr/site/sass/home.scss",
            false
        );
    }

    #[test]
    fn files_ignore_hidden() {
        assert_includes_file!(
            "/usr/site/sass",
            "**/*.scss",
            &[],
            "/usr/site/sass/.child.scss",
            false
        );
    }

    #[test]
    fn files_not_ignored_by_parent() {
        assert_includes_file!(
            "/tmp/.foo/site/sass",
            "**/*.scss",
            &[],
            "/tmp/.foo/site/sass/child.scss",
            true
        );
    }

    #[test]
    fn files_ignore_pattern() {
        assert_includes_file!(
            "/usr/site/sass",
            "**/*.scss",
            &["vendor/"],
            "/usr/site/sass/vendor/bootstrap.scss",
            false
        );
    }

    #[test]
    fn iter_walks_sorted_matches() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.scss");
        touch(dir.path(), "a.scss");
        touch(dir.path(), "nested/_partial.scss");
        touch(dir.path(), "nested/c.scss");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), ".hidden/d.scss");

        let source = Source::new(dir.path(), "**/*.scss", []).unwrap();
        let actual: Vec<_> = source
            .iter()
            .map(|p| p.unwrap().rel_path.as_str().to_owned())
            .collect();
        assert_eq!(
            actual,
            vec!["a.scss", "b.scss", "nested/_partial.scss", "nested/c.scss"]
        );
    }

    #[test]
    fn iter_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::new(dir.path(), "**/*.scss", []).unwrap();
        assert_eq!(source.iter().count(), 0);
    }

    #[test]
    fn iter_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::new(&dir.path().join("missing"), "**/*.scss", []).unwrap();
        assert_eq!(source.iter().count(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn iter_reports_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.scss");
        touch(dir.path(), "private/b.scss");
        let private = dir.path().join("private");
        std::fs::set_permissions(&private, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read_dir(&private).is_ok() {
            // Running with privileges that bypass permission bits
            std::fs::set_permissions(&private, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let source = Source::new(dir.path(), "**/*.scss", []).unwrap();
        let actual: Vec<_> = source.iter().collect();
        std::fs::set_permissions(&private, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(actual.len(), 2, "{actual:?}");
        assert_eq!(actual[0].as_ref().unwrap().rel_path.as_str(), "a.scss");
        assert!(actual[1].is_err());
    }

    #[test]
    fn iter_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.scss");
        let source = Source::new(dir.path(), "**/*.scss", []).unwrap();
        assert_eq!(source.iter().count(), 1);

        touch(dir.path(), "b.scss");
        assert_eq!(source.iter().count(), 2);
    }

    #[test]
    fn invalid_pattern() {
        let result = Source::new(std::path::Path::new("/usr/site/sass"), "a/**{", []);
        assert!(result.is_err());
    }
}
