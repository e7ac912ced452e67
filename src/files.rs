use std::fs;
use std::io::Write;
use std::path;

use anyhow::Context as _;
use relative_path::RelativePathBuf;

use crate::error::Result;

/// Whether a write reached the disk or was skipped because the contents already matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Written {
    Changed,
    Unchanged,
}

/// Atomically replace `dest_file` with `content`.
///
/// The content lands in a temporary file beside the target and is renamed over it, so readers
/// only ever see the old or the new file. Identical content is left alone to keep the
/// modification time stable.
pub(crate) fn write_document_file<S: AsRef<[u8]>, P: AsRef<path::Path>>(
    content: S,
    dest_file: P,
) -> Result<Written> {
    write_document_file_internal(content.as_ref(), dest_file.as_ref())
}

fn write_document_file_internal(content: &[u8], dest_file: &path::Path) -> Result<Written> {
    if let Ok(existing) = fs::read(dest_file) {
        if existing == content {
            log::trace!("Unchanged {}", dest_file.display());
            return Ok(Written::Unchanged);
        }
    }

    let parent = dest_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path::Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Could not create {}", parent.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Could not create {}", dest_file.display()))?;
    file.write_all(content)
        .with_context(|| format!("Could not write {}", dest_file.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .with_context(|| format!("Could not write {}", dest_file.display()))?;
    }
    file.persist(dest_file)
        .map_err(|e| e.error)
        .with_context(|| format!("Could not write {}", dest_file.display()))?;

    log::trace!("Wrote {}", dest_file.display());
    Ok(Written::Changed)
}

/// `path` relative to `root`, when it lives underneath it.
pub(crate) fn rel_to_root(root: &path::Path, path: &path::Path) -> Option<RelativePathBuf> {
    let rel = path.strip_prefix(root).ok()?;
    RelativePathBuf::from_path(rel).ok().map(|p| p.normalize())
}

/// A `/`-separated URL leading from the directory `from_dir` to `to`.
///
/// Falls back to the absolute path of `to` when either side is outside of `root`.
pub(crate) fn relative_url(root: &path::Path, from_dir: &path::Path, to: &path::Path) -> String {
    match (rel_to_root(root, from_dir), rel_to_root(root, to)) {
        (Some(from_dir), Some(to)) => from_dir.relative(to).into_string(),
        _ => to.display().to_string().replace('\\', "/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/site.css");
        let written = write_document_file("a {}\n", &dest).unwrap();
        assert_eq!(written, Written::Changed);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "a {}\n");
    }

    #[test]
    fn write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("site.css");
        write_document_file("a {}\n", &dest).unwrap();
        let written = write_document_file("b {}\n", &dest).unwrap();
        assert_eq!(written, Written::Changed);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "b {}\n");
        // Only the target remains, no temporaries
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_skips_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("site.css");
        write_document_file("a {}\n", &dest).unwrap();
        let written = write_document_file("a {}\n", &dest).unwrap();
        assert_eq!(written, Written::Unchanged);
    }

    #[test]
    fn relative_url_sibling_dirs() {
        let root = path::Path::new("/project");
        let actual = relative_url(
            root,
            &root.join("static/sourcemaps"),
            &root.join("sass/a.scss"),
        );
        assert_eq!(actual, "../../sass/a.scss");
    }

    #[test]
    fn relative_url_child() {
        let root = path::Path::new("/project");
        let actual = relative_url(
            root,
            &root.join("static"),
            &root.join("static/sourcemaps/a.css.map"),
        );
        assert_eq!(actual, "sourcemaps/a.css.map");
    }

    #[test]
    fn relative_url_outside_root() {
        let root = path::Path::new("/project");
        let actual = relative_url(root, &root.join("static"), path::Path::new("/opt/lib.scss"));
        assert_eq!(actual, "/opt/lib.scss");
    }
}
