use relative_path::{RelativePath, RelativePathBuf};

/// A path relative to the project root.
///
/// Rejects absolute paths and is always normalized, so `./static/` and
/// `static` compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct RelPath(RelativePathBuf);

impl RelPath {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_unchecked<S: AsRef<str>>(value: S) -> Self {
        Self(RelativePath::new(value.as_ref()).normalize())
    }

    pub fn as_path(&self) -> &RelativePath {
        self.0.as_relative_path()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_inner(self) -> RelativePathBuf {
        self.0
    }

    /// Resolve against `root` into a filesystem path.
    pub fn to_path(&self, root: &std::path::Path) -> std::path::PathBuf {
        self.0.to_path(root)
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<&str> for RelPath {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let path = std::path::Path::new(value);
        if path.is_absolute() || path.has_root() {
            Err("Absolute paths are not supported")
        } else {
            Ok(Self::from_unchecked(value))
        }
    }
}

impl TryFrom<String> for RelPath {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value: &str = &value;
        value.try_into()
    }
}

impl std::ops::Deref for RelPath {
    type Target = RelativePath;

    #[inline]
    fn deref(&self) -> &RelativePath {
        self.as_path()
    }
}

impl AsRef<RelativePath> for RelPath {
    #[inline]
    fn as_ref(&self) -> &RelativePath {
        self.as_path()
    }
}

impl<'de> serde::Deserialize<'de> for RelPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        let rel_path = s.try_into().map_err(serde::de::Error::custom)?;
        Ok(rel_path)
    }
}
