use std::path::{Path, PathBuf};

/// A predicted structure to be scored, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    id: String,
    path: PathBuf,
}

impl Candidate {
    /// Builds a candidate whose identifier is the base name of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { id, path }
    }

    /// Builds a candidate with an explicit identifier.
    pub fn with_id(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The single structure every candidate of a run is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    path: PathBuf,
}

impl Reference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
