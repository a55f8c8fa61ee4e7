use std::path::PathBuf;

/// Runtime configuration describing where the JSON store document lives.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub path: PathBuf,
}

impl FileStoreConfig {
    /// Construct a configuration pointing at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling path used to stage a write before it replaces the document.
    pub(super) fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "store.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
