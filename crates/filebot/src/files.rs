//! Access to the fixed directory the file tools expose

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// A single directory of entries the assistant may list and read
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of all entries, sorted. Creates the directory if it does not exist.
    pub fn list_entries(&self) -> io::Result<Vec<String>> {
        fs::create_dir_all(&self.dir)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        debug!(dir = %self.dir.display(), count = names.len(), "Listed entries");
        Ok(names)
    }

    /// Full text of the named entry, or `None` if there is no such file
    pub fn read_entry(&self, name: &str) -> io::Result<Option<String>> {
        let Some(path) = self.entry_path(name) else {
            return Ok(None);
        };

        if !path.is_file() {
            return Ok(None);
        }

        fs::read_to_string(&path).map(Some)
    }

    /// Resolve a bare entry name; anything that would leave the directory is rejected
    fn entry_path(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => Some(self.dir.join(part)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_creates_missing_dir() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("Files"));

        assert_eq!(store.list_entries().unwrap(), Vec::<String>::new());
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_list_is_sorted() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();
        fs::write(temp.path().join("a.json"), "{}").unwrap();

        let store = FileStore::new(temp.path());
        assert_eq!(store.list_entries().unwrap(), vec!["a.json", "b.txt"]);
    }

    #[test]
    fn test_read_entry() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("roster.txt"), "Alice\nBob\n").unwrap();

        let store = FileStore::new(temp.path());
        assert_eq!(
            store.read_entry("roster.txt").unwrap().as_deref(),
            Some("Alice\nBob\n")
        );
        assert_eq!(store.read_entry("missing.txt").unwrap(), None);
    }

    #[test]
    fn test_read_rejects_paths_outside_dir() {
        let temp = TempDir::new().unwrap();
        let inner = temp.path().join("Files");
        fs::create_dir_all(&inner).unwrap();
        fs::write(temp.path().join("secret.txt"), "nope").unwrap();

        let store = FileStore::new(&inner);
        assert_eq!(store.read_entry("../secret.txt").unwrap(), None);
        assert_eq!(store.read_entry("/etc/hostname").unwrap(), None);
        assert_eq!(store.read_entry("").unwrap(), None);
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();

        let store = FileStore::new(temp.path());
        assert_eq!(store.read_entry("nested").unwrap(), None);
    }
}
