//! Named-resource access for simulation inputs and recorded frames.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Read-only store of text resources addressed by `/`-separated paths.
///
/// Shared by every frame worker, so implementations must be thread-safe.
pub trait SnapshotSource: Send + Sync {
    /// Open a resource for buffered reading.
    fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + Send>>;

    /// Check whether a resource exists.
    fn file_exists(&self, path: &str) -> bool;

    /// Read a whole resource as text.
    fn read_all_text(&self, path: &str) -> io::Result<String> {
        let mut text = String::new();
        self.open(path)?.read_to_string(&mut text)?;
        Ok(text)
    }

    /// Stream a resource line by line.
    fn read_lines(&self, path: &str) -> io::Result<io::Lines<Box<dyn BufRead + Send>>> {
        Ok(self.open(path)?.lines())
    }
}

/// Resources stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl SnapshotSource for FsSource {
    fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + Send>> {
        let file = File::open(self.resolve(path))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }
}

/// Resources held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl SnapshotSource for MemorySource {
    fn open(&self, path: &str) -> io::Result<Box<dyn BufRead + Send>> {
        match self.files.get(path) {
            Some(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No resource named {}", path),
            )),
        }
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}
