//! File-backed storage and persistence.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::storage::Storage;

/// Storage persisted as a flat JSON object on disk.
///
/// Reads are served from memory. Every write rewrites the whole file while
/// holding `write_lock`, so concurrent writers never interleave.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: DashMap<String, String>,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open the storage at `path`, loading existing entries if the file exists.
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let cache = DashMap::new();

        match Self::read_file(&path) {
            Ok(Some(map)) => {
                for (k, v) in map {
                    cache.insert(k, v);
                }
                tracing::debug!(path = %path.display(), keys = cache.len(), "Loaded storage file");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Storage file unreadable, starting empty");
            }
        }

        Self {
            path,
            cache,
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> std::io::Result<Option<BTreeMap<String, String>>> {
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        let map = serde_json::from_reader(reader)?;
        Ok(Some(map))
    }

    fn persist(&self) {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let map: BTreeMap<_, _> = self
            .cache
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        if let Err(e) = self.write_file(&map) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist storage file");
        }
    }

    fn write_file(&self, map: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(Self::create_private(&self.path)?);
        serde_json::to_writer(writer, map)?;
        Ok(())
    }

    /// Truncate or create the file readable by the owner only; it holds tokens.
    #[cfg(unix)]
    fn create_private(path: &Path) -> std::io::Result<File> {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // `mode` only applies on creation; tighten files written by older versions.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }

    #[cfg(not(unix))]
    fn create_private(path: &Path) -> std::io::Result<File> {
        File::create(path)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.cache.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&self, key: &str) {
        if self.cache.remove(key).is_some() {
            self.persist();
        }
    }
}
