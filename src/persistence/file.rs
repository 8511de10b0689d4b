//! File-backed slot

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{PersistenceAdapter, PersistenceError};

/// A slot stored as `<dir>/<name>.json`.
///
/// Writes go to a sibling temporary file that is then renamed over the slot, so a reader
/// sees either the previous cart or the new one.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot `name` inside `dir`. Neither has to exist yet.
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{name}.json")),
        }
    }

    /// Path of the slot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            slot: self.path.display().to_string(),
            source,
        }
    }
}

impl PersistenceAdapter for FileSlot {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn store(&mut self, payload: &str) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|error| self.io_error(error))?;
        }

        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, payload).map_err(|error| self.io_error(error))?;
        fs::rename(&staging, &self.path).map_err(|error| self.io_error(error))?;

        debug!(slot = %self.path.display(), bytes = payload.len(), "stored cart");

        Ok(())
    }
}
