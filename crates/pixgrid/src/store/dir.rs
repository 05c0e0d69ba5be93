use crate::store::{KeyValueStore, StorageError, validate_key};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Directory-backed store, one file per key.
///
/// Storage layout:
/// - every key lives in `<data_dir>/<key>.dat`
/// - a write goes to `<data_dir>/.<key>.tmp` first and is renamed over the
///   target, so readers see either the old or the new value
pub struct DirStore {
    data_dir: PathBuf,
}

impl DirStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        debug!("Opened directory store at {:?}", data_dir);
        Ok(Self { data_dir })
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.dat"))
    }

    fn scratch_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!(".{key}.tmp"))
    }
}

impl KeyValueStore for DirStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        let path = self.value_path(key);
        match fs::read(&path) {
            Ok(bytes) => {
                trace!("Read {} bytes from {:?}", bytes.len(), path);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!("No value stored at {:?}", path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let scratch = self.scratch_path(key);
        let target = self.value_path(key);

        let mut file = File::create(&scratch)?;
        file.write_all(value)?;
        file.sync_data()?;
        drop(file);

        if let Err(e) = fs::rename(&scratch, &target) {
            let _ = fs::remove_file(&scratch);
            return Err(e.into());
        }
        trace!("Wrote {} bytes to {:?}", value.len(), target);
        Ok(())
    }
}
