pub mod dir;
pub mod memory;

use crate::codec::CodecError;
use thiserror::Error;

pub use dir::DirStore;
pub use memory::MemoryStore;

pub const USERNAME_KEY: &str = "username";
pub const PIXELS_KEY: &str = "pixels";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Byte values keyed by name. A `save` either lands completely or not at all.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn save(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// Keys become file names, so they are limited to `[A-Za-z0-9_-]+`.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
