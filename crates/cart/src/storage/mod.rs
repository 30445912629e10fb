//! Durable key-value storage for cart snapshots.
//!
//! [`CartStorage`] mirrors browser local storage: string keys, string values,
//! last write wins. The cart store serializes the snapshot itself and only
//! ever touches a single key.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - process-local map, shared between clones
//! - [`FileStorage`] - JSON object on disk, replaced atomically on write

mod file;
mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded.
    #[error("Corrupt storage: {0}")]
    Corrupt(String),

    /// A previous writer panicked while holding the storage lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string key-value store.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait CartStorage: Send + Sync {
    /// Read a value. Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Succeeds even if the key did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
