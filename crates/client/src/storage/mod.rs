//! Durable client-side storage.
//!
//! Persists small JSON documents under string keys: per-user cart lines and
//! the cached identity. There is no schema versioning - a value that fails
//! to parse is treated as absent by the consumers in [`crate::cart`] and
//! [`crate::session`].
//!
//! Storage faults are recoverable by design: callers log and carry on with
//! in-memory state rather than failing the action that triggered the write.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors that can occur reading or writing stored values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A key/value store for JSON-serialized client state.
///
/// Implementations must be safe to share across tasks; all methods take
/// `&self`.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage keys for client state.
pub mod keys {
    use jacaranda_core::UserId;

    /// Key for the cached identity of the logged-in user.
    pub const SESSION_USER: &str = "session:user";

    /// Key for a user's persisted cart lines.
    #[must_use]
    pub fn cart(user_id: &UserId) -> String {
        format!("cart:{user_id}")
    }
}
