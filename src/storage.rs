//! Pluggable byte storage for index files.
//!
//! The index never touches the filesystem directly. It reads and writes named
//! files through a [`Storage`] backend, which makes it possible to run the
//! same index code against a directory on disk or a purely in-memory map.
//!
//! # Example
//!
//! ```
//! use marquee::storage::{StorageConfig, StorageFactory};
//! use marquee::storage::memory::MemoryStorageConfig;
//! use std::io::{Read, Write};
//!
//! let storage = StorageFactory::create(StorageConfig::Memory(MemoryStorageConfig::default())).unwrap();
//! let mut output = storage.create_output("hello.bin").unwrap();
//! output.write_all(b"hi").unwrap();
//! output.close().unwrap();
//!
//! let mut input = storage.open_input("hello.bin").unwrap();
//! let mut buf = Vec::new();
//! input.read_to_end(&mut buf).unwrap();
//! assert_eq!(buf, b"hi");
//! ```

pub mod file;
pub mod memory;
pub mod structured;

use std::fmt::Debug;
use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use self::file::{FileStorage, FileStorageConfig};
use self::memory::{MemoryStorage, MemoryStorageConfig};

/// A readable file handle.
pub trait StorageInput: Read + Send + Debug {
    /// Total length of the file in bytes.
    fn size(&self) -> Result<u64>;

    /// Release the handle.
    fn close(&mut self) -> Result<()>;
}

/// A writable file handle.
///
/// Bytes written are not guaranteed to be visible to readers until
/// [`StorageOutput::flush_and_sync`] or [`StorageOutput::close`] returns.
pub trait StorageOutput: Write + Send + Debug {
    /// Flush buffered bytes and make them durable.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Flush, sync and release the handle.
    fn close(&mut self) -> Result<()>;
}

/// A flat namespace of named files.
pub trait Storage: Send + Sync + Debug {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create (or truncate) a file for writing.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    fn file_exists(&self, name: &str) -> bool;

    fn delete_file(&self, name: &str) -> Result<()>;

    /// Names of all files, in no particular order.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Atomically replace `to` with `from`.
    fn rename_file(&self, from: &str, to: &str) -> Result<()>;
}

/// Which storage backend to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    Memory(MemoryStorageConfig),
    File(FileStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(MemoryStorageConfig::default())
    }
}

/// Builds a [`Storage`] backend from its configuration.
pub struct StorageFactory;

impl StorageFactory {
    pub fn create(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(config) => Ok(Arc::new(MemoryStorage::new(config))),
            StorageConfig::File(config) => Ok(Arc::new(FileStorage::new(config)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_memory() {
        let storage = StorageFactory::create(StorageConfig::default()).unwrap();
        assert!(storage.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_factory_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::File(FileStorageConfig::new(dir.path().join("idx")));
        let storage = StorageFactory::create(config).unwrap();
        assert!(!storage.file_exists("missing"));
        assert!(dir.path().join("idx").is_dir());
    }

    #[test]
    fn test_config_serde() {
        let config: StorageConfig =
            serde_json::from_str(r#"{"type":"file","path":"/tmp/films"}"#).unwrap();
        match config {
            StorageConfig::File(file) => assert_eq!(file.path.to_str(), Some("/tmp/films")),
            other => panic!("unexpected config {other:?}"),
        }
    }
}
