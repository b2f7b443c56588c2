//! In-memory storage backend.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{MarqueeError, Result};
use crate::storage::{Storage, StorageInput, StorageOutput};

type FileMap = Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStorageConfig {}

/// Keeps every file as an immutable byte buffer.
///
/// Writes become visible when the output is synced or closed. The backend
/// can be switched to read-only, after which every mutation fails with
/// [`MarqueeError::StorageUnavailable`]; this is how failing disks are
/// simulated in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: FileMap,
    read_only: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new(_config: MemoryStorageConfig) -> Self {
        Self::default()
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self, op: &str, name: &str) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(MarqueeError::storage(format!(
                "cannot {op} {name}: storage is read-only"
            )));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let data = self
            .files
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MarqueeError::storage(format!("file not found: {name}")))?;
        Ok(Box::new(MemoryInput {
            cursor: Cursor::new(SharedBytes(data)),
        }))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_writable("create", name)?;
        Ok(Box::new(MemoryOutput {
            name: name.to_string(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
            read_only: Arc::clone(&self.read_only),
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_writable("delete", name)?;
        self.files.write().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.files.read().keys().cloned().collect())
    }

    fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        self.check_writable("rename", from)?;
        let mut files = self.files.write();
        let data = files
            .remove(from)
            .ok_or_else(|| MarqueeError::storage(format!("file not found: {from}")))?;
        files.insert(to.to_string(), data);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SharedBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug)]
struct MemoryInput {
    cursor: Cursor<SharedBytes>,
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.cursor.get_ref().0.len() as u64)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: FileMap,
    read_only: Arc<AtomicBool>,
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(MarqueeError::storage(format!(
                "cannot write {}: storage is read-only",
                self.name
            )));
        }
        self.files
            .write()
            .insert(self.name.clone(), Arc::new(self.buffer.clone()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}
