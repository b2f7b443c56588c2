//! Directory-backed storage.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarqueeError, Result};
use crate::storage::{Storage, StorageInput, StorageOutput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStorageConfig {
    /// Directory holding the index files. Created if missing.
    pub path: PathBuf,
    /// Call `fsync` when an output is synced.
    #[serde(default = "default_sync")]
    pub sync: bool,
}

fn default_sync() -> bool {
    true
}

impl FileStorageConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sync: true,
        }
    }
}

/// Stores each file as a regular file inside one directory.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    sync: bool,
}

impl FileStorage {
    pub fn new(config: FileStorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.path).map_err(|e| {
            MarqueeError::storage(format!(
                "cannot create index directory {}: {e}",
                config.path.display()
            ))
        })?;
        if !config.path.is_dir() {
            return Err(MarqueeError::storage(format!(
                "{} is not a directory",
                config.path.display()
            )));
        }
        Ok(Self {
            root: config.path,
            sync: config.sync,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn io_err(op: &str, path: &Path, err: io::Error) -> MarqueeError {
        MarqueeError::storage(format!("cannot {op} {}: {err}", path.display()))
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let path = self.path_of(name);
        let file = File::open(&path).map_err(|e| Self::io_err("open", &path, e))?;
        let size = file
            .metadata()
            .map_err(|e| Self::io_err("stat", &path, e))?
            .len();
        Ok(Box::new(FileInput {
            reader: BufReader::new(file),
            size,
        }))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let path = self.path_of(name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Self::io_err("create", &path, e))?;
        Ok(Box::new(FileOutput {
            writer: BufWriter::new(file),
            sync: self.sync,
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.path_of(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err("delete", &path, e)),
        }
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| Self::io_err("list", &self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let src = self.path_of(from);
        fs::rename(&src, self.path_of(to)).map_err(|e| Self::io_err("rename", &src, e))
    }
}

#[derive(Debug)]
struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct FileOutput {
    writer: BufWriter<File>,
    sync: bool,
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        if self.sync {
            self.writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush_and_sync()
    }
}
