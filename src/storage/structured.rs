//! Typed binary records on top of [`StorageOutput`] / [`StorageInput`].
//!
//! All integers are little-endian. Every file written by [`StructWriter`]
//! ends with a CRC32 of its body, and [`StructReader::new`] refuses a file
//! whose checksum does not match. Truncated or corrupted index files are
//! therefore reported as [`MarqueeError::StorageUnavailable`] before any of
//! their content is interpreted.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{MarqueeError, Result};
use crate::storage::{StorageInput, StorageOutput};
use crate::util::varint;

const FOOTER_LEN: usize = 4;

/// Writes typed values and appends a checksum footer on close.
#[derive(Debug)]
pub struct StructWriter {
    output: Box<dyn StorageOutput>,
    hasher: Hasher,
    scratch: Vec<u8>,
}

impl StructWriter {
    pub fn new(output: Box<dyn StorageOutput>) -> Self {
        Self {
            output,
            hasher: Hasher::new(),
            scratch: Vec::with_capacity(16),
        }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.hasher.update(bytes);
        self.output.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put(&[value])
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let mut buf = std::mem::take(&mut self.scratch);
        buf.clear();
        varint::encode_u64(value, &mut buf);
        let result = self.put(&buf);
        self.scratch = buf;
        result
    }

    /// Length-prefixed byte string.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_varint(bytes.len() as u64)?;
        self.put(bytes)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Write the checksum footer, then sync and close the output.
    pub fn close(mut self) -> Result<()> {
        let checksum = self.hasher.clone().finalize();
        self.output.write_u32::<LittleEndian>(checksum)?;
        self.output.close()
    }
}

/// Reads values written by [`StructWriter`] after verifying the footer.
#[derive(Debug)]
pub struct StructReader {
    cursor: Cursor<Vec<u8>>,
    body_len: u64,
}

impl StructReader {
    pub fn new(mut input: Box<dyn StorageInput>) -> Result<Self> {
        let mut data = Vec::with_capacity(input.size()? as usize);
        input.read_to_end(&mut data)?;
        input.close()?;

        if data.len() < FOOTER_LEN {
            return Err(MarqueeError::storage("file too short for checksum footer"));
        }
        let body_len = data.len() - FOOTER_LEN;
        let mut footer = &data[body_len..];
        let expected = footer.read_u32::<LittleEndian>()?;
        let actual = crc32fast::hash(&data[..body_len]);
        if expected != actual {
            return Err(MarqueeError::storage(format!(
                "checksum mismatch: expected {expected:08x}, found {actual:08x}"
            )));
        }
        data.truncate(body_len);

        Ok(Self {
            cursor: Cursor::new(data),
            body_len: body_len as u64,
        })
    }

    fn truncated() -> MarqueeError {
        MarqueeError::storage("unexpected end of file")
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| Self::truncated())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| Self::truncated())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| Self::truncated())
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let pos = self.cursor.position() as usize;
        let (value, len) = varint::decode_u64(&self.cursor.get_ref()[pos..])?;
        self.cursor.set_position((pos + len) as u64);
        Ok(value)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_varint()?;
        if len > self.remaining() {
            return Err(Self::truncated());
        }
        let mut buf = vec![0u8; len as usize];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| Self::truncated())?;
        Ok(buf)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| MarqueeError::storage(format!("invalid UTF-8: {e}")))
    }

    /// Bytes left before the checksum footer.
    pub fn remaining(&self) -> u64 {
        self.body_len.saturating_sub(self.cursor.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    fn write_sample(storage: &MemoryStorage) {
        let mut writer = StructWriter::new(storage.create_output("s.bin").unwrap());
        writer.write_u8(7).unwrap();
        writer.write_u32(1_000_000).unwrap();
        writer.write_u64(u64::MAX).unwrap();
        writer.write_varint(300).unwrap();
        writer.write_string("dune").unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_read_back_values() {
        let storage = MemoryStorage::default();
        write_sample(&storage);

        let mut reader = StructReader::new(storage.open_input("s.bin").unwrap()).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_u32().unwrap(), 1_000_000);
        assert_eq!(reader.read_u64().unwrap(), u64::MAX);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_string().unwrap(), "dune");
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_corruption_is_detected() {
        let storage = MemoryStorage::default();
        write_sample(&storage);

        let mut data = Vec::new();
        storage
            .open_input("s.bin")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        data[3] ^= 0xFF;
        let mut out = storage.create_output("s.bin").unwrap();
        out.write_all(&data).unwrap();
        out.close().unwrap();

        let err = StructReader::new(storage.open_input("s.bin").unwrap()).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_too_short() {
        let storage = MemoryStorage::default();
        let mut out = storage.create_output("tiny").unwrap();
        out.write_all(&[1, 2]).unwrap();
        out.close().unwrap();
        assert!(StructReader::new(storage.open_input("tiny").unwrap()).is_err());
    }
}
