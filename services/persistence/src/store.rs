//! Fixed-layout position store
//!
//! # Binary format
//! ```text
//! [magic:    u32]  "posn"
//! [version:  u32]
//! [capacity: u64]  number of slots
//! then `capacity` slots of
//! [record: RECORD bytes]  bincode-encoded Position, fixed width
//! [checksum: u32]         CRC32C over the record bytes
//! ```
//!
//! A slot whose record and checksum are all zero is unused; a position
//! for symbol 0 is never written. The slot count doubles whenever a
//! flush needs more room, so record offsets are stable between grows.

use crc32c::crc32c;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use types::position::Position;

/// Current store format version
pub const STORE_VERSION: u32 = 1;

const MAGIC: u32 = u32::from_le_bytes(*b"posn");
const HEADER_LEN: u64 = 16;
const INITIAL_CAPACITY: u64 = 1024;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("not a position store (magic {found:#010x})")]
    BadMagic { found: u32 },

    #[error("unsupported store version: {0}")]
    UnsupportedVersion(u32),

    #[error("store truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("corrupt record in slot {slot}")]
    Corrupt { slot: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// File-backed snapshot sink for ledger positions
pub struct PositionStore {
    file: File,
    path: PathBuf,
    capacity: u64,
    record_len: usize,
}

impl PositionStore {
    /// Open an existing store or create a fresh one
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let record_len = bincode::serialized_size(&Position::default())
            .map_err(|e| StoreError::Serialization(e.to_string()))? as usize;

        let len = file.metadata()?.len();
        let mut store = Self {
            file,
            path,
            capacity: INITIAL_CAPACITY,
            record_len,
        };

        if len < HEADER_LEN {
            store.initialize()?;
        } else {
            store.read_header(len)?;
        }
        Ok(store)
    }

    /// Number of slots currently backed by the file
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Write every position into consecutive slots, zeroing the rest
    ///
    /// Doubles the slot count first if the snapshot does not fit.
    /// Returns the number of records written.
    pub fn flush(&mut self, positions: &[Position]) -> Result<usize, StoreError> {
        while positions.len() as u64 > self.capacity {
            self.capacity *= 2;
        }

        let slot_len = self.slot_len();
        self.file.seek(SeekFrom::Start(0))?;
        let mut writer = BufWriter::new(&self.file);

        writer.write_all(&MAGIC.to_le_bytes())?;
        writer.write_all(&STORE_VERSION.to_le_bytes())?;
        writer.write_all(&self.capacity.to_le_bytes())?;

        for position in positions {
            let record = bincode::serialize(position)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if record.len() != self.record_len {
                return Err(StoreError::Serialization(format!(
                    "record is {} bytes, expected {}",
                    record.len(),
                    self.record_len
                )));
            }
            writer.write_all(&record)?;
            writer.write_all(&crc32c(&record).to_le_bytes())?;
        }

        let empty = vec![0u8; slot_len];
        for _ in positions.len() as u64..self.capacity {
            writer.write_all(&empty)?;
        }
        writer.flush()?;
        drop(writer);
        self.file.sync_all()?;

        info!(path = %self.path.display(), records = positions.len(), "positions flushed");
        Ok(positions.len())
    }

    /// Read every used slot back out
    pub fn load(&mut self) -> Result<Vec<Position>, StoreError> {
        let slot_len = self.slot_len();
        self.file.seek(SeekFrom::Start(HEADER_LEN))?;

        let mut positions = Vec::new();
        let mut slot = vec![0u8; slot_len];
        for index in 0..self.capacity as usize {
            self.file.read_exact(&mut slot)?;
            if slot.iter().all(|&b| b == 0) {
                continue;
            }
            let (record, checksum) = slot.split_at(self.record_len);
            let stored = u32::from_le_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
            if crc32c(record) != stored {
                return Err(StoreError::Corrupt { slot: index });
            }
            let position: Position = bincode::deserialize(record)
                .map_err(|_| StoreError::Corrupt { slot: index })?;
            if position.symbol.is_null() {
                continue;
            }
            positions.push(position);
        }

        info!(path = %self.path.display(), records = positions.len(), "positions loaded");
        Ok(positions)
    }

    fn slot_len(&self) -> usize {
        self.record_len + 4
    }

    fn initialize(&mut self) -> Result<(), StoreError> {
        self.capacity = INITIAL_CAPACITY;
        self.flush(&[])?;
        Ok(())
    }

    fn read_header(&mut self, file_len: u64) -> Result<(), StoreError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; HEADER_LEN as usize];
        self.file.read_exact(&mut header)?;

        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != MAGIC {
            return Err(StoreError::BadMagic { found: magic });
        }
        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }
        self.capacity = u64::from_le_bytes([
            header[8], header[9], header[10], header[11], header[12], header[13], header[14],
            header[15],
        ]);

        let expected = HEADER_LEN + self.capacity * self.slot_len() as u64;
        if file_len < expected {
            return Err(StoreError::Truncated {
                expected,
                actual: file_len,
            });
        }
        Ok(())
    }
}
