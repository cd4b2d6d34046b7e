//! Append-only persistence
//!
//! Layout: one header record followed by one record per entry. Every
//! record is a 4-byte big-endian length prefix and a JSON body. The
//! header carries the format version and the genesis hash. Writes go
//! through `O_APPEND` semantics; reads are streaming.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

use crate::entry::AuditEntry;
use crate::error::{AuditError, Result};
use crate::hash::EntryHash;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// First record of every chain file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainHeader {
    /// On-disk format version.
    pub format_version: u32,
    /// Genesis hash the chain is anchored to.
    pub genesis_hash: EntryHash,
}

impl ChainHeader {
    /// Header for a freshly created store.
    pub fn current() -> Self {
        ChainHeader {
            format_version: FORMAT_VERSION,
            genesis_hash: EntryHash::GENESIS,
        }
    }
}

fn write_record<W: Write>(writer: &mut W, body: &[u8]) -> Result<()> {
    let len = u32::try_from(body.len())
        .map_err(|_| AuditError::StoreFormat("record exceeds u32 length".to_string()))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(body)?;
    Ok(())
}

fn read_record<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_bytes) as usize;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Append-only writer for a chain file.
pub struct ChainWriter {
    writer: BufWriter<File>,
}

impl ChainWriter {
    /// Create a new store, writing the header record.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        let header = serde_json::to_vec(&ChainHeader::current())?;
        write_record(&mut writer, &header)?;
        writer.flush()?;
        debug!(path = %path.display(), "audit store created");
        Ok(ChainWriter { writer })
    }

    /// Open an existing store for appending. The header is validated.
    pub fn open_append(path: &Path) -> Result<Self> {
        ChainReader::open(path)?; // header validation only
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(ChainWriter {
            writer: BufWriter::new(file),
        })
    }

    /// Append one sealed entry and flush it to the file.
    pub fn append_entry(&mut self, entry: &AuditEntry) -> Result<()> {
        let body = serde_json::to_vec(entry)?;
        write_record(&mut self.writer, &body)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Streaming reader for a chain file.
#[derive(Debug)]
pub struct ChainReader {
    reader: BufReader<File>,
    header: ChainHeader,
}

impl ChainReader {
    /// Open a store and validate its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let header_bytes = read_record(&mut reader)?
            .ok_or_else(|| AuditError::StoreFormat("missing header record".to_string()))?;
        let header: ChainHeader = serde_json::from_slice(&header_bytes)?;
        if header.format_version != FORMAT_VERSION {
            return Err(AuditError::UnsupportedVersion {
                found: header.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if header.genesis_hash != EntryHash::GENESIS {
            return Err(AuditError::StoreFormat(
                "unexpected genesis hash in header".to_string(),
            ));
        }
        Ok(ChainReader { reader, header })
    }

    /// The validated header.
    pub fn header(&self) -> &ChainHeader {
        &self.header
    }

    /// Read the next entry, or `None` at end of file.
    pub fn next_entry(&mut self) -> Result<Option<AuditEntry>> {
        match read_record(&mut self.reader)? {
            Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
            None => Ok(None),
        }
    }

    /// Drain the remaining entries into a vector.
    pub fn read_all(mut self) -> Result<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
