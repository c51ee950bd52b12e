//! Test fixtures for pkgrename.
//!
//! Builds small but well-formed PKG containers and param.sfo blobs in memory,
//! and writes them into temporary directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PKG_MAGIC: u32 = 0x7F434E54;
pub const SFO_MAGIC: u32 = 0x46535000;
pub const SFO_TYPE_UTF8: u16 = 0x0204;
pub const SFO_TYPE_INTEGER: u16 = 0x0404;

pub const ENTRY_DIGESTS: u32 = 0x0001;
pub const ENTRY_KEYS: u32 = 0x0010;
pub const ENTRY_PARAM_SFO: u32 = 0x1000;
pub const ENTRY_PLAYGO_CHUNK: u32 = 0x1001;
pub const ENTRY_CHANGELOG: u32 = 0x1260;

/// Content type of a game PKG.
pub const CONTENT_TYPE_GD: u32 = 0x1A;
/// Content type of a DLC PKG.
pub const CONTENT_TYPE_AC: u32 = 0x1B;

pub const CONTENT_ID: &str = "UP0000-CUSA00000_00-EXAMPLEGAME00000";

/// One param.sfo value.
#[derive(Debug, Clone, Copy)]
pub enum Param<'a> {
    Str(&'a str, &'a str),
    Int(&'a str, u32),
}

/// Lays out a param.sfo the way the PS4 SDK does: header, entry table, key
/// table, then a 4-byte aligned data table.
#[must_use]
pub fn build_sfo(params: &[Param<'_>]) -> Vec<u8> {
    let mut keys = Vec::new();
    let mut data = Vec::new();
    let mut table = Vec::new();

    for param in params {
        let (key, param_type, value) = match param {
            Param::Str(k, v) => {
                let mut bytes = v.as_bytes().to_vec();
                bytes.push(0);
                (*k, SFO_TYPE_UTF8, bytes)
            }
            Param::Int(k, v) => (*k, SFO_TYPE_INTEGER, v.to_le_bytes().to_vec()),
        };

        table.extend_from_slice(&(keys.len() as u16).to_le_bytes());
        table.extend_from_slice(&param_type.to_le_bytes());
        table.extend_from_slice(&(value.len() as u32).to_le_bytes());
        table.extend_from_slice(&(value.len() as u32).to_le_bytes());
        table.extend_from_slice(&(data.len() as u32).to_le_bytes());

        keys.extend_from_slice(key.as_bytes());
        keys.push(0);
        data.extend_from_slice(&value);
        while data.len() % 4 != 0 {
            data.push(0);
        }
    }
    while keys.len() % 4 != 0 {
        keys.push(0);
    }
    // Trailing padding keeps the last value strictly inside the buffer.
    data.extend_from_slice(&[0u8; 4]);

    let keytable = 20 + table.len();
    let datatable = keytable + keys.len();

    let mut out = Vec::new();
    out.extend_from_slice(&SFO_MAGIC.to_le_bytes());
    out.extend_from_slice(&0x0101u32.to_le_bytes());
    out.extend_from_slice(&(keytable as u32).to_le_bytes());
    out.extend_from_slice(&(datatable as u32).to_le_bytes());
    out.extend_from_slice(&(params.len() as u32).to_le_bytes());
    out.extend_from_slice(&table);
    out.extend_from_slice(&keys);
    out.extend_from_slice(&data);
    out
}

/// An entry-keys block whose key digest is `digest`.
#[must_use]
pub fn keys_block(digest: [u8; 32]) -> Vec<u8> {
    let mut block = vec![0u8; 32];
    block.extend_from_slice(&digest);
    block
}

/// Builds a PKG container with a header and an entry table.
///
/// Entry data is appended after the table in the order entries were added.
#[derive(Debug, Clone)]
pub struct PkgBuilder {
    content_id: String,
    content_type: u32,
    content_flags: u32,
    entries: Vec<(u32, Vec<u8>)>,
}

impl Default for PkgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PkgBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            content_id: CONTENT_ID.to_owned(),
            content_type: CONTENT_TYPE_GD,
            content_flags: 0x0A000000,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn content_id(mut self, content_id: &str) -> Self {
        self.content_id = content_id.to_owned();
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: u32) -> Self {
        self.content_type = content_type;
        self
    }

    #[must_use]
    pub fn content_flags(mut self, flags: u32) -> Self {
        self.content_flags = flags;
        self
    }

    #[must_use]
    pub fn entry(mut self, id: u32, data: Vec<u8>) -> Self {
        self.entries.push((id, data));
        self
    }

    /// Adds a param.sfo entry.
    #[must_use]
    pub fn sfo(self, params: &[Param<'_>]) -> Self {
        self.entry(ENTRY_PARAM_SFO, build_sfo(params))
    }

    /// Adds a changelog entry.
    #[must_use]
    pub fn changelog(self, text: &str) -> Self {
        self.entry(ENTRY_CHANGELOG, text.as_bytes().to_vec())
    }

    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let table = 0x100usize;
        let mut data_at = table + self.entries.len() * 32;
        let mut out = vec![0u8; data_at];

        out[0..4].copy_from_slice(&PKG_MAGIC.to_be_bytes());
        out[0x10..0x14].copy_from_slice(&(self.entries.len() as u32).to_be_bytes());
        out[0x18..0x1C].copy_from_slice(&(table as u32).to_be_bytes());
        let id = self.content_id.as_bytes();
        let id_len = id.len().min(0x24);
        out[0x40..0x40 + id_len].copy_from_slice(&id[..id_len]);
        out[0x74..0x78].copy_from_slice(&self.content_type.to_be_bytes());
        out[0x78..0x7C].copy_from_slice(&self.content_flags.to_be_bytes());

        for (i, (id, data)) in self.entries.iter().enumerate() {
            let rec = table + i * 32;
            out[rec..rec + 4].copy_from_slice(&id.to_be_bytes());
            out[rec + 16..rec + 20].copy_from_slice(&(data_at as u32).to_be_bytes());
            out[rec + 20..rec + 24].copy_from_slice(&(data.len() as u32).to_be_bytes());
            data_at += data.len();
        }
        for (_, data) in &self.entries {
            out.extend_from_slice(data);
        }
        out
    }

    /// Writes the PKG to `dir/name` and returns the path.
    pub fn write_to(&self, dir: &Path, name: &str) -> io::Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, self.build())?;
        Ok(path)
    }
}

/// A retail game with title "Example Game" and title ID CUSA00000.
#[must_use]
pub fn example_game() -> PkgBuilder {
    PkgBuilder::new().sfo(&[
        Param::Str("APP_VER", "01.00"),
        Param::Str("CATEGORY", "gd"),
        Param::Str("CONTENT_ID", CONTENT_ID),
        Param::Str("PUBTOOLINFO", "c_date=20200101,sdk_ver=07508001"),
        Param::Int("SYSTEM_VER", 0x07508001),
        Param::Str("TITLE", "Example Game"),
        Param::Str("TITLE_ID", "CUSA00000"),
        Param::Str("VERSION", "01.00"),
    ])
}

/// Creates a temporary directory for a test.
pub fn temp_dir() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("pkgrename-").tempdir()
}
