//! Metadata extraction from PlayStation 4 PKG files.
//!
//! Only the parts of a PKG that naming needs are read: the header, the entry
//! table, the embedded `param.sfo`, the optional `changeinfo.xml` and the
//! entry-keys digest that tells fake packages from retail ones. Nothing is
//! decrypted.
//!
//! # Example
//!
//! ```no_run
//! use pkgrename_pkg::PkgData;
//!
//! let pkg = PkgData::load("game.pkg").unwrap();
//!
//! println!("Content ID: {}", pkg.header().content_id());
//! println!("Title: {:?}", pkg.param_sfo().get_str("TITLE"));
//! ```
//!
//! # References
//!
//! - [PS4 Developer Wiki - PKG files](https://www.psdevwiki.com/ps4/PKG_files)

use self::entry::{EntryId, PkgEntry};
use self::header::{PkgHeader, PkgHeaderRaw};
use self::sfo::ParamSfo;
use snafu::{ResultExt, Snafu};
use std::collections::TryReserveError;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

use scan_error::*;

pub mod binary;
pub mod changelog;
pub mod entry;
pub mod fake;
pub mod header;
pub mod sfo;

/// Largest accepted `param.sfo` entry.
pub const MAX_PARAM_SFO_SIZE: usize = 65536;

/// Largest accepted `changeinfo.xml` entry.
pub const MAX_CHANGELOG_SIZE: usize = 65536;

/// Everything a PKG contributes to its new file name.
///
/// Reference: <https://www.psdevwiki.com/ps4/PKG_files>
#[derive(Debug, Clone)]
#[must_use]
pub struct PkgData {
    header: PkgHeader,
    param_sfo: ParamSfo,
    changelog: Option<String>,
    fake: Option<bool>,
    compat_checksum: Option<String>,
    file_size: u64,
}

impl PkgData {
    /// Opens `path` and loads its metadata.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pkgrename_pkg::PkgData;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let pkg = PkgData::load("game.pkg")?;
    /// if pkg.is_fake() == Some(true) {
    ///     println!("fake package");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let file = File::open(path.as_ref()).context(OpenFileSnafu)?;
        Self::load_from(&mut BufReader::new(file))
    }

    /// Loads metadata from any seekable byte source.
    ///
    /// Offsets and sizes of all interesting entries are collected in one pass
    /// over the entry table before any entry data is read.
    ///
    /// # Errors
    ///
    /// See [`ScanError`]. An unknown or unreadable compatibility checksum is
    /// not an error; [`PkgData::compat_checksum()`] is `None` then.
    pub fn load_from<R: Read + Seek>(reader: &mut R) -> Result<Self, ScanError> {
        let raw = binary::read_bytes_at(reader, 0, PkgHeaderRaw::SIZE).map_err(blob_error)?;
        let header = PkgHeader::read(&raw).map_err(|_| NotAPkgSnafu.build())?;

        debug!(
            content_id = %header.content_id(),
            entries = header.entry_count(),
            "read PKG header"
        );

        reader
            .seek(SeekFrom::Start(header.table_offset()))
            .context(ReadFileSnafu)?;

        let mut entries = Vec::new();
        let mut param_sfo = None;
        let mut changelog = None;
        let mut keys_offset = None;

        for _ in 0..header.entry_count() {
            let entry = PkgEntry::read_from(reader).context(ReadFileSnafu)?;

            match entry.entry_id() {
                EntryId::EntryKeys => keys_offset = Some(entry.data_offset()),
                EntryId::ParamSfo => {
                    let size = entry.data_size();
                    snafu::ensure!(size <= MAX_PARAM_SFO_SIZE, ParamSfoInvalidSizeSnafu { size });
                    param_sfo = Some(entry);
                }
                EntryId::ChangeinfoXml => {
                    let size = entry.data_size();
                    snafu::ensure!(size <= MAX_CHANGELOG_SIZE, ChangelogInvalidSizeSnafu { size });
                    changelog = Some(entry);
                }
                _ => {}
            }

            entries.push(entry);
        }

        let param_sfo = param_sfo.ok_or(ScanError::ParamSfoNotFound)?;
        let buf = binary::read_bytes_at(reader, param_sfo.data_offset(), param_sfo.data_size())
            .map_err(blob_error)?;
        let param_sfo = ParamSfo::parse(&buf).map_err(|e| {
            if e.is_format_error() {
                ScanError::ParamSfoInvalidFormat
            } else {
                ScanError::ParamSfoInvalidData { source: e }
            }
        })?;

        let changelog = match changelog {
            Some(entry) => {
                let buf = binary::read_bytes_at(reader, entry.data_offset(), entry.data_size())
                    .map_err(blob_error)?;
                Some(String::from_utf8_lossy(&buf).into_owned())
            }
            None => None,
        };

        let fake = match keys_offset {
            Some(offset) => {
                let stored: [u8; 32] =
                    binary::read_struct_at(reader, offset + fake::KEY_DIGEST_OFFSET)
                        .context(ReadFileSnafu)?;
                let content_id = param_sfo
                    .require_content_id()
                    .context(ParamSfoInvalidDataSnafu)?;

                Some(fake::is_fake(content_id, &stored))
            }
            None => None,
        };

        let compat_checksum = compat_checksum(reader, &header, &entries);
        let file_size = reader.seek(SeekFrom::End(0)).context(ReadFileSnafu)?;

        debug!(
            changelog = changelog.is_some(),
            ?fake,
            ?compat_checksum,
            "loaded PKG metadata"
        );

        Ok(Self {
            header,
            param_sfo,
            changelog,
            fake,
            compat_checksum,
            file_size,
        })
    }

    /// Returns the PKG header.
    pub fn header(&self) -> &PkgHeader {
        &self.header
    }

    /// Returns the parsed `param.sfo`.
    pub fn param_sfo(&self) -> &ParamSfo {
        &self.param_sfo
    }

    /// Returns the changelog text, if the PKG has one.
    #[must_use]
    pub fn changelog(&self) -> Option<&str> {
        self.changelog.as_deref()
    }

    /// Returns whether the PKG is fake, or `None` without an entry-keys block.
    #[must_use]
    pub const fn is_fake(&self) -> Option<bool> {
        self.fake
    }

    #[must_use]
    pub fn compat_checksum(&self) -> Option<&str> {
        self.compat_checksum.as_deref()
    }

    /// Returns the size of the whole PKG file in bytes.
    #[must_use]
    pub const fn file_size(&self) -> u64 {
        self.file_size
    }
}

fn blob_error(e: binary::ReadBytesError) -> ScanError {
    match e {
        binary::ReadBytesError::Allocate { source, .. } => ScanError::OutOfMemory { source },
        binary::ReadBytesError::Io { source, .. } => ScanError::ReadFile { source },
    }
}

/// Computes the checksum shared by a game and the patches built for it.
///
/// The digest table (first entry) holds one 32-byte digest per entry; the
/// checksum is the first 3 bytes of the playgo chunk entry's digest. DLC and
/// unknown chunk layouts have none.
pub fn compat_checksum<R: Read + Seek>(
    reader: &mut R,
    header: &PkgHeader,
    entries: &[PkgEntry],
) -> Option<String> {
    if header.is_dlc() {
        return None;
    }

    let target = match header.content_flags().chunk_layout() {
        0x0A000000 => EntryId::PlaygoChunkDat,
        0x02000000 => EntryId::AppPlaygoChunkDat,
        _ => return None,
    };

    let digests = entries.first()?.data_offset();
    let index = entries
        .iter()
        .skip(1)
        .position(|e| e.entry_id() == target)?
        + 1;

    let offset = digests + index as u64 * 32;
    match binary::read_bytes_at(reader, offset, 32) {
        Ok(digest) => Some(digest[..3].iter().map(|b| format!("{b:02X}")).collect()),
        Err(e) => {
            debug!(offset, error = %e, "cannot read compatibility checksum");
            None
        }
    }
}

/// Per-file scan failures.
#[derive(Debug, Snafu)]
#[snafu(module)]
#[non_exhaustive]
pub enum ScanError {
    #[snafu(display("Could not open file."))]
    OpenFile { source: std::io::Error },

    #[snafu(display("Could not read data."))]
    ReadFile { source: std::io::Error },

    #[snafu(display("File is not a PS4 PKG file."))]
    NotAPkg,

    #[snafu(display("Could not allocate memory for PKG content."))]
    OutOfMemory { source: TryReserveError },

    #[snafu(display("PKG content \"param.sfo\" not found."))]
    ParamSfoNotFound,

    #[snafu(display("Invalid size of PKG content \"param.sfo\" ({size} bytes)."))]
    ParamSfoInvalidSize { size: usize },

    #[snafu(display("Invalid file type of PKG content \"param.sfo\"."))]
    ParamSfoInvalidFormat,

    #[snafu(display("Invalid data in PKG content \"param.sfo\"."))]
    ParamSfoInvalidData { source: sfo::Error },

    #[snafu(display("Invalid size of PKG content \"changeinfo.xml\" ({size} bytes)."))]
    ChangelogInvalidSize { size: usize },
}

impl ScanError {
    /// Returns `true` if the error should end an interactive session.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}
