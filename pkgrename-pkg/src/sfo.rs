//! `param.sfo` key/value blobs.
//!
//! Layout (all fields little-endian):
//!
//! | Region      | Offset                         | Notes                          |
//! |-------------|--------------------------------|--------------------------------|
//! | Header      | `0x00`-`0x13`                  | magic, version, table offsets  |
//! | Entry table | `0x14`                         | `n_entries` x 16-byte records  |
//! | Key table   | `keytable_offset`              | NUL-terminated ASCII names     |
//! | Data table  | `datatable_offset`             | string or `u32` values         |
//!
//! The whole buffer is validated once in [`ParamSfo::parse()`]; lookups on the
//! resulting map never touch offsets again.
//!
//! Reference: <https://www.psdevwiki.com/ps4/Param.sfo>

use std::fmt;

use snafu::Snafu;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::binary::u32_le_at;

pub const SFO_MAGIC: u32 = 0x46535000;

/// Special-mode UTF-8 string (not NUL-terminated on disk).
pub const TYPE_UTF8_SPECIAL: u16 = 0x0004;
/// UTF-8 string with trailing NUL.
pub const TYPE_UTF8: u16 = 0x0204;
/// Unsigned 32-bit integer.
pub const TYPE_INTEGER: u16 = 0x0404;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("not a param.sfo file"))]
    InvalidFormat,

    #[snafu(display("{len} bytes cannot hold a header and {entries} entries"))]
    Truncated { len: usize, entries: u32 },

    #[snafu(display("{table} table offset {offset:#x} is out of bounds"))]
    TableOutOfBounds { table: &'static str, offset: u32 },

    #[snafu(display("entry #{num} points outside the buffer"))]
    EntryOutOfBounds { num: usize },

    #[snafu(display("required key {key} is missing"))]
    MissingKey { key: &'static str },
}

impl Error {
    /// Returns `true` if the buffer is not a param.sfo at all, as opposed to a
    /// param.sfo with inconsistent contents.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(self, Self::InvalidFormat)
    }
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SfoHeaderRaw {
    pub magic: U32,            // 0x00 - 0x46535000
    pub version: U32,          // 0x04
    pub keytable_offset: U32,  // 0x08
    pub datatable_offset: U32, // 0x0C
    pub n_entries: U32,        // 0x10
}

#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct SfoEntryRaw {
    pub key_offset: U16,
    pub param_type: U16,
    pub length: U32,
    pub max_length: U32,
    pub data_offset: U32,
}

/// A single param.sfo value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfoValue {
    Utf8(String),
    Utf8Special(String),
    Integer(u32),
    /// Value with a type tag that is neither a string nor an integer.
    Unknown { param_type: u16, raw: Vec<u8> },
}

impl SfoValue {
    /// Returns the value as a string if it is one of the string types.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) | Self::Utf8Special(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it has the integer type.
    #[must_use]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for SfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8(s) | Self::Utf8Special(s) => write!(f, "\"{s}\""),
            Self::Integer(v) => write!(f, "0x{v:08X}"),
            Self::Unknown { param_type, raw } => {
                write!(f, "<type 0x{param_type:04X}, {} bytes>", raw.len())
            }
        }
    }
}

/// Parsed param.sfo, in on-disk entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct ParamSfo {
    entries: Vec<(String, SfoValue)>,
}

impl ParamSfo {
    const HEADER_SIZE: usize = size_of::<SfoHeaderRaw>();
    const ENTRY_SIZE: usize = size_of::<SfoEntryRaw>();

    /// Validates and parses a param.sfo buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFormat`] if the buffer is shorter than the header or the
    /// magic does not match; any other variant
    /// if an offset in the header or entry table points outside `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        snafu::ensure!(
            u32_le_at(buf, 0) == Some(SFO_MAGIC),
            InvalidFormatSnafu
        );

        let (header, _) =
            SfoHeaderRaw::read_from_prefix(buf).map_err(|_| InvalidFormatSnafu.build())?;
        let entries = Self::check(buf, &header)?;

        let keytable = header.keytable_offset.get() as usize;
        let datatable = header.datatable_offset.get() as usize;

        let entries = entries
            .iter()
            .map(|entry| {
                let key = nul_terminated(&buf[keytable + entry.key_offset.get() as usize..]);
                let start = datatable + entry.data_offset.get() as usize;
                let data = &buf[start..start + entry.length.get() as usize];
                let key = String::from_utf8_lossy(key).into_owned();

                (key, Self::value(entry.param_type.get(), data, &buf[start..]))
            })
            .collect();

        Ok(Self { entries })
    }

    /// Integrity check for every offset reachable from the header.
    fn check<'a>(buf: &'a [u8], header: &SfoHeaderRaw) -> Result<&'a [SfoEntryRaw]> {
        let n_entries = header.n_entries.get();
        let len = buf.len();
        let truncated = || TruncatedSnafu { len, entries: n_entries }.build();

        let table_len = (n_entries as usize)
            .checked_mul(Self::ENTRY_SIZE)
            .ok_or_else(truncated)?;
        let table = buf
            .get(Self::HEADER_SIZE..)
            .and_then(|rest| rest.get(..table_len))
            .ok_or_else(truncated)?;
        let entries = <[SfoEntryRaw]>::ref_from_bytes(table).map_err(|_| truncated())?;

        let keytable = header.keytable_offset.get();
        let datatable = header.datatable_offset.get();
        snafu::ensure!(
            (keytable as usize) < len,
            TableOutOfBoundsSnafu {
                table: "key",
                offset: keytable
            }
        );
        snafu::ensure!(
            (datatable as usize) < len,
            TableOutOfBoundsSnafu {
                table: "data",
                offset: datatable
            }
        );

        for (num, entry) in entries.iter().enumerate() {
            let key_end = u64::from(keytable) + u64::from(entry.key_offset.get());
            let data_end = u64::from(datatable)
                + u64::from(entry.data_offset.get())
                + u64::from(entry.length.get());

            snafu::ensure!(
                key_end < len as u64 && data_end < len as u64,
                EntryOutOfBoundsSnafu { num }
            );
        }

        Ok(entries)
    }

    fn value(param_type: u16, data: &[u8], rest: &[u8]) -> SfoValue {
        match param_type {
            TYPE_UTF8 => SfoValue::Utf8(lossy(nul_terminated(data))),
            TYPE_UTF8_SPECIAL => SfoValue::Utf8Special(lossy(nul_terminated(data))),
            TYPE_INTEGER => match u32_le_at(rest, 0) {
                Some(v) => SfoValue::Integer(v),
                None => SfoValue::Unknown {
                    param_type,
                    raw: data.to_vec(),
                },
            },
            _ => SfoValue::Unknown {
                param_type,
                raw: data.to_vec(),
            },
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SfoValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns the string stored under `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Returns the integer stored under `key`.
    #[must_use]
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key)?.as_u32()
    }

    /// Returns `CONTENT_ID`, failing if it is absent.
    pub fn require_content_id(&self) -> Result<&str> {
        self.get_str("CONTENT_ID")
            .ok_or(Error::MissingKey { key: "CONTENT_ID" })
    }

    /// Iterates over all entries in on-disk order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ParamSfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Bytes up to the first NUL, or to the end of `bytes` if there is none.
fn nul_terminated(bytes: &[u8]) -> &[u8] {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..len]
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
