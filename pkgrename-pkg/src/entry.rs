use std::io::Read;

use zerocopy::byteorder::big_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub(crate) struct PkgEntryRaw {
    id: U32,
    filename_offset: U32,
    flags1: U32,
    flags2: U32,
    data_offset: U32,
    data_size: U32,
    padding: U64,
}

/// One record of the PKG entry table.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct PkgEntry {
    raw_entry: PkgEntryRaw,
}

impl PkgEntry {
    pub const RAW_SIZE: usize = size_of::<PkgEntryRaw>();

    /// Reads the next entry from `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let raw_entry = crate::binary::read_struct::<PkgEntryRaw, _>(reader)?;
        Ok(Self { raw_entry })
    }

    /// Returns the entry ID.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.raw_entry.id.get()
    }

    /// Returns the parsed entry identifier.
    #[must_use]
    pub const fn entry_id(&self) -> EntryId {
        EntryId::from_u32(self.id())
    }

    /// Returns the data offset within the PKG file.
    #[must_use]
    pub const fn data_offset(&self) -> u64 {
        self.raw_entry.data_offset.get() as _
    }

    /// Returns the data size in bytes.
    #[must_use]
    pub const fn data_size(&self) -> usize {
        self.raw_entry.data_size.get() as _
    }
}

/// Entry identifiers the renamer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EntryId {
    Digests,
    EntryKeys,
    ParamSfo,
    PlaygoChunkDat,
    AppPlaygoChunkDat,
    ChangeinfoXml,

    /// Any other entry ID.
    Other(u32),
}

impl EntryId {
    /// Returns the raw numeric entry ID.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Digests => 0x00000001,
            Self::EntryKeys => 0x00000010,
            Self::ParamSfo => 0x00001000,
            Self::PlaygoChunkDat => 0x00001001,
            Self::AppPlaygoChunkDat => 0x00001008,
            Self::ChangeinfoXml => 0x00001260,
            Self::Other(raw) => raw,
        }
    }

    /// Converts a raw numeric entry ID into an [`EntryId`].
    #[must_use]
    pub const fn from_u32(raw: u32) -> Self {
        match raw {
            0x00000001 => Self::Digests,
            0x00000010 => Self::EntryKeys,
            0x00001000 => Self::ParamSfo,
            0x00001001 => Self::PlaygoChunkDat,
            0x00001008 => Self::AppPlaygoChunkDat,
            0x00001260 => Self::ChangeinfoXml,
            other => Self::Other(other),
        }
    }
}
