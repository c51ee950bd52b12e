use std::fmt;

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::big_endian::{U16, U32, U64},
};

/// Errors when reading a PKG header.
#[derive(Debug, snafu::Snafu)]
#[non_exhaustive]
pub enum ReadError {
    #[snafu(display("PKG file is too small"))]
    TooSmall,

    #[snafu(display("invalid PKG magic"))]
    InvalidMagic,
}

type Result<T, E = ReadError> = std::result::Result<T, E>;

pub const PKG_MAGIC: u32 = 0x7F434E54;

/// Content type of DLC packages.
pub const CONTENT_TYPE_AC: u32 = 0x1B;

/// Leading part of the PKG header, up to and including the content flags.
///
/// Renaming never needs the digest table or PFS information further in.
#[derive(Debug, Clone, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct PkgHeaderRaw {
    pub pkg_magic: U32,            // 0x000 - 0x7F434E54
    pub pkg_type: U32,             // 0x004
    pub pkg_0x008: U32,            // 0x008 - unknown field
    pub pkg_file_count: U32,       // 0x00C
    pub pkg_entry_count: U32,      // 0x010
    pub pkg_sc_entry_count: U16,   // 0x014
    pub pkg_entry_count_2: U16,    // 0x016
    pub pkg_table_offset: U32,     // 0x018
    pub pkg_entry_data_size: U32,  // 0x01C
    pub pkg_body_offset: U64,      // 0x020
    pub pkg_body_size: U64,        // 0x028
    pub pkg_content_offset: U64,   // 0x030
    pub pkg_content_size: U64,     // 0x038
    pub pkg_content_id: ContentId, // 0x040 (36 bytes)
    pub pkg_padding: [u8; 0xC],    // 0x064
    pub pkg_drm_type: U32,         // 0x070
    pub pkg_content_type: U32,     // 0x074
    pub pkg_content_flags: U32,    // 0x078
    pub pkg_promote_size: U32,     // 0x07C
}

impl PkgHeaderRaw {
    pub const SIZE: usize = size_of::<Self>();
}

/// Content ID structure (36 bytes).
///
/// Format: `<service_id><publisher>-<title_id>_<version>-<label>`
/// Example: `EP4497-CUSA05571_00-00000000000GOTY1`
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    FromBytes,
    IntoBytes,
    KnownLayout,
    Immutable,
    Unaligned,
)]
#[repr(C)]
pub struct ContentId {
    service_id: [u8; 2],
    publisher_code: [u8; 4],
    _sep1: u8,
    title_id: [u8; 9],
    _sep2: u8,
    version: [u8; 2],
    _sep3: u8,
    label: [u8; 16],
}

impl ContentId {
    /// Returns the title ID (e.g., "CUSA05571").
    #[must_use]
    pub fn title_id(&self) -> &str {
        nul_terminated(&self.title_id)
    }

    /// Returns the content label (e.g., "00000000000GOTY1").
    #[must_use]
    pub fn label(&self) -> &str {
        nul_terminated(&self.label)
    }

    /// Returns the full content ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        nul_terminated(self.as_bytes())
    }
}

fn nul_terminated(bytes: &[u8]) -> &str {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..len]).unwrap_or("")
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentId").field(&self.as_str()).finish()
    }
}

/// Region code derived from the first letter of a content ID.
#[must_use]
pub fn region(content_id: &str) -> Option<&'static str> {
    match content_id.as_bytes().first()? {
        b'E' => Some("EU"),
        b'H' => Some("AS"),
        b'I' => Some("IN"),
        b'J' => Some("JP"),
        b'U' => Some("US"),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContentFlags(u32);

bitflags::bitflags! {
    impl ContentFlags: u32 {
        const FIRST_PATCH = 0x00100000;
        const PATCHGO = 0x00200000;
        const REMASTER = 0x00400000;
        const PS_CLOUD = 0x00800000;
        const GD_AC = 0x02000000;
        const NON_GAME = 0x04000000;
        const UNKNOWN_1 = 0x08000000;
        const SUBSEQUENT_PATCH = 0x40000000;
        const DELTA_PATCH = 0x41000000;
        const CUMULATIVE_PATCH = 0x60000000;
    }
}

impl ContentFlags {
    /// Mask selecting the nibble that identifies the playgo chunk layout.
    pub const CHUNK_LAYOUT_MASK: u32 = 0x0F000000;

    /// Returns the raw bits under [`Self::CHUNK_LAYOUT_MASK`].
    #[must_use]
    pub const fn chunk_layout(self) -> u32 {
        self.0 & Self::CHUNK_LAYOUT_MASK
    }
}

/// Parsed PKG header information.
#[derive(Debug, Clone)]
#[must_use]
pub struct PkgHeader {
    raw_header: PkgHeaderRaw,
}

impl PkgHeader {
    /// Parses a PKG header from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is too small or has an invalid magic number.
    pub fn read(pkg: &[u8]) -> Result<Self> {
        let (raw_header, _) =
            PkgHeaderRaw::read_from_prefix(pkg).map_err(|_| TooSmallSnafu.build())?;

        snafu::ensure!(raw_header.pkg_magic.get() == PKG_MAGIC, InvalidMagicSnafu);

        Ok(Self { raw_header })
    }

    /// Returns the number of entries in the PKG.
    #[must_use]
    pub const fn entry_count(&self) -> u32 {
        self.raw_header.pkg_entry_count.get()
    }

    /// Returns the offset to the entry table.
    #[must_use]
    pub const fn table_offset(&self) -> u64 {
        self.raw_header.pkg_table_offset.get() as _
    }

    /// Returns the content ID stored in the header.
    #[must_use]
    pub fn content_id(&self) -> &ContentId {
        &self.raw_header.pkg_content_id
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> u32 {
        self.raw_header.pkg_content_type.get()
    }

    /// Returns `true` for additional content (DLC) packages.
    #[must_use]
    pub const fn is_dlc(&self) -> bool {
        self.content_type() == CONTENT_TYPE_AC
    }

    /// Returns the content flags, keeping unknown bits.
    #[must_use]
    pub const fn content_flags(&self) -> ContentFlags {
        ContentFlags::from_bits_retain(self.raw_header.pkg_content_flags.get())
    }

    /// Returns the raw header.
    #[must_use]
    pub const fn raw_header(&self) -> &PkgHeaderRaw {
        &self.raw_header
    }
}
