//! Offset-addressed reads of fixed-size fields.
//!
//! PKG fields are big-endian and SFO fields are little-endian. Structures
//! carry the byte order in their zerocopy field types and scalar helpers
//! name it; nothing depends on the host order.

use byteorder::{ByteOrder, LittleEndian};
use snafu::{ResultExt, Snafu};
use std::collections::TryReserveError;
use std::io::{self, Read, Seek, SeekFrom};
use zerocopy::FromBytes;

/// Errors when reading a variable-length blob.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadBytesError {
    #[snafu(display("cannot allocate {len} bytes"))]
    Allocate {
        len: usize,
        source: TryReserveError,
    },

    #[snafu(display("cannot read {len} bytes at offset {offset:#x}"))]
    Io {
        offset: u64,
        len: usize,
        source: io::Error,
    },
}

/// Returns the little-endian `u32` stored at `offset` of an in-memory buffer.
#[must_use]
pub fn u32_le_at(buf: &[u8], offset: usize) -> Option<u32> {
    buf.get(offset..offset.checked_add(4)?)
        .map(LittleEndian::read_u32)
}

/// Reads a fixed-size structure from the current position of `src`.
///
/// The structure's field types carry their own byte order.
pub fn read_struct<T: FromBytes, R: Read>(src: &mut R) -> io::Result<T> {
    let mut buf = vec![0u8; size_of::<T>()];
    src.read_exact(&mut buf)?;
    T::read_from_bytes(&buf)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "structure size mismatch"))
}

/// Reads a fixed-size structure at `offset`.
pub fn read_struct_at<T: FromBytes, R: Read + Seek>(src: &mut R, offset: u64) -> io::Result<T> {
    src.seek(SeekFrom::Start(offset))?;
    read_struct(src)
}

/// Reads `len` bytes at `offset` into a freshly allocated buffer.
///
/// Allocation failure is reported instead of aborting the process.
pub fn read_bytes_at<R: Read + Seek>(
    src: &mut R,
    offset: u64,
    len: usize,
) -> Result<Vec<u8>, ReadBytesError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).context(AllocateSnafu { len })?;
    buf.resize(len, 0);

    src.seek(SeekFrom::Start(offset))
        .and_then(|_| src.read_exact(&mut buf))
        .context(IoSnafu { offset, len })?;

    Ok(buf)
}
