/*!
Archive segment format.

Each daily archive is a POSIX ustar stream. A record is one regular-file entry
whose name is the record's address and whose body is the compressed payload.
Every conformant tar writer ends the stream with two zero blocks; appends
overwrite that trailer in place with the next entry and a fresh trailer, so
the file stays a valid archive after every write without re-reading it.
*/

pub mod reader;
pub mod writer;

use std::path::Path;

use crate::{Result, RotalogError};

/// Size of a tar block; headers and padded payloads are multiples of this.
pub const BLOCK_SIZE: u64 = 512;

/// Size of the all-zero end-of-archive trailer (two blocks).
pub const END_MARKER_SIZE: u64 = 2 * BLOCK_SIZE;

/// Permission bits stored in every entry header.
pub const ENTRY_MODE: u32 = 0o600;

/// Summary of one entry found while scanning an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Entry name, which is the address it was written under
    pub address: String,
    /// Absolute position of the entry header in the archive
    pub offset: u64,
    /// Length of the stored (compressed) payload
    pub compressed_size: u64,
    /// Header modification time, seconds since the Unix epoch
    pub mtime: u64,
}

/// True when `name` is a single path component, so joining it onto the log
/// directory cannot escape it.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Base name of an archive path as it appears in addresses.
pub(crate) fn archive_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            RotalogError::validation(format!(
                "archive path has no UTF-8 file name: {}",
                path.display()
            ))
        })
}

pub use reader::{list_entries, read_entry};
pub use writer::{append_entry, append_offset};
