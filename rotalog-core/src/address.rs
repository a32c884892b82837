/*!
Record addresses.

An address is `<archive file name>/<decimal byte offset>`. The same string is
stored as the entry name inside the archive, so lookups compare the full text.
*/

use crate::{Result, RotalogError};
use std::fmt;
use std::str::FromStr;

/// Separator between the archive name and the offset.
pub const ADDRESS_SEPARATOR: char = '/';

/// A decoded record address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Base name of the archive file, e.g. `2024-03-09.tar.gz`
    pub archive: String,
    /// Byte offset of the entry header inside the archive
    pub offset: u64,
}

impl Address {
    pub fn new<S: Into<String>>(archive: S, offset: u64) -> Self {
        Self {
            archive: archive.into(),
            offset,
        }
    }

    /// Decode an address string.
    ///
    /// Splits on the first `/`. The offset must be plain ASCII digits; signs,
    /// whitespace and empty offsets are rejected.
    pub fn parse(address: &str) -> Result<Self> {
        let (archive, offset) = address
            .split_once(ADDRESS_SEPARATOR)
            .ok_or_else(|| RotalogError::malformed_address(format!("missing separator in {address:?}")))?;

        if archive.is_empty() {
            return Err(RotalogError::malformed_address(format!(
                "empty archive name in {address:?}"
            )));
        }

        if offset.is_empty() || !offset.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RotalogError::malformed_address(format!(
                "offset is not a non-negative integer in {address:?}"
            )));
        }

        let offset = offset.parse::<u64>().map_err(|e| {
            RotalogError::malformed_address(format!("offset out of range in {address:?}: {e}"))
        })?;

        Ok(Self::new(archive, offset))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.archive, ADDRESS_SEPARATOR, self.offset)
    }
}

impl FromStr for Address {
    type Err = RotalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
