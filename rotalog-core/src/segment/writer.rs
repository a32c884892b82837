/*!
Appends framed records to an archive.
*/

use std::fs::OpenOptions;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use tar::{Builder, EntryType, Header};

use super::{archive_name, BLOCK_SIZE, END_MARKER_SIZE, ENTRY_MODE};
use crate::{Address, Result, RotalogError};

/// Where the next entry starts in an archive that is currently `len` bytes long.
///
/// An empty file starts at 0. Otherwise the new entry replaces the end marker.
/// A non-empty file shorter than the marker, or one that is not block aligned,
/// was truncated and is reported as corrupt instead of being appended to.
pub fn append_offset(len: u64) -> Result<u64> {
    if len == 0 {
        return Ok(0);
    }
    if len < END_MARKER_SIZE {
        return Err(RotalogError::corrupt(format!(
            "archive is {len} bytes, shorter than the {END_MARKER_SIZE} byte end marker"
        )));
    }
    if len % BLOCK_SIZE != 0 {
        return Err(RotalogError::corrupt(format!(
            "archive length {len} is not a multiple of {BLOCK_SIZE}"
        )));
    }
    Ok(len - END_MARKER_SIZE)
}

/// Append `payload` as a new entry to the archive at `path` and return its address.
///
/// The file is created if missing. The caller is responsible for making sure
/// nothing else touches the file between measuring its length and writing.
pub fn append_entry(path: &Path, payload: &[u8], mtime: DateTime<Local>) -> Result<Address> {
    let archive = archive_name(path)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    let len = file.seek(SeekFrom::End(0))?;
    let offset = append_offset(len)?;
    file.seek(SeekFrom::Start(offset))?;

    let address = Address::new(archive, offset);
    let name = address.to_string();

    let mut header = Header::new_ustar();
    header.set_size(payload.len() as u64);
    header.set_mode(ENTRY_MODE);
    header.set_entry_type(EntryType::Regular);
    header.set_mtime(mtime.timestamp().max(0) as u64);

    let mut builder = Builder::new(BufWriter::new(&mut file));
    builder.append_data(&mut header, &name, payload)?;

    // Writes the fresh end marker right after the new entry
    let mut writer = builder.into_inner()?;
    writer.flush()?;

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_offset() {
        assert_eq!(append_offset(0).unwrap(), 0);
        assert_eq!(append_offset(END_MARKER_SIZE).unwrap(), 0);
        assert_eq!(append_offset(3 * BLOCK_SIZE + END_MARKER_SIZE).unwrap(), 3 * BLOCK_SIZE);
    }

    #[test]
    fn test_append_offset_rejects_truncated_archive() {
        for len in [1, 511, 512, END_MARKER_SIZE - 1] {
            assert!(
                matches!(append_offset(len), Err(RotalogError::Corrupt(_))),
                "length {len} should be corrupt"
            );
        }
        assert!(matches!(
            append_offset(END_MARKER_SIZE + 17),
            Err(RotalogError::Corrupt(_))
        ));
    }

    #[test]
    fn test_first_entry_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2024-03-09.tar.gz");

        let address = append_entry(&path, b"hello", Local::now()).unwrap();
        assert_eq!(address.to_string(), "2024-03-09.tar.gz/0");

        // header + one padded data block + end marker
        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len() as u64, BLOCK_SIZE + BLOCK_SIZE + END_MARKER_SIZE);
        assert_eq!(&bytes[..address.to_string().len()], address.to_string().as_bytes());
        assert_eq!(&bytes[512..517], b"hello");
        assert!(bytes[bytes.len() - END_MARKER_SIZE as usize..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_second_entry_reclaims_end_marker() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2024-03-09.tar.gz");

        append_entry(&path, b"first", Local::now()).unwrap();
        let second = append_entry(&path, b"second", Local::now()).unwrap();

        // The second header sits where the first end marker was
        assert_eq!(second.offset, 2 * BLOCK_SIZE);
        let len = fs::metadata(&path).unwrap().len();
        assert_eq!(len, 4 * BLOCK_SIZE + END_MARKER_SIZE);
    }

    #[test]
    fn test_append_to_truncated_archive_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2024-03-09.tar.gz");
        fs::write(&path, [0u8; 100]).unwrap();

        let result = append_entry(&path, b"payload", Local::now());
        assert!(matches!(result, Err(RotalogError::Corrupt(_))));

        // The file is left as it was
        assert_eq!(fs::metadata(&path).unwrap().len(), 100);
    }
}
