/*!
Locates and extracts framed records from an archive.
*/

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tar::Archive;

use super::EntryInfo;
use crate::{Address, Result, RotalogError};

fn open_archive(dir: &Path, archive: &str) -> Result<File> {
    if !super::is_plain_file_name(archive) {
        return Err(RotalogError::ArchiveNotFound(archive.to_string()));
    }

    File::open(dir.join(archive)).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RotalogError::ArchiveNotFound(archive.to_string()),
        _ => RotalogError::Io(e),
    })
}

fn container_error(archive: &str, e: io::Error) -> RotalogError {
    RotalogError::corrupt(format!("failed to read entries of {archive}: {e}"))
}

/// Read the raw (still compressed) payload stored under `address`.
///
/// Starts at the address offset and walks entries forward with the regular tar
/// parser until one is named exactly like the address. Returns
/// [`RotalogError::EntryNotFound`] when the archive ends first.
pub fn read_entry(dir: &Path, address: &Address) -> Result<Vec<u8>> {
    let mut file = open_archive(dir, &address.archive)?;
    file.seek(SeekFrom::Start(address.offset))?;

    let expected = address.to_string();
    let mut archive = Archive::new(BufReader::new(file));
    let entries = archive
        .entries()
        .map_err(|e| container_error(&address.archive, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| container_error(&address.archive, e))?;
        let matches = entry.path_bytes().as_ref() == expected.as_bytes();
        if !matches {
            continue;
        }

        let size = usize::try_from(entry.size()).map_err(|_| {
            RotalogError::corrupt(format!("entry {expected} declares an oversized payload"))
        })?;
        let mut payload = vec![0u8; size];
        entry
            .read_exact(&mut payload)
            .map_err(|e| container_error(&address.archive, e))?;
        return Ok(payload);
    }

    Err(RotalogError::EntryNotFound(expected))
}

/// Scan a whole archive from the start and describe every entry in it.
pub fn list_entries(path: &Path) -> Result<Vec<EntryInfo>> {
    let name = super::archive_name(path)?;
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RotalogError::ArchiveNotFound(name.to_string()),
        _ => RotalogError::Io(e),
    })?;

    let mut archive = Archive::new(BufReader::new(file));
    let mut infos = Vec::new();
    for entry in archive.entries().map_err(|e| container_error(name, e))? {
        let entry = entry.map_err(|e| container_error(name, e))?;
        infos.push(EntryInfo {
            address: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            offset: entry.raw_header_position(),
            compressed_size: entry.size(),
            mtime: entry.header().mtime().map_err(|e| container_error(name, e))?,
        });
    }
    Ok(infos)
}
