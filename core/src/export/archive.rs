//! Zip packaging of tile files.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::info;
use zip::CompressionMethod;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};

use crate::error::CutError;

use super::Result;

/// Summary of one file inside a packaged archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size_bytes: u64,
    pub compressed: bool,
}

/// Pack `(name, bytes)` pairs into an in-memory zip, preserving the given order.
///
/// Entries are deflated. A duplicate name fails the whole archive.
pub fn pack<'a, I>(files: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (String, &'a [u8])>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut seen = HashSet::new();
    for (name, bytes) in files {
        if !seen.insert(name.clone()) {
            return Err(CutError::Packaging(format!("duplicate entry {name}")));
        }
        writer.start_file(name.as_str(), options)?;
        writer
            .write_all(bytes)
            .map_err(|err| CutError::Packaging(format!("writing {name}: {err}")))?;
    }

    let archive = writer.finish()?.into_inner();
    info!(target: "export::archive", entries = seen.len(), bytes = archive.len(), "packed archive");
    Ok(archive)
}

/// List the file entries of an archive in stored order.
pub fn list_entries(archive: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut entries = Vec::with_capacity(archive.len());

    for idx in 0..archive.len() {
        let file = archive.by_index(idx)?;
        if file.is_dir() {
            continue;
        }
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            size_bytes: file.size(),
            compressed: file.compression() != CompressionMethod::Stored,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn packs_entries_in_order() {
        let files = vec![
            ("cropped-image-1.png".to_string(), b"first".as_slice()),
            ("cropped-image-2.png".to_string(), b"second".as_slice()),
        ];
        let bytes = pack(files).expect("pack");

        let entries = list_entries(&bytes).expect("list");
        let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["cropped-image-1.png", "cropped-image-2.png"]);
        assert!(entries.iter().all(|entry| entry.compressed));
        assert_eq!(entries[1].size_bytes, 6);

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive.by_name("cropped-image-2.png").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn duplicate_names_fail_packaging() {
        let files = vec![
            ("a.png".to_string(), b"1".as_slice()),
            ("a.png".to_string(), b"2".as_slice()),
        ];
        let err = pack(files).unwrap_err();
        assert!(matches!(err, CutError::Packaging(_)));
    }

    #[test]
    fn rejects_garbage_archive() {
        assert!(matches!(list_entries(b"nope").unwrap_err(), CutError::Packaging(_)));
    }
}
