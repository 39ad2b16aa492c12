//! Bundle reader - unpacks a statement bundle archive in memory

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use super::error::{BundleError, BundleResult};

/// Decoded contents of a statement bundle, keyed by entry path.
///
/// Iteration order is unspecified; callers that need a stable order
/// must impose one (see [`super::selector::select_files`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleContents {
    entries: HashMap<String, String>,
}

impl BundleContents {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry paths in sorted order (for logging and diagnostics)
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BundleContents {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Read a bundle file from disk and unpack it.
pub fn read_bundle_file(path: &Path) -> BundleResult<BundleContents> {
    let data = std::fs::read(path)
        .map_err(|source| BundleError::Io { path: path.to_path_buf(), source })?;
    tracing::debug!("Read {} bytes from {}", data.len(), path.display());
    read_bundle(&data)
}

/// Unpack an in-memory archive into path -> text content.
///
/// Directory entries are skipped. Member bytes are decoded as UTF-8; invalid
/// sequences are replaced rather than rejected. Each member's decompression
/// stream is dropped as soon as its bytes are copied out, on success or error.
/// A path that appears twice keeps the later member.
pub fn read_bundle(data: &[u8]) -> BundleResult<BundleContents> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(BundleError::ArchiveRead)?;

    let mut entries = HashMap::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(|source| BundleError::EntryRead {
            entry: format!("#{}", index),
            source,
        })?;

        if member.is_dir() {
            tracing::trace!("Skipping directory entry {}", member.name());
            continue;
        }

        let name = member.name().to_string();
        let mut buf = Vec::new();
        member.read_to_end(&mut buf).map_err(|e| BundleError::EntryRead {
            entry: name.clone(),
            source: ZipError::from(e),
        })?;

        entries.insert(name, String::from_utf8_lossy(&buf).into_owned());
    }

    tracing::debug!("Unpacked {} bundle entries", entries.len());
    Ok(BundleContents { entries })
}
