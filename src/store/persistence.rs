//! Repository file persistence
//!
//! A repository file is a bincode [`FileHeader`] followed by a bincode
//! [`RepositoryRecord`]. Saves go through a temporary file in the destination
//! directory that is synced and renamed over the target, so a reader sees
//! either the old file or the complete new one.

use super::{FileHeader, RepositoryRecord, MAGIC};
use crate::error::RepoError;
use crate::repository::Repository;
use crate::types::{FORMAT_VERSION, REPOSITORY_EXTENSION};
use bincode::Options;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name for a repository called `name`, adding the extension when missing.
pub fn repository_file_name(name: &str) -> String {
    let suffix = format!(".{}", REPOSITORY_EXTENSION);
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Path of repository `name` inside `dir`.
pub fn repository_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(repository_file_name(name))
}

pub(crate) fn save(repository: &Repository, destination: &Path) -> Result<(), RepoError> {
    let header = FileHeader {
        magic: MAGIC,
        format_version: repository.format_version.clone(),
    };
    let record = RepositoryRecord::from_repository(repository);

    let mut bytes = Vec::new();
    codec()
        .serialize_into(&mut bytes, &header)
        .map_err(|e| encode_error(destination, e))?;
    codec()
        .serialize_into(&mut bytes, &record)
        .map_err(|e| encode_error(destination, e))?;

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| RepoError::io(&dir, e))?;
    temp.write_all(&bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| RepoError::io(temp.path(), e))?;
    temp.persist(destination)
        .map_err(|e| RepoError::io(destination, e.error))?;

    info!(
        path = %destination.display(),
        bytes = bytes.len(),
        blobs = record.blobs.len(),
        "repository saved"
    );
    Ok(())
}

pub(crate) fn load(destination: &Path) -> Result<Repository, RepoError> {
    let bytes = std::fs::read(destination).map_err(|e| RepoError::io(destination, e))?;
    let mut reader = bytes.as_slice();
    let limit = bytes.len() as u64;

    let header: FileHeader = codec()
        .with_limit(limit)
        .deserialize_from(&mut reader)
        .map_err(|e| RepoError::corrupt(destination, format!("not a repository file: {}", e)))?;
    if header.magic != MAGIC {
        return Err(RepoError::corrupt(destination, "not a repository file"));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(RepoError::corrupt(
            destination,
            format!(
                "format version {} does not match expected {}",
                header.format_version, FORMAT_VERSION
            ),
        ));
    }

    let record: RepositoryRecord = codec()
        .with_limit(limit)
        .deserialize_from(&mut reader)
        .map_err(|e| RepoError::corrupt(destination, format!("undecodable repository: {}", e)))?;
    if !reader.is_empty() {
        return Err(RepoError::corrupt(
            destination,
            format!("{} trailing bytes after repository", reader.len()),
        ));
    }
    debug!(path = %destination.display(), branches = record.branches.len(), "repository decoded");

    let repository = record.into_repository(header.format_version, destination)?;
    info!(path = %destination.display(), "repository loaded");
    Ok(repository)
}

/// Fixed-width integers; decoding is bounded by the file size so corrupt
/// length prefixes cannot trigger huge allocations.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

fn encode_error(destination: &Path, err: bincode::Error) -> RepoError {
    RepoError::io(
        destination,
        std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
    )
}
