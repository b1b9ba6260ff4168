//! File helpers for session directories and package archives.

use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::lib::errors::PackagerError;

/// Unix permission bits applied to generated ZIP entries.
const ZIP_FILE_PERMISSIONS: u32 = 0o644;

/// In-memory entry appended to an archive next to the session files.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub content: &'a [u8],
}

/// List regular files directly under `dir`, skipping dot-files.
///
/// A missing directory yields an empty list.
pub fn list_session_files(dir: &Path) -> Result<Vec<PathBuf>, PackagerError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| PackagerError::SessionDir {
        path: dir.to_path_buf(),
        source,
    })? {
        let entry = entry.map_err(|source| PackagerError::SessionDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Write `files` (flattened to their file names) and `entries` into a zip at `destination`.
pub fn zip_files(
    files: &[PathBuf],
    entries: &[ArchiveEntry<'_>],
    destination: &Path,
) -> Result<(), PackagerError> {
    let file = File::create(destination).map_err(|source| PackagerError::Io {
        path: destination.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(ZIP_FILE_PERMISSIONS);

    for path in files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"));
        let mut buffer = Vec::new();
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .map_err(|source| PackagerError::Io {
                path: path.clone(),
                source,
            })?;
        write_entry(&mut zip, &name, &buffer, options, destination)?;
    }

    for entry in entries {
        write_entry(&mut zip, entry.name, entry.content, options, destination)?;
    }

    zip.finish().map_err(|source| PackagerError::Zip {
        path: destination.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_entry(
    zip: &mut ZipWriter<File>,
    name: &str,
    content: &[u8],
    options: FileOptions,
    destination: &Path,
) -> Result<(), PackagerError> {
    zip.start_file(name, options)
        .map_err(|source| PackagerError::Zip {
            path: destination.to_path_buf(),
            source,
        })?;
    zip.write_all(content).map_err(|source| PackagerError::Io {
        path: destination.to_path_buf(),
        source,
    })
}

/// Return the SHA256 of any file as a hex string.
pub fn compute_sha256(path: &Path) -> Result<String, PackagerError> {
    let mut file = File::open(path).map_err(|source| PackagerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer).map_err(|source| PackagerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Copy `source` to `destination`, creating missing parent directories.
pub fn copy_into_place(source: &Path, destination: &Path) -> Result<(), PackagerError> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| PackagerError::Io {
            path: parent.to_path_buf(),
            source: err,
        })?;
    }
    fs::copy(source, destination).map_err(|err| PackagerError::Io {
        path: destination.to_path_buf(),
        source: err,
    })?;
    Ok(())
}
