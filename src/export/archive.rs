// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zip archive creation and extraction.

use crate::error::{IoContext, Result};
use crate::util::fs as fsutil;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Deflate level used for every archive we write.
pub const COMPRESSION_LEVEL: i64 = 9;

const CHUNK_SIZE: usize = 64 * 1024;

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).ok().map(|m| m.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_path: &Path) -> Option<u32> {
    None
}

/// Zip the contents of `src_dir` into `dest`, with entry names relative to
/// `src_dir`. `on_bytes(done, total)` is called as file data is written.
/// Returns the number of uncompressed bytes archived.
pub fn zip_directory(src_dir: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64, u64)) -> Result<u64> {
    let (dirs, files) = fsutil::walk(src_dir)?;
    let total: u64 = files.iter().map(|f| f.size).sum();

    let out = File::create(dest).at(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(out));

    for dir in dirs {
        zip.add_directory(dir, file_options())?;
    }

    let mut done = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];
    on_bytes(done, total);
    for file in &files {
        let mut options = file_options();
        if let Some(mode) = unix_mode(&file.absolute) {
            options = options.unix_permissions(mode);
        }
        zip.start_file(file.relative.as_str(), options)?;

        let mut input = File::open(&file.absolute).at(&file.absolute)?;
        loop {
            let n = input.read(&mut buf).at(&file.absolute)?;
            if n == 0 {
                break;
            }
            zip.write_all(&buf[..n]).at(dest)?;
            done += n as u64;
            on_bytes(done, total);
        }
    }

    let mut out = zip.finish()?;
    out.flush().at(dest)?;
    log::info!("Archived {} files ({} bytes) into {}", files.len(), done, dest.display());
    Ok(done)
}

/// Extract every entry of `zip_path` into `dest`. Entries that would land
/// outside `dest` are rejected by the zip reader.
pub fn extract_archive(zip_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(zip_path).at(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(dest)?;
    log::info!("Extracted {} entries from {}", archive.len(), zip_path.display());
    Ok(())
}
