//! Extract stage: unpack the zip archive into the vendor directory.
//!
//! Entry paths are kept relative to the destination and existing files are
//! overwritten. Entries that would land outside the destination are rejected.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::InstallError;

/// Unpack every entry of `archive` into `dest`, returning the number of files written.
/// `dest` must already exist.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, InstallError> {
    let fail = |source: ZipError| InstallError::Extraction {
        archive: archive.to_path_buf(),
        source,
    };
    let io_fail = |e: io::Error| fail(ZipError::Io(e));

    let file = File::open(archive).map_err(io_fail)?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(fail)?;

    let mut files = 0usize;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(fail)?;
        let relative = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(InstallError::UnsafeArchiveEntry {
                    name: entry.name().to_string(),
                })
            }
        };
        let outpath = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(io_fail)?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(io_fail)?;
        }
        // a previous install may have left a read-only file here
        match fs::remove_file(&outpath) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_fail(e)),
        }
        let mut outfile = File::create(&outpath).map_err(io_fail)?;
        io::copy(&mut entry, &mut outfile).map_err(io_fail)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))
                    .map_err(io_fail)?;
            }
        }
        tracing::trace!(entry = %relative.display(), "extracted");
        files += 1;
    }
    Ok(files)
}
