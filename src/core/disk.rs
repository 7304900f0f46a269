//! Download directory statistics
//!
//! Used by `/status` and the `status` CLI subcommand.

use std::io;
use std::path::Path;

/// Summary of the files stored in the download directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirStats {
    /// Number of regular files
    pub files: u64,
    /// Sum of their sizes in bytes
    pub total_bytes: u64,
}

/// Counts the regular files directly inside `dir` and sums their sizes.
///
/// Subdirectories (such as `logs/`) are not descended into, and any path in
/// `exclude` (the channel registry file, for instance) is skipped. A missing
/// directory yields empty statistics.
pub fn download_dir_stats(dir: &Path, exclude: &[&Path]) -> io::Result<DirStats> {
    let entries = match fs_err::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(DirStats::default()),
        Err(e) => return Err(e),
    };

    let mut stats = DirStats::default();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if exclude.iter().any(|skip| *skip == path.as_path()) {
            continue;
        }
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            stats.files += 1;
            stats.total_bytes += metadata.len();
        }
    }

    Ok(stats)
}
