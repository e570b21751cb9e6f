//! File discovery module for finding input videos and numbered outputs.
//!
//! Inputs are `.mp4`/`.mov` files (case-insensitive) in the top level of the
//! job's input directory. Outputs are files named `{n}.mp4` whose numeric
//! stems determine where the next batch starts counting.

use crate::error::{CoreError, CoreResult};
use crate::utils::is_valid_video_file;

use std::path::{Path, PathBuf};

/// Finds video files eligible for processing in the specified directory.
///
/// Only the top level is scanned. Results are sorted by path so repeated
/// runs over the same directory visit files in the same order.
///
/// # Errors
///
/// * `CoreError::Io` - the directory cannot be read
/// * `CoreError::NoInputFiles` - no `.mp4`/`.mov` file was found
///
/// # Examples
///
/// ```rust,no_run
/// use vidmorph_core::find_input_files;
/// use std::path::Path;
///
/// match find_input_files(Path::new("/path/to/uploads")) {
///     Ok(files) => println!("Found {} video files", files.len()),
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_input_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            is_valid_video_file(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoInputFiles);
    }

    files.sort();
    Ok(files)
}

/// Returns the largest numeric stem among `.mp4`/`.mov` files in `dir`.
///
/// Non-numeric names are ignored. A missing directory counts as empty.
pub fn largest_numbered_output(dir: &Path) -> CoreResult<u64> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let largest = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !is_valid_video_file(&path) {
                return None;
            }
            path.file_stem()?.to_str()?.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);

    Ok(largest)
}
