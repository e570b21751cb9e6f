//! Utility functions for formatting and file operations.
//!
//! This module provides general-purpose utility functions used throughout the
//! vidmorph-core library: duration formatting, encoder time and
//! frame-rate parsing, and the "exists and is non-empty" check every stage
//! relies on.

use std::path::Path;

/// Extensions accepted as batch inputs (compared case-insensitively).
pub const INPUT_EXTENSIONS: [&str; 2] = ["mp4", "mov"];

/// Checks if the given path is a file with an accepted input extension.
#[must_use]
pub fn is_valid_video_file(path: &Path) -> bool {
    path.is_file() && has_input_extension(path)
}

/// True when the extension is `.mp4` or `.mov` in any case.
#[must_use]
pub fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// True when `path` is an existing regular file with at least one byte.
#[must_use]
pub fn is_nonempty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Parses an ffprobe rational frame rate ("30000/1001", "25/1" or "25").
/// Returns None for "0/0" and other unusable values.
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse::<f64>().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}

/// Safely extracts filename from a path with consistent error handling.
pub fn get_filename_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_video_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.mp4", "b.MOV", "c.Mp4", "d.mkv", "e.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        assert!(is_valid_video_file(&dir.path().join("a.mp4")));
        assert!(is_valid_video_file(&dir.path().join("b.MOV")));
        assert!(is_valid_video_file(&dir.path().join("c.Mp4")));
        assert!(!is_valid_video_file(&dir.path().join("d.mkv")));
        assert!(!is_valid_video_file(&dir.path().join("e.txt")));
        assert!(!is_valid_video_file(&dir.path().join("missing.mp4")));
    }

    #[test]
    fn test_is_nonempty_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp4");
        let full = dir.path().join("full.mp4");
        std::fs::write(&empty, b"").unwrap();
        std::fs::write(&full, b"data").unwrap();

        assert!(!is_nonempty_file(&empty));
        assert!(is_nonempty_file(&full));
        assert!(!is_nonempty_file(&dir.path().join("absent.mp4")));
        assert!(!is_nonempty_file(dir.path()));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:01:30.50"), Some(90.5));
        assert_eq!(parse_ffmpeg_time("garbage"), None);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("30"), Some(30.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate(""), None);
    }
}
