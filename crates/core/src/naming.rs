//! Remote object naming convention.
//!
//! Recordings are named `YYYY-MM-DD_<anything><suffix>`, e.g.
//! `2021-11-20_14h00m00s.mp4`. The remote object name is the local file name.

use chrono::NaiveDate;
use std::path::Path;

/// Default video file suffix.
pub const DEFAULT_VIDEO_SUFFIX: &str = ".mp4";

/// Format of the date prefix.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Separator between the date prefix and the rest of the name.
pub const DATE_SEPARATOR: char = '_';

/// Returns true if the path's file name ends with `suffix`.
pub fn has_video_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(suffix))
}

/// Remote object name for a local file.
pub fn remote_name_for(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| crate::Error::invalid_date(value))
}

/// Extracts the date prefix of a remote name: everything before the first `_`.
///
/// Names without a separator are parsed whole and fail unless the whole name
/// is a date.
pub fn parse_date_prefix(name: &str) -> crate::Result<NaiveDate> {
    let prefix = name
        .split_once(DATE_SEPARATOR)
        .map(|(prefix, _)| prefix)
        .unwrap_or(name);
    parse_date(prefix)
}

/// Whether `name` is a recording made on `date`.
pub fn is_recording_of(name: &str, date: NaiveDate, suffix: &str) -> bool {
    name.ends_with(suffix) && name.starts_with(&date.format(DATE_FORMAT).to_string())
}
