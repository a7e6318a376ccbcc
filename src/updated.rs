//! Signature database update date.
//!
//! The `update` command records the date of the last successful signature
//! update in a sentinel file. Results carry that date as `YYYYMMDD`; when no
//! update has run yet the build time of the plugin is used instead.

use chrono::{DateTime, NaiveDate};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Canonical format of the update date.
pub const UPDATED_FORMAT: &str = "%Y%m%d";

/// Normalizes a date string to `YYYYMMDD`.
///
/// Accepts an already normalized date, an RFC 2822 timestamp such as
/// `Mon, 22 Aug 2016 02:43:50 +0000`, or an ISO-8601 date or datetime.
/// Returns `None` when the input matches none of them.
///
/// # Example
///
/// ```
/// use fsecure::updated::normalize_date;
///
/// assert_eq!(normalize_date("Mon, 22 Aug 2016 02:43:50 +0000").as_deref(), Some("20160822"));
/// assert_eq!(normalize_date("20160822").as_deref(), Some("20160822"));
/// ```
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let date = if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(raw, UPDATED_FORMAT).ok()?
    } else if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        dt.date_naive()
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.date_naive()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?
    };

    Some(date.format(UPDATED_FORMAT).to_string())
}

/// Returns the last update date recorded in `sentinel`.
///
/// Falls back to `build_time`, unchanged, when the sentinel does not exist,
/// cannot be read or is empty.
pub fn last_updated(sentinel: &Path, build_time: &str) -> String {
    if !sentinel.exists() {
        return build_time.to_string();
    }

    let content = match fs::read_to_string(sentinel) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %sentinel.display(), error = %e, "cannot read update sentinel, using build time");
            return build_time.to_string();
        }
    };

    let first_line = content.lines().next().map(str::trim).unwrap_or_default();
    if first_line.is_empty() {
        warn!(path = %sentinel.display(), "update sentinel is empty, using build time");
        return build_time.to_string();
    }

    match normalize_date(first_line) {
        Some(date) => date,
        None => {
            warn!(path = %sentinel.display(), value = first_line, "unrecognised update date");
            first_line.to_string()
        }
    }
}
