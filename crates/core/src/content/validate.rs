//! Field value checks shared by the content setters.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::{ContentError, Field};

/// Number of known licenses. Ids run from 1.
pub const LICENSE_COUNT: i32 = 11;

const LICENSES: [&str; LICENSE_COUNT as usize] = [
    "Copyright, all rights reserved",
    "Creative Commons Attribution",
    "Creative Commons Attribution-ShareAlike",
    "Creative Commons Attribution-NoDerivs",
    "Creative Commons Attribution-NonCommercial",
    "Creative Commons Attribution-NonCommercial-ShareAlike",
    "Creative Commons Attribution-NonCommercial-NoDerivs",
    "GNU General Public License",
    "GNU Free Documentation License",
    "Public domain",
    "Creative Commons Zero",
];

#[allow(clippy::unwrap_used)]
static LANGUAGE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2,3}$").unwrap());

#[allow(clippy::unwrap_used)]
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Extension to mimetype, for image fields.
static IMAGE_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("gif", "image/gif"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("webp", "image/webp"),
    ])
});

/// Extension to mimetype, for media fields.
static MEDIA_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Audio
        ("mp3", "audio/mpeg"),
        ("m4a", "audio/mp4"),
        ("oga", "audio/ogg"),
        ("ogg", "audio/ogg"),
        ("wav", "audio/x-wav"),
        ("flac", "audio/flac"),
        // Video
        ("mp4", "video/mp4"),
        ("m4v", "video/mp4"),
        ("ogv", "video/ogg"),
        ("webm", "video/webm"),
        // Documents and archives
        ("pdf", "application/pdf"),
        ("epub", "application/epub+zip"),
        ("zip", "application/zip"),
        ("gz", "application/x-gzip"),
        ("tar", "application/x-tar"),
        ("txt", "text/plain"),
        ("csv", "text/csv"),
        ("odt", "application/vnd.oasis.opendocument.text"),
        ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
        (
            "docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        // Images offered as downloads
        ("gif", "image/gif"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
    ])
});

/// Parse a `YYYY-MM-DD` date, falling back to today.
pub fn parse_date(value: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            warn!(value, "Invalid date, using today");
            today()
        }
    }
}

#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Check a license id.
pub fn check_rights(value: i64) -> Result<i32, ContentError> {
    if (1..=i64::from(LICENSE_COUNT)).contains(&value) {
        Ok(value as i32)
    } else {
        Err(ContentError::invalid(
            Field::Rights,
            format!("unknown license id {value}"),
        ))
    }
}

/// Name of a license id.
#[must_use]
pub fn license_name(id: i32) -> Option<&'static str> {
    usize::try_from(id)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| LICENSES.get(i))
        .copied()
}

/// All licenses as `(id, name)`.
pub fn licenses() -> impl Iterator<Item = (i32, &'static str)> {
    (1..).zip(LICENSES)
}

/// Trim a slug and join its words with dashes. Empty yields `None`.
#[must_use]
pub fn slugify(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE.replace_all(trimmed, "-").into_owned())
}

/// Check an ISO 639 language code. Empty yields `None`.
pub fn check_language(value: &str) -> Result<Option<String>, ContentError> {
    let code = value.trim().to_ascii_lowercase();
    if code.is_empty() {
        return Ok(None);
    }
    if LANGUAGE_CODE.is_match(&code) {
        Ok(Some(code))
    } else {
        Err(ContentError::invalid(
            Field::Language,
            format!("not a language code: {value}"),
        ))
    }
}

/// Clean untrusted HTML down to the allowed tag set.
#[must_use]
pub fn sanitize_html(value: &str) -> Option<String> {
    let clean = ammonia::clean(value.trim());
    if clean.is_empty() { None } else { Some(clean) }
}

/// Trimmed text, `None` when empty.
#[must_use]
pub fn plain_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reject traversal sequences, separators and NUL bytes in a file name.
pub fn check_file_path(field: Field, name: &str) -> Result<(), ContentError> {
    if name.contains("..") || name.contains(['/', '\\', '\0']) {
        warn!(%field, "Rejected unsafe file path");
        return Err(ContentError::UnsafePath { field });
    }
    Ok(())
}

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Mimetype of an image file name, if its extension is allowed.
pub fn image_mimetype(name: &str) -> Result<&'static str, ContentError> {
    lookup(&IMAGE_TYPES, Field::Image, name)
}

/// Mimetype of a media file name, if its extension is allowed.
pub fn media_mimetype(name: &str) -> Result<&'static str, ContentError> {
    lookup(&MEDIA_TYPES, Field::Media, name)
}

/// Whether a mimetype is one the media field may carry.
#[must_use]
pub fn is_media_mimetype(mimetype: &str) -> bool {
    MEDIA_TYPES.values().any(|m| *m == mimetype)
}

fn lookup(
    table: &HashMap<&'static str, &'static str>,
    field: Field,
    name: &str,
) -> Result<&'static str, ContentError> {
    check_file_path(field, name)?;
    extension(name)
        .and_then(|ext| table.get(ext.as_str()).copied())
        .ok_or_else(|| ContentError::DisallowedFile {
            field,
            name: name.to_string(),
        })
}
