//! Note constants, upload naming, and input parsing helpers.

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a note title in characters.
pub const MAX_TITLE_LENGTH: u64 = 255;

/// Foreign key from `notes.category_id` to `categories.id`.
pub const CATEGORY_FK_CONSTRAINT: &str = "fk_notes_category";

/// Logical directory every uploaded audio file is stored under.
pub const AUDIO_UPLOAD_DIR: &str = "voice_notes";

/// Stem used when an upload arrives without a usable file name.
const FALLBACK_AUDIO_STEM: &str = "audio";

// ---------------------------------------------------------------------------
// Upload naming
// ---------------------------------------------------------------------------

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped and every character outside
/// `[A-Za-z0-9._-]` becomes `_`. Names that end up empty (or consist only
/// of dots) fall back to `audio`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        FALLBACK_AUDIO_STEM.to_string()
    } else {
        cleaned
    }
}

/// Logical storage path for an uploaded audio file: `voice_notes/<name>`.
pub fn audio_storage_path(file_name: &str) -> String {
    format!("{AUDIO_UPLOAD_DIR}/{}", sanitize_file_name(file_name))
}

/// Insert `suffix` between the stem and the extension of a storage path.
///
/// `voice_notes/clip.mp3` + `Ab3dE9x` -> `voice_notes/clip_Ab3dE9x.mp3`.
pub fn with_name_suffix(path: &str, suffix: &str) -> String {
    let (dir, file) = match path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, path),
    };

    let renamed = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{file}_{suffix}"),
    };

    match dir {
        Some(dir) => format!("{dir}/{renamed}"),
        None => renamed,
    }
}

// ---------------------------------------------------------------------------
// Category references
// ---------------------------------------------------------------------------

/// Parse a category reference sent as text (multipart fields, query strings).
///
/// Blank input means "no category". Anything else must be an integer id.
pub fn parse_category_ref(raw: &str) -> Result<Option<DbId>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    trimmed
        .parse::<DbId>()
        .map(Some)
        .map_err(|_| format!("Incorrect type. Expected pk value, received \"{trimmed}\"."))
}

/// Message used when a note references a category the caller does not own.
pub fn unknown_category_message(id: DbId) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}
