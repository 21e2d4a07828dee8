//! Small identifier helpers for conversation records: GUID coercion,
//! title sanitizing, and bootstrap session ids.

use uuid::Uuid;

/// Maximum conversation title length, in characters.
pub const TITLE_MAX_CHARS: usize = 60;

/// Coerce a user-supplied conversation id into a GUID.
///
/// Accepts hyphenated, braced (`{...}`), and bare 32-hex forms. Anything
/// else yields `None`.
pub fn normalize_uuid(raw: &str) -> Option<Uuid> {
    let s = raw.trim().trim_start_matches('{').trim_end_matches('}').trim();
    if s.is_empty() {
        return None;
    }
    Uuid::parse_str(s).ok()
}

/// Turn free text into a single-line title of at most
/// [`TITLE_MAX_CHARS`] characters. Blank input yields `None`.
pub fn safe_title(seed: &str) -> Option<String> {
    let flat = seed.replace(['\r', '\n'], " ");
    let t = flat.trim();
    if t.is_empty() {
        return None;
    }
    Some(t.chars().take(TITLE_MAX_CHARS).collect())
}

/// Fixed title for a conversation bootstrapped from an image case.
pub fn case_title(image_case_id: i64) -> String {
    format!("ImageCaseId: {image_case_id} 辨識結果")
}

/// Session id for a detection handoff: `s1-{case}-{8 hex chars}`.
pub fn bootstrap_session_id(image_case_id: i64) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("s1-{}-{}", image_case_id, &hex[..8])
}
