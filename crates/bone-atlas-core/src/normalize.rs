//! Identifier normalization for mesh names and detection labels.
//!
//! GLB exports, annotation tools, and the detector all spell the same bone
//! slightly differently: `Temporal.L`, `TemporalL`, `TemporalLL`,
//! `Temporal..L`, `Temporal_bone`. [`normalize`] folds these into one
//! canonical form and produces an ordered list of spellings to try against
//! the catalog.
//!
//! # Rules
//!
//! 1. Trim surrounding whitespace.
//! 2. Replace each `_` with a space (trimming again afterwards).
//! 3. Collapse runs of `.` into a single `.`.
//! 4. Strip trailing `.`.
//! 5. Collapse a doubled trailing side letter (`LL` → `L`, `RR` → `R`, and
//!    the lowercase `ll` / `rr`), repeatedly. Mixed pairs such as the `lL`
//!    in `DistalL` are a word ending followed by a side letter and are kept.
//! 6. If the string ends in an uppercase `L`/`R` that is not already
//!    preceded by `.` (or whitespace), insert a `.` before it.
//!
//! Step 2 is only meant for raw identifiers. Display names built after
//! matching must never be passed through here.

use serde::Serialize;

/// Canonical form of a raw identifier plus its ordered lookup variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedIdentifier {
    pub raw: String,
    pub normalized: String,
    /// Spellings to try, in order. Empty when `normalized` is empty.
    pub candidates: Vec<String>,
}

impl NormalizedIdentifier {
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// `normalized` without a trailing `.L` / `.R` side suffix.
    pub fn base(&self) -> &str {
        strip_side_suffix(&self.normalized)
    }
}

/// Normalize a raw identifier. Pure and deterministic; never fails.
pub fn normalize(raw: &str) -> NormalizedIdentifier {
    let normalized = canonical_form(raw);

    let candidates = if normalized.is_empty() {
        Vec::new()
    } else {
        let mut variants = vec![
            raw.to_string(),
            normalized.clone(),
            normalized.replace('.', ""),
        ];
        if let Some(last) = normalized.chars().last().filter(|c| is_side_letter(*c)) {
            variants.push(format!("{normalized}{last}"));
        }
        variants.push(format!("{normalized}."));
        dedup_keep_first(variants)
    };

    NormalizedIdentifier {
        raw: raw.to_string(),
        normalized,
        candidates,
    }
}

fn canonical_form(raw: &str) -> String {
    let s = raw.trim().replace('_', " ");
    let s = s.trim();

    let mut collapsed = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '.' && collapsed.ends_with('.') {
            continue;
        }
        collapsed.push(c);
    }

    let mut s = collapsed
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();

    loop {
        let mut tail = s.chars().rev();
        match (tail.next(), tail.next()) {
            (Some(a), Some(b)) if is_side_letter(a) && a == b => {
                s.pop();
            }
            _ => break,
        }
    }

    let mut tail = s.chars().rev();
    if let (Some(last), Some(prev)) = (tail.next(), tail.next()) {
        if (last == 'L' || last == 'R') && prev != '.' && !prev.is_whitespace() {
            s.pop();
            s.push('.');
            s.push(last);
        }
    }

    s
}

fn is_side_letter(c: char) -> bool {
    matches!(c, 'L' | 'R' | 'l' | 'r')
}

/// Strip a trailing `.L` / `.R` (case-insensitive) from a name.
pub fn strip_side_suffix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2
        && bytes[bytes.len() - 2] == b'.'
        && matches!(bytes[bytes.len() - 1], b'L' | b'R' | b'l' | b'r')
    {
        &name[..name.len() - 2]
    } else {
        name
    }
}

fn dedup_keep_first(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
