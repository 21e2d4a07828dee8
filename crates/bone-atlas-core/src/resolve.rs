//! Candidate matching against the bone catalog.
//!
//! # Matching Algorithm
//!
//! 1. Try an exact (case-insensitive) lookup for each candidate spelling,
//!    in candidate order. First hit wins.
//! 2. Otherwise strip a trailing `.L` / `.R` from the normalized form and
//!    run a prefix lookup on that base.
//! 3. Order prefix hits by name (ascending, case-insensitive), then
//!    `bone_id`, then `small_bone_id`. Take the first hit whose own name
//!    normalizes to the input's normalized form, else the first hit.
//! 4. Nothing found yields [`Resolution::NotFound`] with the spellings
//!    that were tried.
//!
//! Catalog errors are returned as-is. Retrying is the catalog's business.

use anyhow::Result;
use tracing::debug;

use crate::aggregate::display_name;
use crate::catalog::BoneCatalog;
use crate::models::{BoneCatalogEntry, NotFound, Resolution, ResolvedBone, Side};
use crate::normalize::{normalize, NormalizedIdentifier};

/// Resolve a normalized identifier to a catalog bone.
pub async fn resolve<C: BoneCatalog + ?Sized>(
    ident: &NormalizedIdentifier,
    catalog: &C,
) -> Result<Resolution> {
    if ident.candidates.is_empty() {
        return Ok(not_found(ident));
    }

    for candidate in &ident.candidates {
        if let Some(entry) = catalog.exact_match(candidate).await? {
            let matched = matched_name(&entry, candidate);
            return Ok(Resolution::Resolved(resolved_bone(entry, matched)));
        }
    }

    let base = ident.base().trim();
    if !base.is_empty() {
        let mut hits = catalog.prefix_match(base).await?;
        if !hits.is_empty() {
            debug!(
                input = %ident.raw,
                base,
                hits = hits.len(),
                "no exact catalog match, using prefix match"
            );
            hits.sort_by(|a, b| {
                a.lookup_name()
                    .to_ascii_lowercase()
                    .cmp(&b.lookup_name().to_ascii_lowercase())
                    .then(a.bone_id.cmp(&b.bone_id))
                    .then(a.small_bone_id.cmp(&b.small_bone_id))
            });
            let pick = hits
                .iter()
                .position(|e| normalizes_to(e, &ident.normalized))
                .unwrap_or(0);
            let entry = hits.swap_remove(pick);
            let matched = entry.lookup_name().to_string();
            return Ok(Resolution::Resolved(resolved_bone(entry, matched)));
        }
    }

    debug!(input = %ident.raw, normalized = %ident.normalized, "no catalog match");
    Ok(not_found(ident))
}

/// Normalize `raw` and resolve it. Convenience for single identifiers.
pub async fn resolve_name<C: BoneCatalog + ?Sized>(raw: &str, catalog: &C) -> Result<Resolution> {
    resolve(&normalize(raw), catalog).await
}

fn not_found(ident: &NormalizedIdentifier) -> Resolution {
    Resolution::NotFound(NotFound {
        input: ident.raw.clone(),
        normalized: ident.normalized.clone(),
        candidates_tried: ident.candidates.clone(),
    })
}

fn entry_names(entry: &BoneCatalogEntry) -> impl Iterator<Item = &str> {
    entry
        .mesh_name
        .as_deref()
        .into_iter()
        .chain(std::iter::once(entry.en_name.as_str()))
        .filter(|n| !n.trim().is_empty())
}

fn normalizes_to(entry: &BoneCatalogEntry, normalized: &str) -> bool {
    entry_names(entry).any(|n| normalize(n).normalized.eq_ignore_ascii_case(normalized))
}

fn matched_name(entry: &BoneCatalogEntry, candidate: &str) -> String {
    entry_names(entry)
        .find(|n| n.eq_ignore_ascii_case(candidate))
        .unwrap_or(candidate)
        .to_string()
}

fn resolved_bone(entry: BoneCatalogEntry, matched_name: String) -> ResolvedBone {
    let side_source = entry
        .mesh_name
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(&matched_name);
    let side = side_of(entry.place.as_deref(), side_source);

    ResolvedBone {
        bone_id: entry.bone_id,
        display_name: base_display_name(&entry).unwrap_or_default(),
        small_bone_id: entry.small_bone_id,
        side,
        group_key: group_key(&entry),
        matched_name,
        entry,
    }
}

/// Determine laterality from a catalog placement hint, falling back to the
/// mesh name's side suffix.
///
/// `place` wins when it mentions "left" or "right". A mesh name side is a
/// trailing `.L`/`.R` (any case) or a bare uppercase `L`/`R` glued to the
/// name, as in `TemporalL`.
pub fn side_of(place: Option<&str>, mesh_name: &str) -> Option<Side> {
    let place = place.unwrap_or("").trim().to_ascii_lowercase();
    if place.contains("left") {
        return Some(Side::Left);
    }
    if place.contains("right") {
        return Some(Side::Right);
    }

    let m = mesh_name.trim();
    let mut tail = m.chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some('.')) => match last {
            'L' | 'l' => Some(Side::Left),
            'R' | 'r' => Some(Side::Right),
            _ => None,
        },
        (Some('L'), Some(prev)) if !prev.is_whitespace() => Some(Side::Left),
        (Some('R'), Some(prev)) if !prev.is_whitespace() => Some(Side::Right),
        _ => None,
    }
}

/// Key under which left and right rows of the same structure merge.
///
/// Built from the catalog base name (English, else mesh, else cleaned
/// Chinese) with whitespace collapsed and any side token removed, so
/// `Temporal.L` and `Temporal.R` share `Temporal`. Distinct bone ids with
/// the same structure therefore share a key.
pub fn group_key(entry: &BoneCatalogEntry) -> String {
    let base = [
        Some(entry.en_name.as_str()),
        entry.mesh_name.as_deref(),
        Some(entry.zh_name.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .unwrap_or("");

    let collapsed = base.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_side_token(&collapsed).to_string()
}

/// Display name with any side token removed from the English part, so
/// `Scapula.L` and `Scapula.R` rows read the same.
pub fn base_display_name(entry: &BoneCatalogEntry) -> Option<String> {
    let en = entry.en_name.split_whitespace().collect::<Vec<_>>().join(" ");
    display_name(&entry.zh_name, strip_side_token(&en))
}

const SIDE_SUFFIXES: [&str; 8] = [" left", " right", "(l)", "(r)", ".l", ".r", " l", " r"];
const SIDE_PREFIXES: [&str; 2] = ["left ", "right "];

fn strip_side_token(name: &str) -> &str {
    let mut s = name;
    let lower = s.to_ascii_lowercase();
    if let Some(prefix) = SIDE_PREFIXES.iter().find(|p| lower.starts_with(*p)) {
        s = &s[prefix.len()..];
    }

    let lower = s.to_ascii_lowercase();
    if let Some(suffix) = SIDE_SUFFIXES.iter().find(|p| lower.ends_with(*p)) {
        return s[..s.len() - suffix.len()].trim_end();
    }

    let mut tail = s.chars().rev();
    if let (Some(last @ ('L' | 'R')), Some(prev)) = (tail.next(), tail.next()) {
        if prev.is_ascii_lowercase() {
            return &s[..s.len() - last.len_utf8()];
        }
    }
    s.trim()
}
