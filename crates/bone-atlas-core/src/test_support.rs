//! Shared fixtures for unit tests.

use crate::catalog::memory::InMemoryCatalog;
use crate::models::{BoneCatalogEntry, Geometry, RawDetection};

pub(crate) fn entry(bone_id: i64, zh: &str, en: &str) -> BoneCatalogEntry {
    BoneCatalogEntry {
        bone_id,
        zh_name: zh.to_string(),
        en_name: en.to_string(),
        region: String::new(),
        description: String::new(),
        small_bone_id: None,
        mesh_name: None,
        place: None,
    }
}

pub(crate) fn mesh_entry(
    bone_id: i64,
    small_bone_id: i64,
    zh: &str,
    en: &str,
    mesh: &str,
    place: Option<&str>,
) -> BoneCatalogEntry {
    BoneCatalogEntry {
        small_bone_id: Some(small_bone_id),
        mesh_name: Some(mesh.to_string()),
        place: place.map(str::to_string),
        ..entry(bone_id, zh, en)
    }
}

/// A small catalog covering the naming quirks the resolver has to absorb.
pub(crate) fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_entries(vec![
        entry(10, "頸椎", "Cervical vertebrae"),
        entry(11, "胸椎", "Thoracic vertebrae"),
        entry(12, "腰椎", "Lumbar vertebrae"),
        entry(20, "肋骨 (24)", "Ribs"),
        entry(21, "胸骨", "Sternum"),
        entry(30, "骶骨", "Sacrum"),
        mesh_entry(40, 401, "顳骨", "Temporal bone", "Temporal.L", Some("left")),
        mesh_entry(40, 402, "顳骨", "Temporal bone", "Temporal.R", Some("right")),
        mesh_entry(50, 501, "遠節指骨", "Distal phalanx", "Fourth Distal.L", None),
        mesh_entry(50, 502, "遠節指骨", "Distal phalanx", "Fourth Distal.R", None),
        mesh_entry(60, 601, "額骨", "Frontal bone", "Frontal", None),
    ])
}

pub(crate) fn detection(label: &str, y: f32) -> RawDetection {
    RawDetection {
        label: label.to_string(),
        confidence: 0.9,
        geometry: Geometry::Box([0.1, y, 0.2, y + 0.05]),
        image_case_id: 42,
    }
}
