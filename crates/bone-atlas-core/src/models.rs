//! Core data types shared by the resolution pipeline.
//!
//! Detections and catalog rows come in from the host; everything else is
//! produced fresh per call and never persisted.

use serde::{Deserialize, Serialize};

/// Detection geometry, with coordinates normalized to `[0, 1]`.
///
/// Serialized externally tagged: `{"box": [x1, y1, x2, y2]}` or
/// `{"polygon": [[x, y], [x, y], [x, y], [x, y]]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    /// Axis-aligned box `[x1, y1, x2, y2]`.
    Box([f32; 4]),
    /// Rotated box given as four corner points.
    Polygon([[f32; 2]; 4]),
}

impl Geometry {
    /// Vertical center of the shape. Smaller values are closer to the top.
    pub fn y_center(&self) -> f32 {
        match self {
            Geometry::Box([_, y1, _, y2]) => (y1 + y2) / 2.0,
            Geometry::Polygon(points) => points.iter().map(|p| p[1]).sum::<f32>() / 4.0,
        }
    }
}

/// One detector or annotation hit for an image case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Model-native class name, e.g. `Cervical_Vertebrae`.
    pub label: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    pub geometry: Geometry,
    /// External image-case record this detection belongs to.
    pub image_case_id: i64,
}

/// A canonical bone record from the catalog. Read-only from this crate's
/// point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneCatalogEntry {
    pub bone_id: i64,
    /// Chinese name. May carry a disambiguating suffix such as `肋骨 (24)`.
    #[serde(default)]
    pub zh_name: String,
    #[serde(default)]
    pub en_name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub description: String,
    /// Sub-part id for rows that describe one piece of a larger bone.
    #[serde(default)]
    pub small_bone_id: Option<i64>,
    /// 3D viewer mesh name mapped to this row, e.g. `Temporal.L`.
    #[serde(default)]
    pub mesh_name: Option<String>,
    /// Free-text placement hint (`"left"`, `"Right side"`, ...).
    #[serde(default)]
    pub place: Option<String>,
}

impl BoneCatalogEntry {
    /// The name this row is addressed by: the mesh name when mapped,
    /// otherwise the English name.
    pub fn lookup_name(&self) -> &str {
        match self.mesh_name.as_deref() {
            Some(mesh) if !mesh.trim().is_empty() => mesh,
            _ => &self.en_name,
        }
    }
}

/// Laterality of a paired structure. Unsided (centerline) bones use `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// A catalog hit for a normalized identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBone {
    pub bone_id: i64,
    /// `"{zh}（{en}）"` when both names exist, else whichever is present.
    /// Empty when the catalog row carries neither name.
    pub display_name: String,
    pub small_bone_id: Option<i64>,
    pub side: Option<Side>,
    /// Left/right-insensitive key used to merge paired rows.
    pub group_key: String,
    /// The catalog string (mesh or English name) that matched.
    pub matched_name: String,
    pub entry: BoneCatalogEntry,
}

/// Diagnostic payload for an identifier that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    pub input: String,
    pub normalized: String,
    pub candidates_tried: Vec<String>,
}

/// Outcome of resolving one identifier. Not finding a bone is an ordinary
/// value here; only catalog failures surface as errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolvedBone),
    NotFound(NotFound),
}

impl Resolution {
    pub fn resolved(&self) -> Option<&ResolvedBone> {
        match self {
            Resolution::Resolved(bone) => Some(bone),
            Resolution::NotFound(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// One `display name → count` line of an aggregated summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub display_name: String,
    pub count: usize,
}

/// Per-image-case tally of resolved detections.
///
/// `entries` are ordered by descending count, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedDetectionSummary {
    pub entries: Vec<SummaryEntry>,
    pub unresolved_count: usize,
}

impl AggregatedDetectionSummary {
    /// Number of detections that went into this summary.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum::<usize>() + self.unresolved_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unresolved_count == 0
    }
}

/// Rendered first user turn for the chat collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeedContext(String);

impl SeedContext {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SeedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
