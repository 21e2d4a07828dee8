//! Vertebral level assignment.
//!
//! The detector reports one class per spinal segment (`Cervical_Vertebrae`,
//! ...) without saying which vertebra each box is. Sorting a segment's boxes
//! top to bottom and numbering them gives a usable `C1`..`C7`, `T1`..`T12`,
//! `L1`..`L5` label.

use crate::models::RawDetection;

/// Level names beyond a segment's vertebra count.
pub const UNKNOWN_LEVEL: &str = "unknown";

const CERVICAL: [&str; 7] = ["C1", "C2", "C3", "C4", "C5", "C6", "C7"];
const THORACIC: [&str; 12] = [
    "T1", "T2", "T3", "T4", "T5", "T6", "T7", "T8", "T9", "T10", "T11", "T12",
];
const LUMBAR: [&str; 5] = ["L1", "L2", "L3", "L4", "L5"];

/// Detector classes that carry vertebral levels, in anatomical order.
pub const SPINE_SEGMENTS: [(&str, &[&str]); 3] = [
    ("Cervical_Vertebrae", &CERVICAL),
    ("Thoracic_Vertebrae", &THORACIC),
    ("Lumbar_Vertebrae", &LUMBAR),
];

/// Level names for a detector class, if it is a spinal segment.
pub fn levels_for(label: &str) -> Option<&'static [&'static str]> {
    SPINE_SEGMENTS
        .iter()
        .find(|(class, _)| *class == label)
        .map(|(_, levels)| *levels)
}

/// Assign a vertebral level to each spinal detection.
///
/// The result is index-aligned with `detections`; non-spinal detections get
/// `None`. Within a segment, detections are ordered by vertical center
/// (top first, stable on ties) and numbered from the top.
pub fn assign_spine_levels(detections: &[RawDetection]) -> Vec<Option<String>> {
    let mut out: Vec<Option<String>> = vec![None; detections.len()];

    for (class, levels) in SPINE_SEGMENTS {
        let mut members: Vec<usize> = detections
            .iter()
            .enumerate()
            .filter(|(_, d)| d.label == class)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }

        members.sort_by(|&a, &b| {
            detections[a]
                .geometry
                .y_center()
                .partial_cmp(&detections[b].geometry.y_center())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for (rank, idx) in members.into_iter().enumerate() {
            let level = levels.get(rank).copied().unwrap_or(UNKNOWN_LEVEL);
            out[idx] = Some(level.to_string());
        }
    }

    out
}
