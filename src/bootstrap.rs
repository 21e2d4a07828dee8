//! Detection-to-chat handoff.
//!
//! Takes the detector output for one image case and produces everything a
//! chat backend needs to open a session about it: a session id, a title,
//! the image and seed-text messages, and a per-detection report showing
//! how each label resolved.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bone_atlas_core::aggregate::{tally, Aggregator, LabelAliases};
use bone_atlas_core::catalog::BoneCatalog;
use bone_atlas_core::ids::{bootstrap_session_id, case_title, normalize_uuid, safe_title};
use bone_atlas_core::models::{
    AggregatedDetectionSummary, Geometry, RawDetection, Resolution, Side,
};
use bone_atlas_core::spine::assign_spine_levels;
use bone_atlas_core::summarize::{summarize_with_default, DEFAULT_QUESTION};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::sqlite_catalog::SqliteCatalog;

#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub image_case_id: i64,
    pub image_url: String,
    pub content_type: Option<String>,
    pub question: Option<String>,
    pub top_k: usize,
    pub detections: Vec<RawDetection>,
    /// Existing conversation to seed, in any GUID spelling.
    pub conversation_id: Option<String>,
    /// Title override; sanitized to one line.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    Image,
    Text,
}

/// One opening user turn. Image turns carry `url`; text turns carry `content`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedMessage {
    pub role: String,
    #[serde(rename = "type")]
    pub kind: SeedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
}

impl SeedMessage {
    pub fn image(url: &str, filetype: Option<String>) -> Self {
        Self {
            role: "user".to_string(),
            kind: SeedKind::Image,
            content: None,
            url: Some(url.to_string()),
            filetype,
        }
    }

    pub fn text(content: String) -> Self {
        Self {
            role: "user".to_string(),
            kind: SeedKind::Text,
            content: Some(content),
            url: None,
            filetype: None,
        }
    }
}

/// How one kept detection resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub label: String,
    pub confidence: f32,
    pub geometry: Geometry,
    pub vertebral_level: Option<String>,
    pub resolved: bool,
    pub bone_id: Option<i64>,
    pub small_bone_id: Option<i64>,
    pub display_name: Option<String>,
    pub side: Option<Side>,
    pub matched_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub image_case_id: i64,
    pub title: String,
    pub seed_messages: Vec<SeedMessage>,
    pub summary: AggregatedDetectionSummary,
    pub detections: Vec<DetectionReport>,
}

/// Keep the `top_k` most confident detections, highest first.
///
/// The sort is stable, so equal confidences keep input order. NaN
/// confidences sort after every finite value.
pub fn top_detections(mut detections: Vec<RawDetection>, top_k: usize) -> Vec<RawDetection> {
    detections.sort_by(|a, b| match (a.confidence.is_nan(), b.confidence.is_nan()) {
        (false, false) => b
            .confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
    detections.truncate(top_k);
    detections
}

/// Build the handoff for one image case.
pub async fn bootstrap<C: BoneCatalog + ?Sized>(
    catalog: &C,
    aliases: &LabelAliases,
    default_question: &str,
    request: BootstrapRequest,
) -> Result<BootstrapResponse> {
    let image_url = request.image_url.trim();
    if image_url.is_empty() {
        bail!(
            "Image case {} has no image URL; detection upload may have failed",
            request.image_case_id
        );
    }
    if request.top_k == 0 {
        bail!("top_k must be >= 1");
    }
    let conversation_id = match request.conversation_id.as_deref() {
        Some(raw) => match normalize_uuid(raw) {
            Some(id) => Some(id.hyphenated().to_string()),
            None => bail!("Invalid conversation id: {:?}", raw),
        },
        None => None,
    };

    let case_id = request.image_case_id;
    let total = request.detections.len();
    let own_case: Vec<RawDetection> = request
        .detections
        .into_iter()
        .filter(|d| d.image_case_id == case_id)
        .collect();
    if own_case.len() < total {
        warn!(
            image_case_id = case_id,
            dropped = total - own_case.len(),
            "ignoring detections that belong to other image cases"
        );
    }

    let kept = top_detections(own_case, request.top_k);
    let levels = assign_spine_levels(&kept);

    let aggregator = Aggregator::new(catalog).with_aliases(aliases.clone());
    let resolutions = aggregator.resolve_all(&kept).await?;
    let summary = tally(&resolutions);

    let question = request.question.as_deref().unwrap_or("");
    let seed = summarize_with_default(case_id, &summary, question, default_question);

    let detections: Vec<DetectionReport> = kept
        .into_iter()
        .zip(levels)
        .zip(resolutions.iter())
        .map(|((det, level), resolution)| report(det, level, resolution))
        .collect();

    info!(
        image_case_id = case_id,
        kept = detections.len(),
        bones = summary.entries.len(),
        unresolved = summary.unresolved_count,
        "bootstrap seed built"
    );

    let title = request
        .title
        .as_deref()
        .and_then(safe_title)
        .unwrap_or_else(|| case_title(case_id));

    Ok(BootstrapResponse {
        session_id: bootstrap_session_id(case_id),
        conversation_id,
        image_case_id: case_id,
        title,
        seed_messages: vec![
            SeedMessage::image(image_url, request.content_type),
            SeedMessage::text(seed.into_string()),
        ],
        summary,
        detections,
    })
}

fn report(det: RawDetection, level: Option<String>, resolution: &Resolution) -> DetectionReport {
    let bone = resolution.resolved();
    DetectionReport {
        label: det.label,
        confidence: det.confidence,
        geometry: det.geometry,
        vertebral_level: level,
        resolved: bone.is_some(),
        bone_id: bone.map(|b| b.bone_id),
        small_bone_id: bone.and_then(|b| b.small_bone_id),
        display_name: bone.map(|b| b.display_name.clone()).filter(|n| !n.is_empty()),
        side: bone.and_then(|b| b.side),
        matched_name: bone.map(|b| b.matched_name.clone()),
    }
}

pub fn read_detections(path: &Path) -> Result<Vec<RawDetection>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read detections file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse detections file: {}", path.display()))
}

/// `bonectl bootstrap`: load detections from `detections_path` into
/// `request`, run the handoff against the SQLite catalog, and print the
/// response as JSON.
pub async fn run_bootstrap(
    config: &Config,
    detections_path: &Path,
    mut request: BootstrapRequest,
) -> Result<()> {
    request.detections = read_detections(detections_path)?;
    let pool = db::connect(config).await?;
    let catalog = SqliteCatalog::new(pool);

    let default_question = config
        .bootstrap
        .default_question
        .as_deref()
        .unwrap_or(DEFAULT_QUESTION);

    let response = bootstrap(&catalog, &config.aliases, default_question, request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bone_atlas_core::catalog::memory::InMemoryCatalog;

    fn entry(bone_id: i64, zh: &str, en: &str) -> bone_atlas_core::models::BoneCatalogEntry {
        bone_atlas_core::models::BoneCatalogEntry {
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

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_entries(vec![
            entry(10, "頸椎", "Cervical vertebrae"),
            entry(21, "胸骨", "Sternum"),
            entry(80, "指骨", "Phalanges"),
        ])
    }

    fn det(label: &str, confidence: f32, y: f32, case: i64) -> RawDetection {
        RawDetection {
            label: label.to_string(),
            confidence,
            geometry: Geometry::Box([0.1, y, 0.2, y + 0.1]),
            image_case_id: case,
        }
    }

    fn request(detections: Vec<RawDetection>) -> BootstrapRequest {
        BootstrapRequest {
            image_case_id: 7,
            image_url: "https://img.example/7.png".to_string(),
            content_type: Some("image/png".to_string()),
            question: None,
            top_k: 10,
            detections,
            conversation_id: None,
            title: None,
        }
    }

    #[test]
    fn test_top_detections_stable_and_nan_last() {
        let dets = vec![
            det("a", 0.5, 0.0, 7),
            det("b", f32::NAN, 0.0, 7),
            det("c", 0.9, 0.0, 7),
            det("d", 0.5, 0.0, 7),
        ];
        let labels: Vec<String> = top_detections(dets.clone(), 10)
            .into_iter()
            .map(|d| d.label)
            .collect();
        assert_eq!(labels, vec!["c", "a", "d", "b"]);
        assert_eq!(top_detections(dets, 2).len(), 2);
    }

    #[tokio::test]
    async fn test_bootstrap_builds_seed_messages() {
        let cat = catalog();
        let resp = bootstrap(
            &cat,
            &LabelAliases::default(),
            DEFAULT_QUESTION,
            request(vec![
                det("Cervical_Vertebrae", 0.9, 0.2, 7),
                det("Cervical_Vertebrae", 0.8, 0.1, 7),
                det("Sternum", 0.7, 0.5, 7),
                det("Mystery", 0.6, 0.6, 7),
            ]),
        )
        .await
        .unwrap();

        assert!(resp.session_id.starts_with("s1-7-"));
        assert_eq!(resp.title, "ImageCaseId: 7 辨識結果");
        assert_eq!(resp.seed_messages.len(), 2);
        assert_eq!(resp.seed_messages[0].kind, SeedKind::Image);
        assert_eq!(resp.seed_messages[0].filetype.as_deref(), Some("image/png"));

        let text = resp.seed_messages[1].content.as_deref().unwrap();
        assert!(text.contains("\nImageCaseId: 7\n"));
        assert!(text.contains("- 頸椎（Cervical vertebrae） × 2"));
        assert!(text.contains("- 胸骨（Sternum）"));
        assert!(text.contains("未能對應明確骨名的區域：1 個"));
        assert!(text.contains(DEFAULT_QUESTION));

        assert_eq!(resp.summary.total(), 4);
        // kept order is by confidence; the lower box is C2
        assert_eq!(resp.detections[0].vertebral_level.as_deref(), Some("C2"));
        assert_eq!(resp.detections[1].vertebral_level.as_deref(), Some("C1"));
        assert!(!resp.detections[3].resolved);
        assert_eq!(resp.detections[3].display_name, None);
    }

    #[tokio::test]
    async fn test_bootstrap_applies_top_k_and_case_filter() {
        let cat = catalog();
        let mut req = request(vec![
            det("Sternum", 0.3, 0.0, 7),
            det("Cervical_Vertebrae", 0.9, 0.0, 8),
            det("Cervical_Vertebrae", 0.8, 0.0, 7),
        ]);
        req.top_k = 1;
        req.question = Some("這是什麼骨頭？".to_string());
        let resp = bootstrap(&cat, &LabelAliases::default(), DEFAULT_QUESTION, req)
            .await
            .unwrap();
        assert_eq!(resp.detections.len(), 1);
        assert_eq!(resp.detections[0].bone_id, Some(10));
        let text = resp.seed_messages[1].content.as_deref().unwrap();
        assert!(text.contains("這是什麼骨頭？"));
        assert!(!text.contains(DEFAULT_QUESTION));
    }

    #[tokio::test]
    async fn test_bootstrap_uses_aliases() {
        let cat = catalog();
        let mut aliases = LabelAliases::new();
        aliases.insert("Phalanges_Hand", "Phalanges");
        let resp = bootstrap(
            &cat,
            &aliases,
            DEFAULT_QUESTION,
            request(vec![det("Phalanges_Hand", 0.9, 0.0, 7)]),
        )
        .await
        .unwrap();
        assert_eq!(resp.detections[0].bone_id, Some(80));
        assert_eq!(resp.summary.unresolved_count, 0);
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_empty_image_url() {
        let cat = catalog();
        let mut req = request(vec![]);
        req.image_url = "   ".to_string();
        let err = bootstrap(&cat, &LabelAliases::default(), DEFAULT_QUESTION, req)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no image URL"));
    }

    #[tokio::test]
    async fn test_bootstrap_conversation_id_and_title() {
        let cat = catalog();
        let mut req = request(vec![]);
        req.conversation_id = Some("{6F9619FF-8B86-D011-B42D-00C04FC964FF}".to_string());
        req.title = Some("左手\r\n指骨".to_string());
        let resp = bootstrap(&cat, &LabelAliases::default(), DEFAULT_QUESTION, req)
            .await
            .unwrap();
        assert_eq!(
            resp.conversation_id.as_deref(),
            Some("6f9619ff-8b86-d011-b42d-00c04fc964ff")
        );
        assert_eq!(resp.title, "左手  指骨");

        let mut bad = request(vec![]);
        bad.conversation_id = Some("not-a-guid".to_string());
        assert!(bootstrap(&cat, &LabelAliases::default(), DEFAULT_QUESTION, bad)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_with_no_detections() {
        let cat = catalog();
        let resp = bootstrap(&cat, &LabelAliases::default(), DEFAULT_QUESTION, request(vec![]))
            .await
            .unwrap();
        assert!(resp.summary.is_empty());
        let text = resp.seed_messages[1].content.as_deref().unwrap();
        assert!(text.contains("目前沒有可對應到骨名的偵測結果"));
    }
}
