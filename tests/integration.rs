use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {"bone_id": 10, "zh_name": "頸椎", "en_name": "Cervical vertebrae", "region": "Spine"},
  {"bone_id": 20, "zh_name": "肋骨 (24)", "en_name": "Ribs", "region": "Thorax"},
  {"bone_id": 21, "zh_name": "胸骨", "en_name": "Sternum", "region": "Thorax"},
  {"bone_id": 40, "small_bone_id": 401, "zh_name": "顳骨", "en_name": "Temporal bone",
   "mesh_name": "Temporal.L", "place": "left"},
  {"bone_id": 40, "small_bone_id": 402, "zh_name": "顳骨", "en_name": "Temporal bone",
   "mesh_name": "Temporal.R", "place": "right"},
  {"bone_id": 50, "small_bone_id": 502, "zh_name": "遠節指骨", "en_name": "Distal phalanx",
   "mesh_name": "Fourth Distal.R"},
  {"bone_id": 50, "small_bone_id": 501, "zh_name": "遠節指骨", "en_name": "Distal phalanx",
   "mesh_name": "Fourth Distal.L"}
]"#;

fn bonectl_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("bonectl");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(root.join("catalog.json"), CATALOG).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/bones.sqlite"

[bootstrap]
top_k = 10

[logging]
level = "warn"

[aliases]
Cervical_Spine = "Cervical vertebrae"
"#,
        root.display()
    );

    let config_path = config_dir.join("bones.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_bonectl(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = bonectl_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run bonectl binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn imported_env() -> (TempDir, PathBuf) {
    let (tmp, config_path) = setup_test_env();
    let catalog = tmp.path().join("catalog.json");
    let (stdout, stderr, success) =
        run_bonectl(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    (tmp, config_path)
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_bonectl(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_bonectl(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_bonectl(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_import_reports_rows() {
    let (tmp, config_path) = setup_test_env();
    let catalog = tmp.path().join("catalog.json");

    let (stdout, _, success) = run_bonectl(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("Imported 7 catalog rows"), "got: {}", stdout);

    // re-import upserts instead of duplicating
    run_bonectl(&config_path, &["import", catalog.to_str().unwrap()]);
    let (stdout, _, _) = run_bonectl(&config_path, &["bones"]);
    let groups: Value = serde_json::from_str(&stdout).unwrap();
    let total: u64 = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 7);
}

#[test]
fn test_resolve_sided_mesh_name() {
    let (_tmp, config_path) = imported_env();

    let (stdout, stderr, success) = run_bonectl(&config_path, &["resolve", "Fourth_DistalL"]);
    assert!(success, "resolve failed: stdout={}, stderr={}", stdout, stderr);
    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["status"], "resolved");
    assert_eq!(v["bone_id"], 50);
    assert_eq!(v["small_bone_id"], 501);
    assert_eq!(v["side"], "L");
}

#[test]
fn test_resolve_uses_aliases() {
    let (_tmp, config_path) = imported_env();

    let (stdout, _, success) = run_bonectl(&config_path, &["resolve", "Cervical_Spine"]);
    assert!(success);
    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["bone_id"], 10);
}

#[test]
fn test_resolve_not_found_exits_nonzero() {
    let (_tmp, config_path) = imported_env();

    let (stdout, _, success) = run_bonectl(&config_path, &["resolve", "Unknownium"]);
    assert!(!success);
    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["status"], "not_found");
    assert_eq!(v["input"], "Unknownium");
}

#[test]
fn test_normalize_without_config() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");

    let (stdout, stderr, success) = run_bonectl(&missing, &["normalize", "Fourth_DistalL"]);
    assert!(success, "normalize failed: {}", stderr);
    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["normalized"], "Fourth Distal.L");
}

#[test]
fn test_bootstrap_end_to_end() {
    let (tmp, config_path) = imported_env();
    let dets = tmp.path().join("dets.json");
    fs::write(
        &dets,
        r#"[
          {"label": "Cervical_Vertebrae", "confidence": 0.91, "geometry": {"box": [0.1, 0.20, 0.2, 0.25]}, "image_case_id": 42},
          {"label": "Cervical_Vertebrae", "confidence": 0.88, "geometry": {"box": [0.1, 0.10, 0.2, 0.15]}, "image_case_id": 42},
          {"label": "Ribs", "confidence": 0.75, "geometry": {"box": [0.3, 0.4, 0.6, 0.5]}, "image_case_id": 42},
          {"label": "Blob", "confidence": 0.40, "geometry": {"box": [0.0, 0.0, 0.1, 0.1]}, "image_case_id": 42}
        ]"#,
    )
    .unwrap();

    let (stdout, stderr, success) = run_bonectl(
        &config_path,
        &[
            "bootstrap",
            "42",
            "--detections",
            dets.to_str().unwrap(),
            "--image-url",
            "https://img.test/42.png",
        ],
    );
    assert!(success, "bootstrap failed: stdout={}, stderr={}", stdout, stderr);

    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert!(v["session_id"].as_str().unwrap().starts_with("s1-42-"));
    assert_eq!(v["title"], "ImageCaseId: 42 辨識結果");
    assert_eq!(v["seed_messages"][0]["type"], "image");
    assert_eq!(v["seed_messages"][0]["url"], "https://img.test/42.png");

    let text = v["seed_messages"][1]["content"].as_str().unwrap();
    assert!(text.contains("- 頸椎（Cervical vertebrae） × 2"), "got: {}", text);
    assert!(text.contains("- 肋骨（Ribs）"), "got: {}", text);
    assert!(text.contains("未能對應明確骨名的區域：1 個"));
    assert_eq!(v["detections"][1]["vertebral_level"], "C1");
}

#[test]
fn test_bootstrap_rejects_empty_image_url() {
    let (tmp, config_path) = imported_env();
    let dets = tmp.path().join("dets.json");
    fs::write(&dets, "[]").unwrap();

    let (_, stderr, success) = run_bonectl(
        &config_path,
        &[
            "bootstrap",
            "42",
            "--detections",
            dets.to_str().unwrap(),
            "--image-url",
            "",
        ],
    );
    assert!(!success);
    assert!(stderr.contains("no image URL"), "got: {}", stderr);
}

#[test]
fn test_bones_groups_left_and_right() {
    let (_tmp, config_path) = imported_env();

    let (stdout, _, success) = run_bonectl(&config_path, &["bones"]);
    assert!(success);
    let groups: Value = serde_json::from_str(&stdout).unwrap();
    let temporal = groups
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["bone_id"] == 40)
        .unwrap();
    assert_eq!(temporal["count"], 2);
    assert_eq!(temporal["left"]["small_bone_id"], 401);
    assert_eq!(temporal["right"]["small_bone_id"], 402);
}

#[test]
fn test_missing_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");
    let (_, stderr, success) = run_bonectl(&missing, &["bones"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
