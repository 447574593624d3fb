use defects::api::DefectsApi;
use defects::config::{DefectsConfig, OnCorrupt};
use defects::error::DefectError;
use defects::model::{DefectPatch, NewDefect};
use defects::store::fs::FileStore;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PIXEL_PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn report(id: &str) -> NewDefect {
    NewDefect {
        defect_id: Some(id.to_string()),
        image_url: Some(format!("data:image/png;base64,{}", PIXEL_PNG_B64)),
        defect_type: Some("Leak".to_string()),
        severity: Some("Medium".to_string()),
        location: Some("Level 2".to_string()),
        description: Some("Water pooling".to_string()),
        ..NewDefect::default()
    }
}

fn open(dir: &Path, config: &DefectsConfig) -> DefectsApi<FileStore> {
    DefectsApi::open(FileStore::new(dir), config).unwrap()
}

#[test]
fn test_records_survive_restart_in_order() {
    let dir = TempDir::new().unwrap();
    let config = DefectsConfig::default();

    {
        let mut api = open(dir.path(), &config);
        api.create_defect(report("B")).unwrap();
        api.create_defect(report("A")).unwrap();
        api.update_defect(
            "B",
            DefectPatch {
                status: Some("Resolved".into()),
                ..DefectPatch::default()
            },
        )
        .unwrap();
    }

    let api = open(dir.path(), &config);
    let listed = api.list_defects();
    let ids: Vec<_> = listed.iter().map(|d| d.defect_id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A"]);
    assert_eq!(listed[0].status, "Resolved");

    let filename = listed[1].image_url.trim_start_matches("/api/images/");
    assert!(api.image(filename).is_ok());
}

#[test]
fn test_record_file_holds_bare_filenames() {
    let dir = TempDir::new().unwrap();
    let mut api = open(dir.path(), &DefectsConfig::default());
    let created = api.create_defect(report("A")).unwrap();

    let raw = fs::read_to_string(dir.path().join("defects.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved[0]["imageUrl"], created.image_url.as_str());
    assert!(dir.path().join("images").join(&created.image_url).is_file());
}

#[test]
fn test_corrupt_record_file_fails_by_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("defects.json"), "[{\"defectId\":").unwrap();

    let result = DefectsApi::open(FileStore::new(dir.path()), &DefectsConfig::default());
    let Err(DefectError::Store(message)) = result else {
        panic!("expected a store error");
    };
    assert!(message.contains("defects.json"));

    // Nothing was overwritten
    let raw = fs::read_to_string(dir.path().join("defects.json")).unwrap();
    assert_eq!(raw, "[{\"defectId\":");
}

#[test]
fn test_corrupt_record_file_can_start_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("defects.json"), "garbage").unwrap();
    let mut config = DefectsConfig::default();
    config.records.on_corrupt = OnCorrupt::StartEmpty;

    let api = open(dir.path(), &config);
    assert_eq!(api.defect_count(), 0);

    let preserved: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.starts_with("defects.json.corrupt-"))
        .collect();
    assert_eq!(preserved.len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join(&preserved[0])).unwrap(),
        "garbage"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("defects.json")).unwrap(),
        "[]"
    );
}

#[test]
fn test_custom_layout_from_config() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path())
        .with_records_file(dir.path().join("records.json"))
        .with_images_dir(dir.path().join("photos"));
    let mut api = DefectsApi::open(store, &DefectsConfig::default()).unwrap();
    let created = api.create_defect(report("A")).unwrap();

    assert!(dir.path().join("records.json").is_file());
    assert!(dir.path().join("photos").join(&created.image_url).is_file());
    assert!(!dir.path().join("defects.json").exists());
}

#[test]
fn test_loads_records_written_by_earlier_server() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("defects.json"),
        r#"[
  {
    "defectId": "DEF-1700000000000",
    "timestamp": "2023-11-14T22:13:20.000Z",
    "imageUrl": "0b6f0c1e-8f3c-4c8e-9a55-1c2d3e4f5a6b.png",
    "defectType": "Crack",
    "severity": "High",
    "location": "Beam 3",
    "description": "Visible crack",
    "status": "New",
    "reportedBy": "Anonymous",
    "assignedTo": null
  },
  {
    "defectId": "DEF-1700000000001",
    "timestamp": "2023-11-14T22:13:21.000Z",
    "imageUrl": "1b6f0c1e-8f3c-4c8e-9a55-1c2d3e4f5a6b.png",
    "defectType": "Leak",
    "severity": "Low",
    "location": "Roof",
    "description": "Drip",
    "status": "Resolved",
    "reportedBy": "Sam"
  }
]"#,
    )
    .unwrap();

    let api = open(dir.path(), &DefectsConfig::default());
    assert_eq!(api.defect_count(), 2);
    let second = api.get_defect("DEF-1700000000001").unwrap();
    assert_eq!(second.assigned_to, None);
    assert_eq!(
        second.image_url,
        "/api/images/1b6f0c1e-8f3c-4c8e-9a55-1c2d3e4f5a6b.png"
    );
}
