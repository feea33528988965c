use std::fs;
use std::path::Path;
use std::sync::Arc;

use matchly::directory::{
    Attachment, CreatorDirectoryService, CreatorId, FileBlobStore, FilterCriteria, JsonFileStore,
    OnboardingForm, OnboardingGuard, SortMode,
};
use serde_json::{json, Value};

type FileService = CreatorDirectoryService<JsonFileStore, FileBlobStore>;

fn open_service(root: &Path) -> FileService {
    let records = JsonFileStore::open(root.join("records")).expect("record store opens");
    let blobs = FileBlobStore::open(root.join("media-kits")).expect("blob store opens");
    CreatorDirectoryService::new(
        Arc::new(records),
        Arc::new(blobs),
        OnboardingGuard::new(64 * 1024),
    )
}

fn form(name: &str, platform: &str, followers: &str) -> OnboardingForm {
    OnboardingForm {
        name: name.to_string(),
        niche: "Beauty".to_string(),
        platform: platform.to_string(),
        followers: followers.to_string(),
    }
}

fn pdf(label: &str) -> Attachment {
    Attachment::new(
        format!("{label}.pdf"),
        "application/pdf",
        format!("%PDF-1.7 {label}").into_bytes(),
    )
}

fn read_document(root: &Path, key: &str) -> Value {
    let raw = fs::read_to_string(root.join("records").join(format!("{key}.json")))
        .expect("document exists");
    serde_json::from_str(&raw).expect("document is json")
}

#[test]
fn records_and_shortlist_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");

    let (jane, sam) = {
        let service = open_service(dir.path());
        let jane = service
            .onboard(form("Jane", "Instagram", "25000"), Some(pdf("jane")))
            .expect("jane onboarded");
        let sam = service
            .onboard(form("Sam", "tiktok", "900"), Some(pdf("sam")))
            .expect("sam onboarded");
        service.toggle_saved(&sam.id).expect("sam saved");
        (jane, sam)
    };

    let stored = read_document(dir.path(), "creators");
    assert_eq!(stored[0]["name"], "Jane");
    assert_eq!(stored[1]["platform"], "TikTok");
    assert!(stored[0]["createdAt"].is_i64());
    assert!(stored[0]["mediaKit"]
        .as_str()
        .map_or(false, |reference| reference.starts_with("sha256:")));
    assert_eq!(read_document(dir.path(), "savedCreators"), json!([sam.id.as_str()]));

    let restarted = open_service(dir.path());
    let view = restarted
        .discover(&FilterCriteria::default(), SortMode::MostFollowers)
        .expect("discover");
    let order: Vec<&CreatorId> = view.creators.iter().map(|card| &card.record.id).collect();
    assert_eq!(order, vec![&sam.id, &jane.id]);

    let current = restarted
        .current_profile()
        .expect("read")
        .expect("profile exists");
    assert_eq!(current.id, sam.id);

    let dashboard = restarted.dashboard().expect("read").expect("dashboard");
    let handle = dashboard.media_kit_preview.expect("kit resolvable on disk");
    let bytes = restarted
        .open_preview(&handle)
        .expect("open")
        .expect("bytes");
    assert_eq!(bytes, pdf("sam").bytes);

    let fresh_process = open_service(dir.path());
    assert!(fresh_process
        .open_preview(&handle)
        .expect("open")
        .is_none());
}

#[test]
fn legacy_file_is_backfilled_on_first_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records = dir.path().join("records");
    fs::create_dir_all(&records).expect("records dir");
    fs::write(
        records.join("creators.json"),
        json!([
            { "id": "old-1", "name": "Old One", "niche": "Food", "platform": "YouTube", "followers": 10 },
            { "id": "old-2", "name": "Old Two", "niche": "Food", "platform": "", "followers": 20, "mediaKit": "uploads/old-2.pdf" }
        ])
        .to_string(),
    )
    .expect("seed legacy file");

    let service = open_service(dir.path());
    let loaded = service.creators().expect("load");
    assert!(loaded.iter().all(|record| record.created_at.is_some()));
    assert_eq!(loaded[1].platform, None);

    let stored = read_document(dir.path(), "creators");
    let first_pass: Vec<Value> = stored
        .as_array()
        .expect("array")
        .iter()
        .map(|record| record["createdAt"].clone())
        .collect();
    assert!(first_pass.iter().all(Value::is_i64));

    let reloaded = open_service(dir.path()).creators().expect("reload");
    assert_eq!(reloaded, loaded);

    let dashboard = service.dashboard().expect("read").expect("dashboard");
    assert!(dashboard.media_kit_preview.is_none());
}

#[test]
fn unreadable_file_is_left_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records = dir.path().join("records");
    fs::create_dir_all(&records).expect("records dir");
    fs::write(records.join("creators.json"), "[{\"id\": ").expect("seed corrupted file");

    let service = open_service(dir.path());
    assert!(service.creators().expect("read path").is_empty());
    assert!(service
        .onboard(form("Jane", "Instagram", "25000"), Some(pdf("jane")))
        .is_err());

    let raw = fs::read_to_string(records.join("creators.json")).expect("file still there");
    assert_eq!(raw, "[{\"id\": ");
}

#[test]
fn deleting_a_creator_clears_it_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = open_service(dir.path());
    let jane = service
        .onboard(form("Jane", "Instagram", "25000"), Some(pdf("jane")))
        .expect("onboarded");
    service.toggle_saved(&jane.id).expect("saved");

    service.delete(&jane.id).expect("delete").expect("existed");

    assert_eq!(read_document(dir.path(), "creators"), json!([]));
    assert_eq!(read_document(dir.path(), "savedCreators"), json!([]));
}
