//! Social identity provider export/import and organization listing.

mod common;

use std::sync::Arc;

use common::*;
use idsync_core::prelude::*;
use serde_json::json;

fn tenant() -> MemoryRemote {
    MemoryRemote::new()
        .with_script(groovy_script("t-google", "Google Profile Normalization", "return profile\n"))
        .with_provider(provider("google", "googleConfig", Some("t-google")))
        .with_provider(provider("apple", "appleConfig", None))
}

#[tokio::test]
async fn test_export_embeds_transform_script() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("google.idp.json");
    let sync = IdpSync::new(Arc::new(tenant()), context());

    sync.export_provider("google", Some(&file)).await.unwrap();

    let bundle: ExportBundle = ExportBundle::read(&file).unwrap();
    assert!(bundle.idp.contains_key("google"));
    let script = bundle.script.get("t-google").unwrap();
    assert_eq!(script.script, vec!["return profile".to_string(), String::new()]);
    assert!(bundle.missing_transform_scripts().is_empty());
}

#[tokio::test]
async fn test_list_is_sorted_and_lookup_checks_presence() {
    let sync = IdpSync::new(Arc::new(tenant()), context());

    let ids: Vec<String> = sync
        .list_providers()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["apple", "google"]);

    let err = sync.get_provider_by_id("github").await.unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
}

#[tokio::test]
async fn test_import_writes_transform_script_before_provider() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("all.idp.json");
    IdpSync::new(Arc::new(tenant()), context())
        .export_providers_to_file(Some(&file))
        .await
        .unwrap();

    let target = Arc::new(MemoryRemote::new());
    let batch = IdpSync::new(target.clone(), context())
        .import_providers_from_file(&file)
        .await
        .unwrap();
    assert_eq!(batch.success_count, 2);

    let writes = target.writes();
    let script_at = writes
        .iter()
        .position(|w| matches!(w, Write::Script(id, _) if id == "t-google"))
        .unwrap();
    let provider_at = writes
        .iter()
        .position(|w| *w == Write::Provider("googleConfig".to_string(), "google".to_string()))
        .unwrap();
    assert!(script_at < provider_at);
    assert!(writes.contains(&Write::Provider("appleConfig".to_string(), "apple".to_string())));
}

#[tokio::test]
async fn test_missing_transform_script_is_skipped_with_provider_written() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("google.idp.json");
    let mut bundle: ExportBundle = context().bundle();
    bundle
        .idp
        .insert("google".to_string(), provider("google", "googleConfig", Some("gone")));
    bundle.write(&file).unwrap();

    let target = Arc::new(MemoryRemote::new());
    IdpSync::new(target.clone(), context())
        .import_provider_by_id("google", &file)
        .await
        .unwrap();

    assert_eq!(
        target.writes(),
        vec![Write::Provider("googleConfig".to_string(), "google".to_string())]
    );
}

#[tokio::test]
async fn test_import_unknown_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("google.idp.json");
    IdpSync::new(Arc::new(tenant()), context())
        .export_provider("google", Some(&file))
        .await
        .unwrap();

    let target = Arc::new(MemoryRemote::new());
    let err = IdpSync::new(target.clone(), context())
        .import_provider_by_id("apple", &file)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
    assert!(target.writes().is_empty());
}

#[tokio::test]
async fn test_separate_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let exported = IdpSync::new(Arc::new(tenant()), context())
        .export_providers_to_files(dir.path())
        .await
        .unwrap();
    assert_eq!(exported.success_count, 2);
    assert!(dir.path().join("apple.idp.json").is_file());
    assert!(dir.path().join("google.idp.json").is_file());

    let target = Arc::new(MemoryRemote::new());
    let sync = IdpSync::new(target.clone(), context());
    let imported = sync.import_providers_from_files(dir.path()).await.unwrap();
    assert_eq!(imported.total, 2);
    assert_eq!(imported.success_count, 2);
    assert!(target.script("t-google").is_some());

    let first = sync
        .import_first_provider(&dir.path().join("apple.idp.json"))
        .await
        .unwrap();
    assert_eq!(first, "apple");
}

#[tokio::test]
async fn test_organizations_accumulate_every_page() {
    let orgs: Vec<_> = (0..5)
        .map(|i| json!({"_id": format!("org-{i}"), "name": format!("Org {i}")}))
        .collect();
    let remote = Arc::new(MemoryRemote::new().with_managed_pages(
        "alpha_organization",
        idsync_core::pager::chunk_pages(&orgs, 2),
    ));
    let sync = OrganizationSync::new(remote.clone(), organization_type(REALM, true));

    let listed = sync.list_organizations().await.unwrap();
    assert_eq!(listed, orgs);
    assert_eq!(remote.cursors().len(), 3);
    assert_eq!(
        remote.queried_fields()[0],
        vec!["name", "parent/*/name", "children/*/name"]
    );
}
