mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;
use uuid::Uuid;

use common::{data, TestApp, MEDIA_BASE_URL};
use site_cms_api::auth::{AuthorizationGuard, Role, SessionPrincipal};
use site_cms_api::content::ContentError;
use site_cms_api::media::{ListOptions, LocalObjectStore, MediaLibrary, ObjectStore};
use site_cms_api::store::MemoryStore;

#[tokio::test]
async fn upload_list_and_delete_over_http() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.super_admin().await?;

    let (status, body) = app.upload("Team Photo (1).png", Some(&admin), b"\x89PNG....", "image/png").await?;
    assert_eq!(status, StatusCode::CREATED);
    let entry = data(&body).clone();
    let name = entry["name"].as_str().unwrap_or_default().to_string();
    assert!(name.ends_with("-TeamPhoto1.png"), "unexpected name {}", name);
    assert_eq!(entry["kind"], "image");
    assert_eq!(entry["url"], format!("{}/{}", MEDIA_BASE_URL, name));
    assert_eq!(app.objects.contents(&name).await.as_deref(), Some(&b"\x89PNG...."[..]));

    let (status, body) = app.get("/api/admin/media", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)[0]["name"], name.as_str());

    let (status, _) = app.delete(&format!("/api/admin/media/{}", name), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.objects.len().await, 0);
    Ok(())
}

#[tokio::test]
async fn media_writes_require_super_admin() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, company) = app.login("company@site.test", Some(Role::CompanyAdmin)).await?;

    let (status, _) = app.upload("brochure.pdf", None, b"%PDF-1.7", "application/pdf").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.upload("brochure.pdf", Some(&company), b"%PDF-1.7", "application/pdf").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.objects.len().await, 0);

    // Any signed-in principal may browse.
    let (status, _) = app.get("/api/admin/media", Some(&company)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/admin/media", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn empty_uploads_and_bad_sorts_are_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.super_admin().await?;

    let (status, body) = app.upload("empty.txt", Some(&admin), b"", "text/plain").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["file"].is_string());

    let (status, _) = app.get("/api/admin/media?sort=size", Some(&admin)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

async fn super_admin_session(store: &MemoryStore) -> SessionPrincipal {
    let id = Uuid::new_v4();
    store.add_principal(id, "root@site.test", Some(Role::SuperAdmin)).await;
    SessionPrincipal { id, email: "root@site.test".to_string() }
}

#[tokio::test]
async fn colliding_names_never_overwrite() -> Result<()> {
    let content = Arc::new(MemoryStore::new());
    let session = super_admin_session(&content).await;
    let root = std::env::temp_dir().join(format!("site-cms-media-{}", Uuid::new_v4()));
    let objects = Arc::new(LocalObjectStore::new(&root, MEDIA_BASE_URL));

    let library = MediaLibrary::with_clock(
        objects.clone(),
        AuthorizationGuard::new(content.clone()),
        Arc::new(|| 1_700_000_000_000_i64),
    );

    let first = library
        .upload(Some(&session), "logo.svg", b"<svg/>".to_vec(), Some("image/svg+xml"))
        .await?;
    assert_eq!(first.name, "1700000000000-logo.svg");

    let err = library
        .upload(Some(&session), "logo.svg", b"<svg>replaced</svg>".to_vec(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Conflict(_)));

    let stored = tokio::fs::read(root.join("1700000000000-logo.svg")).await?;
    assert_eq!(stored, b"<svg/>");

    let listed = objects.list("", &ListOptions::default()).await?;
    assert_eq!(listed.len(), 1);

    tokio::fs::remove_dir_all(&root).await?;
    Ok(())
}
