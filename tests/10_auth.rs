mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{data, TestApp};
use site_cms_api::auth::Role;

#[tokio::test]
async fn health_endpoint_reports_store_state() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["database"], "ok");

    app.store.set_unavailable(true);
    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(data(&body)["database"], "degraded");
    Ok(())
}

#[tokio::test]
async fn whoami_reads_the_stored_role() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (id, token) = app.login("editor@site.test", Some(Role::CompanyAdmin)).await?;

    let (status, body) = app.get("/api/admin/whoami", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["id"], id.to_string());
    assert_eq!(data(&body)["role"], "COMPANY_ADMIN");

    let (status, body) = app.get("/api/admin/whoami", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_anonymous() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, _) = app.get("/api/admin/whoami", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public routes ignore the bad token entirely.
    let (status, _) = app.get("/api/public/services", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn mutations_without_an_allowed_role_never_reach_the_store() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, no_role) = app.login("visitor@site.test", None).await?;
    let (_, company) = app.login("company@site.test", Some(Role::CompanyAdmin)).await?;
    let missing = Uuid::new_v4();

    for token in [None, Some(no_role.as_str()), Some(company.as_str())] {
        let (status, _) = app.post("/api/admin/services", token, json!({ "title": "Audit" })).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .patch(&format!("/api/admin/team-members/{}", missing), token, json!({ "name": "X" }))
            .await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.delete(&format!("/api/admin/faqs/{}", missing), token).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send(reqwest::Method::POST, &format!("/api/admin/services/{}/publish", missing), token, None)
            .await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.patch("/api/admin/settings/site_name", token, json!({ "value": "X" })).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Anonymous callers are refused even for the authenticated-only types.
    let (status, _) = app.post("/api/admin/resources", None, json!({ "title": "Guide" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.store.content_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn revoked_roles_apply_on_the_next_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (id, token) = app.login("temp@site.test", Some(Role::SuperAdmin)).await?;

    let (status, _) = app.post("/api/admin/faqs", Some(&token), json!({ "question": "Q?", "answer": "A." })).await?;
    assert_eq!(status, StatusCode::CREATED);

    app.store.add_principal(id, "temp@site.test", None).await;
    let (status, _) = app.post("/api/admin/faqs", Some(&token), json!({ "question": "Q2?", "answer": "A." })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn grant_requires_an_existing_principal() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.super_admin().await?;

    let (status, body) = app
        .post("/api/admin/admins/grant", Some(&admin), json!({ "email": "ghost@site.test" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    assert_eq!(app.store.role_writes(), 0);

    let (target, target_token) = app.login("new-admin@site.test", None).await?;
    let (status, body) = app
        .post("/api/admin/admins/grant", Some(&admin), json!({ "email": "new-admin@site.test" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["id"], target.to_string());
    assert_eq!(data(&body)["role"], "SUPER_ADMIN");
    assert_eq!(app.store.role_writes(), 1);

    let (_, body) = app.get("/api/admin/whoami", Some(&target_token)).await?;
    assert_eq!(data(&body)["role"], "SUPER_ADMIN");
    Ok(())
}

#[tokio::test]
async fn only_super_admins_may_grant() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, company) = app.login("company@site.test", Some(Role::CompanyAdmin)).await?;
    app.login("someone@site.test", None).await?;

    let (status, _) = app
        .post("/api/admin/admins/grant", Some(&company), json!({ "email": "someone@site.test" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/admin/admins/grant", None, json!({ "email": "someone@site.test" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.role_writes(), 0);
    Ok(())
}
