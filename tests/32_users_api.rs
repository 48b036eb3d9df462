mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

// Database-backed; skipped unless TEST_DATABASE_URL points at a scratch database.

#[tokio::test]
async fn member_crud_against_postgres() -> Result<()> {
    let Some(pool) = common::database().await? else {
        return Ok(());
    };
    let server = common::TestServer::start(pool).await?;
    let tag = common::run_tag();
    let company = common::create_company(&server, &format!("users-{}", tag)).await?;

    let (status, body) = server
        .post(
            "/api/v1/users",
            &json!({
                "company": company,
                "name": format!("Ann {}", tag),
                "phone": "+15550100",
                "email": format!("ann-{}@example.com", tag),
                "role": "admin"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["error"], "");
    assert_eq!(body["data"]["company"], company.as_str());
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"]["surname"].is_null());
    assert!(body["data"].get("deleted").is_none());
    let id = body["data"]["id"].as_str().context("missing id")?.to_string();

    let (status, body) = server.get(&format!("/api/v1/users/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], format!("ann-{}@example.com", tag));

    // Only the supplied field changes
    let (status, body) = server
        .patch(&format!("/api/v1/users/{}", id), &json!({ "surname": "Lee" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["surname"], "Lee");
    assert_eq!(body["data"]["role"], "admin");
    let updated_at = body["data"]["updatedAt"].clone();

    // Same values again: nothing to write, row comes back untouched
    let (status, body) = server
        .patch(&format!("/api/v1/users/{}", id), &json!({ "surname": "Lee" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updatedAt"], updated_at);

    let (status, body) = server.delete(&format!("/api/v1/users/{}", id)).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = server.get(&format!("/api/v1/users/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found");

    let (status, _) = server.delete(&format!("/api/v1/users/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn member_write_conflicts() -> Result<()> {
    let Some(pool) = common::database().await? else {
        return Ok(());
    };
    let server = common::TestServer::start(pool).await?;
    let tag = common::run_tag();
    let company = common::create_company(&server, &format!("conflicts-{}", tag)).await?;
    let email = format!("dup-{}@example.com", tag);

    let member = json!({
        "company": company,
        "name": "First",
        "phone": "+15550101",
        "email": email
    });
    let (status, _) = server.post("/api/v1/users", &member).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.post("/api/v1/users", &member).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate user");

    let (status, body) = server
        .post(
            "/api/v1/users",
            &json!({
                "company": Uuid::now_v7(),
                "name": "Orphan",
                "phone": "+15550102",
                "email": format!("orphan-{}@example.com", tag)
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "company not found");

    let (status, body) = server
        .post(
            "/api/v1/users",
            &json!({ "company": company, "name": "NoMail", "phone": "+1", "email": "" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "email is empty");

    let ghost = Uuid::now_v7();
    for patch in [json!({ "name": "Ghost" }), json!({}), json!({ "email": "" })] {
        let (status, body) = server.patch(&format!("/api/v1/users/{}", ghost), &patch).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "patch {}", patch);
        assert_eq!(body["error"], "user not found");
    }
    Ok(())
}
