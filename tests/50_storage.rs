mod common;

use anyhow::{Context, Result};
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use serde_json::{json, Value};

use common::TestServer;

async fn register_company(client: &Client, server: &TestServer, handle: &str) -> Result<()> {
    let res = client
        .post(server.url("/companies"))
        .json(&json!({"handle": handle, "password": "secret", "name": format!("{handle} Inc")}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "registering {handle}");
    Ok(())
}

async fn register_user(client: &Client, server: &TestServer, username: &str) -> Result<()> {
    let res = client
        .post(server.url("/users"))
        .json(&json!({"username": username, "password": "secret", "first_name": "Test"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "registering {username}");
    Ok(())
}

/// Log in through the API and return a ready `Authorization` value
async fn login(client: &Client, server: &TestServer, path: &str, body: Value) -> Result<String> {
    let res = client.post(server.url(path)).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "login at {path}");
    let body: Value = res.json().await?;
    let token = body["token"].as_str().context("token missing")?;
    Ok(format!("Bearer {token}"))
}

async fn post_job(client: &Client, server: &TestServer, bearer: &str, company: &str) -> Result<i64> {
    let res = client
        .post(server.url("/jobs"))
        .header(AUTHORIZATION, bearer)
        .json(&json!({"title": "Engineer", "salary": "100k", "equity": 0.1, "company": company}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let job: Value = res.json().await?;
    assert_eq!(job["company"], company);
    job["id"].as_i64().context("job id missing")
}

#[tokio::test]
async fn cross_company_job_patch_is_forbidden() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    let testcompany = common::unique_name("testcompany");
    let otherco = common::unique_name("otherco");
    register_company(&client, server, &testcompany).await?;
    register_company(&client, server, &otherco).await?;

    let other_bearer = login(&client, server, "/company-auth", json!({"handle": otherco, "password": "secret"})).await?;
    let job_id = post_job(&client, server, &other_bearer, &otherco).await?;

    let intruder = common::company_bearer(&testcompany);
    let res = client
        .patch(server.url(&format!("/jobs/{job_id}")))
        .header(AUTHORIZATION, &intruder)
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await?;
    common::expect_error(res, StatusCode::FORBIDDEN).await?;

    let res = client
        .patch(server.url(&format!("/jobs/{job_id}")))
        .header(AUTHORIZATION, &intruder)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    common::expect_error(res, StatusCode::FORBIDDEN).await?;

    let res = client
        .delete(server.url(&format!("/jobs/{job_id}")))
        .header(AUTHORIZATION, &intruder)
        .send()
        .await?;
    common::expect_error(res, StatusCode::FORBIDDEN).await?;

    // Untouched
    let job: Value = client
        .get(server.url(&format!("/jobs/{job_id}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(job["title"], "Engineer");
    Ok(())
}

#[tokio::test]
async fn job_patch_changes_only_sent_columns() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    let handle = common::unique_name("co");
    register_company(&client, server, &handle).await?;
    let bearer = common::company_bearer(&handle);
    let job_id = post_job(&client, server, &bearer, &handle).await?;

    let res = client
        .patch(server.url(&format!("/jobs/{job_id}")))
        .header(AUTHORIZATION, &bearer)
        .json(&json!({"salary": "120k", "equity": 0.25}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let job: Value = res.json().await?;
    assert_eq!(job["id"].as_i64(), Some(job_id));
    assert_eq!(job["salary"], "120k");
    assert_eq!(job["equity"].as_f64(), Some(0.25));
    assert_eq!(job["title"], "Engineer");
    assert_eq!(job["company"], handle.as_str());

    let res = client
        .delete(server.url(&format!("/jobs/{job_id}")))
        .header(AUTHORIZATION, &bearer)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url(&format!("/jobs/{job_id}"))).send().await?;
    common::expect_error(res, StatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn company_patch_returns_updated_row() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    let handle = common::unique_name("co");
    register_company(&client, server, &handle).await?;

    let res = client
        .patch(server.url(&format!("/companies/{handle}")))
        .header(AUTHORIZATION, common::company_bearer(&handle))
        .json(&json!({"logo": "https://example.test/logo.png"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let company: Value = res.json().await?;
    assert_eq!(company["logo"], "https://example.test/logo.png");
    assert_eq!(company["name"], format!("{handle} Inc"));
    assert!(company.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn update_of_missing_key_is_not_found() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    // A valid token for an account that was never registered
    let ghost = common::unique_name("ghost");
    let res = client
        .patch(server.url(&format!("/companies/{ghost}")))
        .header(AUTHORIZATION, common::company_bearer(&ghost))
        .json(&json!({"name": "Nobody"}))
        .send()
        .await?;
    common::expect_error(res, StatusCode::NOT_FOUND).await?;

    let res = client
        .patch(server.url("/jobs/2147483647"))
        .header(AUTHORIZATION, common::company_bearer(&ghost))
        .json(&json!({"title": "Nothing"}))
        .send()
        .await?;
    common::expect_error(res, StatusCode::NOT_FOUND).await?;
    Ok(())
}

#[tokio::test]
async fn listings_page_and_search() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    let tag = common::unique_name("page");
    for suffix in ["a", "b", "c"] {
        register_company(&client, server, &format!("{tag}{suffix}")).await?;
    }

    let first: Vec<Value> = client
        .get(server.url(&format!("/companies?search={tag}&limit=2")))
        .send()
        .await?
        .json()
        .await?;
    let handles: Vec<&str> = first.iter().filter_map(|c| c["handle"].as_str()).collect();
    assert_eq!(handles, vec![format!("{tag}a"), format!("{tag}b")]);

    let rest: Vec<Value> = client
        .get(server.url(&format!("/companies?search={}&offset=2", tag.to_uppercase())))
        .send()
        .await?
        .json()
        .await?;
    let handles: Vec<&str> = rest.iter().filter_map(|c| c["handle"].as_str()).collect();
    assert_eq!(handles, vec![format!("{tag}c")]);
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_conflict() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    let username = common::unique_name("user");
    register_user(&client, server, &username).await?;

    let res = client
        .post(server.url("/users"))
        .json(&json!({"username": username, "password": "other"}))
        .send()
        .await?;
    let message = common::expect_error(res, StatusCode::CONFLICT).await?;
    assert_eq!(message, format!("There already exists a user with username '{username}'."));

    let res = client
        .post(server.url("/user-auth"))
        .json(&json!({"username": username, "password": "wrong"}))
        .send()
        .await?;
    common::expect_error(res, StatusCode::UNAUTHORIZED).await?;
    Ok(())
}

#[tokio::test]
async fn applications_are_unique_and_scoped() -> Result<()> {
    let Some(server) = common::ensure_storage_server().await? else {
        return Ok(());
    };
    let client = Client::new();

    let handle = common::unique_name("hiring");
    let rival = common::unique_name("rival");
    let username = common::unique_name("applicant");
    register_company(&client, server, &handle).await?;
    register_company(&client, server, &rival).await?;
    register_user(&client, server, &username).await?;

    let company_bearer = common::company_bearer(&handle);
    let job_id = post_job(&client, server, &company_bearer, &handle).await?;
    let user_bearer = login(&client, server, "/user-auth", json!({"username": username, "password": "secret"})).await?;

    let apply_url = server.url(&format!("/jobs/{job_id}/applications"));
    let res = client.post(&apply_url).header(AUTHORIZATION, &user_bearer).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let application: Value = res.json().await?;
    assert_eq!(application["username"], username.as_str());
    assert_eq!(application["job_id"].as_i64(), Some(job_id));
    let application_id = application["id"].as_i64().context("application id missing")?;

    let res = client.post(&apply_url).header(AUTHORIZATION, &user_bearer).send().await?;
    let message = common::expect_error(res, StatusCode::CONFLICT).await?;
    assert_eq!(message, "You have already applied for this job.");

    let listed: Vec<Value> = client
        .get(&apply_url)
        .header(AUTHORIZATION, &company_bearer)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed.len(), 1);

    let res = client
        .get(&apply_url)
        .header(AUTHORIZATION, common::company_bearer(&rival))
        .send()
        .await?;
    common::expect_error(res, StatusCode::FORBIDDEN).await?;

    let res = client
        .get(server.url(&format!("/jobs/{job_id}/applications/{application_id}")))
        .header(AUTHORIZATION, common::user_bearer(&common::unique_name("stranger")))
        .send()
        .await?;
    let message = common::expect_error(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(message, "No job application found.");

    let user: Value = client
        .get(server.url(&format!("/users/{username}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(user["jobs"], json!([job_id]));

    let company: Value = client
        .get(server.url(&format!("/companies/{handle}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(company["jobs"], json!([job_id]));

    let res = client
        .delete(server.url(&format!("/jobs/{job_id}/applications/{application_id}")))
        .header(AUTHORIZATION, &user_bearer)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
