#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use linkedlist_api::auth::{TokenClaims, TokenCodec};
use reqwest::StatusCode;
use serde_json::Value;

/// Secret the spawned server signs and verifies tokens with
pub const TEST_SECRET: &str = "integration-test-secret";

/// Nothing listens here, so storage calls fail fast
const UNREACHABLE_DATABASE: &str = "postgresql://127.0.0.1:1/linkedlist_test";

static SERVER: OnceLock<TestServer> = OnceLock::new();
static STORAGE_SERVER: OnceLock<TestServer> = OnceLock::new();
static NAME_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: &str, run_migrations: bool, connection_timeout: u64) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_linkedlist-api"));
        cmd.env("APP_ENV", "development")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("JWT_SECRET_KEY", TEST_SECRET)
            .env("DATABASE_URL", database_url)
            .env("DATABASE_RUN_MIGRATIONS", run_migrations.to_string())
            .env("DATABASE_CONNECTION_TIMEOUT", connection_timeout.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            // `/` does not need the database
            if let Ok(resp) = client.get(&self.base_url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Server with no reachable database; every case against it must resolve
/// before storage is touched
pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| {
        TestServer::spawn(UNREACHABLE_DATABASE, false, 1).expect("failed to spawn server binary")
    });
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Server backed by the Postgres database in `DATABASE_URL`, migrated on
/// startup. `None` when the variable is unset so storage tests can skip.
pub async fn ensure_storage_server() -> Result<Option<&'static TestServer>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping storage-backed test");
            return Ok(None);
        }
    };

    let server = STORAGE_SERVER.get_or_init(|| {
        TestServer::spawn(&database_url, true, 10).expect("failed to spawn server binary")
    });
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(Some(server))
}

/// Identifier that no other test run has used, e.g. `co1718000000123456x3`
pub fn unique_name(prefix: &str) -> String {
    let n = NAME_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!(
        "{}{}x{}x{}",
        prefix,
        chrono::Utc::now().timestamp_micros(),
        std::process::id(),
        n
    )
}

/// `Authorization` header value for a token signed with the server's secret
pub fn bearer(claims: TokenClaims) -> String {
    let codec = TokenCodec::new(TEST_SECRET).expect("test secret is valid");
    format!("Bearer {}", codec.sign(&claims).expect("token signs"))
}

pub fn user_bearer(username: &str) -> String {
    bearer(TokenClaims::user(username))
}

pub fn company_bearer(handle: &str) -> String {
    bearer(TokenClaims::company(handle))
}

/// Assert the error envelope and return its message
pub async fn expect_error(res: reqwest::Response, status: StatusCode) -> Result<String> {
    assert_eq!(res.status(), status, "unexpected status");
    let body: Value = res.json().await?;
    assert_eq!(body["error"]["status"], status.as_u16());
    let title = body["error"]["title"].as_str().context("error title missing")?;
    assert!(!title.is_empty());
    let message = body["error"]["message"].as_str().context("error message missing")?;
    Ok(message.to_string())
}
