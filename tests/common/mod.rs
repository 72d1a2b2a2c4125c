#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    // Holding the child keeps its stdin pipe open; the server exits when we do
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_trustchain-api"));
        cmd.env("TRUSTCHAIN_API_PORT", port.to_string())
            .env("TRUSTCHAIN_STORE", "memory")
            .env("TRUSTCHAIN_SHUTDOWN_ON_STDIN_CLOSE", "1")
            .env("APP_ENV", "development")
            .env_remove("PORT")
            .stdin(Stdio::piped())
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
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
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

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}

/// Fresh identifier so tests sharing one server never collide
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Status plus decoded JSON body
pub async fn send(request: reqwest::RequestBuilder) -> Result<(StatusCode, Value)> {
    let res = request.send().await?;
    let status = res.status();
    let body = res.json::<Value>().await.context("response body is not JSON")?;
    Ok((status, body))
}

pub async fn get(path: &str) -> Result<(StatusCode, Value)> {
    let server = ensure_server().await?;
    send(reqwest::Client::new().get(server.url(path))).await
}

pub async fn post(path: &str, body: &Value) -> Result<(StatusCode, Value)> {
    let server = ensure_server().await?;
    send(reqwest::Client::new().post(server.url(path)).json(body)).await
}

pub async fn put(path: &str, body: &Value) -> Result<(StatusCode, Value)> {
    let server = ensure_server().await?;
    send(reqwest::Client::new().put(server.url(path)).json(body)).await
}

pub async fn delete(path: &str) -> Result<(StatusCode, Value)> {
    let server = ensure_server().await?;
    send(reqwest::Client::new().delete(server.url(path))).await
}

/// POST that must succeed with 201; returns the created document
pub async fn create(path: &str, body: &Value) -> Result<Value> {
    let (status, res) = post(path, body).await?;
    anyhow::ensure!(status == StatusCode::CREATED, "POST {} -> {}: {}", path, status, res);
    Ok(res["data"].clone())
}

pub fn id_of(document: &Value) -> String {
    document["$id"].as_str().unwrap_or_default().to_string()
}
