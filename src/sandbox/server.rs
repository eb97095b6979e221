// src/sandbox/server.rs
use rocket::http::ContentType;
use rocket::{get, post, routes, serde::json::Json, Build, Rocket, State};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::SandboxRegistry;
use crate::config::SandboxConfig;
use crate::models::{LeadsResponse, Result, StageAck};

// Request bodies mirror the engine bridge defaults: count 5, seed 42,
// limit 5, dry_run on.
#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(default = "default_count")]
    count: u32,
    #[serde(default)]
    industry: String,
    #[serde(default = "default_seed")]
    seed: u32,
}

#[derive(Debug, Deserialize)]
struct LimitBody {
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct SendBody {
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default = "default_dry_run")]
    dry_run: bool,
}

fn default_count() -> u32 {
    5
}

fn default_seed() -> u32 {
    42
}

fn default_limit() -> u32 {
    5
}

fn default_dry_run() -> bool {
    true
}

#[get("/")]
async fn index() -> Json<Value> {
    Json(json!({
        "status": "Sandbox Engine Online",
        "endpoints": {
            "leads": "/leads",
            "generate": "/agent/generate",
            "enrich": "/agent/enrich",
            "prepare_messages": "/agent/prepare-messages",
            "send": "/agent/send",
            "export": "/export/csv"
        }
    }))
}

#[get("/health")]
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "lead-console-sandbox"
    }))
}

#[get("/leads")]
async fn get_leads(registry: &State<SandboxRegistry>) -> Json<LeadsResponse> {
    Json(registry.fetch())
}

#[post("/generate", data = "<body>")]
async fn generate(registry: &State<SandboxRegistry>, body: Json<GenerateBody>) -> Json<StageAck> {
    Json(registry.generate(body.count, &body.industry, body.seed))
}

#[post("/enrich", data = "<body>")]
async fn enrich(registry: &State<SandboxRegistry>, body: Json<LimitBody>) -> Json<StageAck> {
    Json(registry.enrich(body.limit))
}

#[post("/prepare-messages", data = "<body>")]
async fn prepare_messages(
    registry: &State<SandboxRegistry>,
    body: Json<LimitBody>,
) -> Json<StageAck> {
    Json(registry.prepare_messages(body.limit))
}

#[post("/send", data = "<body>")]
async fn send(registry: &State<SandboxRegistry>, body: Json<SendBody>) -> Json<StageAck> {
    Json(registry.send(body.limit, body.dry_run))
}

#[get("/csv")]
async fn export_csv(registry: &State<SandboxRegistry>) -> (ContentType, String) {
    (ContentType::CSV, registry.export_csv())
}

pub fn build_rocket(config: &SandboxConfig, registry: SandboxRegistry) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.listen_address.clone()))
        .merge(("port", config.port))
        .merge(("log_level", "off"));

    rocket::custom(figment)
        .manage(registry)
        .mount("/", routes![index, health_check, get_leads])
        .mount("/agent", routes![generate, enrich, prepare_messages, send])
        .mount("/export", routes![export_csv])
}

/// Ignite and launch the sandbox in a background task, returning a shutdown
/// handle once the listener accepts connections.
pub async fn launch(config: &SandboxConfig, registry: SandboxRegistry) -> Result<rocket::Shutdown> {
    let rocket = build_rocket(config, registry).ignite().await?;
    let shutdown = rocket.shutdown();

    tokio::spawn(async move {
        if let Err(e) = rocket.launch().await {
            error!("❌ Sandbox engine exited: {}", e);
        }
    });

    wait_until_ready(&config.listen_address, config.port).await?;
    info!(
        "🧪 Sandbox engine listening on {}:{}",
        config.listen_address, config.port
    );
    Ok(shutdown)
}

/// Poll the listener until it accepts a TCP connection.
pub async fn wait_until_ready(host: &str, port: u16) -> Result<()> {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect((host, port)).await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
    }
    Err(format!("sandbox engine never came up on {}:{}", host, port).into())
}
