// src/engine/http.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{EngineError, PipelineEngine};
use crate::models::{LeadsResponse, Result, Stage, StageAck, StageRequest};

/// HTTP client for a pipeline engine. Owns its endpoints pre-joined from the
/// configured base URL, so every call site works with a checked `Url`.
pub struct HttpEngine {
    client: Client,
    leads_url: Url,
    export_url: Url,
    generate_url: Url,
    enrich_url: Url,
    prepare_url: Url,
    send_url: Url,
}

impl HttpEngine {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        // A base of "http://host/api" must keep its prefix when joined.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        debug!("Created engine client for {}", base);
        Ok(Self {
            client,
            leads_url: base.join("leads")?,
            export_url: base.join("export/csv")?,
            generate_url: base.join("agent/generate")?,
            enrich_url: base.join("agent/enrich")?,
            prepare_url: base.join("agent/prepare-messages")?,
            send_url: base.join("agent/send")?,
        })
    }

    fn stage_url(&self, stage: Stage) -> &Url {
        match stage {
            Stage::Generate => &self.generate_url,
            Stage::Enrich => &self.enrich_url,
            Stage::PrepareMessages => &self.prepare_url,
            Stage::Send => &self.send_url,
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> std::result::Result<T, EngineError> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = response.text().await?;
            Err(EngineError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl PipelineEngine for HttpEngine {
    async fn fetch_leads(&self) -> std::result::Result<LeadsResponse, EngineError> {
        debug!("GET {}", self.leads_url);
        let response = self.client.get(self.leads_url.clone()).send().await?;
        Self::parse_json(response).await
    }

    async fn run_stage(
        &self,
        request: &StageRequest,
    ) -> std::result::Result<StageAck, EngineError> {
        let url = self.stage_url(request.stage());
        debug!("POST {} {}", url, request.payload());
        let response = self
            .client
            .post(url.clone())
            .json(&request.payload())
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn export_csv(&self) -> std::result::Result<Vec<u8>, EngineError> {
        debug!("GET {}", self.export_url);
        let response = self.client.get(self.export_url.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.bytes().await?.to_vec())
        } else {
            let body = response.text().await?;
            Err(EngineError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::models::LeadStatus;
    use crate::sandbox::{self, SandboxRegistry};
    use std::time::Duration;

    // Reserve a free loopback port by binding to 0 and letting it go again.
    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    async fn start_sandbox() -> (String, rocket::Shutdown) {
        let config = SandboxConfig {
            listen_address: "127.0.0.1".to_string(),
            port: free_port(),
        };
        let shutdown = sandbox::launch(&config, SandboxRegistry::new())
            .await
            .unwrap();
        (config.url(), shutdown)
    }

    fn engine_for(url: &str) -> HttpEngine {
        HttpEngine::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_prefix_survives_endpoint_joins() {
        let engine = engine_for("http://engine.internal:8000/bridge");
        assert_eq!(
            engine.leads_url.as_str(),
            "http://engine.internal:8000/bridge/leads"
        );
        assert_eq!(
            engine.stage_url(Stage::PrepareMessages).as_str(),
            "http://engine.internal:8000/bridge/agent/prepare-messages"
        );
        assert_eq!(
            engine.export_url.as_str(),
            "http://engine.internal:8000/bridge/export/csv"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_cycle_against_sandbox_engine() {
        let (url, shutdown) = start_sandbox().await;
        let engine = engine_for(&url);

        let empty = engine.fetch_leads().await.unwrap();
        assert!(empty.leads.is_empty());

        let ack = engine
            .run_stage(&StageRequest::Generate {
                count: 8,
                industry: "SaaS".into(),
                seed: 77,
            })
            .await
            .unwrap();
        assert_eq!(ack.status, "success");
        assert_eq!(ack.generated, Some(8));

        let ack = engine
            .run_stage(&StageRequest::Enrich { limit: 5 })
            .await
            .unwrap();
        assert_eq!(ack.processed, Some(5));

        let ack = engine
            .run_stage(&StageRequest::PrepareMessages { limit: 5 })
            .await
            .unwrap();
        assert_eq!(ack.processed, Some(5));

        let ack = engine
            .run_stage(&StageRequest::Send {
                limit: 5,
                dry_run: true,
            })
            .await
            .unwrap();
        assert_eq!(ack.status, "complete");
        assert_eq!(ack.mode.as_deref(), Some("DRY RUN"));

        let synced = engine.fetch_leads().await.unwrap();
        assert_eq!(synced.leads.len(), 8);
        assert_eq!(
            synced
                .leads
                .iter()
                .filter(|lead| lead.status == LeadStatus::Sent)
                .count(),
            5
        );
        assert_eq!(synced.engine_total(), 8);

        shutdown.notify();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn distinct_seeds_produce_independent_batches() {
        let (url, shutdown) = start_sandbox().await;
        let engine = engine_for(&url);

        for seed in [11, 12] {
            engine
                .run_stage(&StageRequest::Generate {
                    count: 10,
                    industry: "Fintech".into(),
                    seed,
                })
                .await
                .unwrap();
        }

        let synced = engine.fetch_leads().await.unwrap();
        assert!(
            synced.leads.len() > 10,
            "a second seed should add a fresh batch, got {}",
            synced.leads.len()
        );

        shutdown.notify();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn export_streams_the_full_registry() {
        let (url, shutdown) = start_sandbox().await;
        let engine = engine_for(&url);

        engine
            .run_stage(&StageRequest::Generate {
                count: 3,
                industry: "Biotech".into(),
                seed: 5,
            })
            .await
            .unwrap();

        let bytes = engine.export_csv().await.unwrap();
        let body = String::from_utf8(bytes).unwrap();
        let mut lines = body.lines();
        assert!(lines.next().unwrap().starts_with("id,full_name,email"));
        assert_eq!(lines.count(), 3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads_export.csv");
        tokio::fs::write(&path, body.as_bytes()).await.unwrap();
        assert!(path.exists());

        shutdown.notify();
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_transport_error() {
        // Reserved but unbound port: connection refused.
        let engine = engine_for(&format!("http://127.0.0.1:{}", free_port()));
        let error = engine.fetch_leads().await.unwrap_err();
        assert_eq!(error.category(), "transport");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_success_status_is_reported_with_body() {
        use rocket::http::Status as HttpStatus;

        #[rocket::get("/leads")]
        fn broken() -> (HttpStatus, &'static str) {
            (HttpStatus::InternalServerError, "registry offline")
        }

        let port = free_port();
        let figment = rocket::Config::figment()
            .merge(("address", "127.0.0.1"))
            .merge(("port", port))
            .merge(("log_level", "off"));
        let rocket = rocket::custom(figment)
            .mount("/", rocket::routes![broken])
            .ignite()
            .await
            .unwrap();
        let shutdown = rocket.shutdown();
        tokio::spawn(rocket.launch());
        sandbox::wait_until_ready("127.0.0.1", port).await.unwrap();

        let engine = engine_for(&format!("http://127.0.0.1:{}", port));
        let error = engine.fetch_leads().await.unwrap_err();
        assert_eq!(error.category(), "status");
        match error {
            EngineError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "registry offline");
            }
            other => panic!("expected status error, got {:?}", other),
        }

        shutdown.notify();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_body_is_a_shape_error() {
        #[rocket::get("/leads")]
        fn junk() -> &'static str {
            "not a leads payload"
        }

        let port = free_port();
        let figment = rocket::Config::figment()
            .merge(("address", "127.0.0.1"))
            .merge(("port", port))
            .merge(("log_level", "off"));
        let rocket = rocket::custom(figment)
            .mount("/", rocket::routes![junk])
            .ignite()
            .await
            .unwrap();
        let shutdown = rocket.shutdown();
        tokio::spawn(rocket.launch());
        sandbox::wait_until_ready("127.0.0.1", port).await.unwrap();

        let engine = engine_for(&format!("http://127.0.0.1:{}", port));
        let error = engine.fetch_leads().await.unwrap_err();
        assert_eq!(error.category(), "shape");

        shutdown.notify();
    }
}
