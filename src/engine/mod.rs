// src/engine/mod.rs
use async_trait::async_trait;

use crate::models::{LeadsResponse, StageAck, StageRequest};

pub mod http;

pub use http::HttpEngine;

/// The three ways a call to the engine can go wrong from this side: the
/// request never completed, the engine answered with a non-success status, or
/// the body did not match the expected shape. The orchestration layer treats
/// all three identically; the split exists so logs and tests can tell them
/// apart.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected engine response shape: {0}")]
    Shape(#[from] serde_json::Error),
}

impl EngineError {
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Transport(_) => "transport",
            EngineError::Status { .. } => "status",
            EngineError::Shape(_) => "shape",
        }
    }
}

/// Everything the console needs from a pipeline engine: read the registry,
/// trigger a stage, pull the bulk export. Implemented over HTTP for real
/// deployments and by scripted fakes in tests.
#[async_trait]
pub trait PipelineEngine: Send + Sync {
    async fn fetch_leads(&self) -> Result<LeadsResponse, EngineError>;

    async fn run_stage(&self, request: &StageRequest) -> Result<StageAck, EngineError>;

    async fn export_csv(&self) -> Result<Vec<u8>, EngineError>;
}
