use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{config::Config, orchestrator::Orchestrator};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Seed range the generate stage draws from, one fresh value per invocation.
pub const GENERATE_SEED_SPACE: u32 = 1_000_000;

/// One prospective contact as reported by the pipeline engine. Read-only on
/// this side: the console never constructs or mutates leads, it only re-reads
/// the set after triggering stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub website: String,
    pub role: String,
    pub country: String,
    pub industry: String,
    pub linkedin_url: String,
    pub status: LeadStatus,
    // Draft fields stay unset until the prepare-messages stage has run.
    #[serde(default)]
    pub email_draft: Option<String>,
    #[serde(default)]
    pub linkedin_draft: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn has_drafts(&self) -> bool {
        self.email_draft.is_some() || self.linkedin_draft.is_some()
    }
}

/// Lifecycle states in pipeline order. FAILED is terminal and reachable from
/// any stage; any other wire value lands in Unknown rather than disappearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Enriched,
    Messaged,
    Sent,
    Failed,
    #[serde(other)]
    Unknown,
}

impl LeadStatus {
    pub const KNOWN: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Enriched,
        LeadStatus::Messaged,
        LeadStatus::Sent,
        LeadStatus::Failed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Enriched => "ENRICHED",
            LeadStatus::Messaged => "MESSAGED",
            LeadStatus::Sent => "SENT",
            LeadStatus::Failed => "FAILED",
            LeadStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            LeadStatus::New => "🔵",
            LeadStatus::Enriched => "🟡",
            LeadStatus::Messaged => "🟠",
            LeadStatus::Sent => "🟢",
            LeadStatus::Failed => "🔴",
            LeadStatus::Unknown => "⚪",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Failed)
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Envelope of the engine's fetch endpoint. `stats` is the engine's own
/// aggregation over its entire registry, while `leads` may be windowed to the
/// most recent entries, so the two can legitimately disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadsResponse {
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub stats: HashMap<String, u64>,
}

impl LeadsResponse {
    pub fn engine_total(&self) -> u64 {
        self.stats.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Enrich,
    PrepareMessages,
    Send,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Generate => "generate",
            Stage::Enrich => "enrich",
            Stage::PrepareMessages => "prepare-messages",
            Stage::Send => "send",
        };
        write!(f, "{}", name)
    }
}

/// One stage invocation. Ephemeral: dispatched, acknowledged, forgotten.
/// The variants carry exactly the parameters their stage accepts, so an
/// industry filter on enrich or a dry-run flag on generate cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageRequest {
    Generate { count: u32, industry: String, seed: u32 },
    Enrich { limit: u32 },
    PrepareMessages { limit: u32 },
    Send { limit: u32, dry_run: bool },
}

impl StageRequest {
    /// Generate request with a fresh seed, so two otherwise identical calls
    /// still produce distinct batches on the engine side.
    pub fn generate(count: u32, industry: impl Into<String>) -> Self {
        StageRequest::Generate {
            count,
            industry: industry.into(),
            seed: fastrand::u32(..GENERATE_SEED_SPACE),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            StageRequest::Generate { .. } => Stage::Generate,
            StageRequest::Enrich { .. } => Stage::Enrich,
            StageRequest::PrepareMessages { .. } => Stage::PrepareMessages,
            StageRequest::Send { .. } => Stage::Send,
        }
    }

    pub fn batch_size(&self) -> u32 {
        match self {
            StageRequest::Generate { count, .. } => *count,
            StageRequest::Enrich { limit, .. } => *limit,
            StageRequest::PrepareMessages { limit, .. } => *limit,
            StageRequest::Send { limit, .. } => *limit,
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        match self {
            StageRequest::Generate {
                count,
                industry,
                seed,
            } => json!({ "count": count, "industry": industry, "seed": seed }),
            StageRequest::Enrich { limit } => json!({ "limit": limit }),
            StageRequest::PrepareMessages { limit } => json!({ "limit": limit }),
            StageRequest::Send { limit, dry_run } => {
                json!({ "limit": limit, "dry_run": dry_run })
            }
        }
    }
}

/// Engine acknowledgement for a stage trigger. Counters vary by stage, so
/// everything past `status` is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageAck {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl StageAck {
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(n) = self.generated {
            parts.push(format!("{} generated", n));
        }
        if let Some(n) = self.added {
            parts.push(format!("{} added", n));
        }
        if let Some(n) = self.processed {
            parts.push(format!("{} processed", n));
        }
        if let Some(n) = self.sent {
            parts.push(format!("{} sent", n));
        }
        if let Some(n) = self.failed {
            parts.push(format!("{} failed", n));
        }
        let mut summary = if parts.is_empty() {
            self.status.clone()
        } else {
            parts.join(", ")
        };
        if let Some(mode) = &self.mode {
            summary.push_str(&format!(" [{}]", mode));
        }
        summary
    }
}

pub struct ConsoleApp {
    pub config: Config,
    pub orchestrator: Arc<Orchestrator>,
}
