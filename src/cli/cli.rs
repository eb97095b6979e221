use std::sync::Arc;

use crate::config::Config;
use crate::models::{ConsoleApp, Result, StageRequest};
use crate::orchestrator::{Orchestrator, TriggerOutcome};

#[derive(Debug, Clone)]
pub enum MenuAction {
    GenerateLeads,
    EnrichLeads,
    DraftMessages,
    SendOutreach,
    RefreshNow,
    ShowPipelineStatus,
    WatchPipeline,
    ShowLeadDrafts,
    ExportCsv,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::GenerateLeads => {
                write!(f, "🧬 Stage 1: Generate a fresh lead batch")
            }
            MenuAction::EnrichLeads => {
                write!(f, "✨ Stage 2: Enrich new leads")
            }
            MenuAction::DraftMessages => {
                write!(f, "📝 Stage 3: Draft outreach messages")
            }
            MenuAction::SendOutreach => {
                write!(f, "📤 Stage 4: Send outreach (dry run or live)")
            }
            MenuAction::RefreshNow => write!(f, "🔄 Refresh pipeline state now"),
            MenuAction::ShowPipelineStatus => write!(f, "📊 Show pipeline status"),
            MenuAction::WatchPipeline => write!(f, "📺 Watch pipeline live"),
            MenuAction::ShowLeadDrafts => write!(f, "📨 Show drafted messages"),
            MenuAction::ExportCsv => write!(f, "💾 Export leads to CSV"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

impl ConsoleApp {
    pub fn new(config: Config, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Hands a stage request to the orchestrator and narrates the outcome.
    /// Every stage action funnels through here so busy rejection and engine
    /// failure read the same no matter which stage was asked for.
    pub(crate) async fn dispatch_trigger(&self, request: StageRequest) -> Result<()> {
        let stage = request.stage();
        println!(
            "\n🚀 Triggering {} (batch size {})...",
            stage,
            request.batch_size()
        );

        match self.orchestrator.trigger_stage(request).await {
            TriggerOutcome::Completed { ack } => {
                println!("✅ Engine accepted {}: {}", stage, ack.summary());
                self.print_counts_line();
            }
            TriggerOutcome::Rejected => {
                println!("🚧 Another trigger is still in flight, hold on a moment");
            }
            TriggerOutcome::Failed { error } => {
                println!("❌ Trigger failed: {}", error);
                println!("💡 Keeping the last known pipeline state; check the engine and retry");
            }
        }

        Ok(())
    }

    /// One-line pipeline summary printed after state-changing actions.
    pub(crate) fn print_counts_line(&self) {
        let snapshot = self.orchestrator.view().snapshot;
        println!(
            "📊 Tracking {} leads (🔵 {} new · ✨ {} enriched · 📝 {} messaged · 📤 {} sent · ❌ {} failed)",
            snapshot.total(),
            snapshot.new,
            snapshot.enriched,
            snapshot.messaged,
            snapshot.sent,
            snapshot.failed,
        );
        if snapshot.unknown > 0 {
            println!(
                "❓ {} leads report a status this console does not recognize",
                snapshot.unknown
            );
        }
    }
}
