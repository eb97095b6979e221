use dialoguer::{theme::ColorfulTheme, Select};

use crate::{
    cli::cli::MenuAction,
    models::{ConsoleApp, Result},
};
use tracing::error;

impl ConsoleApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🚀 Welcome to Lead Console!");
        println!("═══════════════════════════════════════");

        // Pull the first pipeline picture before offering the menu. A dead
        // engine is not fatal here: the background poller keeps retrying.
        if let Err(e) = self.orchestrator.refresh().await {
            println!("⚠️ Engine not reachable yet ({}): {}", e.category(), e);
            println!(
                "   The poller retries every {}ms in the background",
                self.config.orchestrator.poll_interval_ms
            );
        }
        self.show_pipeline_status().await?;

        loop {
            let actions = vec![
                MenuAction::GenerateLeads,
                MenuAction::EnrichLeads,
                MenuAction::DraftMessages,
                MenuAction::SendOutreach,
                MenuAction::RefreshNow,
                MenuAction::ShowPipelineStatus,
                MenuAction::WatchPipeline,
                MenuAction::ShowLeadDrafts,
                MenuAction::ExportCsv,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(5) // Default to the status screen
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::GenerateLeads => {
                    if let Err(e) = self.run_generate().await {
                        error!("Generate stage failed: {}", e);
                    }
                }
                MenuAction::EnrichLeads => {
                    if let Err(e) = self.run_enrich().await {
                        error!("Enrich stage failed: {}", e);
                    }
                }
                MenuAction::DraftMessages => {
                    if let Err(e) = self.run_draft_messages().await {
                        error!("Draft stage failed: {}", e);
                    }
                }
                MenuAction::SendOutreach => {
                    if let Err(e) = self.run_send().await {
                        error!("Send stage failed: {}", e);
                    }
                }
                MenuAction::RefreshNow => {
                    if let Err(e) = self.refresh_now().await {
                        error!("Manual refresh failed: {}", e);
                    }
                }
                MenuAction::ShowPipelineStatus => {
                    if let Err(e) = self.show_pipeline_status().await {
                        error!("Failed to show pipeline status: {}", e);
                    }
                }
                MenuAction::WatchPipeline => {
                    if let Err(e) = self.watch_pipeline().await {
                        error!("Watch mode failed: {}", e);
                    }
                }
                MenuAction::ShowLeadDrafts => {
                    if let Err(e) = self.show_lead_drafts().await {
                        error!("Failed to show drafts: {}", e);
                    }
                }
                MenuAction::ExportCsv => {
                    if let Err(e) = self.run_export().await {
                        error!("CSV export failed: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Lead Console!");
                    break;
                }
            }
        }

        Ok(())
    }
}
