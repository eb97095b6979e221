use dialoguer::{theme::ColorfulTheme, Input};

use crate::models::{ConsoleApp, Result, StageRequest};

impl ConsoleApp {
    pub async fn run_draft_messages(&self) -> Result<()> {
        println!("\n📝 Draft Outreach Messages");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Prepares email and LinkedIn drafts for ENRICHED leads.");

        let enriched = self.orchestrator.view().snapshot.enriched;
        if enriched == 0 {
            println!("📭 No ENRICHED leads in the last snapshot; enrich a batch first");
        } else {
            println!("✨ {} ENRICHED leads are ready for drafting", enriched);
        }

        let limit: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many leads to draft messages for")
            .default(self.config.controls.default_batch_size)
            .interact_text()?;

        if limit == 0 {
            println!("❌ Nothing to draft with a limit of zero");
            return Ok(());
        }

        self.dispatch_trigger(StageRequest::PrepareMessages { limit })
            .await
    }
}
