use dialoguer::{theme::ColorfulTheme, Input};

use crate::models::{ConsoleApp, Result, StageRequest};

impl ConsoleApp {
    pub async fn run_enrich(&self) -> Result<()> {
        println!("\n✨ Enrich Leads");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Advances NEW leads to ENRICHED by filling in their profiles.");

        let new_count = self.orchestrator.view().snapshot.new;
        if new_count == 0 {
            println!("📭 No NEW leads in the last snapshot; generate a batch first");
        } else {
            println!("🔵 {} NEW leads are waiting", new_count);
        }

        let limit: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many leads to enrich")
            .default(self.config.controls.default_batch_size)
            .interact_text()?;

        if limit == 0 {
            println!("❌ Nothing to enrich with a limit of zero");
            return Ok(());
        }

        self.dispatch_trigger(StageRequest::Enrich { limit }).await
    }
}
