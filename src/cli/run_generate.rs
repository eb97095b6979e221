use dialoguer::{theme::ColorfulTheme, Input};

use crate::models::{ConsoleApp, Result, StageRequest};

impl ConsoleApp {
    pub async fn run_generate(&self) -> Result<()> {
        println!("\n🧬 Generate Leads");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Creates a fresh batch of NEW leads on the engine side.");

        let count: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Batch size (10 / 50 / 100 / 200 are the usual presets)")
            .default(self.config.controls.default_batch_size)
            .interact_text()?;

        if count == 0 {
            println!("❌ Nothing to generate with a batch size of zero");
            return Ok(());
        }

        let industry: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Industry filter (leave empty for a mixed batch)")
            .default(self.config.controls.default_industry.clone())
            .allow_empty(true)
            .interact_text()?;

        // generate() stamps a fresh seed on every call, so triggering this
        // twice with the same answers still yields two distinct batches.
        self.dispatch_trigger(StageRequest::generate(count, industry))
            .await
    }
}
