use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::models::{ConsoleApp, Result, StageRequest};

impl ConsoleApp {
    pub async fn run_send(&self) -> Result<()> {
        println!("\n📤 Send Outreach");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Delivers prepared messages for MESSAGED leads.");

        let messaged = self.orchestrator.view().snapshot.messaged;
        if messaged == 0 {
            println!("📭 No MESSAGED leads in the last snapshot; draft messages first");
        } else {
            println!("📝 {} MESSAGED leads have drafts ready to go", messaged);
        }

        let limit: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many leads to send to")
            .default(self.config.controls.default_batch_size)
            .interact_text()?;

        if limit == 0 {
            println!("❌ Nothing to send with a limit of zero");
            return Ok(());
        }

        let dry_run = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Dry run? (simulate delivery, nothing leaves the engine)")
            .default(self.config.controls.default_dry_run)
            .interact()?;

        if !dry_run {
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!(
                    "⚠️ LIVE send to up to {} leads. Are you sure?",
                    limit
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("❌ Send cancelled");
                return Ok(());
            }
        }

        self.dispatch_trigger(StageRequest::Send { limit, dry_run })
            .await
    }
}
