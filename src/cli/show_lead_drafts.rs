use crate::models::{ConsoleApp, Result};

const DRAFT_DISPLAY_LIMIT: usize = 10;

impl ConsoleApp {
    pub async fn show_lead_drafts(&self) -> Result<()> {
        let view = self.orchestrator.view();
        let drafted: Vec<_> = view.leads.iter().filter(|lead| lead.has_drafts()).collect();

        println!("\n📨 Drafted Messages");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if drafted.is_empty() {
            println!("📭 No drafted messages yet. Run the draft stage first.");
            return Ok(());
        }

        println!(
            "✉️ {} leads carry drafts, showing up to {}\n",
            drafted.len(),
            DRAFT_DISPLAY_LIMIT
        );

        for lead in drafted.iter().take(DRAFT_DISPLAY_LIMIT) {
            println!(
                "{} {} <{}> ({} at {})",
                lead.status.badge(),
                lead.full_name,
                lead.email,
                lead.role,
                lead.company_name
            );
            if let Some(draft) = &lead.email_draft {
                println!("   📧 Email:    {}", draft);
            }
            if let Some(draft) = &lead.linkedin_draft {
                println!("   💼 LinkedIn: {}", draft);
            }
            println!();
        }

        if drafted.len() > DRAFT_DISPLAY_LIMIT {
            println!(
                "... and {} more drafted leads",
                drafted.len() - DRAFT_DISPLAY_LIMIT
            );
        }

        Ok(())
    }
}
