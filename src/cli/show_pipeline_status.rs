use chrono::Local;

use crate::models::{ConsoleApp, LeadStatus, Result};

impl ConsoleApp {
    pub async fn show_pipeline_status(&self) -> Result<()> {
        let view = self.orchestrator.view();
        let snapshot = view.snapshot;

        println!("\n📊 Pipeline Status");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if snapshot.total() == 0 {
            println!("📭 No leads tracked yet. Generate a batch to get started.");
        } else {
            for status in LeadStatus::KNOWN {
                println!(
                    "{} {:<9} {:>6}  ({:.1}%)",
                    status.badge(),
                    status.label(),
                    snapshot.count(status),
                    snapshot.percentage(status)
                );
            }
            if snapshot.unknown > 0 {
                println!(
                    "{} {:<9} {:>6}  ({:.1}%)",
                    LeadStatus::Unknown.badge(),
                    LeadStatus::Unknown.label(),
                    snapshot.unknown,
                    snapshot.percentage(LeadStatus::Unknown)
                );
            }
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("📦 Tracked here: {}", snapshot.total());
        }

        let engine_total = view.engine_total();
        if view.is_windowed() {
            println!(
                "🌐 Engine reports {} leads in total; showing the most recent {}",
                engine_total,
                view.leads.len()
            );
        } else if engine_total > 0 {
            println!("🌐 Engine total: {}", engine_total);
        }

        match view.last_refreshed {
            Some(at) => println!(
                "🕒 Last refreshed: {}",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            ),
            None => println!("🕒 Last refreshed: never (engine not reached yet)"),
        }

        if let Some(failure) = &view.last_failure {
            println!("⚠️ Last refresh problem: {}", failure);
        }

        if self.orchestrator.is_busy() {
            println!("🚧 A stage trigger is currently in flight");
        }

        Ok(())
    }
}
