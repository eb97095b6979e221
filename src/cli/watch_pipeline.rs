use std::io::BufRead;

use chrono::Local;
use console::Term;
use tokio::time::{interval, MissedTickBehavior};

use crate::models::{ConsoleApp, Result};

const WATCH_ROWS: usize = 15;

impl ConsoleApp {
    /// Live status table, redrawn at the poll cadence until Enter is pressed.
    /// Each frame only reads the shared view; the background poller is what
    /// keeps that view current.
    pub async fn watch_pipeline(&self) -> Result<()> {
        println!("\n📺 Watching pipeline (press Enter to stop)...");

        let mut stop = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            let _ = std::io::stdin().lock().read_line(&mut line);
        });

        let term = Term::stdout();
        let mut ticker = interval(self.config.orchestrator.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.draw_watch_frame(&term)?,
                _ = &mut stop => break,
            }
        }

        println!("\n👋 Stopped watching");
        Ok(())
    }

    fn draw_watch_frame(&self, term: &Term) -> Result<()> {
        let view = self.orchestrator.view();
        let snapshot = view.snapshot;

        term.clear_screen()?;
        println!("📺 Lead Pipeline (live). Press Enter to stop.");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if view.leads.is_empty() {
            println!("📭 No leads tracked yet");
        } else {
            println!(
                "{:<22} {:<20} {:<18} {:<14} {:<12} {}",
                "NAME", "COMPANY", "ROLE", "INDUSTRY", "STATUS", "DRAFTS"
            );
            for lead in view.leads.iter().take(WATCH_ROWS) {
                println!(
                    "{:<22} {:<20} {:<18} {:<14} {:<12} {}",
                    truncate(&lead.full_name, 20),
                    truncate(&lead.company_name, 18),
                    truncate(&lead.role, 16),
                    truncate(&lead.industry, 12),
                    format!("{} {}", lead.status.badge(), lead.status.label()),
                    if lead.has_drafts() { "📨" } else { "" },
                );
            }
            if view.leads.len() > WATCH_ROWS {
                println!("   ... and {} more", view.leads.len() - WATCH_ROWS);
            }
        }

        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(
            "📊 {} tracked  🔵 {} new  ✨ {} enriched  📝 {} messaged  📤 {} sent  ❌ {} failed",
            snapshot.total(),
            snapshot.new,
            snapshot.enriched,
            snapshot.messaged,
            snapshot.sent,
            snapshot.failed,
        );
        if view.is_windowed() {
            println!(
                "🌐 Engine reports {} leads in total; showing the most recent {}",
                view.engine_total(),
                view.leads.len()
            );
        }
        if let Some(at) = view.last_refreshed {
            println!(
                "🕒 Last refreshed {}",
                at.with_timezone(&Local).format("%H:%M:%S")
            );
        }
        if let Some(failure) = &view.last_failure {
            println!("⚠️ Last refresh problem: {}", failure);
        }
        if self.orchestrator.is_busy() {
            println!("🚧 Stage trigger in flight");
        }

        Ok(())
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_leaves_short_values_alone() {
        assert_eq!(truncate("Acme", 10), "Acme");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
    }

    #[test]
    fn truncate_shortens_long_values_with_an_ellipsis() {
        assert_eq!(truncate("Grandline Manufacturing", 10), "Grandline…");
        assert_eq!(truncate("Grandline Manufacturing", 10).chars().count(), 10);
    }
}
