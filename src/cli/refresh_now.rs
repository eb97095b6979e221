use crate::models::{ConsoleApp, Result};

impl ConsoleApp {
    /// Manual resync, independent of the background poller cadence.
    pub async fn refresh_now(&self) -> Result<()> {
        println!("\n🔄 Refreshing pipeline state...");
        match self.orchestrator.refresh().await {
            Ok(()) => self.print_counts_line(),
            Err(e) => {
                println!("❌ Refresh failed ({}): {}", e.category(), e);
                println!("💡 Showing the last known pipeline state until the engine answers again");
            }
        }
        Ok(())
    }
}
