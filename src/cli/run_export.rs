use chrono::Local;
use tracing::info;

use crate::models::{ConsoleApp, Result};

impl ConsoleApp {
    pub async fn run_export(&self) -> Result<()> {
        println!("\n💾 Export Leads to CSV");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let bytes = match self.orchestrator.engine().export_csv().await {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("❌ Export failed ({}): {}", e.category(), e);
                return Ok(());
            }
        };

        // Header line plus one row per lead.
        let rows = String::from_utf8_lossy(&bytes)
            .lines()
            .count()
            .saturating_sub(1);

        tokio::fs::create_dir_all(&self.config.output.directory).await?;
        let filename = format!(
            "{}/leads_export_{}.csv",
            self.config.output.directory,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        tokio::fs::write(&filename, &bytes).await?;

        info!("Exported {} leads to {}", rows, filename);
        println!(
            "✅ Exported {} leads ({} bytes) to {}",
            rows,
            bytes.len(),
            filename
        );

        Ok(())
    }
}
