//! Review report - the read path of the review listing, on the console
//!
//! Fetches all five collections from the configured API base, projects the
//! denormalized review rows, and prints them page by page.

use anyhow::{Context, Result};
use destino_engine::{CorrelationEngine, EngineConfig, FilterState, Resource};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::from_env().context("Invalid engine configuration")?;
    info!(base = %config.base_url, "starting review report");

    let engine = CorrelationEngine::connect(config).context("Failed to build API client")?;

    engine
        .refresh_all()
        .await
        .context("Could not load resource collections")?;

    let mut filter = FilterState::new();
    loop {
        let rows = engine.rows(Resource::Reviews, &filter);
        let page = engine.page(&rows, &filter);

        println!("\nReviews ({})", page.range_label);
        println!("{:-<72}", "");
        for row in &page.items {
            let col = |name: &str| row.display.get(name).cloned().unwrap_or_default();
            println!(
                "#{:<4} {:<20} {:<24} {}",
                row.id,
                col("clientName"),
                col("serviceName"),
                col("rating"),
            );
        }

        if page.current_page >= page.total_pages {
            break;
        }
        filter = filter.with_page(page.current_page + 1);
    }

    Ok(())
}
