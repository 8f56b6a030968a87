//! Text-menu front end for the student roster.

mod menu;

use menu::Menu;
use roster_core::{KeywordQueryAgent, RecordManager, RosterConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[roster-cli] .env not loaded: {} (using system environment)", e);
    }

    // Logs go to stderr so they do not interleave with the menu.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RosterConfig::load()?;
    let storage = config.open_storage()?;
    let mut manager = RecordManager::open(storage, Arc::new(KeywordQueryAgent::new()));
    tracing::info!(
        target: "roster::cli",
        app = %config.app_name,
        records = manager.len(),
        "menu started"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Menu::new(&mut manager, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}
