//! `rescueline status` — Show system status.

use rescueline_config::AppConfig;
use rescueline_core::store::{DocumentStore, ReportStore};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🚨 Rescueline Status");
    println!("===================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  Model:         {}", config.default_model);
    println!("  Temperature:   {}", config.default_temperature);
    println!("  Context docs:  {}", config.context.max_documents);
    println!("  Store:         {}", config.store.backend);
    println!("  Database:      {}", config.database_path().display());
    println!("  Gateway:       {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "  API key:       {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );

    let state = rescueline_gateway::build_state(&config).await?;
    println!("\n  Documents:     {}", state.documents.count().await?);
    println!("  Reports:       {}", state.reports.list_reports().await?.len());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `rescueline init` first");
    }

    Ok(())
}
