//! `rescueline serve` — Start the HTTP API server.

use rescueline_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🚨 Rescueline Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.default_model);
    println!("   Store:     {}", config.store.backend);

    if !config.has_api_key() {
        println!("   ⚠️  No API key configured — information queries will return fallback text");
    }

    rescueline_gateway::start(config).await?;

    Ok(())
}
