//! `rescueline ask` — Answer a single question from the command line.

use rescueline_config::AppConfig;

pub async fn run(question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Give a clear heads-up instead of a silent fallback answer
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  WARNING: No API key configured — you will get the fallback answer.");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GEMINI_API_KEY      (recommended)");
        eprintln!("    GOOGLE_API_KEY");
        eprintln!("    RESCUELINE_API_KEY");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let question = question.trim();
    if question.is_empty() {
        return Err("Question must not be empty".into());
    }

    let state = rescueline_gateway::build_state(&config).await?;
    let answer = state.pipeline.answer_query(question).await;

    println!("{answer}");

    Ok(())
}
