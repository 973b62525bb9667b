//! `rescueline ingest` — Load a plain-text document into the store.

use rescueline_config::AppConfig;
use rescueline_core::document::{StoredDocument, normalize_content};
use rescueline_core::store::DocumentStore;
use std::path::Path;

pub async fn run(path: &Path, name: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;

    let content = normalize_content(&raw);
    if content.is_empty() {
        return Err(format!("{} has no text content", path.display()).into());
    }

    let original_name = name.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.txt".into())
    });

    let state = rescueline_gateway::build_state(&config).await?;
    let doc = StoredDocument::new(&original_name, "text/plain", content);
    let id = state.documents.insert(doc).await?;

    println!("✅ Ingested {original_name} as {id}");
    println!("   Documents in store: {}", state.documents.count().await?);

    Ok(())
}
