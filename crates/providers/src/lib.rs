//! Generative-text provider implementations for Rescueline.

pub mod gemini;

pub use gemini::GeminiProvider;

use rescueline_core::generator::Generator;
use std::sync::Arc;

/// Build the configured generator.
///
/// Only the Gemini backend is built in; the trait boundary exists so tests
/// (and future providers) can substitute their own implementation.
pub fn build_from_config(config: &rescueline_config::AppConfig) -> Arc<dyn Generator> {
    let api_key = config.api_key.clone().unwrap_or_default();

    let mut provider = GeminiProvider::new(api_key);
    if let Some(url) = &config.generator.api_url {
        provider = provider.with_base_url(url);
    }

    Arc::new(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_default_config() {
        let config = rescueline_config::AppConfig::default();
        let generator = build_from_config(&config);
        assert_eq!(generator.name(), "gemini");
    }
}
