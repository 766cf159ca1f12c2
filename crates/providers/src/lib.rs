//! Generator backend implementations for inkmath.
//!
//! All backends implement the `inkmath_core::Generator` trait.
//! `build_from_config` selects and constructs the configured backend.

pub mod gemini;

pub use gemini::GeminiGenerator;

use std::sync::Arc;
use std::time::Duration;

use inkmath_config::AppConfig;
use inkmath_core::{Generator, GeneratorError};

/// Build the configured generator from application config.
///
/// The config object is constructed once at startup and passed in
/// explicitly, which keeps test doubles trivial to wire up.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Generator>, GeneratorError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        GeneratorError::NotConfigured(
            "no API key configured — set INKMATH_API_KEY or GEMINI_API_KEY".into(),
        )
    })?;

    let mut generator = GeminiGenerator::with_timeout(
        api_key,
        &config.generator.model,
        Duration::from_secs(config.generator.timeout_secs),
    );
    if let Some(base_url) = &config.generator.base_url {
        generator = generator.with_base_url(base_url);
    }

    Ok(Arc::new(generator))
}
