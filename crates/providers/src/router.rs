//! Provider selection from configuration.
//!
//! `gemini` gets the native Gemini client; every other name is treated as
//! an OpenAI-compatible endpoint.

use std::sync::Arc;
use std::time::Duration;

use docchat_config::AppConfig;
use docchat_core::error::ProviderError;
use docchat_core::provider::Provider;
use tracing::{debug, warn};

use crate::gemini::{self, GeminiProvider};
use crate::openai_compat::OpenAiCompatProvider;

/// Build the configured default provider.
///
/// A missing API key is not an error here: the provider is still built and
/// the failure surfaces on the first request.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    build_named(config, &config.default_provider)
}

/// Build a specific provider by name using the settings in `config`.
pub fn build_named(config: &AppConfig, name: &str) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider_config = config.providers.get(name);

    let api_key = config.api_key_for(name).unwrap_or_default();
    if api_key.is_empty() && name != "ollama" {
        warn!(provider = name, "No API key configured; requests will fail");
    }

    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .or_else(|| default_base_url(name))
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "unknown provider '{name}'; set providers.{name}.api_url"
            ))
        })?;

    let connect_timeout = provider_config
        .and_then(|p| p.connect_timeout_secs)
        .map(Duration::from_secs);

    debug!(provider = name, base_url = %base_url, "Building provider");

    let provider: Arc<dyn Provider> = if name == "gemini" {
        Arc::new(GeminiProvider::with_base_url(
            base_url,
            api_key,
            connect_timeout,
        )?)
    } else {
        Arc::new(OpenAiCompatProvider::new(
            name,
            base_url,
            api_key,
            connect_timeout,
        )?)
    };

    Ok(provider)
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "gemini" => gemini::DEFAULT_BASE_URL,
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.to_string())
}
