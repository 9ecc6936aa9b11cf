//! AI provider configuration.
//!
//! Credentials are read once at startup and passed into the guidance
//! service; adapters never touch the process environment themselves.

use crate::llm::ProviderKind;

#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    /// Optional `PREFERRED_AI_API` override for which provider goes first.
    pub preferred: Option<ProviderKind>,
}

impl AiConfig {
    /// Read provider credentials and the preference override from the
    /// environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_key("OPENAI_API_KEY"),
            gemini_api_key: env_key("GEMINI_API_KEY"),
            deepseek_api_key: env_key("DEEPSEEK_API_KEY"),
            preferred: std::env::var("PREFERRED_AI_API")
                .ok()
                .and_then(|value| ProviderKind::parse(&value)),
        }
    }

    pub fn key_for(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::DeepSeek => self.deepseek_api_key.as_deref(),
        }
    }

    pub fn is_configured(&self, provider: ProviderKind) -> bool {
        self.key_for(provider).is_some()
    }

    /// The fallback chain as an explicit list: the preferred provider
    /// first, then the default order, skipping anything without a
    /// credential. Empty when no provider is configured at all.
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        let mut order = Vec::new();
        if let Some(preferred) = self.preferred {
            if self.is_configured(preferred) {
                order.push(preferred);
            }
        }
        for &provider in &ProviderKind::FALLBACK_ORDER {
            if self.is_configured(provider) && !order.contains(&provider) {
                order.push(provider);
            }
        }
        order
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
