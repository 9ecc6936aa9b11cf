//! Fallback orchestration across AI providers.
//!
//! Providers are attempted strictly one at a time, in the order computed
//! by [`AiConfig::provider_order`]. The first success wins; every failure
//! is logged and accumulated, and only an aggregate error reaches the
//! caller when the chain is exhausted.

use crate::config::AiConfig;
use crate::guidance::types::{AssessmentResult, GuidanceRequest};
use crate::llm::{self, ProviderError, ProviderKind};

#[derive(Debug, thiserror::Error)]
pub enum GuidanceError {
    #[error("No AI service is configured. Set GEMINI_API_KEY, DEEPSEEK_API_KEY, or OPENAI_API_KEY.")]
    NoProviderConfigured,

    /// Per-provider errors are carried for diagnostics but deliberately
    /// kept out of the display message.
    #[error("All AI services are currently unavailable. Please try again later.")]
    AllProvidersFailed {
        attempts: Vec<(ProviderKind, ProviderError)>,
    },
}

/// The seam between the fallback loop and the vendor transports. The live
/// implementation dispatches to the adapter modules; tests substitute a
/// counting mock.
pub(crate) trait ProviderAttempt {
    async fn attempt(
        &self,
        provider: ProviderKind,
        request: &GuidanceRequest,
    ) -> Result<AssessmentResult, ProviderError>;
}

struct LiveProviders<'a> {
    client: &'a reqwest::Client,
    config: &'a AiConfig,
}

impl ProviderAttempt for LiveProviders<'_> {
    async fn attempt(
        &self,
        provider: ProviderKind,
        request: &GuidanceRequest,
    ) -> Result<AssessmentResult, ProviderError> {
        let api_key = self
            .config
            .key_for(provider)
            .ok_or(ProviderError::MissingCredential {
                provider: provider.name(),
            })?;

        match provider {
            ProviderKind::Gemini => llm::gemini::generate_guidance(self.client, api_key, request).await,
            ProviderKind::DeepSeek => {
                llm::deepseek::generate_guidance(self.client, api_key, request).await
            }
            ProviderKind::OpenAi => llm::openai::generate_guidance(self.client, api_key, request).await,
        }
    }
}

/// Try each provider in order until one succeeds. Results are returned
/// exactly as the winning provider produced them.
pub(crate) async fn run_fallback_chain<P: ProviderAttempt>(
    order: &[ProviderKind],
    providers: &P,
    request: &GuidanceRequest,
) -> Result<AssessmentResult, GuidanceError> {
    if order.is_empty() {
        return Err(GuidanceError::NoProviderConfigured);
    }

    let mut attempts = Vec::new();
    for &provider in order {
        tracing::info!("Requesting first-aid guidance from {}", provider);
        match providers.attempt(provider, request).await {
            Ok(result) => {
                if !attempts.is_empty() {
                    tracing::info!(
                        "{} succeeded after {} failed attempt(s)",
                        provider,
                        attempts.len()
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                tracing::warn!("{} guidance attempt failed: {}", provider, e);
                attempts.push((provider, e));
            }
        }
    }

    Err(GuidanceError::AllProvidersFailed { attempts })
}

/// Entry point for guidance generation. Holds the provider configuration
/// and one shared HTTP client; no other state survives a request.
pub struct GuidanceService {
    client: reqwest::Client,
    config: AiConfig,
}

impl GuidanceService {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Generate guidance from whichever configured provider answers first.
    pub async fn generate_first_aid_guidance(
        &self,
        request: &GuidanceRequest,
    ) -> Result<AssessmentResult, GuidanceError> {
        let order = self.config.provider_order();
        let providers = LiveProviders {
            client: &self.client,
            config: &self.config,
        };
        run_fallback_chain(&order, &providers, request).await
    }
}
