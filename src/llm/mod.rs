//! Language-generation service client
//! Wraps the OpenAI chat-completions API behind a trait so the pipeline can
//! run against a canned backend in tests

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client as OpenAIClient,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

use crate::config::Config;
use crate::data::DataError;

/// A single system+user completion round trip. Both report synthesis and
/// translation go through this one operation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

/// Shared clients satisfy the trait too, so callers can keep a handle to a
/// client after handing it to the pipeline
#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        (**self)
            .complete(system_prompt, user_prompt, max_tokens, temperature)
            .await
    }
}

#[derive(Debug)]
pub struct OpenAiCompletions {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiCompletions {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);

        Self {
            client: OpenAIClient::with_config(config),
            model,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.providers.openai_api_key.clone().ok_or_else(|| {
            DataError::Config("OPENAI_API_KEY environment variable is required but not set".to_string())
        })?;

        Ok(Self::new(
            api_key,
            config.llm.model.clone(),
            config.llm.timeout_seconds,
        ))
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletions {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        info!(
            "Requesting completion from '{}' (prompt length: {} chars)",
            self.model,
            system_prompt.len() + user_prompt.len()
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()?
                    .into(),
            ])
            .max_tokens(max_tokens)
            .temperature(temperature)
            .build()?;

        let response = timeout(self.timeout, self.client.chat().create(request))
            .await
            .context("Completion request timed out")?
            .context("Completion request failed")?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .context("Completion response contained no content")?
            .trim()
            .to_string();

        info!("Received completion ({} chars)", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for Canned {
        async fn complete(&self, _: &str, _: &str, _: u32, _: f32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.calls.load(Ordering::SeqCst) > 1 {
                return Err(anyhow!("only one call expected"));
            }
            Ok("done".to_string())
        }
    }

    #[tokio::test]
    async fn test_arc_client_delegates_to_inner() {
        let client = Arc::new(Canned {
            calls: AtomicUsize::new(0),
        });

        let result = Arc::clone(&client)
            .complete("system", "user", 100, 0.5)
            .await
            .expect("delegated call succeeds");
        assert_eq!(result, "done");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let err = OpenAiCompletions::from_config(&Config::default())
            .expect_err("missing key must fail");
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}

