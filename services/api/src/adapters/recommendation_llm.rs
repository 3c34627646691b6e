//! services/api/src/adapters/recommendation_llm.rs
//!
//! This module contains the adapter for the book recommendation LLM.
//! It implements the `RecommendationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use shelfmate_core::{
    flow::build_system_instruction,
    ports::{PortError, PortResult, RecommendationRequest, RecommendationService},
};
use std::time::Duration;
use tracing::{info, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `RecommendationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiRecommendationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiRecommendationAdapter {
    /// Creates a new `OpenAiRecommendationAdapter`.
    ///
    /// The client's retry policy is replaced so a throttled call fails on the
    /// first answer instead of being retried.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self {
            client: client.with_backoff(single_attempt()),
            model,
        }
    }
}

/// A policy whose elapsed-time budget is already spent, so no retry is scheduled.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Sorts a provider failure into rate limiting or everything else.
fn map_openai_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::ApiError(api_err) => {
            let throttled = [api_err.r#type.as_deref(), api_err.code.as_deref()]
                .into_iter()
                .flatten()
                .any(is_rate_limit_code);
            if throttled {
                PortError::RateLimited(api_err.message)
            } else {
                PortError::Unexpected(api_err.message)
            }
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

fn is_rate_limit_code(code: &str) -> bool {
    matches!(
        code,
        "rate_limit_exceeded" | "insufficient_quota" | "requests" | "tokens"
    )
}

//=========================================================================================
// `RecommendationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecommendationService for OpenAiRecommendationAdapter {
    /// Sends the selections, transcript and user input to the chat-completion
    /// endpoint and returns the text of the last returned choice.
    async fn recommend(&self, request: &RecommendationRequest) -> PortResult<String> {
        let system_instruction = build_system_instruction(
            &request.selected_genres,
            &request.selected_preferences,
            &request.chat_history,
        );

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_instruction)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user_input.clone())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(1.0_f32)
            .frequency_penalty(0.0_f32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| {
                let mapped = map_openai_error(e);
                warn!("Chat completion failed: {}", mapped);
                mapped
            })?;

        info!(
            model = %self.model,
            choices = response.choices.len(),
            "Received recommendation from chat completion"
        );

        // Only the final choice is kept when several come back.
        match response.choices.into_iter().last() {
            Some(choice) => choice.message.content.ok_or_else(|| {
                PortError::Unexpected(
                    "Recommendation LLM response contained no text content.".to_string(),
                )
            }),
            None => Err(PortError::Unexpected(
                "Recommendation LLM returned no choices in its response.".to_string(),
            )),
        }
    }
}
