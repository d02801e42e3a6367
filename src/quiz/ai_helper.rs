use std::future::Future;

use chatgpt::client::ChatGPT;
use chatgpt::types::CompletionResponse;
use log::{debug, warn};
use thiserror::Error;

use crate::quiz::game::{fallback_fact, FactRequest};

#[derive(Debug, Error)]
pub enum FactError {
    #[error("chatgpt error: {0}")]
    ChatGPT(#[from] chatgpt::err::Error),
    #[error("empty completion")]
    EmptyCompletion,
}

/// Anything that can tell the player something about a country after a guess.
pub trait FactSource: Send + Sync {
    fn fetch_fact(
        &self,
        country_name: &str,
        was_correct: bool,
    ) -> impl Future<Output = Result<String, FactError>> + Send;
}

pub struct FactHelper {
    chat_gpt: ChatGPT,
}

impl FactHelper {
    pub fn new(chat_gpt: ChatGPT) -> Self {
        Self { chat_gpt }
    }

    fn prompt(country_name: &str, was_correct: bool) -> String {
        let opening = if was_correct {
            "The player just guessed its flag correctly, so open with a short cheer."
        } else {
            "The player just failed to recognise its flag, so open with a gentle word of consolation."
        };
        format!(
            "You are the host of a \"guess the flag\" quiz.
        Tell the player one surprising, family-friendly fact about {}.
        {} Keep it to 1-2 sentences and do not use markdown.",
            country_name, opening
        )
    }
}

impl FactSource for FactHelper {
    async fn fetch_fact(&self, country_name: &str, was_correct: bool) -> Result<String, FactError> {
        debug!("Generating fact about {:?}, correct guess: {}", country_name, was_correct);
        let prompt = Self::prompt(country_name, was_correct);

        let response: CompletionResponse = self.chat_gpt.send_message(&prompt).await?;
        let content = response.message().clone().content;

        debug!("Completion: {:?}", content);

        if content.trim().is_empty() {
            return Err(FactError::EmptyCompletion);
        }
        Ok(content)
    }
}

/// Runs `request` against `source`. Failures turn into the fallback text, so
/// the caller always has something to show.
pub async fn fetch_fact_for<S: FactSource>(source: &S, request: &FactRequest) -> String {
    match source
        .fetch_fact(&request.country_name, request.was_correct)
        .await
    {
        Ok(fact) => fact,
        Err(err) => {
            warn!("Fact about {} failed: {}", request.country_name, err);
            fallback_fact(&request.country_name, request.was_correct)
        }
    }
}
