//! Scripted mock provider for tests.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use assist_core::{AppError, AppResult};
use std::sync::Mutex;

/// A test double that returns scripted replies and records requests.
pub struct MockClient {
    reply: Result<String, String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockClient {
    /// A client that always answers with the same text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every completion fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 10),
            }),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replies_and_records() {
        let mock = MockClient::replying("Visit the registration point.");
        let request = LlmRequest::new("How do I register?", "gpt-3.5-turbo");

        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.content, "Visit the registration point.");
        assert_eq!(mock.requests().len(), 1);
        assert_eq!(mock.requests()[0].prompt, "How do I register?");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockClient::failing("boom");
        let request = LlmRequest::new("q", "m");
        assert!(mock.complete(&request).await.is_err());
    }
}
