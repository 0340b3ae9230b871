use super::TextGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted reply from [`MockTextClient`].
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
    Delayed(Duration, String),
}

/// Scriptable stand-in for a text model.
///
/// Replies are handed out in call order and cycle once exhausted.
#[derive(Clone)]
pub struct MockTextClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(MockReply::Text(response.into()))
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Fail(message.into()))
    }

    /// Reply with `response` after sleeping for `delay`.
    pub fn with_delayed_response(self, delay: Duration, response: impl Into<String>) -> Self {
        self.push(MockReply::Delayed(delay, response.into()))
    }

    fn push(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let reply = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.prompts.lock().unwrap().push(prompt.to_string());

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies[(*count - 1) % replies.len()].clone())
            }
        };

        match reply {
            None => Ok("Reverse the last thing you did".to_string()),
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(message)) => Err(Error::AiProvider(message)),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}
