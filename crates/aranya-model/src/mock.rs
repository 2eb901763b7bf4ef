//! Scripted backend for tests and offline runs.
//!
//! Replies are keyed by prompt id. Several replies for the same prompt are
//! served in order; the last one repeats.
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{ModelBackend, ModelError, ModelRequest};

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<String, VecDeque<Result<String, ModelError>>>>,
    requests: Mutex<Vec<ModelRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    unconfigured: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, prompt_id: &str, text: impl Into<String>) -> Self {
        self.push(prompt_id, Ok(text.into()))
    }

    pub fn fail(self, prompt_id: &str, error: ModelError) -> Self {
        self.push(prompt_id, Err(error))
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Behave like a backend without an API credential
    pub fn unconfigured(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, prompt_id: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.prompt_id == prompt_id)
            .count()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(self, prompt_id: &str, reply: Result<String, ModelError>) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(prompt_id.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, prompt_id: &str) -> Result<String, ModelError> {
        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        let queue = replies.get_mut(prompt_id).ok_or_else(|| {
            ModelError::Response(format!("no scripted reply for prompt '{}'", prompt_id))
        })?;

        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| {
                Err(ModelError::Response("scripted replies exhausted".to_string()))
            })
        } else {
            queue.front().cloned().unwrap_or_else(|| {
                Err(ModelError::Response("scripted replies exhausted".to_string()))
            })
        }
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn id(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn generate(&self, request: ModelRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt_id = request.prompt_id.clone();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply(&prompt_id)
    }
}
