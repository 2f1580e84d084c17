//! Scripted stand-in for the Gemini endpoint.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gemini::{CallError, GenerateRequest, GenerateResponse, GenerativeClient};

/// Replays queued replies in order and records every request it receives.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<GenerateResponse, CallError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<GenerateResponse, CallError>>) -> Self {
        Self { script: Mutex::new(script.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeClient for ScriptedClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CallError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CallError::Transport("script exhausted".into())))
    }
}

pub fn server_error() -> CallError {
    CallError::Http { status: 500, body: String::new(), hint: None }
}
