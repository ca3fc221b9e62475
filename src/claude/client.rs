//! [`CompletionClient`] over the Claude Code CLI.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::{ClaudeError, CompletionError};
use crate::llm::{ChatMessage, Completion, CompletionClient, Role, Usage};

use super::subprocess::{check_claude_installed, run_claude};

/// Trait for executing Claude CLI commands.
///
/// This abstraction allows mocking the Claude subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaudeExecutor: Send + Sync {
    /// Run Claude and return its raw JSON envelope.
    async fn run(&self, prompt: &str, system: Option<String>) -> Result<String, ClaudeError>;
}

/// Default executor that calls the real Claude CLI.
///
/// The first call checks that `claude` is installed. A successful check is
/// remembered; a failed one is retried on the next call.
#[derive(Default)]
pub struct DefaultExecutor {
    installed: OnceCell<()>,
}

#[async_trait]
impl ClaudeExecutor for DefaultExecutor {
    async fn run(&self, prompt: &str, system: Option<String>) -> Result<String, ClaudeError> {
        self.installed.get_or_try_init(check_claude_installed).await?;
        run_claude(prompt, system.as_deref()).await
    }
}

/// Claude CLI JSON envelope when using --output-format json
#[derive(Deserialize)]
struct ClaudeCliResponse {
    result: String,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    usage: Option<Usage>,
}

fn parse_envelope(response: &str) -> Result<Completion, ClaudeError> {
    let envelope: ClaudeCliResponse = serde_json::from_str(response).map_err(|e| {
        let preview: String = response.chars().take(200).collect();
        ClaudeError::InvalidJson(format!("{e}. Response: {preview}"))
    })?;
    if envelope.is_error {
        return Err(ClaudeError::ExecutionFailed(envelope.result));
    }
    Ok(Completion {
        text: envelope.result,
        usage: envelope.usage,
    })
}

/// Completion client backed by the `claude` executable.
pub struct ClaudeClient<E = DefaultExecutor> {
    executor: E,
}

impl ClaudeClient {
    pub fn new() -> Self {
        Self {
            executor: DefaultExecutor::default(),
        }
    }
}

impl Default for ClaudeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ClaudeExecutor> ClaudeClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    async fn run(
        &self,
        prompt: &str,
        system: Option<String>,
    ) -> Result<Completion, CompletionError> {
        let raw = self.executor.run(prompt, system).await?;
        let completion = parse_envelope(&raw)?;
        if completion.text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(completion)
    }
}

#[async_trait]
impl<E: ClaudeExecutor> CompletionClient for ClaudeClient<E> {
    async fn complete(&self, prompt: &str) -> Result<Completion, CompletionError> {
        self.run(prompt, None).await
    }

    /// System messages become the appended system prompt; the rest of the
    /// conversation is flattened into the `-p` prompt.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let turns: Vec<&ChatMessage> = messages.iter().filter(|m| m.role != Role::System).collect();

        let prompt = match turns.as_slice() {
            [only] => only.content.clone(),
            _ => turns
                .iter()
                .map(|m| match m.role {
                    Role::Assistant => format!("Assistant: {}", m.content),
                    _ => format!("User: {}", m.content),
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        let system = (!system.is_empty()).then(|| system.join("\n\n"));

        self.run(&prompt, system).await
    }
}
