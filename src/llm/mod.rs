//! Abstract text-completion capability.

pub mod client;

pub use client::{ChatMessage, Completion, CompletionClient, Role, Usage};

#[cfg(test)]
pub use client::MockCompletionClient;
