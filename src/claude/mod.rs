//! Claude CLI integration.

pub mod client;
pub mod subprocess;

pub use client::{ClaudeClient, ClaudeExecutor, DefaultExecutor};
pub use subprocess::{check_claude_installed, run_claude};
