//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};

use chglog::{
    ChatMessage, Completion, CompletionClient, CompletionError, RawCommit, RawLog, RawTag,
    StaticLogSource,
};

/// Base timestamp for deterministic histories (2023-11-14T22:13:20Z).
pub const BASE_TIME: i64 = 1_700_000_000;

/// Install a test subscriber so `RUST_LOG=chglog=debug` shows pipeline logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    fn signature_at(&self, seconds: i64) -> Signature<'static> {
        Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
            .expect("Failed to create signature")
    }

    /// Create a commit dated `seconds` after [`BASE_TIME`]. Returns the commit OID.
    pub fn commit_at(&self, message: &str, seconds: i64) -> Oid {
        let sig = self.signature_at(BASE_TIME + seconds);

        let file_path = self.dir.path().join("test.txt");
        std::fs::write(&file_path, format!("{message}\n{seconds}\n"))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(std::path::Path::new("test.txt")).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a linear history, one minute apart, oldest first.
    pub fn commits(&self, messages: &[&str]) -> Vec<Oid> {
        messages
            .iter()
            .enumerate()
            .map(|(i, m)| self.commit_at(m, i as i64 * 60))
            .collect()
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag_lightweight(name, &obj, false).expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag dated `seconds` after [`BASE_TIME`].
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str, seconds: i64) {
        let sig = self.signature_at(BASE_TIME + seconds);
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag(name, &obj, &sig, message, false).expect("Failed to create annotated tag");
    }
}

/// A raw commit at log position `i` (0 = newest), one hour apart.
pub fn raw_commit(i: usize, message: &str) -> RawCommit {
    RawCommit::from_message(
        format!("{:040x}", i + 1),
        vec![format!("{:040x}", i + 2)],
        "Test User",
        "test@example.com",
        Utc.timestamp_opt(BASE_TIME - i as i64 * 3600, 0).unwrap(),
        message,
    )
}

/// An in-memory log, newest message first, with tags placed by log index.
pub fn static_log(messages: &[&str], tags: &[(&str, usize)]) -> StaticLogSource {
    let commits: Vec<RawCommit> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| raw_commit(i, m))
        .collect();
    let tags = tags
        .iter()
        .map(|(name, i)| RawTag {
            name: name.to_string(),
            target: commits[*i].hash.clone(),
            date: commits[*i].timestamp,
        })
        .collect();
    StaticLogSource::new(RawLog { commits, tags })
}

/// Replies with a fixed text and counts requests.
pub struct ScriptedClient {
    reply: String,
    calls: AtomicU32,
}

impl ScriptedClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _prompt: &str) -> Result<Completion, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion::new(self.reply.as_str()))
    }

    async fn chat(&self, _messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion::new(self.reply.as_str()))
    }
}

/// Fails every request.
pub struct FailingClient;

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _prompt: &str) -> Result<Completion, CompletionError> {
        Err(CompletionError::Provider("connection refused".to_string()))
    }

    async fn chat(&self, _messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        Err(CompletionError::Provider("connection refused".to_string()))
    }
}

/// Answers only after `delay`.
pub struct SlowClient {
    pub delay: Duration,
}

#[async_trait]
impl CompletionClient for SlowClient {
    async fn complete(&self, _prompt: &str) -> Result<Completion, CompletionError> {
        tokio::time::sleep(self.delay).await;
        Ok(Completion::new("Too late"))
    }

    async fn chat(&self, _messages: &[ChatMessage]) -> Result<Completion, CompletionError> {
        tokio::time::sleep(self.delay).await;
        Ok(Completion::new("Too late"))
    }
}
