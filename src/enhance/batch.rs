//! Batched subject enhancement with strict fallback.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{CompletionError, ConfigError};
use crate::llm::CompletionClient;

use super::decision::{Condition, Decision};
use super::parse::{clean_lines, split_sections};
use super::prompt::build_messages;

/// Tuning for [`BatchEnhancer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancerOptions {
    /// Subjects with fewer characters are never sent.
    pub min_subject_len: usize,
    /// Response lines with fewer characters are dropped.
    pub min_line_len: usize,
    /// Subjects per request.
    pub chunk_size: usize,
    /// Deadline for each request.
    pub request_timeout: Duration,
}

impl Default for EnhancerOptions {
    fn default() -> Self {
        Self {
            min_subject_len: 15,
            min_line_len: 3,
            chunk_size: 50,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Rewrites commit subjects through a [`CompletionClient`], one request per
/// chunk of unique eligible subjects.
///
/// Never fails: every subject in the input is a key of the result, mapped to
/// its rewritten lines or to itself.
pub struct BatchEnhancer {
    client: Arc<dyn CompletionClient>,
    options: EnhancerOptions,
}

impl BatchEnhancer {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        options: EnhancerOptions,
    ) -> Result<Self, ConfigError> {
        if options.chunk_size == 0 {
            return Err(ConfigError::EmptyChunk);
        }
        Ok(Self { client, options })
    }

    pub fn with_defaults(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            options: EnhancerOptions::default(),
        }
    }

    pub fn options(&self) -> &EnhancerOptions {
        &self.options
    }

    pub async fn enhance(&self, subjects: &[String]) -> HashMap<String, Vec<String>> {
        let mut seen = HashSet::new();
        let mut decisions = Vec::new();
        let mut eligible = Vec::new();

        for subject in subjects {
            if !seen.insert(subject.as_str()) {
                debug!(
                    condition = %Condition::Duplicate,
                    subject = %subject,
                    "Subject already queued"
                );
                continue;
            }
            if subject.chars().count() < self.options.min_subject_len {
                decisions.push(Decision::new(subject.as_str(), Condition::TooShort));
            } else {
                eligible.push(subject.as_str());
            }
        }

        for chunk in eligible.chunks(self.options.chunk_size) {
            decisions.extend(self.enhance_chunk(chunk).await);
        }

        decisions
            .into_iter()
            .map(|d| (d.subject.clone(), d.resolve()))
            .collect()
    }

    async fn enhance_chunk(&self, chunk: &[&str]) -> Vec<Decision> {
        let text = match self.request(chunk).await {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    condition = %Condition::RequestFailed,
                    count = chunk.len(),
                    error = %err,
                    "Enhancement request failed, keeping original subjects"
                );
                return chunk
                    .iter()
                    .map(|s| Decision::new(*s, Condition::RequestFailed))
                    .collect();
            }
        };

        let min_line = self.options.min_line_len;

        // A lone subject owns every line, whatever delimiters came back.
        if let [only] = chunk {
            let lines: Vec<String> = split_sections(&text)
                .iter()
                .flat_map(|section| clean_lines(section, min_line))
                .collect();
            return vec![self.decide(only, lines)];
        }

        let sections = split_sections(&text);
        if sections.len() > chunk.len() {
            warn!(
                expected = chunk.len(),
                received = sections.len(),
                "Ignoring extra enhancement sections"
            );
        }

        chunk
            .iter()
            .enumerate()
            .map(|(i, subject)| match sections.get(i) {
                Some(section) => self.decide(subject, clean_lines(section, min_line)),
                None => {
                    warn!(
                        condition = %Condition::SectionMissing,
                        subject = %subject,
                        "No enhancement returned"
                    );
                    Decision::new(*subject, Condition::SectionMissing)
                }
            })
            .collect()
    }

    fn decide(&self, subject: &str, lines: Vec<String>) -> Decision {
        if lines.is_empty() {
            warn!(
                condition = %Condition::SectionEmpty,
                subject = %subject,
                "Enhancement had no usable lines"
            );
            Decision::new(subject, Condition::SectionEmpty)
        } else {
            Decision::rewritten(subject, lines)
        }
    }

    async fn request(&self, chunk: &[&str]) -> Result<String, CompletionError> {
        let messages = build_messages(chunk);
        debug!(count = chunk.len(), "Sending enhancement request");
        let completion = timeout(self.options.request_timeout, self.client.chat(&messages))
            .await
            .map_err(|_| CompletionError::Timeout(self.options.request_timeout))??;
        if let Some(usage) = completion.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Enhancement usage"
            );
        }
        Ok(completion.text)
    }
}
