//! Template rendering of the version tree.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::DateTime;
use minijinja::value::Value;
use minijinja::{context, Environment, Error, ErrorKind, UndefinedBehavior};

use crate::commit::IssueRef;
use crate::config::{ChangelogConfig, Info};
use crate::error::RenderError;
use crate::platform::{autolink, processor_for, Processor};

use super::model::Version;

/// Renders versions through a template body.
///
/// Templates see `info` and `versions`, the link functions `commit_url`,
/// `issue_url` and `compare_url`, and the filters `datetime`, `upper_first`
/// and `autolink`. Referencing anything else is an error.
pub struct Renderer {
    processor: Arc<dyn Processor>,
}

impl Renderer {
    pub fn new(processor: Arc<dyn Processor>) -> Self {
        Self { processor }
    }

    /// Renderer linking into the configured platform.
    pub fn for_config(config: &ChangelogConfig) -> Self {
        Self::new(processor_for(
            config.platform,
            config.info.repository_url.as_deref(),
            config.issue_tracker_url.as_deref(),
        ))
    }

    pub fn render(
        &self,
        template: &str,
        info: &Info,
        versions: &[Version],
    ) -> Result<String, RenderError> {
        let env = self.environment();
        let tmpl = env.template_from_str(template).map_err(RenderError::Syntax)?;
        tmpl.render(context! { info => info, versions => versions })
            .map_err(RenderError::Render)
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        let p = Arc::clone(&self.processor);
        env.add_function("commit_url", move |hash: String| link(p.commit_url(&hash)));

        let p = Arc::clone(&self.processor);
        env.add_function("issue_url", move |reference: String| {
            link(IssueRef::parse(&reference).and_then(|r| p.issue_url(&r)))
        });

        let p = Arc::clone(&self.processor);
        env.add_function("compare_url", move |from: String, to: String| {
            link(p.compare_url(&from, &to))
        });

        let p = Arc::clone(&self.processor);
        env.add_filter("autolink", move |text: String| autolink(p.as_ref(), &text));

        env.add_filter("datetime", datetime);
        env.add_filter("upper_first", upper_first);
        env
    }
}

fn link(url: Option<String>) -> Value {
    url.map(Value::from).unwrap_or_else(|| Value::from(()))
}

/// Format an RFC 3339 timestamp with a strftime pattern.
fn datetime(value: String, format: String) -> Result<String, Error> {
    let date = DateTime::parse_from_rfc3339(&value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("datetime filter expects an RFC 3339 timestamp, got '{value}': {e}"),
        )
    })?;
    let mut out = String::new();
    write!(out, "{}", date.format(&format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid datetime format '{format}'"),
        )
    })?;
    Ok(out)
}

fn upper_first(value: String) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
