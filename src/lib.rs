//! # repodoc Library
//!
//! This crate can be used to:
//!
//! - Scan a Python project (local or cloned from GitHub) for module, function
//!   and class docstrings
//! - Summarize that metadata into a prompt and have an LLM write Markdown
//!   documentation from it
//! - Grade generated documentation against a reference on a five-metric rubric
//!
//! ## Usage
//!
//! ### To generate documentation:
//!
//! ```rust,no_run
//! use repodoc::agent::{AgentConfig, ChatAgent};
//! use repodoc::filewalker::DiscoveryOptions;
//! use repodoc::prompt::{DEFAULT_TEMPLATE, WRITER_SYSTEM_PROMPT};
//! use repodoc::{generate_documentation, source};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let agent = ChatAgent::new(AgentConfig {
//!         api_key: Some(std::env::var("REPODOC_API_KEY")?),
//!         ..AgentConfig::default()
//!     })?
//!     .with_system_prompt(WRITER_SYSTEM_PROMPT);
//!
//!     let located = source::locate("https://github.com/owner/repo", None)?;
//!     let markdown = generate_documentation(
//!         located,
//!         &DiscoveryOptions::default(),
//!         DEFAULT_TEMPLATE,
//!         &agent,
//!     )
//!     .await?;
//!     println!("{markdown}");
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod docstring;
pub mod error;
pub mod extractor;
pub mod filewalker;
#[cfg(feature = "git")]
pub mod git;
pub mod grading;
pub mod prompt;
pub mod source;
pub mod summary;
pub mod writer;

pub use agent::{AgentConfig, ChatAgent, EchoAgent, GenerationAgent};
pub use cli::{Config, Mode};
pub use error::{DocgenError, Result};
pub use extractor::{FileRecord, MetadataExtractor};
pub use filewalker::{DiscoveryOptions, collect_source_files};
pub use grading::GradeReport;
pub use source::LocatedSource;
pub use summary::ProjectSummary;
pub use writer::MarkdownWriter;

use log::{error, info, warn};
use std::path::Path;

/// Runs the whole documentation pipeline on an already located source and
/// releases it afterwards, whether generation succeeded or not.
pub async fn generate_documentation(
    source: LocatedSource,
    discovery: &DiscoveryOptions,
    template: &str,
    agent: &dyn GenerationAgent,
) -> Result<String> {
    let outcome = document_project(source.root(), discovery, template, agent).await;
    source.release();
    outcome
}

/// Scans `root`, builds the request prompt and asks `agent` for Markdown.
pub async fn document_project(
    root: &Path,
    discovery: &DiscoveryOptions,
    template: &str,
    agent: &dyn GenerationAgent,
) -> Result<String> {
    let files = collect_source_files(root, discovery);
    info!(
        "Found {} .{} files under {}",
        files.len(),
        discovery.extension,
        root.display()
    );

    let mut extractor = MetadataExtractor::new();
    let records = extractor.extract_all(&files);
    let summary = ProjectSummary::assemble(&records, root);
    if summary.is_empty() {
        warn!("No source files could be summarized; sending the template only");
    }

    let prompt = prompt::documentation_request(&summary, template);
    agent.generate(&prompt).await.inspect_err(|e| error!("{e}"))
}

/// Builds the agent `config` asks for: a prompt echo for dry runs, otherwise
/// a [`ChatAgent`] primed for the selected mode.
pub fn build_agent(config: &Config) -> Result<Box<dyn GenerationAgent>> {
    if config.dry_run {
        return Ok(Box::new(EchoAgent));
    }

    let system_prompt = match config.mode {
        Mode::Generate { .. } => prompt::WRITER_SYSTEM_PROMPT,
        Mode::Grade { .. } => prompt::GRADER_SYSTEM_PROMPT,
    };
    let agent = ChatAgent::new(config.agent.clone())?.with_system_prompt(system_prompt);
    Ok(Box::new(agent))
}

/// Executes one invocation and returns the text to print.
pub async fn run_repodoc(config: &Config, agent: &dyn GenerationAgent) -> Result<String> {
    match &config.mode {
        Mode::Generate { input } => {
            let located = source::locate(input, config.branch())?;
            generate_documentation(located, &config.discovery, &config.template, agent).await
        }
        Mode::Grade {
            original,
            generated,
        } => {
            let original = read_text(original).await?;
            let generated = read_text(generated).await?;

            if config.dry_run {
                return Ok(prompt::grading_request(&original, &generated));
            }

            let report = grading::grade(&original, &generated, agent).await?;
            if config.json {
                serde_json::to_string_pretty(&report)
                    .map_err(|e| DocgenError::grading(format!("failed to serialize report: {e}")))
            } else {
                Ok(report.to_markdown())
            }
        }
    }
}

/// Drives `work` to completion unless `interrupt` finishes first.
///
/// `interrupt` is polled before `work` on every wakeup, so a pending
/// interrupt wins and `work` is dropped together with any workspace it owns.
pub async fn run_until_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        biased;
        () = interrupt => None,
        outcome = work => Some(outcome),
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DocgenError::io(path, e))
}
