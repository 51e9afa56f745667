//! User-facing progress output for a pipeline run.
//!
//! The pipeline emits [`PipelineEvent`]s as it advances; a reporter decides
//! what the user sees. Output goes to **stdout**, interleaved with the
//! ranker's own output, while diagnostics stay on stderr via `tracing`.

use std::io::Write;

use order_agent_core::KeywordSet;

use crate::pipeline::Stage;

/// Something worth telling the user about.
#[derive(Clone, Debug)]
pub enum PipelineEvent<'a> {
    /// The pipeline moved into `Stage`.
    Entered(Stage),
    /// The model produced a non-empty query.
    QueryReady { query: &'a str },
    /// Filtering finished.
    Filtered {
        keywords: &'a KeywordSet,
        matched: usize,
        total: usize,
    },
    /// Filtering done; payload about to go to the ranker (or printed in a
    /// dry run).
    Payload { payload: &'a str, dry_run: bool },
}

/// Receives pipeline events as they happen.
pub trait PipelineReporter {
    fn report(&self, event: PipelineEvent<'_>);
}

/// Plain-text lines on stdout.
pub struct ConsoleReporter;

impl PipelineReporter for ConsoleReporter {
    fn report(&self, event: PipelineEvent<'_>) {
        let line = match event {
            PipelineEvent::Entered(_) => return,
            PipelineEvent::QueryReady { query } => format!("Query: {}\n", query),
            PipelineEvent::Filtered {
                keywords,
                matched,
                total,
            } => {
                if keywords.is_empty() {
                    format!(
                        "No keywords in query, keeping all {} catalog entries.\n",
                        total
                    )
                } else {
                    format!(
                        "Keywords: {}\nMatched {} of {} catalog entries.\n",
                        keywords, matched, total
                    )
                }
            }
            PipelineEvent::Payload { payload, dry_run } => {
                if dry_run {
                    format!("{}\n", payload)
                } else {
                    return;
                }
            }
        };
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

/// Reporter that prints nothing.
pub struct NoReport;

impl PipelineReporter for NoReport {
    fn report(&self, _event: PipelineEvent<'_>) {}
}

/// Records events as strings. Used by tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingReporter {
    pub(crate) events: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl PipelineReporter for RecordingReporter {
    fn report(&self, event: PipelineEvent<'_>) {
        let text = match event {
            PipelineEvent::Entered(stage) => format!("enter {}", stage),
            PipelineEvent::QueryReady { query } => format!("query {}", query),
            PipelineEvent::Filtered {
                keywords,
                matched,
                total,
            } => format!("filtered [{}] {}/{}", keywords, matched, total),
            PipelineEvent::Payload { payload, dry_run } => {
                format!("payload {} dry_run={}", payload, dry_run)
            }
        };
        self.events.borrow_mut().push(text);
    }
}
