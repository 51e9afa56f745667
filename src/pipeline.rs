//! The command → query → matches → ranker pipeline.
//!
//! ```text
//! LoadPreferences → Translate → CheckEmpty → Filter → Serialize → InvokeRanker
//!                       │            │          │                      │
//!                       └────────────┴──────────┴──────── Failed ◀─────┘
//! ```
//!
//! Stages run strictly in order on the calling thread. The first failure
//! aborts the run; there are no retries and no fallbacks. Preferences are
//! the only input allowed to be missing.

use std::fmt;

use order_agent_core::{Catalog, FilterError, FilteredResult, KeywordSet, Projection};
use thiserror::Error;

use crate::catalog::projection;
use crate::config::Config;
use crate::preferences::load_preferences;
use crate::process::{ProcessRunner, ProcessStatus};
use crate::ranker::{serialize, Ranker, RankerError};
use crate::report::{PipelineEvent, PipelineReporter};
use crate::translator::{TranslationError, Translator};

/// Pipeline states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadPreferences,
    Translate,
    CheckEmpty,
    Filter,
    Serialize,
    InvokeRanker,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadPreferences => "load-preferences",
            Stage::Translate => "translate",
            Stage::CheckEmpty => "check-empty",
            Stage::Filter => "filter",
            Stage::Serialize => "serialize",
            Stage::InvokeRanker => "ranker",
        };
        f.write_str(name)
    }
}

/// Why a run stopped early.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("model did not return a usable query, aborting")]
    EmptyQuery,

    #[error("in-memory filtering failed: {0}")]
    Filter(#[from] FilterError),

    #[error(transparent)]
    RankerInvocation(#[from] RankerError),
}

impl PipelineError {
    /// The stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Translation(_) | PipelineError::EmptyQuery => Stage::Translate,
            PipelineError::Filter(_) => Stage::Filter,
            PipelineError::RankerInvocation(_) => Stage::InvokeRanker,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after serialization instead of starting the ranker.
    pub dry_run: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub query: String,
    pub keywords: KeywordSet,
    pub matched: FilteredResult,
    pub payload: String,
    /// `None` for dry runs.
    pub ranker_status: Option<ProcessStatus>,
}

/// Runs one command through every stage.
pub struct Pipeline<R> {
    config: Config,
    catalog: Catalog,
    projection: Projection,
    runner: R,
}

impl<R: ProcessRunner> Pipeline<R> {
    /// Build a pipeline over a loaded catalog.
    pub fn new(config: Config, catalog: Catalog, runner: R) -> Self {
        let projection = projection(&config.catalog);
        Self {
            config,
            catalog,
            projection,
            runner,
        }
    }

    /// Run `command` through every stage, reporting progress to `reporter`.
    pub fn run(
        &self,
        command: &str,
        options: RunOptions,
        reporter: &dyn PipelineReporter,
    ) -> Result<PipelineReport, PipelineError> {
        let enter = |stage: Stage| {
            tracing::info!(stage = %stage, "entering stage");
            reporter.report(PipelineEvent::Entered(stage));
        };

        enter(Stage::LoadPreferences);
        let preferences = load_preferences(&self.config.preferences.file_path);

        enter(Stage::Translate);
        let translator = Translator::new(&self.config.translator, &self.runner)?;
        let query = translator.translate(command, preferences.as_deref())?;

        enter(Stage::CheckEmpty);
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        reporter.report(PipelineEvent::QueryReady { query: &query });

        enter(Stage::Filter);
        let keywords = KeywordSet::parse(&query);
        if keywords.is_empty() {
            tracing::warn!(query = %query, "query has no keywords, selecting the whole catalog");
        }
        let matched = self.catalog.filter_keywords(&keywords, &self.projection)?;
        tracing::info!(
            keywords = %keywords,
            matched = matched.len(),
            total = self.catalog.len(),
            "filtering complete"
        );
        reporter.report(PipelineEvent::Filtered {
            keywords: &keywords,
            matched: matched.len(),
            total: self.catalog.len(),
        });

        enter(Stage::Serialize);
        let payload = serialize(&matched);
        reporter.report(PipelineEvent::Payload {
            payload: &payload,
            dry_run: options.dry_run,
        });

        let ranker_status = if options.dry_run {
            None
        } else {
            enter(Stage::InvokeRanker);
            if matched.is_empty() {
                tracing::warn!("no catalog entries matched, ranker receives an empty list");
            }
            let ranker = Ranker::new(&self.config.ranker, &self.runner);
            Some(ranker.invoke(&payload)?)
        };

        Ok(PipelineReport {
            query,
            keywords,
            matched,
            payload,
            ranker_status,
        })
    }
}
