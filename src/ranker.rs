//! Hand-off to the external ranker.
//!
//! The ranker is an opaque script: it receives the matching names as one
//! comma-joined argument, prints its own presentation, and reports success
//! through its exit status.

use std::path::PathBuf;

use order_agent_core::keywords::KEYWORD_DELIMITER;
use order_agent_core::FilteredResult;
use thiserror::Error;

use crate::config::RankerConfig;
use crate::process::{Invocation, ProcessError, ProcessRunner, ProcessStatus};

/// Ranker hand-off failures.
#[derive(Debug, Error)]
pub enum RankerError {
    #[error("could not run ranker: {0}")]
    Process(#[from] ProcessError),

    #[error("ranker {script} finished with {status}")]
    Exit { script: String, status: ProcessStatus },
}

/// Join the primary value of every row with the delimiter.
pub fn serialize(result: &FilteredResult) -> String {
    let names = result.primary_values();
    for name in names.iter().filter(|n| n.contains(KEYWORD_DELIMITER)) {
        tracing::warn!(
            name = %name,
            "entry name contains the delimiter and will be split by the ranker"
        );
    }
    let delimiter = KEYWORD_DELIMITER.to_string();
    names.join(delimiter.as_str())
}

/// Runs `<interpreter> <script> <payload>`.
pub struct Ranker<R> {
    interpreter_path: PathBuf,
    script_path: PathBuf,
    runner: R,
}

impl<R: ProcessRunner> Ranker<R> {
    /// Ranker configured from `[ranker]`.
    pub fn new(config: &RankerConfig, runner: R) -> Self {
        Self {
            interpreter_path: config.interpreter_path.clone(),
            script_path: config.script_path.clone(),
            runner,
        }
    }

    /// `<interpreter> <script> <payload>`
    pub fn invocation(&self, payload: &str) -> Invocation {
        Invocation::new(&self.interpreter_path)
            .arg(self.script_path.to_string_lossy())
            .arg(payload)
    }

    /// Run the ranker with inherited stdio. A nonzero exit is an error.
    pub fn invoke(&self, payload: &str) -> Result<ProcessStatus, RankerError> {
        let invocation = self.invocation(payload);
        tracing::debug!(command_line = %invocation, "running ranker");

        let status = self.runner.run_inherited(&invocation)?;
        if !status.success() {
            return Err(RankerError::Exit {
                script: self.script_path.display().to_string(),
                status,
            });
        }
        Ok(status)
    }
}
