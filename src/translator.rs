//! Query translation: free-text command in, keyword query out.
//!
//! The translator composes the prompt (preamble, command, optional
//! preferences), runs the model executable once with that prompt as a
//! single argument, and cleans the captured text into a query string.

use std::io;
use std::path::PathBuf;

use order_agent_core::{clean_output, CleanupError, OutputTrim, PromptTemplate};
use thiserror::Error;

use crate::config::TranslatorConfig;
use crate::process::{Invocation, ProcessError, ProcessRunner};

/// Failures turning a command into a query.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("could not read prompt file {}: {source}", path.display())]
    PromptFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model process failed: {0}")]
    Process(#[from] ProcessError),

    #[error("could not clean model output: {0}")]
    Cleanup(#[from] CleanupError),
}

/// Runs the local model to turn commands into keyword queries.
pub struct Translator<R> {
    executable_path: PathBuf,
    model_path: PathBuf,
    model_flag: String,
    merge_stderr: bool,
    trim: OutputTrim,
    template: PromptTemplate,
    runner: R,
}

impl<R: ProcessRunner> Translator<R> {
    /// Build a translator, reading the prompt preamble from
    /// `config.prompt_file_path`.
    pub fn new(config: &TranslatorConfig, runner: R) -> Result<Self, TranslationError> {
        let path = &config.prompt_file_path;
        let preamble =
            std::fs::read_to_string(path).map_err(|source| TranslationError::PromptFile {
                path: path.clone(),
                source,
            })?;
        if preamble.trim().is_empty() {
            tracing::warn!(path = %path.display(), "prompt file is empty");
        } else {
            tracing::info!(path = %path.display(), "loaded prompt preamble");
        }

        let template = PromptTemplate::new(preamble)
            .with_labels(&config.command_label, &config.preferences_label);
        Ok(Self::with_template(config, template, runner))
    }

    /// Build a translator around an already-loaded template.
    pub fn with_template(config: &TranslatorConfig, template: PromptTemplate, runner: R) -> Self {
        Self {
            executable_path: config.executable_path.clone(),
            model_path: config.model_path.clone(),
            model_flag: config.model_flag.clone(),
            merge_stderr: config.merge_stderr,
            trim: OutputTrim::bytes(config.trim_trailing_bytes),
            template,
            runner,
        }
    }

    /// The prompt template in use.
    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// `<executable> [<model_flag>] <model> <prompt>`
    pub fn invocation(&self, prompt: &str) -> Invocation {
        let mut inv = Invocation::new(&self.executable_path).merge_stderr(self.merge_stderr);
        if !self.model_flag.is_empty() {
            inv = inv.arg(&self.model_flag);
        }
        inv.arg(self.model_path.to_string_lossy()).arg(prompt)
    }

    /// Translate `command` into a query string.
    ///
    /// An empty string means the model ran but produced nothing usable; the
    /// caller decides how to treat that. The model's exit status is only
    /// logged.
    pub fn translate(
        &self,
        command: &str,
        preferences: Option<&str>,
    ) -> Result<String, TranslationError> {
        let prompt = self.template.compose(command, preferences);
        let invocation = self.invocation(&prompt);
        tracing::debug!(command_line = %invocation, "running model");

        let output = self.runner.capture(&invocation)?;
        if !output.status.success() {
            tracing::warn!(
                status = %output.status,
                "model process did not exit cleanly, using its output anyway"
            );
        }

        let query = clean_output(&output.bytes, self.trim)?;
        if query.is_empty() {
            tracing::warn!("model returned empty output");
        } else {
            tracing::info!(query = %query, "model produced query");
        }
        Ok(query)
    }
}
