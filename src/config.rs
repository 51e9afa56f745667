//! TOML configuration.
//!
//! Every path the pipeline touches lives here instead of being compiled in.
//! All keys have defaults, so an empty file (or no file at all) yields a
//! usable [`Config`]. Relative paths are resolved against the working
//! directory; bare executable names are looked up on `PATH`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use order_agent_core::catalog::{DEFAULT_OUTPUT_FIELD, DEFAULT_PLACEHOLDER};
use order_agent_core::prompt::{DEFAULT_COMMAND_LABEL, DEFAULT_PREFERENCES_LABEL};

/// Location used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/order-agent.toml";

/// Top-level configuration, one field per TOML section.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub ranker: RankerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// `[translator]`: the local model process.
#[derive(Debug, Deserialize, Clone)]
pub struct TranslatorConfig {
    #[serde(default = "default_executable_path")]
    pub executable_path: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Flag placed before the model path (e.g. `-m`). Empty means the model
    /// path is passed positionally.
    #[serde(default)]
    pub model_flag: String,
    #[serde(default = "default_prompt_file_path")]
    pub prompt_file_path: PathBuf,
    #[serde(default = "default_command_label")]
    pub command_label: String,
    #[serde(default = "default_preferences_label")]
    pub preferences_label: String,
    /// Append the model's stderr to its captured stdout.
    #[serde(default)]
    pub merge_stderr: bool,
    /// Bytes of trailing diagnostic output to drop from every answer.
    #[serde(default)]
    pub trim_trailing_bytes: usize,
}

fn default_executable_path() -> PathBuf {
    PathBuf::from("llama-run")
}
fn default_model_path() -> PathBuf {
    PathBuf::from("models/model.gguf")
}
fn default_prompt_file_path() -> PathBuf {
    PathBuf::from("data/prompt.txt")
}
fn default_command_label() -> String {
    DEFAULT_COMMAND_LABEL.to_string()
}
fn default_preferences_label() -> String {
    DEFAULT_PREFERENCES_LABEL.to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            executable_path: default_executable_path(),
            model_path: default_model_path(),
            model_flag: String::new(),
            prompt_file_path: default_prompt_file_path(),
            command_label: default_command_label(),
            preferences_label: default_preferences_label(),
            merge_stderr: false,
            trim_trailing_bytes: 0,
        }
    }
}

/// `[preferences]`: optional free-form preference text.
#[derive(Debug, Deserialize, Clone)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_file_path")]
    pub file_path: PathBuf,
}

fn default_preferences_file_path() -> PathBuf {
    PathBuf::from("data/preferences.txt")
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            file_path: default_preferences_file_path(),
        }
    }
}

/// `[ranker]`: the external ranking script.
#[derive(Debug, Deserialize, Clone)]
pub struct RankerConfig {
    #[serde(default = "default_interpreter_path")]
    pub interpreter_path: PathBuf,
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
}

fn default_interpreter_path() -> PathBuf {
    PathBuf::from("python3")
}
fn default_script_path() -> PathBuf {
    PathBuf::from("scripts/ranker.py")
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            interpreter_path: default_interpreter_path(),
            script_path: default_script_path(),
        }
    }
}

/// `[catalog]`: where records come from and what gets projected.
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// JSON array of objects. The built-in sample catalog is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    #[serde(default = "default_output_fields")]
    pub output_fields: Vec<String>,
    #[serde(default = "default_missing_placeholder")]
    pub missing_placeholder: String,
}

fn default_fields() -> Vec<String> {
    vec!["name".to_string(), "description".to_string()]
}
fn default_output_fields() -> Vec<String> {
    vec![DEFAULT_OUTPUT_FIELD.to_string()]
}
fn default_missing_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            fields: default_fields(),
            output_fields: default_output_fields(),
            missing_placeholder: default_missing_placeholder(),
        }
    }
}

/// `[display]`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplayConfig {
    /// Text printed once at startup, if the file exists.
    #[serde(default)]
    pub banner_path: Option<PathBuf>,
}

/// Read and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if given, otherwise the default location if it exists,
/// otherwise the built-in defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_config(default_path)
    } else {
        tracing::warn!(
            path = DEFAULT_CONFIG_PATH,
            "config file not found, using built-in defaults"
        );
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    let required_paths = [
        ("translator.executable_path", &config.translator.executable_path),
        ("translator.model_path", &config.translator.model_path),
        ("translator.prompt_file_path", &config.translator.prompt_file_path),
        ("ranker.interpreter_path", &config.ranker.interpreter_path),
        ("ranker.script_path", &config.ranker.script_path),
    ];
    for (key, value) in required_paths {
        if value.as_os_str().is_empty() {
            bail!("{} must not be empty", key);
        }
    }

    if config.catalog.fields.is_empty() {
        bail!("catalog.fields must list at least one field");
    }
    if config.catalog.output_fields.is_empty() {
        bail!("catalog.output_fields must list at least one field");
    }
    if let Some(field) = config
        .catalog
        .output_fields
        .iter()
        .find(|f| !config.catalog.fields.contains(f))
    {
        bail!(
            "catalog.output_fields contains '{}', which is not one of catalog.fields {:?}",
            field,
            config.catalog.fields
        );
    }

    Ok(())
}
