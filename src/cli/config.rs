use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::suggest::backend::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};

/// Model credential baked in at build time, if `GEMINI_API_KEY` was set then.
const BUILD_TIME_API_KEY: Option<&str> = option_env!("GEMINI_API_KEY");

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Fill web forms with model-suggested values after a human review"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Gemini API base URL
    #[arg(long, global = true)]
    pub gemini_endpoint: Option<String>,

    /// Gemini model name
    #[arg(long, global = true)]
    pub gemini_model: Option<String>,

    /// Gemini API key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Answer every prompt with the contents of this file instead of calling the model
    #[arg(long, global = true)]
    pub mock_response: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the fillable fields detected on a page
    Detect {
        /// HTML file to scan
        #[arg(long)]
        page: String,
    },

    /// Ask the model for values and print them as JSON
    Suggest {
        /// HTML file to scan
        #[arg(long)]
        page: String,

        /// Natural-language requirements for the values
        #[arg(short, long)]
        requirements: String,
    },

    /// Write a JSON map of identifier → value into a page
    Fill {
        /// HTML file to fill
        #[arg(long)]
        page: String,

        /// JSON object of identifier → value
        #[arg(long)]
        values: String,

        /// Where to write the filled HTML
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Analyze, review suggestions interactively, then fill
    Assist {
        /// HTML file to fill
        #[arg(long)]
        page: String,

        /// Natural-language requirements for the values
        #[arg(short, long)]
        requirements: String,

        /// Where to write the filled HTML
        #[arg(short, long)]
        output: Option<String>,

        /// Accept the suggestions without the review prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// Answer processFormWithAI messages as NDJSON over stdin/stdout
    Serve,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: default_reset_delay_ms(),
        }
    }
}

fn default_reset_delay_ms() -> u64 { 3000 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "ignoring malformed config");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Settings resolution: CLI > config > env > build-time > defaults
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

/// Resolve Gemini settings. `env_key` is the runtime `GEMINI_API_KEY`.
pub fn resolve_gemini(cli: &Cli, config: &AppConfig, env_key: Option<&str>) -> GeminiSettings {
    let endpoint = cli
        .gemini_endpoint
        .as_deref()
        .or(config.gemini.endpoint.as_deref())
        .unwrap_or(DEFAULT_GEMINI_ENDPOINT);
    let model = cli
        .gemini_model
        .as_deref()
        .or(config.gemini.model.as_deref())
        .unwrap_or(DEFAULT_GEMINI_MODEL);
    let api_key = cli
        .api_key
        .as_deref()
        .or(config.gemini.api_key.as_deref())
        .or(env_key.filter(|k| !k.is_empty()))
        .or(BUILD_TIME_API_KEY)
        .unwrap_or_default();

    GeminiSettings {
        endpoint: endpoint.to_string(),
        model: model.to_string(),
        api_key: api_key.to_string(),
    }
}
