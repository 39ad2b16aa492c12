use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub bundle: BundleConfig,
    pub logging: LoggingConfig,
}

/// Chat completion endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full chat completion URL
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Whole-request timeout in seconds (accepts "90s", "2m")
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// How the selected bundle files are sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// One completion per recognized file
    #[default]
    PerFile,
    /// One completion for the whole bundle
    Combined,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerFile => "per_file",
            Self::Combined => "combined",
        }
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_file" => Ok(Self::PerFile),
            "combined" => Ok(Self::Combined),
            other => Err(format!("unknown analysis mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Longer files are cut to this many characters
    pub max_chars_per_file: usize,
    pub mode: AnalysisMode,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self { max_chars_per_file: 8000, mode: AnalysisMode::PerFile }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), file: None }
    }
}

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "bundle-advisor")]
#[command(version, about = "Summarize performance issues in a CockroachDB statement bundle")]
pub struct CommandLineArgs {
    /// Path to the statement bundle (.zip)
    #[arg(value_name = "STATEMENT_BUNDLE")]
    pub bundle: PathBuf,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Chat completion endpoint URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model name (overrides config file)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Request timeout (overrides config file, e.g., "90s", "2m")
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Maximum characters kept per file (overrides config file)
    #[arg(long, value_name = "CHARS")]
    pub max_chars: Option<usize>,

    /// Analysis mode (overrides config file)
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<AnalysisMode>,

    /// Logging level (overrides config file, e.g., "info,bundle_advisor=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the prompts instead of calling the API
    #[arg(long)]
    pub dry_run: bool,
}

impl Config {
    /// Load configuration for a parsed command line
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with BUNDLE_ADVISOR_)
    /// 3. Configuration file (only when --config is given)
    /// 4. Default values
    pub fn load(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        let mut config = match &cli_args.config {
            Some(path) => Self::from_toml(path)?,
            None => Config::default(),
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Log level to use while the configuration itself is being loaded
    ///
    /// Only the CLI flag and env var are consulted; the config file has not
    /// been read yet.
    pub fn startup_log_level(
        cli_args: &CommandLineArgs,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> String {
        cli_args
            .log_level
            .clone()
            .or_else(|| lookup("BUNDLE_ADVISOR_LOG_LEVEL"))
            .unwrap_or_else(|| LoggingConfig::default().level)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - BUNDLE_ADVISOR_ENDPOINT: Chat completion URL
    /// - BUNDLE_ADVISOR_MODEL: Model name (default: gpt-4)
    /// - BUNDLE_ADVISOR_API_KEY_ENV: Variable holding the API key (default: OPENAI_API_KEY)
    /// - BUNDLE_ADVISOR_TIMEOUT: Request timeout (accepts "120", "90s", "2m")
    /// - BUNDLE_ADVISOR_MAX_CHARS: Characters kept per file (default: 8000)
    /// - BUNDLE_ADVISOR_MODE: per_file or combined
    /// - BUNDLE_ADVISOR_LOG_LEVEL: Logging level
    /// - BUNDLE_ADVISOR_LOG_FILE: Rolling log file path
    fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("BUNDLE_ADVISOR_ENDPOINT") {
            self.llm.endpoint = endpoint;
            tracing::info!("Override llm.endpoint from env: {}", self.llm.endpoint);
        }

        if let Some(model) = lookup("BUNDLE_ADVISOR_MODEL") {
            self.llm.model = model;
            tracing::info!("Override llm.model from env: {}", self.llm.model);
        }

        if let Some(var) = lookup("BUNDLE_ADVISOR_API_KEY_ENV") {
            self.llm.api_key_env = var;
            tracing::info!("Override llm.api_key_env from env: {}", self.llm.api_key_env);
        }

        if let Some(timeout) = lookup("BUNDLE_ADVISOR_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout_secs from env: {}", self.llm.timeout_secs);
                },
                Err(e) => tracing::warn!(
                    "Invalid BUNDLE_ADVISOR_TIMEOUT '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Some(max_chars) = lookup("BUNDLE_ADVISOR_MAX_CHARS") {
            match max_chars.trim().parse() {
                Ok(val) => {
                    self.bundle.max_chars_per_file = val;
                    tracing::info!(
                        "Override bundle.max_chars_per_file from env: {}",
                        self.bundle.max_chars_per_file
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid BUNDLE_ADVISOR_MAX_CHARS '{}': {} (keep {})",
                    max_chars,
                    e,
                    self.bundle.max_chars_per_file
                ),
            }
        }

        if let Some(mode) = lookup("BUNDLE_ADVISOR_MODE") {
            match mode.parse::<AnalysisMode>() {
                Ok(val) => {
                    self.bundle.mode = val;
                    tracing::info!("Override bundle.mode from env: {}", val.as_str());
                },
                Err(e) => tracing::warn!(
                    "Invalid BUNDLE_ADVISOR_MODE '{}': {} (keep {})",
                    mode,
                    e,
                    self.bundle.mode.as_str()
                ),
            }
        }

        if let Some(level) = lookup("BUNDLE_ADVISOR_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(file) = lookup("BUNDLE_ADVISOR_LOG_FILE") {
            tracing::info!("Override logging.file from env: {}", file);
            self.logging.file = Some(file);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(endpoint) = &args.endpoint {
            self.llm.endpoint = endpoint.clone();
            tracing::info!("Override llm.endpoint from CLI: {}", self.llm.endpoint);
        }

        if let Some(model) = &args.model {
            self.llm.model = model.clone();
            tracing::info!("Override llm.model from CLI: {}", self.llm.model);
        }

        if let Some(timeout) = &args.timeout {
            match parse_duration_to_secs(timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout_secs from CLI: {}", self.llm.timeout_secs);
                },
                Err(e) => tracing::warn!(
                    "Invalid --timeout '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Some(max_chars) = args.max_chars {
            self.bundle.max_chars_per_file = max_chars;
            tracing::info!(
                "Override bundle.max_chars_per_file from CLI: {}",
                self.bundle.max_chars_per_file
            );
        }

        if let Some(mode) = args.mode {
            self.bundle.mode = mode;
            tracing::info!("Override bundle.mode from CLI: {}", mode.as_str());
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        let endpoint = self.llm.endpoint.trim();
        if endpoint.is_empty() {
            anyhow::bail!("llm.endpoint cannot be empty");
        }
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            anyhow::bail!("llm.endpoint must be an http(s) URL, got '{}'", endpoint);
        }
        if endpoint.starts_with("http://") {
            tracing::warn!("llm.endpoint is not HTTPS; the API key will be sent in clear text");
        }

        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model cannot be empty");
        }

        if self.llm.api_key_env.trim().is_empty() {
            anyhow::bail!("llm.api_key_env cannot be empty");
        }

        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be > 0");
        }

        if self.bundle.max_chars_per_file == 0 {
            anyhow::bail!("bundle.max_chars_per_file must be > 0");
        }

        Ok(())
    }

    fn from_toml(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.trim().parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => {
            n.checked_mul(60).ok_or_else(|| "duration too large".to_string())
        },
        "h" | "hr" | "hour" | "hours" => {
            n.checked_mul(60 * 60).ok_or_else(|| "duration too large".to_string())
        },
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Accept either a number of seconds or a human-friendly string
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '90s', '2m'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
