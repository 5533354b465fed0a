use crate::llm::{DEFAULT_MODEL, LlmSettings, Provider};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Default OpenAI-compatible endpoint when `LLM_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Host to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Maximum upload size in megabytes
    #[arg(long, env = "MAX_FILE_SIZE_MB")]
    pub max_file_size_mb: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub extraction: ExtractionConfig,
    pub resilience: ResilienceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Upload limits enforced by the validation gate.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub max_file_size_mb: u64,
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    /// Allowed extensions joined for display, e.g. `.pdf, .txt`.
    #[must_use]
    pub fn allowed_display(&self) -> String {
        self.allowed_extensions.join(", ")
    }

    /// Whether `extension` (with leading dot) is allowed, ignoring case.
    #[must_use]
    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Largest accepted upload in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            allowed_extensions: vec![".pdf".to_string(), ".txt".to_string()],
        }
    }
}

/// Sampling and sizing parameters for the completion request.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_document_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1000,
            max_document_chars: 400_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub request_timeout_secs: u64,
    pub provider_timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let defaults = UploadConfig::default();
        let extraction = ExtractionConfig::default();

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.port", 8501)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("upload.max_file_size_mb", defaults.max_file_size_mb)?
            .set_default("upload.allowed_extensions", defaults.allowed_extensions)?
            .set_default("extraction.temperature", f64::from(extraction.temperature))?
            .set_default("extraction.max_tokens", extraction.max_tokens)?
            .set_default(
                "extraction.max_document_chars",
                u64::try_from(extraction.max_document_chars).unwrap_or(u64::MAX),
            )?
            .set_default("resilience.request_timeout_secs", 180)?
            .set_default("resilience.provider_timeout_secs", 120)?;

        // 2. Config file: explicit path must exist, ./config.{yaml,toml,json} is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment, e.g. DOCUMIND_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("DOCUMIND")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("upload.allowed_extensions")
                .try_parsing(true),
        );

        // 4. CLI flags (and their clap env aliases) win over everything else
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(mb) = cli.max_file_size_mb {
            builder = builder.set_override("upload.max_file_size_mb", mb)?;
        }
        if let Some(secs) = cli.request_timeout_secs {
            builder = builder.set_override("resilience.request_timeout_secs", secs)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Timeout applied to the provider HTTP client.
    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.resilience.provider_timeout_secs)
    }

    /// Timeout applied to every dashboard request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.resilience.request_timeout_secs)
    }
}

/// Load provider settings from the process environment.
///
/// The API key is read but not required here; call
/// [`LlmSettings::validate`] to enforce it.
pub fn load_llm_settings() -> LlmSettings {
    llm_settings_from(|key| std::env::var(key).ok())
}

/// Build provider settings from an arbitrary variable lookup.
pub fn llm_settings_from<F>(lookup: F) -> LlmSettings
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

    let base_url = non_empty("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let model = non_empty("OPENAI_MODEL")
        .or_else(|| non_empty("LLM_MODEL"))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let api_key = non_empty("OPENAI_API_KEY").or_else(|| non_empty("LLM_API_KEY"));

    let mut provider = Provider::detect_from_url(&base_url);

    let deployment_name = non_empty("AZURE_DEPLOYMENT_NAME");
    let api_version = non_empty("AZURE_API_VERSION");

    if let Provider::AzureOpenAI { .. } = &provider {
        provider = Provider::AzureOpenAI {
            deployment_name: deployment_name.clone().unwrap_or_else(|| model.clone()),
            api_version: api_version
                .clone()
                .unwrap_or_else(|| "2024-08-01-preview".to_string()),
        };
    }

    LlmSettings {
        base_url,
        api_key,
        model,
        provider,
        request_timeout: Duration::from_secs(120),
    }
}
