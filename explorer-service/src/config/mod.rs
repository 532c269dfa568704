use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_SERVICE_NAME: &str = "cybersafe.cc";
const DEFAULT_USER_AGENT: &str = "cybersafe.cc/1.0";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub common: core_config::Config,
    /// Name reported by the health endpoint.
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    /// Directory with the browser UI; unset disables static file serving.
    pub static_dir: Option<PathBuf>,
    pub proxy: ProxyConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Default `User-Agent`, overridable per request by caller headers.
    pub user_agent: String,
    /// Unset means the outbound client imposes no timeout of its own.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_version: String,
    pub timeout_secs: Option<u64>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            timeout_secs: None,
        }
    }
}

impl AssistantConfig {
    /// The credential, if one is provisioned and non-empty.
    pub fn credential(&self) -> Option<&Secret<String>> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            static_dir: None,
            proxy: ProxyConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(ExplorerConfig {
            common,
            service_name: get_env("SERVICE_NAME", DEFAULT_SERVICE_NAME),
            log_level: get_env("LOG_LEVEL", "info"),
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            static_dir: optional_env("STATIC_DIR").map(PathBuf::from),
            proxy: ProxyConfig {
                user_agent: get_env("PROXY_USER_AGENT", DEFAULT_USER_AGENT),
                timeout_secs: parse_optional_env("PROXY_TIMEOUT_SECS")?,
            },
            assistant: AssistantConfig {
                api_key: optional_env("ANTHROPIC_API_KEY").map(Secret::new),
                base_url: get_env("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
                model: get_env("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
                max_tokens: parse_optional_env("ANTHROPIC_MAX_TOKENS")?
                    .unwrap_or(DEFAULT_MAX_TOKENS),
                api_version: get_env("ANTHROPIC_VERSION", DEFAULT_ANTHROPIC_VERSION),
                timeout_secs: parse_optional_env("ANTHROPIC_TIMEOUT_SECS")?,
            },
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}

fn parse_optional_env<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
            })
        })
        .transpose()
}
