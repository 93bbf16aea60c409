//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChainpalError, Result};

/// Top-level Chainpal configuration.
///
/// Loaded once at process start and shared behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock: Option<MockConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tool_iterations: Option<u32>,

    /// Tool results forwarded to the client per reply. 0 disables forwarding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_num_of_tools: Option<usize>,

    /// Replaces the identity paragraph of the system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Model used to title new chats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<ProviderConfig>>,
}

/// Configuration for a single OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl ProviderConfig {
    /// Resolve the API key: check `api_key` field first, then `api_key_env` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tool names whose results never reach the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_tools: Option<Vec<String>>,

    /// Base URL of the You.com search API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_api_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_timeout_secs: Option<u64>,
}

impl ToolsConfig {
    pub fn resolve_search_api_key(&self) -> Option<String> {
        let env = self
            .search_api_key_env
            .clone()
            .or_else(|| Some(DEFAULT_SEARCH_KEY_ENV.to_string()));
        resolve_secret_field(&self.search_api_key, &env)
    }
}

/// One canned reply. `input` must match the latest turn exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_mock_responses")]
    pub responses: Vec<MockResponse>,

    #[serde(default = "default_word_delay_ms")]
    pub word_delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            responses: default_mock_responses(),
            word_delay_ms: default_word_delay_ms(),
        }
    }
}

fn default_mock_responses() -> Vec<MockResponse> {
    vec![MockResponse {
        input: "  how to buy bitcoin".into(),
        output: "Pick a reputable exchange, fund your account and place a buy order for BTC."
            .into(),
    }]
}

fn default_word_delay_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitquery_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipfs_gateway: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Concurrent IPFS metadata fetches per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_concurrency: Option<usize>,
}

impl MarketConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        let env = self
            .api_key_env
            .clone()
            .or_else(|| Some(DEFAULT_BITQUERY_KEY_ENV.to_string()));
        resolve_secret_field(&self.api_key, &env)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "chainpal_market=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

pub const DEFAULT_PORT: u16 = 3011;
pub const DEFAULT_PROVIDER_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_SEARCH_KEY_ENV: &str = "YOUCOM_API_KEY";
pub const DEFAULT_BITQUERY_KEY_ENV: &str = "BITQUERY_API_KEY";

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ChainpalError::Config(e.to_string()))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let substituted = substitute_env_vars(&raw)?;
        json5::from_str(&substituted).map_err(|e| ChainpalError::Config(e.to_string()))
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    pub fn model(&self) -> String {
        self.agent
            .as_ref()
            .and_then(|a| a.model.clone())
            .or_else(|| self.first_provider().and_then(|p| p.default_model.clone()))
            .unwrap_or_else(|| "gpt-4o".to_string())
    }

    pub fn temperature(&self) -> f64 {
        self.agent
            .as_ref()
            .and_then(|a| a.temperature)
            .unwrap_or(0.0)
    }

    pub fn max_tokens(&self) -> u32 {
        self.agent.as_ref().and_then(|a| a.max_tokens).unwrap_or(4096)
    }

    pub fn max_tool_iterations(&self) -> u32 {
        self.agent
            .as_ref()
            .and_then(|a| a.max_tool_iterations)
            .unwrap_or(8)
    }

    pub fn max_num_of_tools(&self) -> usize {
        self.agent
            .as_ref()
            .and_then(|a| a.max_num_of_tools)
            .unwrap_or(1)
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.agent.as_ref().and_then(|a| a.system_prompt.as_deref())
    }

    pub fn summary_model(&self) -> String {
        self.agent
            .as_ref()
            .and_then(|a| a.summary_model.clone())
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    pub fn research_tools(&self) -> Vec<String> {
        self.tools
            .as_ref()
            .and_then(|t| t.research_tools.clone())
            .unwrap_or_else(|| vec!["WebSearch".to_string()])
    }

    pub fn search_api_url(&self) -> String {
        self.tools
            .as_ref()
            .and_then(|t| t.search_api_url.clone())
            .unwrap_or_else(|| "https://api.ydc-index.io".to_string())
    }

    pub fn search_api_key(&self) -> Option<String> {
        self.tools
            .clone()
            .unwrap_or_default()
            .resolve_search_api_key()
    }

    pub fn search_timeout_secs(&self) -> u64 {
        self.tools
            .as_ref()
            .and_then(|t| t.search_timeout_secs)
            .unwrap_or(30)
    }

    pub fn mock(&self) -> MockConfig {
        self.mock.clone().unwrap_or_default()
    }

    pub fn bitquery_url(&self) -> String {
        self.market
            .as_ref()
            .and_then(|m| m.bitquery_url.clone())
            .unwrap_or_else(|| "https://streaming.bitquery.io/eap".to_string())
    }

    pub fn bitquery_api_key(&self) -> Option<String> {
        self.market.clone().unwrap_or_default().resolve_api_key()
    }

    pub fn ipfs_gateway(&self) -> String {
        self.market
            .as_ref()
            .and_then(|m| m.ipfs_gateway.clone())
            .unwrap_or_else(|| "https://ipfs.io/ipfs/".to_string())
    }

    pub fn market_timeout_secs(&self) -> u64 {
        self.market
            .as_ref()
            .and_then(|m| m.timeout_secs)
            .unwrap_or(30)
    }

    pub fn metadata_concurrency(&self) -> usize {
        self.market
            .as_ref()
            .and_then(|m| m.metadata_concurrency)
            .unwrap_or(8)
            .max(1)
    }

    /// Directory holding users, chats, and chat histories.
    pub fn store_dir(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.dir.as_ref())
            .map(|d| PathBuf::from(shellexpand::tilde(d).as_ref()))
            .unwrap_or_else(|| data_dir().join("store"))
    }

    pub fn gateway_port(&self) -> u16 {
        self.gateway.as_ref().map(|g| g.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn gateway_bind(&self) -> String {
        self.gateway
            .as_ref()
            .and_then(|g| g.bind.clone())
            .unwrap_or_else(|| "0.0.0.0".to_string())
    }

    /// Get the first provider config.
    pub fn first_provider(&self) -> Option<&ProviderConfig> {
        self.models
            .as_ref()
            .and_then(|m| m.providers.as_ref())
            .and_then(|p| p.first())
    }

    /// API key of the first provider, falling back to `OPENAI_API_KEY`.
    pub fn provider_api_key(&self) -> Option<String> {
        match self.first_provider() {
            Some(p) => p.resolve_api_key().or_else(|| {
                resolve_secret_field(&None, &Some(DEFAULT_PROVIDER_KEY_ENV.to_string()))
            }),
            None => resolve_secret_field(&None, &Some(DEFAULT_PROVIDER_KEY_ENV.to_string())),
        }
    }

    /// Get a config value by dotted path (e.g. "gateway.port", "agent.model").
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if self.provider_api_key().is_none() {
            let id = self
                .first_provider()
                .map(|p| p.id.as_str())
                .unwrap_or("openai");
            warnings.push(format!("Provider '{id}' has no API key configured"));
        }

        if self.bitquery_api_key().is_none() {
            warnings.push("Bitquery API key is not configured; market endpoints will fail".into());
        }

        if self.search_api_key().is_none() {
            warnings.push("Search API key is not configured; WebSearch will fail".into());
        }

        if let Some(gw) = &self.gateway {
            if gw.port == 0 {
                errors.push("Gateway port cannot be 0".to_string());
            }
        }

        (warnings, errors)
    }
}

/// Base directory for Chainpal data: `~/.chainpal/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chainpal")
}
