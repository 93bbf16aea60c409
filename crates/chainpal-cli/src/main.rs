use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;

use chainpal_agent::summarizer::ChatNamer;
use chainpal_agent::{AgentRuntime, ReplyPipeline};
use chainpal_core::config::Config;
use chainpal_core::store::{ChatExchange, ChatStore, JsonChatStore};
use chainpal_core::types::ChatTurn;
use chainpal_gateway::GatewayState;
use chainpal_market::MarketService;
use chainpal_providers::openai::OpenAiProvider;
use chainpal_providers::{Credentials, LlmProvider};
use chainpal_tools::{ToolContext, ToolRegistry};

mod logging;

#[derive(Parser)]
#[command(
    name = "chainpal",
    about = "Crypto chat assistant backend for the Solana ecosystem",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (default: 3011)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ask a single question and stream the reply to stdout
    Chat {
        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Save the exchange as a new chat owned by this wallet
        #[arg(long)]
        wallet: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value by dotted path
    Get { key: String },
    /// Check the configuration for problems
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    logging::init_logging(&config.logging.clone().unwrap_or_default(), cli.verbose);
    let config = Arc::new(config);

    match cli.command {
        Commands::Serve { port } => serve(config, port).await?,
        Commands::Chat { message, wallet } => chat(config, message, wallet).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(config.as_ref())?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => anyhow::bail!("No config value at '{key}'"),
            },
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                for error in &errors {
                    println!("error: {error}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("{} config error(s) in {}", errors.len(), config_path.display());
                }
                println!("Config OK: {}", config_path.display());
            }
        },
    }

    Ok(())
}

/// The configured LLM provider and its credentials.
fn build_provider(config: &Config) -> (Arc<dyn LlmProvider>, Credentials) {
    let provider = match config.first_provider() {
        Some(p) => OpenAiProvider::new(p.id.clone(), p.base_url.as_deref()),
        None => OpenAiProvider::openai(None),
    };
    let credentials = Credentials::from_api_key(config.provider_api_key());
    (Arc::new(provider), credentials)
}

fn build_runtime(
    config: Arc<Config>,
    provider: Arc<dyn LlmProvider>,
    credentials: Credentials,
) -> anyhow::Result<AgentRuntime> {
    let tools = Arc::new(ToolRegistry::with_builtin_tools());
    let tool_ctx = Arc::new(ToolContext::new(config.clone())?);
    tracing::debug!(tools = ?tools.list(), "Tool registry ready");
    Ok(AgentRuntime::new(provider, credentials, tools, tool_ctx, config))
}

async fn serve(config: Arc<Config>, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or_else(|| config.gateway_port());
    let (warnings, errors) = config.validate();
    for warning in warnings {
        tracing::warn!("{warning}");
    }
    if !errors.is_empty() {
        anyhow::bail!("invalid config: {}", errors.join("; "));
    }

    let (provider, credentials) = build_provider(&config);
    let runtime = build_runtime(config.clone(), provider.clone(), credentials.clone())?;
    let replies = ReplyPipeline::from_config(Arc::new(runtime), &config);
    let namer = ChatNamer::new(provider, credentials, config.summary_model());

    let store_dir = config.store_dir();
    tracing::info!(dir = %store_dir.display(), "Using chat store");
    let store = Arc::new(JsonChatStore::new(store_dir));
    let market = Arc::new(MarketService::from_config(&config)?);

    let state = GatewayState::new(config.clone(), replies, store, market).with_namer(namer);

    #[cfg(feature = "metrics")]
    let state = match chainpal_gateway::metrics::install_prometheus_recorder() {
        Ok(handle) => state.with_metrics(handle),
        Err(e) => {
            tracing::warn!(%e, "Failed to install metrics recorder");
            state
        }
    };

    tracing::info!("Starting Chainpal gateway on port {port}");
    chainpal_gateway::start_gateway(Arc::new(state), port).await
}

async fn chat(config: Arc<Config>, message: String, wallet: Option<String>) -> anyhow::Result<()> {
    let (provider, credentials) = build_provider(&config);
    let runtime = build_runtime(config.clone(), provider, credentials)?;
    let replies = ReplyPipeline::from_config(Arc::new(runtime), &config);

    let mut stream = replies.stream_reply(vec![ChatTurn::user(message.clone())])?;
    let mut answer = String::new();
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        stdout.write_all(chunk.as_bytes())?;
        stdout.flush()?;
        answer.push_str(&chunk);
    }
    println!();

    if let Some(wallet_id) = wallet {
        let store = JsonChatStore::new(config.store_dir());
        let uuid = uuid::Uuid::new_v4().to_string();
        let exchange = ChatExchange {
            uuid: uuid.clone(),
            name: None,
            question: message,
            answer,
        };
        store.save_exchange(&wallet_id, exchange).await?;
        tracing::info!(%uuid, %wallet_id, "Saved chat");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["chainpal", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080) }));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_chat_with_global_flags() {
        let cli = Cli::try_parse_from([
            "chainpal",
            "chat",
            "-m",
            "top tokens?",
            "--verbose",
            "--config",
            "/tmp/chainpal.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/tmp/chainpal.json"));
        match cli.command {
            Commands::Chat { message, wallet } => {
                assert_eq!(message, "top tokens?");
                assert!(wallet.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_chat_requires_message() {
        assert!(Cli::try_parse_from(["chainpal", "chat"]).is_err());
    }

    #[test]
    fn test_build_provider_uses_first_provider() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "models": {"providers": [{
                "id": "local",
                "base_url": "http://localhost:8000",
                "api_key": "sk-local"
            }]}
        }))
        .unwrap();
        let (provider, credentials) = build_provider(&config);
        assert_eq!(provider.id(), "local");
        assert!(matches!(credentials, Credentials::ApiKey { .. }));
    }
}
