mod echo;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tgpoll_client::{BotApi, CommandParam, PollingClient};
use tgpoll_core::config::{self, LoggingConfig};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tgpoll", version, about = "Long-polling Telegram Bot API client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Bot token. Overrides the config file.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll for updates and echo text messages back.
    Run,
    /// Send a single command, e.g. `send sendMessage chat_id=1 text=hi`.
    Send {
        /// Bot API method name.
        command: String,
        /// Parameters as `key=value`.
        params: Vec<String>,
    },
    /// Show the bot identity behind the token.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.config)?;
    if let Some(token) = cli.token {
        cfg.telegram.bot_token = token;
    }

    let _log_guard = init_logging(&cfg.logging)?;

    cfg.telegram.validate()?;

    match cli.command {
        Commands::Run => {
            let api = BotApi::from_config(&cfg.telegram);
            let me = api.get_me().await?;
            info!("Running as {} (id {})", me.display_name(), me.id);

            let client = Arc::new(
                PollingClient::with_api(api.clone(), echo::EchoHandler::new(api))
                    .with_settings(cfg.telegram.poll_settings()),
            );
            let poller = client.clone();
            let task = tokio::spawn(async move { poller.start().await });

            tokio::signal::ctrl_c().await?;
            info!("Ctrl-C received, stopping...");
            client.stop()?;
            task.await??;
        }
        Commands::Send { command, params } => {
            let params = params
                .iter()
                .map(String::as_str)
                .map(parse_param)
                .collect::<anyhow::Result<Vec<_>>>()?;
            let api = BotApi::from_config(&cfg.telegram);
            let result = api.send_command(&command, params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Status => {
            let api = BotApi::from_config(&cfg.telegram);
            let me = api.get_me().await?;
            println!("tgpoll status\n");
            println!("Config: {}", cli.config);
            println!("API base: {}", cfg.telegram.api_base);
            println!("Bot: {} (id {})", me.display_name(), me.id);
        }
    }

    Ok(())
}

/// Parse `key=value`. Values that look like JSON are sent as such.
fn parse_param(raw: &str) -> anyhow::Result<(String, CommandParam)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid parameter '{raw}', expected key=value"))?;
    let param = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(v) => CommandParam::from(v),
        Err(_) => CommandParam::from(value),
    };
    Ok((key.to_string(), param))
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    if cfg.file.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        return Ok(None);
    }

    let path = std::path::Path::new(&cfg.file);
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("invalid log file path '{}'", cfg.file))?;
    std::fs::create_dir_all(dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}
