mod commands;
mod gateway;
mod i18n;

use clap::{Parser, Subcommand};
use pomni_channels::telegram::TelegramChannel;
use pomni_core::{
    config::{self, shellexpand},
    context::Context,
    traits::{Channel, Provider},
};
use pomni_memory::Store;
use pomni_providers::{openai::OpenAiProvider, openrouter::OpenRouterProvider};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pomni",
    version,
    about = "Pomni — personal Telegram assistant for reminders, daily tasks, and questions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration, provider availability, and pending tasks.
    Status,
    /// Send a one-shot question to the configured provider.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Start => {
            let provider = build_provider(&cfg)?;
            if !provider.is_available().await {
                warn!(
                    "provider '{}' did not answer the availability check; continuing",
                    provider.name()
                );
            }

            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. \
                             Set it in config.toml or the BOT_TOKEN env var."
                        );
                    }
                    channels.insert(
                        "telegram".to_string(),
                        Arc::new(TelegramChannel::new(tg.clone())),
                    );
                }
            }
            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable [channel.telegram] in config.toml.");
            }

            if cfg.scheduler.enabled && !cfg.scheduler.window_covered() {
                warn!(
                    "scheduler poll interval ({}s) is longer than the daily window ({} min); \
                     some days may get no announcement",
                    cfg.scheduler.poll_interval_secs, cfg.scheduler.window_minutes
                );
            }

            let memory = Store::new(&cfg.memory).await?;

            println!("{} — Starting bot...", cfg.pomni.name);
            let gw = Arc::new(gateway::Gateway::new(provider, channels, memory, &cfg));
            gw.run().await?;
        }
        Commands::Status => {
            println!("{} — Status Check\n", cfg.pomni.name);
            println!("Config: {}", cli.config);
            println!("Database: {}", shellexpand(&cfg.memory.db_path));
            println!("Default provider: {}", cfg.provider.default);

            match build_provider(&cfg) {
                Ok(provider) => println!(
                    "  {}: {}",
                    provider.name(),
                    if provider.is_available().await {
                        "available"
                    } else {
                        "unreachable"
                    }
                ),
                Err(e) => println!("  provider: {e}"),
            }

            match cfg.channel.telegram {
                Some(ref tg) => println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                ),
                None => println!("  telegram: not configured"),
            }

            println!(
                "  scheduler: {} (every {}s, daily check {:02}:00 +{} min)",
                if cfg.scheduler.enabled {
                    "enabled"
                } else {
                    "disabled"
                },
                cfg.scheduler.poll_interval_secs,
                cfg.scheduler.daily_check_hour,
                cfg.scheduler.window_minutes
            );

            let memory = Store::new(&cfg.memory).await?;
            let (reminders, recurring) = memory.count_pending().await?;
            println!("\nPending reminders: {reminders}");
            println!("Recurring tasks: {recurring}");
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: pomni ask <message>");
            }

            let prompt = message.join(" ");
            let provider = build_provider(&cfg)?;
            let context = Context::with_system(&cfg.router.system_prompt, &prompt);
            let limit = Duration::from_secs(cfg.provider.timeout_secs);
            let answer = gateway::complete_within(provider.as_ref(), &context, limit).await?;
            println!("{answer}");
        }
    }

    Ok(())
}

/// Log to stderr and to a daily-rolling file under `{data_dir}/logs`.
///
/// `RUST_LOG` wins over `pomni.log_level`. The returned guard flushes the
/// file writer on drop and must live as long as the process.
fn init_logging(cfg: &config::Config) -> anyhow::Result<WorkerGuard> {
    let log_dir = PathBuf::from(shellexpand(&cfg.pomni.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "pomni.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.pomni.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(guard)
}

/// Build the configured provider.
fn build_provider(cfg: &config::Config) -> anyhow::Result<Arc<dyn Provider>> {
    match cfg.provider.default.as_str() {
        "openrouter" => {
            let or = cfg.provider.openrouter.clone().unwrap_or_default();
            if or.api_key.is_empty() {
                anyhow::bail!(
                    "OpenRouter api_key is empty. \
                     Set it in config.toml or the OPENROUTER_API_KEY env var."
                );
            }
            Ok(Arc::new(OpenRouterProvider::from_config(or.api_key, or.model)))
        }
        "openai" => {
            let Some(oa) = cfg.provider.openai.clone() else {
                anyhow::bail!("provider 'openai' selected but [provider.openai] is missing");
            };
            Ok(Arc::new(OpenAiProvider::from_config(
                oa.base_url,
                oa.api_key,
                oa.model,
            )))
        }
        other => anyhow::bail!("unsupported provider: {other}"),
    }
}
