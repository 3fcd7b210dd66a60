mod api;
mod engine;
mod i18n;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use usher_channels::WhatsAppTransport;
use usher_core::config;
use usher_core::traits::{Directory, Generator, Transport};
use usher_directory::{HttpDirectory, StaticDirectory};
use usher_providers::OpenAiGenerator;
use usher_sessions::{IdempotencyCache, SessionStore};

#[derive(Parser)]
#[command(
    name = "usher",
    version,
    about = "Usher — multi-tenant business-messaging conversation engine"
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
    /// Start the conversation engine.
    Start,
    /// Check configuration and collaborator availability.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    let _log_guard = init_tracing(&cfg.log);

    match cli.command {
        Commands::Start => {
            if cfg.engine.queue_capacity == 0 {
                anyhow::bail!("engine.queue_capacity must be at least 1");
            }
            if cfg.engine.page_size == 0 {
                anyhow::bail!("engine.page_size must be at least 1");
            }

            let transport: Arc<dyn Transport> =
                Arc::new(WhatsAppTransport::from_config(&cfg.transport));
            if !transport.is_configured() {
                tracing::warn!("transport credentials missing, outbound messages are log-only");
            }

            let generator: Arc<dyn Generator> =
                Arc::new(OpenAiGenerator::from_config(&cfg.generation));
            if !generator.is_configured() {
                tracing::warn!("generation api key missing, replies will fall back to apologies");
            }

            let directory: Arc<dyn Directory> = if cfg.directory.base_url.is_empty() {
                if cfg.directory.businesses.is_empty() {
                    tracing::warn!("directory is empty, users will have nothing to select");
                }
                Arc::new(StaticDirectory::new(cfg.directory.businesses.clone()))
            } else {
                Arc::new(HttpDirectory::from_config(&cfg.directory))
            };

            let store = Arc::new(SessionStore::new());
            let dedup = Arc::new(IdempotencyCache::new(
                Duration::from_secs(cfg.engine.seen_window_secs),
                Duration::from_secs(cfg.engine.reply_window_secs),
            ));

            println!("Usher — starting conversation engine...");
            let engine = Arc::new(engine::Engine::new(
                cfg, store, dedup, directory, transport, generator,
            ));
            engine.run().await?;
        }
        Commands::Status => {
            println!("Usher — Status Check\n");
            println!("Config: {}", cli.config);
            println!("API: {}:{}", cfg.api.host, cfg.api.port);
            println!();

            let transport = WhatsAppTransport::from_config(&cfg.transport);
            println!(
                "  transport ({}): {}",
                transport.name(),
                if transport.is_configured() {
                    "configured"
                } else {
                    "mock mode, no credentials"
                }
            );

            let generator = OpenAiGenerator::from_config(&cfg.generation);
            if !generator.is_configured() {
                println!("  generator ({}): no api key", generator.name());
            } else if generator.is_available().await {
                println!("  generator ({}): available", generator.name());
            } else {
                println!(
                    "  generator ({}): configured but unreachable",
                    generator.name()
                );
            }

            if cfg.directory.base_url.is_empty() {
                println!(
                    "  directory: static, {} businesses",
                    cfg.directory.businesses.len()
                );
            } else {
                let directory = HttpDirectory::from_config(&cfg.directory);
                match directory.list().await {
                    Ok(businesses) => println!(
                        "  directory: {} reachable, {} businesses",
                        cfg.directory.base_url,
                        businesses.len()
                    ),
                    Err(e) => println!(
                        "  directory: {} unreachable ({e})",
                        cfg.directory.base_url
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Initialize tracing to stdout, or to daily-rolling files when a log
/// directory is configured. The returned guard must stay alive for the
/// file writer to flush.
fn init_tracing(log: &config::LogConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if log.dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(config::shellexpand(&log.dir), "usher.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
