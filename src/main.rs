use clap::Parser;
use anyhow::Result;
use tracing::{info, error};

mod api;
mod cli;
mod config;
mod forms;
mod records;
mod resources;
mod tui;

use api::ApiClient;
use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "shikkhaloy_admin=info");
    }

    let config = Config::from_env()?;
    config.validate()?;

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let file_appender = tracing_appender::rolling::never(&config.log_dir, "shikkhaloy-admin.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env())
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            info!("Launching admin console against {}", config.base_url);

            match tui::run_tui(config).await {
                Ok(_) => info!("Console exited successfully"),
                Err(e) => error!("Console failed: {}", e),
            }
        }

        Commands::Check => {
            info!("Probing backend at {}", config.base_url);

            let client = api::HttpApiClient::new(&config)?;
            let sessions = client.fetch_list("/sessions").await?;
            println!("Backend reachable - {} session(s) configured:", sessions.len());
            for session in &sessions {
                println!(
                    "  {} ({} to {})",
                    records::cell_text(session, "name"),
                    records::cell_text(session, "startDate"),
                    records::cell_text(session, "endDate")
                );
            }
        }

        Commands::Resources => {
            for spec in resources::catalog() {
                println!("{:<20} {:<20} {}", spec.key, spec.path, spec.description);
            }
        }
    }

    Ok(())
}
