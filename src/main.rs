use std::path::PathBuf;

use clap::Parser;
use marketpulse::config::Config;
use marketpulse::server;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "marketpulse", version, about)]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the listen address from the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = if args.config.exists() {
        match Config::load(&args.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    config.init_logging();
    info!("marketpulse starting");

    tokio::select! {
        result = server::run(config) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("marketpulse stopped");
}
