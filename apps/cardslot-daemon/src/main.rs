use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod config;
mod routes;
mod state;

#[derive(Parser)]
#[command(name = "cardslot-daemon")]
#[command(about = "Voice-driven slot dispatcher for the motorized card holder")]
struct Args {
    /// YAML config file; defaults apply when it does not exist
    #[arg(long, default_value = "cardslot.yaml")]
    config: PathBuf,

    /// Listen address, overrides the config file
    #[arg(long)]
    bind: Option<String>,

    /// Dispatch one text command, print the JSON result and exit
    #[arg(long)]
    once: Option<String>,

    /// Parse --once text as a multi-item command
    #[arg(long, requires = "once")]
    batch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    let mut cfg = config::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }

    let state = state::build(&cfg).await?;

    if let Some(text) = args.once {
        let runner = state.session.runner();
        let result = if args.batch {
            runner.submit_batch(text).await
        } else {
            runner.submit(text).await
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    info!(bind = %cfg.bind, "cardslot-daemon listening");
    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("cardslot-daemon shutting down");
    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
