mod app;
mod config;
mod filter;
mod profile;
mod state;
mod tui;
mod ui;
mod view;

use std::{fs::OpenOptions, io, path::Path, sync::Arc};

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = config::Config::parse();
    init_tracing(config.log_file.as_deref())?;

    let app = app::StatescopeApp::bootstrap(config).await?;
    app.run().await
}

/// Logs default to stderr: the alternate screen owns stdout while the
/// dashboard runs. `--log-file` appends to a file instead.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("statescope=info,statescope::app=debug"))?;

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .compact()
                .with_writer(Arc::new(file))
                .try_init()
                .map_err(|err| eyre!(err))?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .with_writer(io::stderr)
                .try_init()
                .map_err(|err| eyre!(err))?;
        }
    }

    Ok(())
}
