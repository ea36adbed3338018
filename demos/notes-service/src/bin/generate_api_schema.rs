//! Offline OpenAPI generation for notes-service. Exits non-zero on
//! configuration conflicts or (with `--check`) schema drift.

use api_kit::{ApiConfig, SchemaCommand};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let command = SchemaCommand::parse();
    let config = ApiConfig::from_env()?;
    command.run(&notes_service::routes()?, &config)?;
    Ok(())
}
