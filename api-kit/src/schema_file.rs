//! Writing the generated OpenAPI document to disk and checking it for
//! drift, plus the offline generation command services embed in a binary.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::openapi;
use crate::routes::RouteTable;

fn output_path(config: &ApiConfig) -> Result<PathBuf> {
    config.schema_path.clone().ok_or_else(|| {
        Error::Config(
            "API_SCHEMA_PATH must be set in order to write the api spec to a file".to_string(),
        )
    })
}

/// Generates the OpenAPI document and writes it to the configured path,
/// creating parent directories as needed.
pub fn write_schema_file(table: &RouteTable, config: &ApiConfig) -> Result<()> {
    write_schema_file_to(table, config, &output_path(config)?)
}

pub fn write_schema_file_to(table: &RouteTable, config: &ApiConfig, path: &Path) -> Result<()> {
    let spec = openapi::spec_json(table, config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, spec)?;
    tracing::info!(path = %path.display(), "wrote OpenAPI schema");
    Ok(())
}

/// Regenerates the document and compares it with the file on disk.
pub fn check_schema_file(table: &RouteTable, config: &ApiConfig) -> Result<()> {
    check_schema_file_at(table, config, &output_path(config)?)
}

pub fn check_schema_file_at(table: &RouteTable, config: &ApiConfig, path: &Path) -> Result<()> {
    let expected = openapi::spec_json(table, config)?;
    let actual = fs::read_to_string(path)?;
    if actual != expected {
        return Err(Error::SchemaOutOfSync);
    }
    Ok(())
}

/// Offline schema generation command. Embed it in a service binary and call
/// [`SchemaCommand::run`] with the service's route table; the process should
/// exit non-zero when `run` fails (configuration conflicts, drift).
#[derive(Debug, Parser)]
#[command(about = "Generate the OpenAPI schema for the service")]
pub struct SchemaCommand {
    /// Check that the existing schema matches the code instead of writing.
    #[arg(long)]
    pub check: bool,

    /// Write to (or check against) this path instead of the configured one.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl SchemaCommand {
    pub fn run(&self, table: &RouteTable, config: &ApiConfig) -> Result<()> {
        let path = match &self.output {
            Some(path) => path.clone(),
            None => output_path(config)?,
        };
        if self.check {
            check_schema_file_at(table, config, &path)
        } else {
            write_schema_file_to(table, config, &path)
        }
    }
}
