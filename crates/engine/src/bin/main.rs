// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mssql_complete::{EngineConfig, SERVER_NAME, Session, serve};
use mssql_complete_catalog::SchemaCache;

/// SQL Server completion source for editor plugins
#[derive(Parser, Debug)]
#[command(name = "mssql-complete")]
#[command(about = "SQL Server completion engine speaking NDJSON over stdio", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file; host variables override its values
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log filter (overrides RUST_LOG), e.g. `debug` or `mssql_complete=trace`
    #[arg(long, value_name = "FILTER", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer completion requests on stdin/stdout (default)
    Serve,

    /// Run the schema query once and print the tables it returned
    Fetch {
        /// Host variables as a JSON object, e.g. '{"mssql#server":"localhost"}'
        #[arg(long, value_name = "JSON")]
        vars: Option<String>,
    },
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{}'", directives))?,
        None => EnvFilter::from_default_env(),
    };

    // stdout carries the protocol
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

async fn run_serve(config: EngineConfig) -> Result<()> {
    tracing::info!("Starting {} server", SERVER_NAME);

    let mut session = Session::new(config);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&mut session, stdin, stdout).await?;
    Ok(())
}

async fn run_fetch(mut config: EngineConfig, vars: Option<String>) -> Result<()> {
    if let Some(raw) = vars {
        let vars: serde_json::Value =
            serde_json::from_str(&raw).context("--vars is not valid JSON")?;
        config.merge_host_vars(&vars)?;
    }

    let fetcher = config.build_fetcher();
    tracing::info!(source = %fetcher.describe(), "Fetching schema");

    let mut cache = SchemaCache::new();
    let snapshot = cache.ensure_loaded(fetcher.as_ref()).await?;
    for table in snapshot.tables() {
        println!(
            "{}\t{}\t{} columns",
            table.name,
            table.kind,
            table.columns.len()
        );
    }
    tracing::info!(tables = snapshot.len(), "Schema fetched");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config = load_config(cli.config.as_ref())?;
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_serve(config).await,
        Command::Fetch { vars } => run_fetch(config, vars).await,
    }
}
