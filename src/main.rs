use clap::{CommandFactory, Parser};
use idmef_connector::logging::init_logging;
use idmef_connector::{Config, Connector};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

/// Maps a Splunk alert payload read from stdin to an IDMEFv2 alert and sends it.
#[derive(Parser)]
#[command(name = "idmef-connector", version)]
struct Cli {
    /// Process the alert payload on stdin (set by Splunk when the alert fires).
    #[arg(long)]
    execute: bool,

    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, env = "IDMEF_CONNECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// JSON template replacing the built-in alert template.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Print the alert instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if !cli.execute {
        eprintln!("{}", Cli::command().render_usage());
        anyhow::bail!("nothing to do: run with --execute and the alert payload on stdin");
    }

    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    if let Err(e) = run(&cli, config).await {
        log::error!("Error occurred: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let payload: Value = serde_json::from_str(&input)?;
    log::info!("Received payload: {}", payload);

    let connector = match &cli.template {
        Some(path) => Connector::with_template_file(config, path)?,
        None => Connector::new(config)?,
    };

    let alert = connector.process(payload, cli.dry_run).await?;
    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&alert.message)?);
    }
    Ok(())
}
