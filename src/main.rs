use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use knox_spark_submit::config::overrides::ConfigOverrides;
use knox_spark_submit::config::Config;
use knox_spark_submit::gateway::transport::ReqwestTransport;
use knox_spark_submit::orchestrator::JobSubmitter;

/// Submit a Spark application to YARN through an Apache Knox gateway
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON config file, command line options and environment variables take precedence
    #[arg(long, env = "KNOX_SUBMIT_CONFIG")]
    config: Option<PathBuf>,

    /// Check the artifacts and print the submission document, without registering an application
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    options: ConfigOverrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::load(args.config.as_deref(), args.options)
        .map_err(|err| {
            error!("Invalid configuration: {err}");
            err
        })
        .context("Invalid configuration")?;
    info!("Gateway: {}", config.gateway.url);

    let transport = Arc::new(ReqwestTransport::new(&config.gateway).map_err(|err| {
        error!("Can't build HTTP client: {err}");
        err
    })?);
    let submitter = JobSubmitter::new(transport, config);

    if args.dry_run {
        let document = submitter.dry_run().await.map_err(|err| {
            error!("Dry run failed: {err}");
            err
        })?;
        println!("{document}");
        return Ok(());
    }

    let outcome = submitter.run().await?;
    info!("Application {} is {} after {} polls", outcome.app_id, outcome.state, outcome.polls);
    Ok(())
}
