use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actions;
mod command;
mod credentials;
mod ecr;
mod engine;
mod error;
mod inputs;
mod reconcile;
mod workflow;

#[cfg(test)]
mod fakes;

use credentials::EcrCredentialsProvider;
use ecr::AwsCliRegistry;
use engine::CliContainerEngine;

/// Push a local image to ECR (keeping alias tags in sync) or pull one from it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    inputs: inputs::Inputs,

    /// Container CLI to use (docker or podman)
    #[arg(long, env = "INPUT_CONTAINER-CLI", default_value = "docker")]
    container_cli: String,

    /// AWS CLI executable used for registry lookups and re-tagging
    #[arg(long, env = "INPUT_AWS-CLI", default_value = "aws")]
    aws_cli: String,
}

async fn execute(cli: Cli) -> Result<()> {
    debug!("Running with {:?}", cli);

    let credentials = EcrCredentialsProvider::from_env().await;
    let engine = CliContainerEngine::new(cli.container_cli);
    let registry = AwsCliRegistry::new(cli.aws_cli);

    workflow::run(&cli.inputs, &credentials, &engine, &registry)
        .await
        .with_context(|| format!("Failed to {} {}", cli.inputs.action, cli.inputs.image))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing for all commands
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            println!("{}", actions::error_command(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}
