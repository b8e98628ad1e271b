mod cli;
mod client;
mod credentials;
mod error;
mod handler;
mod health;
mod metadata;
mod output;
mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::error::ServiceResult;
use crate::handler::RequestHandler;
use crate::output::TerminalSink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    match cli.command.clone() {
        Command::Send(args) => {
            let text = match args.text {
                Some(text) => text,
                None => prompt_text().await?,
            };
            build_handler(&cli)?.send(text).await;
        }
        Command::Interactive => {
            tracing::info!("Interactive mode: empty line or {} to quit", handler::QUIT);
            build_handler(&cli)?.run_session(prompt_text).await?;
        }
        Command::Health(args) => {
            let client = cli.connection.client()?;
            let base_url = client.base_url().to_string();
            let started = Instant::now();
            let result = tokio::task::spawn_blocking(move || client.health()).await?;
            println!(
                "{}",
                health::health_summary(&base_url, &result, started.elapsed(), args.verbose)
            );
        }
        Command::Status => println!("{}", cli.connection.describe()?),
        Command::Version => println!("{} {}", metadata::PKG_NAME, metadata::PKG_VERSION),
    }

    Ok(())
}

fn build_handler(cli: &Cli) -> ServiceResult<RequestHandler> {
    Ok(RequestHandler::new(
        cli.connection.client()?,
        cli.connection.credential_store()?,
        Arc::new(TerminalSink),
    ))
}

async fn prompt_text() -> ServiceResult<String> {
    let text = tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt("Message")
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| std::io::Error::other(format!("prompt task failed: {e}")))??;
    Ok(text)
}
