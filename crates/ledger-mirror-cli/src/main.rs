//! ledger-mirror - command-line front end for the ledger mirror
//!
//! Each invocation runs one operation against the ledger node and the local
//! mirror, prints a single JSON object on stdout and logs to stderr.

mod config;
mod output;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ledger_mirror::gateway::NodeGateway;
use ledger_mirror::store::SqliteMirror;
use ledger_mirror::{CallContext, Coordinator, CoordinatorConfig, Gateway, MirrorError};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Command, Config, LogFormat};
use crate::output::{Failure, Output};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.log_format);

    match run(config).await {
        Ok(output) => {
            output.print();
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!("{}", failure);
            failure.print();
            ExitCode::from(failure.exit_code())
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ledger_mirror=info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(config: Config) -> Result<Output, Failure> {
    config.validate()?;

    let gateway = NodeGateway::connect(config.gateway_config()?)
        .context("configuring ledger gateway")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?config.command,
        db = %config.db_path.display(),
        "ledger-mirror starting"
    );

    execute(
        gateway,
        &config.db_path,
        config.coordinator_config(),
        config.command,
    )
    .await
}

/// Run one command. `get` and `set` only talk to the ledger and never open
/// the mirror database.
async fn execute<G: Gateway>(
    gateway: G,
    db_path: &Path,
    config: CoordinatorConfig,
    command: Command,
) -> Result<Output, Failure> {
    let output = match command {
        Command::Get => {
            let coordinator = Coordinator::new(gateway, (), config);
            Output::Value(coordinator.read(&interruptible(&coordinator)).await?)
        }
        Command::Set { value } => {
            let coordinator = Coordinator::new(gateway, (), config);
            Output::TxHash(
                coordinator
                    .write(&interruptible(&coordinator), &value)
                    .await?,
            )
        }
        command => {
            let mirror = open_mirror(db_path)?;
            let coordinator = Coordinator::new(gateway, mirror, config);
            let ctx = interruptible(&coordinator);

            let init = coordinator.initialize(&ctx).await?;
            match command {
                Command::Sync => Output::Synced(coordinator.sync(&ctx).await?),
                Command::Check => Output::Equal(coordinator.check(&ctx).await?),
                _ => Output::Initialized(init),
            }
        }
    };
    Ok(output)
}

fn open_mirror(path: &Path) -> Result<SqliteMirror, MirrorError> {
    SqliteMirror::open(path).map_err(|e| {
        error!(db = %path.display(), error = %e, "cannot open mirror");
        MirrorError::from(e)
    })
}

/// Operation context that Ctrl-C cancels.
fn interruptible<G: Gateway, M>(coordinator: &Coordinator<G, M>) -> CallContext {
    let ctx = coordinator.context();
    cancel_on_interrupt(&ctx);
    ctx
}

/// Cancel in-flight calls on Ctrl-C.
fn cancel_on_interrupt(ctx: &CallContext) {
    let token = ctx.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received interrupt, cancelling");
            token.cancel();
        }
    });
}
