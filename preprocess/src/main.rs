use anyhow::{Context, Result};
use preprocess::{common::Cancellation, config::Config, Command};
use std::{env, path::PathBuf, sync::Arc};
use structopt::StructOpt;
use tracing::{trace_span, warn, Instrument};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

#[derive(Debug, Clone, StructOpt)]
/// Preprocess ball-track datasets
struct Args {
    #[structopt(long, default_value = "preprocess.json5")]
    /// configuration file
    pub config_file: PathBuf,
    #[structopt(subcommand)]
    pub command: SubCommand,
}

#[derive(Debug, Clone, StructOpt)]
enum SubCommand {
    /// write normalized frame tensors
    Normalize,
    /// write normalized label vectors
    Align,
    /// index the artifacts and report the dataset size
    Index,
    /// save a train/validation partition
    Split,
    /// remove persisted artifacts
    Clean,
    /// normalize, align and split
    All,
}

impl From<SubCommand> for Command {
    fn from(command: SubCommand) -> Self {
        match command {
            SubCommand::Normalize => Command::Normalize,
            SubCommand::Align => Command::Align,
            SubCommand::Index => Command::Index,
            SubCommand::Split => Command::Split,
            SubCommand::Clean => Command::Clean,
            SubCommand::All => Command::All,
        }
    }
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    let Args {
        config_file,
        command,
    } = Args::from_args();
    let config = Arc::new(
        Config::open(&config_file)
            .with_context(|| format!("failed to load config file '{}'", config_file.display()))?,
    );

    // stop scheduling work on ctrl-c
    let cancel = Cancellation::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, waiting for running items to finish");
                cancel.cancel();
            }
        }
    });

    // start preprocessing program
    preprocess::start(config, command.into(), cancel)
        .instrument(trace_span!("preprocess"))
        .await?;

    Ok(())
}
