use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod progress;

use config::load_config;

/// voxmod — manage speech-to-text customization models from the terminal
#[derive(Debug, Parser)]
#[command(name = "voxmod", version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Service base URL (overrides the configured value).
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    /// Service API key (overrides the configured value).
    #[arg(long, global = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Path to a custom configuration file (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log format: "pretty" (default) or "json".
    #[arg(long, global = true, default_value = "pretty", value_name = "FORMAT")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a model, upload a corpus, and train it end to end.
    Train {
        /// Name of the new model.
        #[arg(long)]
        name: String,

        /// A short description of the new model.
        #[arg(long)]
        descr: String,

        /// Path of the out-of-vocabulary corpus file.
        #[arg(long, value_name = "FILE")]
        corpus: PathBuf,

        /// Base model the customization extends.
        #[arg(long, default_value = voxmod_client::DEFAULT_BASE_MODEL)]
        base_model: String,

        /// Give up if the service has not finished after this many seconds.
        /// By default training is waited on for as long as it takes.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// List every customization model on the account.
    List,

    /// Delete one or more models by id, or "all" for the whole account.
    Delete {
        /// Customization ids to delete, or the single sentinel "all".
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },

    /// Transcribe an audio file against a trained model.
    Evaluate {
        /// Customization id, or "latest" for the most recently created model.
        #[arg(long, short = 'm')]
        model: String,

        /// Path of the audio file.
        #[arg(long, value_name = "FILE")]
        audio: PathBuf,
    },

    /// Prompt-driven session covering all of the above.
    Interactive,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_format);

    let cfg = load_config(cli.config.as_ref(), cli.url.as_deref(), cli.api_key.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Train { name, descr, corpus, base_model, timeout } => {
            commands::train::run(&name, &descr, &corpus, &base_model, timeout, &cfg)?;
        }
        Commands::List => {
            commands::list::run(&cfg)?;
        }
        Commands::Delete { ids } => {
            commands::delete::run(&ids, &cfg)?;
        }
        Commands::Evaluate { model, audio } => {
            commands::evaluate::run(&model, &audio, &cfg)?;
        }
        Commands::Interactive => {
            commands::interactive::run(&cfg)?;
        }
    }

    Ok(())
}

fn init_tracing(log_format: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}
