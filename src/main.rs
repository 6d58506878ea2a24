//! IPPure panel CLI.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use ippure_panel::{invoke, Config, PanelMode};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ippure-panel")]
#[command(about = "IP reputation panel - fraud score, native check and IP info from IPPure")]
#[command(version)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Panel argument, e.g. "mode=fraud" or '{"mode":"native"}'
    #[arg(short, long)]
    argument: Option<String>,

    /// Select the mode directly, overriding the argument
    #[arg(short, long)]
    mode: Option<PanelMode>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "warn")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// {"title":..,"content":..,"style":..}
    Json,
    /// Title, content and style as plain lines
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Config::example());
        return Ok(());
    }

    // Logs go to stderr, stdout carries only the panel
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config {
        Some(ref path) => {
            info!(config = %path.display(), "Loading configuration");
            Config::load(path)
        }
        None => Ok(Config::default()),
    };

    // Handle --validate
    if args.validate {
        config?;
        info!("Configuration is valid");
        return Ok(());
    }

    let panel = invoke(config, args.mode, args.argument.as_deref()).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&panel)?),
        OutputFormat::Text => {
            println!("{}", panel.title);
            println!("{}", panel.content);
            println!("[{}]", panel.style);
        }
    }

    Ok(())
}
