use std::panic;

use anyhow::Context;
use backtrace::Backtrace;
use clap::Parser;
use tracing::debug;
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::catalog::Catalog;
use crate::commands::Command;
use crate::config::Config;

mod catalog;
mod commands;
mod config;

#[derive(Parser, Clone, Debug)]
/// Derive storage keys of chain state entries.
struct Cli {
    /// Path to the configuration file.
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// If set, output logs in JSON format.
    #[clap(short, long, action, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

fn setup_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout carries the derived keys
    if json {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .finish();
        tracing::subscriber::set_global_default(subscriber).context("Setting up logging failed")
    } else {
        let subscriber = tracing_subscriber::fmt()
            .pretty()
            .compact()
            .with_level(true)
            .with_file(false)
            .with_line_number(false)
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .finish();
        tracing::subscriber::set_global_default(subscriber).context("Setting up logging failed")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json)?;

    panic::set_hook(Box::new(|panic_info| {
        let msg = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => {
                match panic_info.payload().downcast_ref::<String>() {
                    Some(s) => &s[..],
                    None => "Box<dyn Any>",
                }
            },
        };
        let (file, lineno, col) = match panic_info.location() {
            Some(l) => (l.file(), l.line(), l.column()),
            None => ("<unknown>", 0, 0),
        };

        error!(
            msg,
            file,
            lineno,
            col,
            "Panic occurred: {:?}",
            Backtrace::new(),
        );
    }));

    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;
    debug!("Output format {:?}", config.output.format);

    let catalog = Catalog::load(&config).context("while loading the catalog")?;
    let output = cli.command.run(&catalog, config.output.format)?;
    println!("{output}");

    Ok(())
}
