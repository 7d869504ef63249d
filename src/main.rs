mod cli;
mod commands;
mod config;
mod dialect;
mod engine;
mod paths;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::CredentialArgs;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let creds = CredentialArgs {
        client_id: cli.client_id,
        client_secret: cli.client_secret,
        api_url: cli.api_url,
    };

    match cli.command {
        Command::Deploy(args) => {
            let config_path = config_path(cli.config.as_deref())?;
            commands::deploy::run(&ctx, &creds, &config_path, args)
        }
        Command::Export(args) => {
            let config_path = config_path(cli.config.as_deref())?;
            commands::export::run(&ctx, &creds, &config_path, args)
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "synq-monitors", &mut io::stdout());
            Ok(())
        }
    }
}

fn config_path(flag: Option<&str>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(paths::expand(path)),
        None => paths::config_file(),
    }
}
