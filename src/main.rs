//! kiln - a front-end asset pipeline with a live-reload dev server.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod graph;
mod logger;
mod pipeline;
mod reload;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use cli::{Cli, Commands};
use config::PipelineConfig;
use pipeline::StepContext;

fn main() -> Result<()> {
    // Ctrl+C handler first, before anything blocks
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;
    debug!("config"; "root {}, mode {:?}", config.root.display(), config.mode);

    match cli.command() {
        Commands::Clean => cli::clean::clean_build_root(&config)
            .map(|removed| {
                if !removed {
                    log!("clean"; "nothing to clean");
                }
            })
            .map_err(Into::into),
        Commands::Serve { .. } => cli::dev::run_serve(&config),
        command => {
            let ctx = step_context(config)?;
            match command {
                Commands::Build { build_args } => cli::build::build_all(&ctx, &build_args).map(|_| ()),
                Commands::Step { name } => cli::build::build_step(&ctx, name).map(|_| ()),
                Commands::Watch => cli::dev::run_watch(ctx),
                _ => cli::dev::run_dev(ctx),
            }
        }
    }
}

fn step_context(config: PipelineConfig) -> Result<StepContext> {
    let table = config.path_table()?;
    Ok(StepContext::new(Arc::new(config), Arc::new(table)))
}
