//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::core::{AssetKind, BuildMode};

/// Front-end asset pipeline with a live-reload dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml, optional)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Project root (default: the config file's directory, or cwd)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Build mode; source maps are only written in development
    #[arg(long, global = true, env = "KILN_ENV", value_enum)]
    pub mode: Option<BuildMode>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build, serve and watch (the default)
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        serve_args: ServeArgs,
    },

    /// Run every step once and exit
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Run a single step once and exit
    Step {
        /// Step to run
        #[arg(value_enum)]
        name: AssetKind,
    },

    /// Build once, then rebuild on change (no server)
    #[command(visible_alias = "w")]
    Watch,

    /// Serve the build root as it is (no watcher, no live reload)
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        serve_args: ServeArgs,
    },

    /// Delete the build root
    Clean,
}

/// Arguments for `build`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Exit non-zero when any step fails
    #[arg(long)]
    pub strict: bool,

    /// Delete the build root before building
    #[arg(short, long)]
    pub clean: bool,
}

/// Arguments shared by `dev` and `serve`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// The command to run; bare `kiln` means `dev`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dev {
            serve_args: ServeArgs::default(),
        })
    }

    /// Serve overrides of the effective command, if any.
    pub fn serve_args(&self) -> Option<&ServeArgs> {
        match &self.command {
            Some(Commands::Dev { serve_args } | Commands::Serve { serve_args }) => Some(serve_args),
            _ => None,
        }
    }
}
