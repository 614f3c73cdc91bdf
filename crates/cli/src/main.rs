use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use output::OutputFormat;

/// luapack - bundle and minify Lua projects for distribution
#[derive(Parser)]
#[command(name = "luapack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Suppress progress output
  #[arg(short, long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts
  Build {
    /// Targets to build: compiler, runtime, standalone (default: all)
    targets: Vec<String>,

    /// Project root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output directory (default: <root>/build)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Skip the load-check of finished artifacts
    #[arg(long)]
    no_verify: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Minify a single Lua file to stdout
  Minify {
    /// File to minify
    file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Build {
      targets,
      root,
      out_dir,
      no_verify,
      format,
    } => cmd::cmd_build(&targets, &root, out_dir, !no_verify, format, cli.quiet),
    Commands::Minify { file } => cmd::cmd_minify(&file),
  }
}
