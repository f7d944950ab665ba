mod commands;
mod error;
mod render;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use dtx_core::{Codec, FileStore};
use dtx_pipeline::Options;
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::error::{CliError, Result};

#[derive(Parser)]
#[command(name = "dtx")]
#[command(about = "Inspect and maintain dtx transaction logs", long_about = None)]
struct Cli {
    /// Directory holding the transaction logs
    #[arg(long, short = 'd', global = true, default_value = ".dtx")]
    dir: PathBuf,

    /// Pipeline options file (TOML); its codec decides how payloads are shown
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Payload codec, overriding the options file
    #[arg(long, global = true, value_enum)]
    codec: Option<CodecArg>,

    /// Log store activity to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CodecArg {
    Json,
    Binary,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Json => Self::Json,
            CodecArg::Binary => Self::Binary,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    let codec = resolve_codec(cli.codec, cli.config.as_deref())?;
    if !cli.dir.is_dir() {
        return Err(CliError::MissingDir(cli.dir));
    }
    let store = FileStore::open(&cli.dir)?;
    let mut out = io::stdout().lock();
    cli.command.execute(&store, codec, &mut out)
}

fn resolve_codec(arg: Option<CodecArg>, config: Option<&Path>) -> Result<Codec> {
    if let Some(arg) = arg {
        return Ok(arg.into());
    }
    match config {
        Some(path) => Ok(Options::load(path)?.codec()),
        None => Ok(Codec::default()),
    }
}

fn init_tracing(verbose: bool) {
    if !verbose && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
