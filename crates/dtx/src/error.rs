use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("log directory '{0}' does not exist")]
    MissingDir(PathBuf),

    #[error("log store error")]
    Store(#[from] dtx_core::StoreError),

    #[error("invalid options")]
    Config(#[from] dtx_pipeline::ConfigError),

    #[error("failed to write output")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
