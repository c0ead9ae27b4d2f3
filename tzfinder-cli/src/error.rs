//! CLI error handling and exit codes.

use colored::Colorize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Build(#[from] tzfinder_index::BuildError),

    #[error(transparent)]
    Lookup(#[from] tzfinder_lookup::LookupError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

/// Print the error to stderr and exit non-zero.
pub fn exit_with_error(e: CliError) -> ! {
    eprintln!("{} {}", "error:".red().bold(), e);
    let code = match &e {
        CliError::Build(tzfinder_index::BuildError::InvalidInput(_)) => 2,
        CliError::Build(tzfinder_index::BuildError::Cancelled) => 130,
        _ => 1,
    };
    std::process::exit(code);
}
