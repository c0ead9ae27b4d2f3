pub mod build;
pub mod info;
pub mod lookup;
pub mod zones;

use std::path::{Path, PathBuf};

use tzfinder_lookup::facade::DEFAULT_DATA_FILE;
use tzfinder_lookup::TimeZoneLookup;

use crate::error::CliResult;

/// Resolve the data file: explicit flag, or the default name next to the
/// executable, or the current directory as a last resort.
pub fn open_lookup(data: Option<&Path>) -> CliResult<TimeZoneLookup> {
    let path: PathBuf = match data {
        Some(path) => path.to_path_buf(),
        None => std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DATA_FILE)))
            .filter(|candidate| candidate.exists())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
    };
    Ok(TimeZoneLookup::from_path(&path)?)
}
