//! Process-wide lookup facade.
//!
//! One lazily-loaded [`TimeZoneLookup`] behind a one-shot initializer.
//! Configuration (a data path or a data stream) is accepted until the
//! first load begins; afterwards the setters fail with `AlreadyLoaded`
//! and the loaded tree is immutable for the life of the process.
//!
//! Load is at-most-once and thread-safe: concurrent first callers block
//! on the cell and observe the identical handle. A *failed* load releases
//! the configuration again so the host can correct it and retry.

use std::io::Read;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::{LookupError, Result};
use crate::lookup::TimeZoneLookup;
use tzfinder_core::TimeZoneIndex;

/// Default data file name, expected next to the executable.
pub const DEFAULT_DATA_FILE: &str = "TZFinder.TimeZoneData.bin";

static HANDLE: OnceCell<TimeZoneLookup> = OnceCell::new();
static CONFIG: Mutex<FacadeConfig> = Mutex::new(FacadeConfig {
    path: None,
    reader: None,
    loading: false,
});

struct FacadeConfig {
    path: Option<PathBuf>,
    reader: Option<Box<dyn Read + Send>>,
    /// Set while (and after) a load consumes the configuration.
    loading: bool,
}

/// Configure the data file path. Fails once a load has started.
pub fn set_data_path(path: impl Into<PathBuf>) -> Result<()> {
    let mut config = CONFIG.lock();
    if config.loading || HANDLE.get().is_some() {
        return Err(LookupError::AlreadyLoaded);
    }
    config.path = Some(path.into());
    Ok(())
}

/// Configure an open data stream; it is consumed and dropped by the
/// load. Fails once a load has started.
pub fn set_data_reader(reader: impl Read + Send + 'static) -> Result<()> {
    let mut config = CONFIG.lock();
    if config.loading || HANDLE.get().is_some() {
        return Err(LookupError::AlreadyLoaded);
    }
    config.reader = Some(Box::new(reader));
    Ok(())
}

/// Force the one-shot load and return the shared handle. Idempotent.
pub fn ensure_loaded() -> Result<&'static TimeZoneLookup> {
    HANDLE.get_or_try_init(|| {
        let mut config = CONFIG.lock();
        config.loading = true;

        let result = match config.reader.take() {
            Some(reader) => TimeZoneLookup::from_reader(reader),
            None => {
                let path = config.path.clone().unwrap_or_else(default_data_path);
                TimeZoneLookup::from_path(&path)
            }
        };
        if result.is_err() {
            // Allow reconfiguration and another attempt.
            config.loading = false;
        }
        result
    })
}

fn default_data_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map(|dir| dir.join(DEFAULT_DATA_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// [`TimeZoneLookup::index_at`] on the shared handle.
pub fn index_at(lon: f32, lat: f32) -> Result<TimeZoneIndex> {
    ensure_loaded()?.index_at(lon, lat)
}

/// [`TimeZoneLookup::id_at`] on the shared handle.
pub fn id_at(lon: f32, lat: f32) -> Result<String> {
    ensure_loaded()?.id_at(lon, lat)
}

/// [`TimeZoneLookup::all_ids_at`] on the shared handle.
pub fn all_ids_at(lon: f32, lat: f32) -> Result<Vec<String>> {
    ensure_loaded()?.all_ids_at(lon, lat)
}

/// [`TimeZoneLookup::index_of`] on the shared handle.
pub fn index_of(id: &str) -> Result<u16> {
    ensure_loaded()?.index_of(id)
}

/// [`TimeZoneLookup::id_of`] on the shared handle.
pub fn id_of(index: u16) -> Result<&'static str> {
    ensure_loaded()?.id_of(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The facade is process-global state, so the whole lifecycle lives in
    // one test: configure, load concurrently, verify sharing, verify the
    // setters are frozen.
    #[test]
    fn test_facade_lifecycle() {
        // Missing default file: load fails and stays retryable.
        set_data_path("/nonexistent/tzfinder-test.bin").unwrap();
        assert!(ensure_loaded().is_err());

        // Reconfigure with an in-memory stream of a real tree.
        let tree = tzfinder_core::Tree::new(
            tzfinder_core::Node::leaf(tzfinder_core::TimeZoneIndex::single(1)),
            vec!["Europe/Paris".into()],
        );
        let mut data = Vec::new();
        tzfinder_index::write_tree(&tree, &mut data).unwrap();
        set_data_reader(std::io::Cursor::new(data)).unwrap();

        // Concurrent first callers all see the identical handle.
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| ensure_loaded().unwrap() as *const TimeZoneLookup as usize)
            })
            .collect();
        let pointers: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(pointers.windows(2).all(|w| w[0] == w[1]));

        // Queries flow through the shared handle.
        assert_eq!(id_at(2.25, 47.5).unwrap(), "Europe/Paris");
        assert_eq!(index_of("europe/paris").unwrap(), 1);
        assert_eq!(id_of(1).unwrap(), "Europe/Paris");
        assert_eq!(all_ids_at(0.0, 0.0).unwrap(), vec!["Europe/Paris"]);

        // Configuration is frozen now.
        assert!(matches!(
            set_data_path("anywhere.bin"),
            Err(LookupError::AlreadyLoaded)
        ));
        assert!(matches!(
            set_data_reader(std::io::empty()),
            Err(LookupError::AlreadyLoaded)
        ));
    }
}
