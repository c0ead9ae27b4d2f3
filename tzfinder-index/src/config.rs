//! Compiler configuration.

/// Tuning knobs for the loader, builder and consolidator.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Ring vertices closer than this (meters, great-circle) to the last
    /// kept vertex are dropped by the reducer.
    pub min_ring_distance_m: f64,

    /// Deepest tree level. 25 alternating splits give five full geohash
    /// characters of resolution (~4.9 km × 4.9 km cells at the equator).
    pub max_level: u8,

    /// Worker threads for the build and consolidation phases;
    /// `0` means `std::thread::available_parallelism()`.
    pub workers: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            min_ring_distance_m: 500.0,
            max_level: 25,
            workers: 0,
        }
    }
}

impl BuildConfig {
    pub fn with_min_ring_distance_m(mut self, meters: f64) -> Self {
        self.min_ring_distance_m = meters;
        self
    }

    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Resolved worker count.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}
