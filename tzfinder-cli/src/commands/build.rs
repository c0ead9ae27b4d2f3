//! `tzfinder build`: GeoJSON in, binary tree out.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use tzfinder_index::{compile, write_tree_to_path, BuildConfig, Progress, ProgressStep};

use crate::error::CliResult;

/// Progress printer: one updating stderr line, throttled.
struct ConsoleProgress {
    quiet: bool,
    units: AtomicU64,
}

impl ConsoleProgress {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            units: AtomicU64::new(0),
        }
    }
}

impl Progress for ConsoleProgress {
    fn on_progress(&self, step: ProgressStep, delta: u64) {
        if self.quiet {
            return;
        }
        let total = self.units.fetch_add(delta, Ordering::Relaxed) + delta;
        if total % 64 == 0 || step == ProgressStep::Write {
            let label = match step {
                ProgressStep::Load => "loading",
                ProgressStep::Build => "building",
                ProgressStep::Consolidate => "consolidating",
                ProgressStep::Write => "writing",
            };
            eprint!("\r{label}: {total} work items");
            let _ = std::io::stderr().flush();
        }
    }
}

pub fn run(geojson: &Path, output: &Path, config: BuildConfig, quiet: bool) -> CliResult<()> {
    let start = Instant::now();
    let progress = ConsoleProgress::new(quiet);
    let cancel = AtomicBool::new(false);

    let input = File::open(geojson)?;
    let (tree, stats) = compile(input, &config, &progress, &cancel)?;
    write_tree_to_path(&tree, output, &progress)?;

    if !quiet {
        eprintln!();
    }
    println!(
        "{} zones, {} nodes ({} leaves, {} disputed), depth {}, {:.1}s -> {}",
        stats.sources,
        stats.node_count,
        stats.leaf_count,
        stats.multi_index_leaves,
        stats.max_depth,
        start.elapsed().as_secs_f32(),
        output.display()
    );
    Ok(())
}
