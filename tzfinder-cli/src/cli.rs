//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tzfinder",
    version,
    about = "Compile and query time-zone boundary data"
)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a GeoJSON FeatureCollection into a binary tree file
    Build {
        /// Input GeoJSON file (Timezone Boundary Builder release)
        geojson: PathBuf,

        /// Output data file
        #[arg(short, long, default_value = tzfinder_lookup::facade::DEFAULT_DATA_FILE)]
        output: PathBuf,

        /// Deepest tree level (default 25)
        #[arg(long)]
        max_level: Option<u8>,

        /// Ring reduction threshold in meters (default 500)
        #[arg(long)]
        min_ring_distance: Option<f64>,

        /// Worker threads (default: all cores)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Resolve the time zone(s) at a coordinate
    Lookup {
        /// Longitude in degrees, [-180, 180]
        lon: f32,

        /// Latitude in degrees, [-90, 90]
        lat: f32,

        /// Data file (default: sibling of the executable)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Print every id applying at the coordinate
        #[arg(long)]
        all: bool,

        /// Also print the leaf cell box and depth
        #[arg(long)]
        cell: bool,
    },

    /// List the id table of a data file
    Zones {
        /// Data file (default: sibling of the executable)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Print tree statistics of a data file
    Info {
        /// Data file (default: sibling of the executable)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}
