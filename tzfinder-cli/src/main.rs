mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;

fn init_tracing(cli: &Cli) {
    // The library crates emit `tracing` events; without a subscriber
    // installed here, `RUST_LOG=...` would have no effect. Default to
    // "off" so output only changes when the user opts in.
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into());

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> error::CliResult<()> {
    match cli.command {
        Commands::Build {
            geojson,
            output,
            max_level,
            min_ring_distance,
            workers,
        } => {
            let mut config = tzfinder_index::BuildConfig::default();
            if let Some(level) = max_level {
                config = config.with_max_level(level);
            }
            if let Some(meters) = min_ring_distance {
                config = config.with_min_ring_distance_m(meters);
            }
            if let Some(n) = workers {
                config = config.with_workers(n);
            }
            commands::build::run(&geojson, &output, config, cli.quiet)
        }

        Commands::Lookup {
            lon,
            lat,
            data,
            all,
            cell,
        } => commands::lookup::run(lon, lat, data.as_deref(), all, cell),

        Commands::Zones { data } => commands::zones::run(data.as_deref()),

        Commands::Info { data } => commands::info::run(data.as_deref()),
    }
}
