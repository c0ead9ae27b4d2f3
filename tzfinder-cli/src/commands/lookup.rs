//! `tzfinder lookup`: resolve a coordinate.

use std::path::Path;

use super::open_lookup;
use crate::error::CliResult;

pub fn run(lon: f32, lat: f32, data: Option<&Path>, all: bool, cell: bool) -> CliResult<()> {
    let lookup = open_lookup(data)?;

    if all {
        for id in lookup.all_ids_at(lon, lat)? {
            println!("{id}");
        }
    } else {
        println!("{}", lookup.id_at(lon, lat)?);
    }

    if cell {
        let (_, bbox, level) = lookup.box_at(lon, lat)?;
        println!(
            "cell: ({}, {})..({}, {}) at level {level}",
            bbox.sw.lon, bbox.sw.lat, bbox.ne.lon, bbox.ne.lat
        );
    }
    Ok(())
}
