//! `tzfinder info`: tree statistics.

use std::path::Path;

use tzfinder_index::BuildStats;

use super::open_lookup;
use crate::error::CliResult;

pub fn run(data: Option<&Path>) -> CliResult<()> {
    let lookup = open_lookup(data)?;
    let stats = BuildStats::of(lookup.tree());

    println!("zones:           {}", lookup.zone_count());
    println!("nodes:           {}", stats.node_count);
    println!("leaves:          {}", stats.leaf_count);
    println!("disputed leaves: {}", stats.multi_index_leaves);
    println!("max depth:       {}", stats.max_depth);
    Ok(())
}
