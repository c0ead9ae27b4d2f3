//! `tzfinder zones`: list the id table.

use std::path::Path;

use super::open_lookup;
use crate::error::CliResult;

pub fn run(data: Option<&Path>) -> CliResult<()> {
    let lookup = open_lookup(data)?;
    for (position, id) in lookup.zone_ids().iter().enumerate() {
        println!("{:5}  {id}", position + 1);
    }
    Ok(())
}
