//! The lookup handle: descent, id resolution, traversal, Etc/GMT.

use std::io::Read;
use std::path::Path;

use tzfinder_core::{BBox, Node, TimeZoneIndex, Tree};

use crate::error::{LookupError, Result};
use crate::reader::read_tree;

/// An immutable, re-entrant handle over one loaded time-zone tree.
///
/// Every query descends from the root, re-deriving the cell box from the
/// level parity on the way down; only one comparison pair per level
/// touches memory, so a lookup is a handful of cache lines end to end.
pub struct TimeZoneLookup {
    tree: Tree,
}

impl TimeZoneLookup {
    /// Wrap an already-deserialized (or freshly built) tree.
    pub fn new(tree: Tree) -> Self {
        Self { tree }
    }

    /// Load from any gzip tree stream. The reader is consumed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(read_tree(reader)?))
    }

    /// Load from a data file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        tracing::info!(path = %path.display(), "loading time-zone data");
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Number of zones in the id table.
    pub fn zone_count(&self) -> usize {
        self.tree.ids.len()
    }

    /// All ids, in index order.
    pub fn zone_ids(&self) -> &[String] {
        &self.tree.ids
    }

    /// The leaf payload covering `(lon, lat)`.
    pub fn index_at(&self, lon: f32, lat: f32) -> Result<TimeZoneIndex> {
        validate(lon, lat)?;
        let (node, _, _) = self.descend(lon, lat);
        Ok(node.index)
    }

    /// Leaf payload plus the leaf's cell box and depth.
    pub fn box_at(&self, lon: f32, lat: f32) -> Result<(TimeZoneIndex, BBox, u8)> {
        validate(lon, lat)?;
        let (node, bbox, level) = self.descend(lon, lat);
        Ok((node.index, bbox, level))
    }

    /// Primary id at `(lon, lat)`; ocean cells fall back to [`etc_gmt`].
    pub fn id_at(&self, lon: f32, lat: f32) -> Result<String> {
        let index = self.index_at(lon, lat)?;
        match index.first() {
            0 => etc_gmt(lon),
            first => Ok(self.tree.ids[first as usize - 1].clone()),
        }
    }

    /// Every id applying at `(lon, lat)`: the primary id (or the Etc/GMT
    /// fallback), then the secondary id for disputed cells.
    pub fn all_ids_at(&self, lon: f32, lat: f32) -> Result<Vec<String>> {
        let index = self.index_at(lon, lat)?;
        let mut ids = Vec::with_capacity(2);
        match index.first() {
            0 => ids.push(etc_gmt(lon)?),
            first => ids.push(self.tree.ids[first as usize - 1].clone()),
        }
        if index.second() != 0 {
            ids.push(self.tree.ids[index.second() as usize - 1].clone());
        }
        Ok(ids)
    }

    /// Case-insensitive id search; returns the 1-based index.
    pub fn index_of(&self, id: &str) -> Result<u16> {
        self.tree
            .ids
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(id))
            .map(|pos| (pos + 1) as u16)
            .ok_or_else(|| LookupError::UnknownId(id.to_string()))
    }

    /// Id for a 1-based index.
    pub fn id_of(&self, index: u16) -> Result<&str> {
        if index == 0 || index as usize > self.tree.ids.len() {
            return Err(LookupError::IndexOutOfRange(index));
        }
        Ok(&self.tree.ids[index as usize - 1])
    }

    /// Visit the cell box of every leaf matching `query`: with no second
    /// entry, any leaf whose payload *contains* `query.first()`; with a
    /// second entry, only leaves whose payload *equals* the query
    /// (compared in canonical order).
    pub fn traverse<F: FnMut(BBox)>(&self, query: TimeZoneIndex, mut callback: F) {
        let query = query.normalized();
        walk(&self.tree.root, BBox::WORLD, 0, query, &mut callback);
    }

    fn descend(&self, lon: f32, lat: f32) -> (&Node, BBox, u8) {
        let mut node = &self.tree.root;
        let mut bbox = BBox::WORLD;
        let mut level = 0u8;
        while let Some(pair) = &node.children {
            let (hi_box, lo_box) = bbox.split(level);
            // Only one axis differs between the halves at any level, so
            // the combined comparison selects the right child either way.
            if lon >= hi_box.sw.lon && lat >= hi_box.sw.lat {
                node = &pair.0;
                bbox = hi_box;
            } else {
                node = &pair.1;
                bbox = lo_box;
            }
            level += 1;
        }
        (node, bbox, level)
    }
}

fn walk<F: FnMut(BBox)>(node: &Node, bbox: BBox, level: u8, query: TimeZoneIndex, callback: &mut F) {
    match &node.children {
        Some(pair) => {
            let (hi_box, lo_box) = bbox.split(level);
            walk(&pair.0, hi_box, level + 1, query, callback);
            walk(&pair.1, lo_box, level + 1, query, callback);
        }
        None => {
            let matches = if query.second() == 0 {
                node.index.contains(query.first())
            } else {
                node.index == query
            };
            if matches {
                callback(bbox);
            }
        }
    }
}

fn validate(lon: f32, lat: f32) -> Result<()> {
    if lon.is_nan() || !(-180.0..=180.0).contains(&lon) {
        return Err(LookupError::LongitudeOutOfRange(lon));
    }
    if lat.is_nan() || !(-90.0..=90.0).contains(&lat) {
        return Err(LookupError::LatitudeOutOfRange(lat));
    }
    Ok(())
}

/// Synthetic id for coordinates with no dataset coverage: the nautical
/// `Etc/GMT±k` zone for the longitude's 15°-wide band. Note the inverted
/// sign convention: POSIX `Etc/GMT+k` lies *west* of Greenwich.
pub fn etc_gmt(lon: f32) -> Result<String> {
    if lon.is_nan() || !(-180.0..=180.0).contains(&lon) {
        return Err(LookupError::LongitudeOutOfRange(lon));
    }
    let offset = (-lon / 15.0).round() as i32;
    Ok(match offset {
        0 => "Etc/GMT".to_string(),
        k if k > 0 => format!("Etc/GMT+{k}"),
        k => format!("Etc/GMT{k}"),
    })
}
