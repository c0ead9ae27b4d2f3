//! Time-zone polygon sources and the id table.
//!
//! One [`TimeZoneSource`] per input feature: the outer boundaries of its
//! polygons as *included* rings, the holes as *excluded* rings. Sources are
//! created by the loader and read-only afterwards; indices are 1-based in
//! feature order so that `0` stays free to mean "no time zone".

use rustc_hash::FxHashMap;

use crate::ring::Ring;

/// A single time zone's polygon set.
#[derive(Debug, Clone)]
pub struct TimeZoneSource {
    /// 1-based index into the id table.
    pub index: u16,
    /// IANA identifier, e.g. `Europe/Paris`.
    pub id: String,
    /// Outer boundaries.
    pub included: Vec<Ring>,
    /// Holes.
    pub excluded: Vec<Ring>,
}

/// All sources of one dataset, addressable by index and by id.
#[derive(Debug, Default)]
pub struct SourceTable {
    sources: Vec<TimeZoneSource>,
    by_id: FxHashMap<String, u16>,
}

impl SourceTable {
    pub fn new(sources: Vec<TimeZoneSource>) -> Self {
        let mut by_id = FxHashMap::default();
        for source in &sources {
            by_id.insert(source.id.clone(), source.index);
        }
        Self { sources, by_id }
    }

    /// Look up by 1-based index.
    pub fn get(&self, index: u16) -> &TimeZoneSource {
        &self.sources[index as usize - 1]
    }

    pub fn index_of(&self, id: &str) -> Option<u16> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeZoneSource> {
        self.sources.iter()
    }

    /// Ids in index order, for the serialized id table.
    pub fn ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;

    fn source(index: u16, id: &str) -> TimeZoneSource {
        TimeZoneSource {
            index,
            id: id.to_string(),
            included: vec![Ring::from_reduced(vec![
                Position::new(0.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(0.0, 1.0),
            ])],
            excluded: Vec::new(),
        }
    }

    #[test]
    fn test_table_lookups() {
        let table = SourceTable::new(vec![source(1, "Europe/Paris"), source(2, "Asia/Tokyo")]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).id, "Europe/Paris");
        assert_eq!(table.get(2).id, "Asia/Tokyo");
        assert_eq!(table.index_of("Asia/Tokyo"), Some(2));
        assert_eq!(table.index_of("Mars/Olympus"), None);
        assert_eq!(table.ids(), vec!["Europe/Paris", "Asia/Tokyo"]);
    }
}
