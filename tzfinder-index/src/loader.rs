//! GeoJSON source loader.
//!
//! Streams a `FeatureCollection` (the Timezone Boundary Builder release
//! format) into a [`SourceTable`]. Each feature carries its IANA id in
//! `properties.tzid` and a `Polygon` or `MultiPolygon` geometry in
//! `[longitude, latitude]` order; any other geometry kind aborts the load.
//! Outer boundaries become included rings, holes become excluded rings,
//! and every ring goes through the reducer on the way in.

use std::io::{BufReader, Read};

use serde::Deserialize;

use tzfinder_core::{Position, Ring, SourceTable, TimeZoneSource};

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::progress::{Progress, ProgressStep};

/// Features get 1-based `u16` indices, and the serialized id count must
/// stay positive in an `i16`.
const MAX_SOURCES: usize = 32_767;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Deserialize)]
struct FeatureProperties {
    tzid: String,
}

/// GeoJSON rings nest as `coordinates[polygon][ring][vertex]`; only the
/// two polygonal kinds are meaningful for boundary data.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum FeatureGeometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

/// Load and reduce all sources from a GeoJSON reader.
pub fn load_sources<R: Read>(
    reader: R,
    config: &BuildConfig,
    progress: &dyn Progress,
) -> Result<SourceTable> {
    let collection: FeatureCollection = serde_json::from_reader(BufReader::new(reader))?;

    if collection.features.is_empty() {
        return Err(BuildError::InvalidInput("no features in input".into()));
    }
    if collection.features.len() > MAX_SOURCES {
        return Err(BuildError::InvalidInput(format!(
            "{} features exceed the supported maximum of {}",
            collection.features.len(),
            MAX_SOURCES
        )));
    }

    let mut sources = Vec::with_capacity(collection.features.len());
    for (position, feature) in collection.features.into_iter().enumerate() {
        let index = (position + 1) as u16;
        let id = feature.properties.tzid;

        let mut included = Vec::new();
        let mut excluded = Vec::new();
        match feature.geometry {
            FeatureGeometry::Polygon { coordinates } => {
                reduce_polygon(&id, coordinates, config, &mut included, &mut excluded)?;
            }
            FeatureGeometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    reduce_polygon(&id, polygon, config, &mut included, &mut excluded)?;
                }
            }
        }

        tracing::debug!(
            tzid = %id,
            index = index,
            included = included.len(),
            excluded = excluded.len(),
            "source loaded"
        );
        sources.push(TimeZoneSource {
            index,
            id,
            included,
            excluded,
        });
        progress.on_progress(ProgressStep::Load, 1);
    }

    let table = SourceTable::new(sources);
    tracing::info!(sources = table.len(), "sources loaded");
    Ok(table)
}

/// Reduce one polygon's rings: first ring is the outer boundary, the rest
/// are holes.
fn reduce_polygon(
    id: &str,
    rings: Vec<Vec<[f64; 2]>>,
    config: &BuildConfig,
    included: &mut Vec<Ring>,
    excluded: &mut Vec<Ring>,
) -> Result<()> {
    if rings.is_empty() {
        return Err(BuildError::InvalidInput(format!(
            "{id}: polygon without rings"
        )));
    }
    for (ring_no, raw) in rings.into_iter().enumerate() {
        if raw.len() < 4 {
            return Err(BuildError::InvalidInput(format!(
                "{id}: ring with {} coordinates (minimum is 4)",
                raw.len()
            )));
        }
        let positions: Vec<Position> = raw
            .iter()
            .map(|&[lon, lat]| Position::new(lon as f32, lat as f32))
            .collect();
        let ring = Ring::reduce(&positions, config.min_ring_distance_m);
        if ring_no == 0 {
            included.push(ring);
        } else {
            excluded.push(ring);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;

    fn load(json: &str) -> Result<SourceTable> {
        load_sources(json.as_bytes(), &BuildConfig::default(), &NoopProgress)
    }

    const SQUARE: &str = "[[0.0,0.0],[8.0,0.0],[8.0,8.0],[0.0,8.0],[0.0,0.0]]";

    #[test]
    fn test_load_polygon_feature() {
        let json = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature",
                  "properties":{{"tzid":"Europe/Paris"}},
                  "geometry":{{"type":"Polygon","coordinates":[{SQUARE}]}}}}
            ]}}"#
        );
        let table = load(&json).unwrap();
        assert_eq!(table.len(), 1);
        let source = table.get(1);
        assert_eq!(source.id, "Europe/Paris");
        assert_eq!(source.index, 1);
        assert_eq!(source.included.len(), 1);
        assert!(source.excluded.is_empty());
    }

    #[test]
    fn test_load_polygon_with_hole() {
        let json = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature",
                  "properties":{{"tzid":"Europe/Rome"}},
                  "geometry":{{"type":"Polygon","coordinates":[
                    {SQUARE},
                    [[2.0,2.0],[4.0,2.0],[4.0,4.0],[2.0,4.0],[2.0,2.0]]
                  ]}}}}
            ]}}"#
        );
        let table = load(&json).unwrap();
        let source = table.get(1);
        assert_eq!(source.included.len(), 1);
        assert_eq!(source.excluded.len(), 1);
    }

    #[test]
    fn test_load_multipolygon_indices_in_order() {
        let json = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature",
                  "properties":{{"tzid":"Asia/Tokyo"}},
                  "geometry":{{"type":"MultiPolygon","coordinates":[[{SQUARE}],[{SQUARE}]]}}}},
                {{"type":"Feature",
                  "properties":{{"tzid":"Asia/Seoul"}},
                  "geometry":{{"type":"Polygon","coordinates":[{SQUARE}]}}}}
            ]}}"#
        );
        let table = load(&json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).included.len(), 2);
        assert_eq!(table.index_of("Asia/Seoul"), Some(2));
    }

    #[test]
    fn test_unsupported_geometry_kind_fails() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature",
             "properties":{"tzid":"Null/Island"},
             "geometry":{"type":"Point","coordinates":[0.0,0.0]}}
        ]}"#;
        assert!(matches!(load(json), Err(BuildError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(
            load("{not geojson"),
            Err(BuildError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_short_ring_fails() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature",
             "properties":{"tzid":"Bad/Ring"},
             "geometry":{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[0.0,0.0]]]}}
        ]}"#;
        assert!(matches!(load(json), Err(BuildError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_collection_fails() {
        assert!(matches!(
            load(r#"{"type":"FeatureCollection","features":[]}"#),
            Err(BuildError::InvalidInput(_))
        ));
    }
}
