//! Full pipeline tests: compile a synthetic world, serialize it, load it
//! back and query it.

use std::sync::atomic::AtomicBool;

use tzfinder_core::{BBox, Position};
use tzfinder_index::{compile, write_tree, write_tree_to_path, BuildConfig, NoopProgress};
use tzfinder_lookup::{read_tree, TimeZoneLookup};

/// A miniature planet: one France-sized zone, one Japan-sized zone, and a
/// disputed pair sharing the same western-desert polygon.
const WORLD: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","properties":{"tzid":"Europe/Paris"},
     "geometry":{"type":"Polygon","coordinates":[
       [[-5.0,42.0],[8.0,42.0],[8.0,51.0],[-5.0,51.0],[-5.0,42.0]]]}},
    {"type":"Feature","properties":{"tzid":"Asia/Tokyo"},
     "geometry":{"type":"Polygon","coordinates":[
       [[134.0,29.0],[146.0,29.0],[146.0,41.0],[134.0,41.0],[134.0,29.0]]]}},
    {"type":"Feature","properties":{"tzid":"Africa/Casablanca"},
     "geometry":{"type":"Polygon","coordinates":[
       [[-14.0,21.0],[-8.0,21.0],[-8.0,28.0],[-14.0,28.0],[-14.0,21.0]]]}},
    {"type":"Feature","properties":{"tzid":"Africa/El_Aaiun"},
     "geometry":{"type":"Polygon","coordinates":[
       [[-14.0,21.0],[-8.0,21.0],[-8.0,28.0],[-14.0,28.0],[-14.0,21.0]]]}}
  ]
}"#;

fn config() -> BuildConfig {
    BuildConfig::default().with_max_level(12).with_workers(2)
}

fn compiled() -> tzfinder_core::Tree {
    let (tree, stats) = compile(
        WORLD.as_bytes(),
        &config(),
        &NoopProgress,
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(stats.sources, 4);
    assert!(stats.multi_index_leaves > 0, "expected disputed leaves");
    tree
}

fn loaded() -> TimeZoneLookup {
    let tree = compiled();
    let mut bytes = Vec::new();
    write_tree(&tree, &mut bytes).unwrap();
    TimeZoneLookup::from_reader(bytes.as_slice()).unwrap()
}

#[test]
fn test_serialization_roundtrip_preserves_tree() {
    let tree = compiled();
    let mut bytes = Vec::new();
    write_tree(&tree, &mut bytes).unwrap();
    let restored = read_tree(bytes.as_slice()).unwrap();
    assert_eq!(restored, tree);
}

#[test]
fn test_path_roundtrip_through_tempdir() {
    let tree = compiled();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.bin");
    write_tree_to_path(&tree, &path, &NoopProgress).unwrap();

    let lookup = TimeZoneLookup::from_path(&path).unwrap();
    assert_eq!(lookup.tree(), &tree);
    assert_eq!(lookup.id_at(2.255419, 47.479083).unwrap(), "Europe/Paris");
}

#[test]
fn test_known_locations_resolve() {
    let lookup = loaded();
    assert_eq!(lookup.id_at(2.255419, 47.479083).unwrap(), "Europe/Paris");
    assert_eq!(lookup.id_at(139.7, 35.7).unwrap(), "Asia/Tokyo");
}

#[test]
fn test_ocean_falls_back_to_etc_gmt() {
    let lookup = loaded();
    assert_eq!(lookup.id_at(0.0, 0.0).unwrap(), "Etc/GMT");
    assert_eq!(lookup.id_at(-30.0, 0.0).unwrap(), "Etc/GMT+2");
    assert_eq!(lookup.all_ids_at(-30.0, 0.0).unwrap(), vec!["Etc/GMT+2"]);
}

#[test]
fn test_disputed_region_returns_both_ids_in_canonical_order() {
    let lookup = loaded();
    let ids = lookup.all_ids_at(-10.7, 24.0).unwrap();
    assert_eq!(ids, vec!["Africa/Casablanca", "Africa/El_Aaiun"]);

    let index = lookup.index_at(-10.7, 24.0).unwrap();
    assert!(index.first() < index.second(), "payload must be canonical");
}

#[test]
fn test_id_index_roundtrip_for_every_zone() {
    let lookup = loaded();
    for i in 1..=lookup.zone_count() as u16 {
        let id = lookup.id_of(i).unwrap().to_string();
        assert_eq!(lookup.index_of(&id).unwrap(), i);
    }
}

#[test]
fn test_descent_is_pure_and_total() {
    let lookup = loaded();
    // A coarse grid over the whole valid domain: every point reaches a
    // leaf, twice identically, and the reported cell contains the point.
    let mut lon = -180.0f32;
    while lon <= 180.0 {
        let mut lat = -90.0f32;
        while lat <= 90.0 {
            let (index, bbox, level) = lookup.box_at(lon, lat).unwrap();
            assert_eq!(index, lookup.index_at(lon, lat).unwrap());
            assert!(level <= 12);
            assert!(
                bbox.contains(lon, lat),
                "cell {bbox:?} does not contain ({lon}, {lat})"
            );
            lat += 7.5;
        }
        lon += 15.0;
    }
}

#[test]
fn test_traverse_covers_the_zone() {
    let lookup = loaded();
    let paris = lookup.index_of("Europe/Paris").unwrap();

    let mut boxes: Vec<BBox> = Vec::new();
    lookup.traverse(tzfinder_core::TimeZoneIndex::single(paris), |b| {
        boxes.push(b)
    });
    assert!(!boxes.is_empty());

    // Every returned cell resolves back to the zone...
    for bbox in &boxes {
        let center = bbox.at(0.5, 0.5);
        let index = lookup.index_at(center.lon, center.lat).unwrap();
        assert!(index.contains(paris), "cell center lost the zone");
    }

    // ...and the union covers the polygon interior (sampled).
    let inside = Position::new(2.255419, 47.479083);
    assert!(boxes.iter().any(|b| b.contains(inside.lon, inside.lat)));
    for (lon, lat) in [(0.0, 45.0), (-2.0, 48.0), (5.0, 44.0), (7.0, 50.0)] {
        assert!(
            boxes.iter().any(|b| b.contains(lon, lat)),
            "({lon}, {lat}) not covered"
        );
    }
}

#[test]
fn test_compiled_output_is_schedule_independent() {
    // Different worker counts must serialize to identical bytes.
    let cancel = AtomicBool::new(false);
    let (tree_a, _) = compile(
        WORLD.as_bytes(),
        &config().with_workers(1),
        &NoopProgress,
        &cancel,
    )
    .unwrap();
    let (tree_b, _) = compile(
        WORLD.as_bytes(),
        &config().with_workers(8),
        &NoopProgress,
        &cancel,
    )
    .unwrap();

    let (mut bytes_a, mut bytes_b) = (Vec::new(), Vec::new());
    write_tree(&tree_a, &mut bytes_a).unwrap();
    write_tree(&tree_b, &mut bytes_b).unwrap();
    assert_eq!(bytes_a, bytes_b);
}
