//! Geographic positions and axis-aligned boxes.
//!
//! Coordinates are 32-bit floats in degrees, `longitude ∈ [-180, 180]`,
//! `latitude ∈ [-90, 90]`. Position equality is bitwise: the builder and
//! the lookup must agree exactly on cell corners, so no epsilon comparison
//! is ever applied.

use std::hash::{Hash, Hasher};

/// Mean Earth radius in meters, used by [`haversine_m`].
pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// A `(longitude, latitude)` pair in degrees.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub lon: f32,
    pub lat: f32,
}

impl Position {
    pub const fn new(lon: f32, lat: f32) -> Self {
        Self { lon, lat }
    }
}

// Bitwise-exact equality. Cell corners are produced by repeated midpoint
// bisection on both sides of the serialization boundary; they either match
// bit-for-bit or not at all.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.lon.to_bits() == other.lon.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon.to_bits().hash(state);
        self.lat.to_bits().hash(state);
    }
}

/// Axis-aligned rectangle `(SW, NE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub sw: Position,
    pub ne: Position,
}

impl BBox {
    /// The whole valid coordinate domain.
    pub const WORLD: BBox = BBox {
        sw: Position::new(-180.0, -90.0),
        ne: Position::new(180.0, 90.0),
    };

    pub const fn new(sw: Position, ne: Position) -> Self {
        Self { sw, ne }
    }

    /// Bisect along the axis selected by `level` parity: even levels split
    /// longitude (a vertical cut), odd levels split latitude.
    ///
    /// Returns `(hi, lo)` where `hi` owns the half with the greater
    /// coordinate on the split axis. Alternating the axis per level makes
    /// a root-to-leaf path geohash-compatible: at depth `5k` the cell grid
    /// equals a `k`-character geohash.
    pub fn split(&self, level: u8) -> (BBox, BBox) {
        if level % 2 == 0 {
            let mid = (self.sw.lon + self.ne.lon) / 2.0;
            let hi = BBox::new(Position::new(mid, self.sw.lat), self.ne);
            let lo = BBox::new(self.sw, Position::new(mid, self.ne.lat));
            (hi, lo)
        } else {
            let mid = (self.sw.lat + self.ne.lat) / 2.0;
            let hi = BBox::new(Position::new(self.sw.lon, mid), self.ne);
            let lo = BBox::new(self.sw, Position::new(self.ne.lon, mid));
            (hi, lo)
        }
    }

    /// Closed containment test (edges count as inside).
    pub fn contains(&self, lon: f32, lat: f32) -> bool {
        lon >= self.sw.lon && lon <= self.ne.lon && lat >= self.sw.lat && lat <= self.ne.lat
    }

    /// Corners in walk order `[SW, NW, NE, SE]`, forming the closed 4-edge
    /// ring used by the box-side ray cast.
    pub fn corners(&self) -> [Position; 4] {
        [
            self.sw,
            Position::new(self.sw.lon, self.ne.lat),
            self.ne,
            Position::new(self.ne.lon, self.sw.lat),
        ]
    }

    /// Interior point at fractional offsets `(fx, fy)` from the SW corner.
    pub fn at(&self, fx: f32, fy: f32) -> Position {
        Position::new(
            lerp(self.sw.lon, self.ne.lon, fx),
            lerp(self.sw.lat, self.ne.lat, fy),
        )
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Great-circle distance between two positions in meters.
///
/// Haversine on a spherical Earth of radius [`EARTH_RADIUS_M`]. Used only
/// by the ring reducer, where a few meters of error against a geodesic are
/// irrelevant next to the 500 m thinning threshold.
pub fn haversine_m(a: Position, b: Position) -> f64 {
    let lat_a = (a.lat as f64).to_radians();
    let lat_b = (b.lat as f64).to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.lon as f64 - a.lon as f64).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bitwise_equality() {
        assert_eq!(Position::new(1.5, -2.5), Position::new(1.5, -2.5));
        assert_ne!(Position::new(0.0, 0.0), Position::new(-0.0, 0.0));
        let nan = Position::new(f32::NAN, 0.0);
        assert_eq!(nan, nan); // same bit pattern
    }

    #[test]
    fn test_even_level_splits_longitude() {
        let (hi, lo) = BBox::WORLD.split(0);
        assert_eq!(hi.sw, Position::new(0.0, -90.0));
        assert_eq!(hi.ne, Position::new(180.0, 90.0));
        assert_eq!(lo.sw, Position::new(-180.0, -90.0));
        assert_eq!(lo.ne, Position::new(0.0, 90.0));
    }

    #[test]
    fn test_odd_level_splits_latitude() {
        let (hi, lo) = BBox::WORLD.split(1);
        assert_eq!(hi.sw, Position::new(-180.0, 0.0));
        assert_eq!(lo.ne, Position::new(180.0, 0.0));
    }

    #[test]
    fn test_alternating_descent_shrinks_both_axes() {
        let mut bbox = BBox::WORLD;
        for level in 0..10 {
            let (hi, _) = bbox.split(level);
            bbox = hi;
        }
        // Five longitude halvings and five latitude halvings.
        assert_eq!(bbox.ne.lon - bbox.sw.lon, 360.0 / 32.0);
        assert_eq!(bbox.ne.lat - bbox.sw.lat, 180.0 / 32.0);
    }

    #[test]
    fn test_split_halves_partition_parent() {
        let bbox = BBox::new(Position::new(-10.0, 20.0), Position::new(30.0, 60.0));
        let (hi, lo) = bbox.split(0);
        assert_eq!(lo.ne.lon, hi.sw.lon);
        assert_eq!(lo.sw, bbox.sw);
        assert_eq!(hi.ne, bbox.ne);
    }

    #[test]
    fn test_at_interpolates_interior() {
        let bbox = BBox::new(Position::new(0.0, 0.0), Position::new(10.0, 10.0));
        let p = bbox.at(0.1, 0.9);
        assert_eq!(p, Position::new(1.0, 9.0));
    }

    #[test]
    fn test_haversine_equator_degree() {
        // One degree of longitude at the equator is ~111.2 km.
        let d = haversine_m(Position::new(0.0, 0.0), Position::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 200.0, "got {}", d);
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = Position::new(12.5, -33.0);
        assert_eq!(haversine_m(p, p), 0.0);
    }
}
