//! Coordinate conversion and gating predicates.
//!
//! All functions are pure. Non-finite inputs propagate: NaN distances or
//! Doppler differences make every gate comparison false.

/// Cartesian position `(x, y, z)` in the same length units as the range.
pub type Point3 = (f64, f64, f64);

/// Spherical (degrees, degrees, range) to Cartesian.
pub fn to_cartesian(azimuth_deg: f64, elevation_deg: f64, range: f64) -> Point3 {
    let az = azimuth_deg.to_radians();
    let el = elevation_deg.to_radians();
    (
        range * el.cos() * az.cos(),
        range * el.cos() * az.sin(),
        range * el.sin(),
    )
}

/// Euclidean distance between two Cartesian points.
pub fn euclidean(a: Point3, b: Point3) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    let dz = a.2 - b.2;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// True when the Doppler rates differ by strictly less than `threshold`.
pub fn doppler_gate(d1: f64, d2: f64, threshold: f64) -> bool {
    (d1 - d2).abs() < threshold
}

/// True when `distance` is strictly inside `threshold`.
pub fn range_gate(distance: f64, threshold: f64) -> bool {
    distance < threshold
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
