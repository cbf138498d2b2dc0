//! Turn raw position reports into measurements.
//!
//! Sensors that only report range get a Doppler rate derived from
//! successive range samples.

use serde::Deserialize;

use crate::types::Measurement;

/// A position report without Doppler.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangeSample {
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
    pub timestamp: f64,
}

/// Range rate between consecutive samples.
///
/// The first sample, and any sample whose time delta is not positive, gets
/// a Doppler of zero.
pub fn derive_doppler(samples: &[RangeSample]) -> Vec<Measurement> {
    let mut out = Vec::with_capacity(samples.len());
    let mut prev: Option<&RangeSample> = None;

    for s in samples {
        let doppler = match prev {
            Some(p) if s.timestamp - p.timestamp > 0.0 => {
                (s.range - p.range) / (s.timestamp - p.timestamp)
            }
            _ => 0.0,
        };
        out.push(Measurement::new(
            s.azimuth,
            s.elevation,
            s.range,
            doppler,
            s.timestamp,
        ));
        prev = Some(s);
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
