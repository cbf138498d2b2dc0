//! Shared types, error enum, and measurement record for trackinit-core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors produced by trackinit-core.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("firm threshold must be a positive integer, got {0}")]
    InvalidFirmThreshold(i64),
    #[error("unknown initiation mode: {0} (expected 3-state, 5-state or 7-state)")]
    UnknownMode(String),
    #[error("identifier {0} is not occupied")]
    IdNotOccupied(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// One sensor report: spherical position, Doppler rate, and timestamp.
///
/// Angles are in degrees. Timestamps must be non-decreasing across the
/// stream fed to the tracker; this is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
    pub doppler: f64,
    pub timestamp: f64,
}

impl Measurement {
    pub fn new(azimuth: f64, elevation: f64, range: f64, doppler: f64, timestamp: f64) -> Self {
        Measurement {
            azimuth,
            elevation,
            range,
            doppler,
            timestamp,
        }
    }

    /// Cartesian position of this measurement.
    pub fn position(&self) -> crate::geometry::Point3 {
        crate::geometry::to_cartesian(self.azimuth, self.elevation, self.range)
    }
}

impl From<(f64, f64, f64, f64, f64)> for Measurement {
    fn from((az, el, r, dop, t): (f64, f64, f64, f64, f64)) -> Self {
        Measurement::new(az, el, r, dop, t)
    }
}

// ---------------------------------------------------------------------------
// Track identity and status
// ---------------------------------------------------------------------------

/// Track identifier handed out by the identifier pool. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    Tentative,
    Firm,
    Deleted,
}

impl std::fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackStatus::Tentative => write!(f, "tentative"),
            TrackStatus::Firm => write!(f, "firm"),
            TrackStatus::Deleted => write!(f, "deleted"),
        }
    }
}

/// Which gates a measurement satisfied when it was accepted by a track.
///
/// Acceptance only needs one; the distinction is kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMatch {
    Both,
    DopplerOnly,
    RangeOnly,
}

impl GateMatch {
    /// Combine the two gate outcomes. `None` when neither gate holds.
    pub fn from_gates(doppler_ok: bool, range_ok: bool) -> Option<Self> {
        match (doppler_ok, range_ok) {
            (true, true) => Some(GateMatch::Both),
            (true, false) => Some(GateMatch::DopplerOnly),
            (false, true) => Some(GateMatch::RangeOnly),
            (false, false) => None,
        }
    }
}

impl std::fmt::Display for GateMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateMatch::Both => write!(f, "doppler and range"),
            GateMatch::DopplerOnly => write!(f, "doppler"),
            GateMatch::RangeOnly => write!(f, "range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
