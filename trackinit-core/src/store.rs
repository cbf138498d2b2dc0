//! Track records and the ordered store that owns them.
//!
//! Hit/miss counters and status live on each `Track`, so deleting a track
//! never disturbs the bookkeeping of its neighbours. Deleted tracks stay in
//! the store as tombstones (status `Deleted`, measurements dropped) until
//! `purge_deleted()` is called; identifiers are never derived from storage
//! position.

use serde::Serialize;

use crate::types::{Measurement, TrackId, TrackStatus};

/// Result of charging a track with a missed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissOutcome {
    /// Firm or deleted tracks are not charged.
    Ignored,
    /// Miss counted; track still tentative.
    Missed(u32),
    /// Miss count exceeded the firm threshold; track is now deleted.
    Expired(u32),
}

/// One candidate or confirmed object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: TrackId,
    pub status: TrackStatus,
    pub hit_count: u32,
    pub miss_count: u32,
    pub measurements: Vec<Measurement>,
}

impl Track {
    /// Start a tentative track from its first measurement.
    pub fn new(id: TrackId, first: Measurement) -> Self {
        Track {
            id,
            status: TrackStatus::Tentative,
            hit_count: 1,
            miss_count: 0,
            measurements: vec![first],
        }
    }

    /// Most recent measurement, `None` once deleted.
    pub fn last(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    pub fn first_seen(&self) -> Option<f64> {
        self.measurements.first().map(|m| m.timestamp)
    }

    pub fn last_seen(&self) -> Option<f64> {
        self.last().map(|m| m.timestamp)
    }

    pub fn is_active(&self) -> bool {
        self.status != TrackStatus::Deleted
    }

    pub fn is_firm(&self) -> bool {
        self.status == TrackStatus::Firm
    }

    /// Append an accepted measurement. Returns true if this hit promoted
    /// the track to firm.
    pub fn record_hit(&mut self, measurement: Measurement, firm_threshold: u32) -> bool {
        self.measurements.push(measurement);

        if self.status != TrackStatus::Tentative {
            return false;
        }

        self.hit_count += 1;
        self.miss_count = 0;
        if self.hit_count >= firm_threshold {
            self.status = TrackStatus::Firm;
            return true;
        }
        false
    }

    /// Charge one missed cycle; deletes the track when misses exceed
    /// `firm_threshold`.
    pub fn record_miss(&mut self, firm_threshold: u32) -> MissOutcome {
        if self.status != TrackStatus::Tentative {
            return MissOutcome::Ignored;
        }

        self.miss_count += 1;
        if self.miss_count > firm_threshold {
            self.delete();
            MissOutcome::Expired(self.miss_count)
        } else {
            MissOutcome::Missed(self.miss_count)
        }
    }

    fn delete(&mut self) {
        self.status = TrackStatus::Deleted;
        self.measurements.clear();
    }
}

// ---------------------------------------------------------------------------
// Track store
// ---------------------------------------------------------------------------

/// Tracks in creation order. Scan order for association is store order.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
}

impl TrackStore {
    pub fn new() -> Self {
        TrackStore { tracks: Vec::new() }
    }

    /// Append a track; returns its storage index.
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Track> {
        self.tracks.iter_mut()
    }

    /// Active (non-deleted) track holding `id`.
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.is_active() && t.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.iter().filter(|t| t.is_active())
    }

    pub fn firm(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.iter().filter(|t| t.is_firm())
    }

    /// Drop tombstones from storage. Returns count removed.
    pub fn purge_deleted(&mut self) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(Track::is_active);
        before - self.tracks.len()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl<'a> IntoIterator for &'a TrackStore {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
