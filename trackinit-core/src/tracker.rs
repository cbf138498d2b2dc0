//! Measurement-to-track association and track lifecycle.
//!
//! Pure logic, no I/O. Each measurement is offered to existing tracks in
//! store order and taken by the first one whose last measurement is within
//! the time window and passes the Doppler gate or the range gate. There is
//! no motion model and no best-fit comparison between candidate tracks.
//!
//! A measurement nobody accepts starts a new tentative track, and only on
//! those cycles are the remaining tentative tracks charged a miss. Tracks
//! that miss more than `firm_threshold` cycles are deleted and their
//! identifiers returned to the pool. Firm tracks never expire.

use serde::Serialize;

use crate::config::GatingParams;
use crate::geometry::{doppler_gate, euclidean, range_gate, Point3};
use crate::ids::{IdPool, IdSlot};
use crate::store::{MissOutcome, Track, TrackStore};
use crate::types::*;

// ---------------------------------------------------------------------------
// Track events (output)
// ---------------------------------------------------------------------------

/// Events emitted per measurement for the caller to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackEvent {
    /// Measurement matched no track and started a new tentative one.
    Initiated { id: TrackId, timestamp: f64 },
    /// Measurement appended to an existing track.
    Assigned {
        id: TrackId,
        gates: GateMatch,
        timestamp: f64,
    },
    /// Tentative track reached the firm threshold.
    Confirmed { id: TrackId, timestamp: f64 },
    /// Tentative track was charged a miss.
    Missed {
        id: TrackId,
        misses: u32,
        timestamp: f64,
    },
    /// Tentative track exceeded its miss budget; identifier released.
    Deleted {
        id: TrackId,
        misses: u32,
        timestamp: f64,
    },
}

impl TrackEvent {
    pub fn id(&self) -> TrackId {
        match self {
            TrackEvent::Initiated { id, .. }
            | TrackEvent::Assigned { id, .. }
            | TrackEvent::Confirmed { id, .. }
            | TrackEvent::Missed { id, .. }
            | TrackEvent::Deleted { id, .. } => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// Association step
// ---------------------------------------------------------------------------

/// Everything the association step mutates.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    pub tracks: TrackStore,
    pub ids: IdPool,
}

impl TrackerState {
    pub fn new() -> Self {
        TrackerState::default()
    }
}

/// Associate one measurement with the tracks in `state`.
///
/// # Panics
///
/// If a track being deleted holds an identifier the pool does not consider
/// occupied. That means the store and pool have diverged, which the
/// lifecycle rules never allow.
pub fn associate(
    state: &mut TrackerState,
    measurement: &Measurement,
    params: &GatingParams,
) -> Vec<TrackEvent> {
    let mut events = Vec::new();
    let timestamp = measurement.timestamp;
    let position = measurement.position();

    for track in state.tracks.iter_mut().filter(|t| t.is_active()) {
        let Some(gates) = gate(measurement, position, track, params) else {
            continue;
        };

        let promoted = track.record_hit(*measurement, params.firm_threshold());
        log::debug!(
            "measurement at t={timestamp} assigned to track {} ({gates} gate)",
            track.id
        );
        events.push(TrackEvent::Assigned {
            id: track.id,
            gates,
            timestamp,
        });
        if promoted {
            log::info!("track {} is now firm", track.id);
            events.push(TrackEvent::Confirmed {
                id: track.id,
                timestamp,
            });
        }
        return events;
    }

    let id = state.ids.acquire();
    let new_index = state.tracks.push(Track::new(id, *measurement));
    log::debug!("measurement at t={timestamp} initiated track {id}");
    events.push(TrackEvent::Initiated { id, timestamp });

    for (index, track) in state.tracks.iter_mut().enumerate() {
        if index == new_index {
            continue;
        }
        match track.record_miss(params.firm_threshold()) {
            MissOutcome::Ignored => {}
            MissOutcome::Missed(misses) => events.push(TrackEvent::Missed {
                id: track.id,
                misses,
                timestamp,
            }),
            MissOutcome::Expired(misses) => {
                if let Err(e) = state.ids.release(track.id) {
                    panic!("track store and identifier pool diverged: {e}");
                }
                log::info!("track {} removed after {misses} misses", track.id);
                events.push(TrackEvent::Deleted {
                    id: track.id,
                    misses,
                    timestamp,
                });
            }
        }
    }

    events
}

/// Evaluate a measurement against a track's most recent measurement.
///
/// Accepts when the time window holds and at least one of the Doppler and
/// range gates holds.
fn gate(
    measurement: &Measurement,
    position: Point3,
    track: &Track,
    params: &GatingParams,
) -> Option<GateMatch> {
    let last = track.last()?;

    let distance = euclidean(position, last.position());
    let doppler_ok = doppler_gate(measurement.doppler, last.doppler, params.doppler_threshold());
    let range_ok = range_gate(distance, params.range_threshold());
    let time_ok = measurement.timestamp - last.timestamp <= params.time_threshold();

    log::trace!(
        "track {}: distance={distance:.3} doppler_ok={doppler_ok} range_ok={range_ok} time_ok={time_ok}",
        track.id
    );

    if !time_ok {
        return None;
    }
    GateMatch::from_gates(doppler_ok, range_ok)
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackerStats {
    pub total_measurements: u64,
    pub assigned: u64,
    pub tracks_initiated: u64,
    pub tracks_confirmed: u64,
    pub tracks_deleted: u64,
}

/// Associate a stream of measurements into tracks.
///
/// Owns the gating parameters and the track state. Call `update()` per
/// measurement (timestamps non-decreasing) and hand the returned events
/// to whatever reports them.
#[derive(Debug, Clone)]
pub struct Tracker {
    params: GatingParams,
    state: TrackerState,
    stats: TrackerStats,
}

impl Tracker {
    pub fn new(params: GatingParams) -> Self {
        Tracker {
            params,
            state: TrackerState::new(),
            stats: TrackerStats::default(),
        }
    }

    /// Process a single measurement. Returns the events it caused.
    pub fn update(&mut self, measurement: &Measurement) -> Vec<TrackEvent> {
        self.stats.total_measurements += 1;
        let events = associate(&mut self.state, measurement, &self.params);

        for event in &events {
            match event {
                TrackEvent::Initiated { .. } => self.stats.tracks_initiated += 1,
                TrackEvent::Assigned { .. } => self.stats.assigned += 1,
                TrackEvent::Confirmed { .. } => self.stats.tracks_confirmed += 1,
                TrackEvent::Deleted { .. } => self.stats.tracks_deleted += 1,
                TrackEvent::Missed { .. } => {}
            }
        }
        events
    }

    /// Process a whole sequence in order. Returns all events.
    pub fn run<'a, I>(&mut self, measurements: I) -> Vec<TrackEvent>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        measurements
            .into_iter()
            .flat_map(|m| self.update(m))
            .collect()
    }

    pub fn params(&self) -> &GatingParams {
        &self.params
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn tracks(&self) -> &TrackStore {
        &self.state.tracks
    }

    pub fn ids(&self) -> &IdPool {
        &self.state.ids
    }

    /// Active track holding `id`.
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.state.tracks.get(id)
    }

    pub fn active(&self) -> Vec<&Track> {
        self.state.tracks.active().collect()
    }

    pub fn firm(&self) -> Vec<&Track> {
        self.state.tracks.firm().collect()
    }

    /// Drop deleted tracks from storage. Returns count removed.
    pub fn purge_deleted(&mut self) -> usize {
        self.state.tracks.purge_deleted()
    }

    /// Serializable view of the current state for reporting.
    pub fn snapshot(&self, include_deleted: bool) -> TrackSnapshot<'_> {
        TrackSnapshot {
            params: &self.params,
            stats: self.stats,
            tracks: self
                .state
                .tracks
                .iter()
                .filter(|t| include_deleted || t.is_active())
                .collect(),
            id_pool: self.state.ids.slots(),
        }
    }
}

/// Point-in-time view of tracks and the identifier pool.
#[derive(Debug, Serialize)]
pub struct TrackSnapshot<'a> {
    pub params: &'a GatingParams,
    pub stats: TrackerStats,
    pub tracks: Vec<&'a Track>,
    pub id_pool: &'a [IdSlot],
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SlotState;

    fn params(firm: i64) -> GatingParams {
        GatingParams::new(2.0, 10.0, firm, 2.0).unwrap()
    }

    fn m(az: f64, el: f64, r: f64, dop: f64, t: f64) -> Measurement {
        Measurement::new(az, el, r, dop, t)
    }

    fn reference_measurements() -> Vec<Measurement> {
        vec![
            m(10.0, 5.0, 100.0, 5.0, 0.0),
            m(12.0, 6.0, 105.0, 6.0, 1.0),
            m(9.0, 4.0, 98.0, 4.5, 2.0),
            m(50.0, 20.0, 500.0, 50.0, 3.0),
            m(52.0, 22.0, 505.0, 52.0, 5.0),
            m(53.0, 23.0, 510.0, 53.0, 7.0),
        ]
    }

    /// A measurement far from everything and outside every time window.
    fn isolated(t: f64) -> Measurement {
        m(t * 3.0, 1.0, 10_000.0 + t * 100.0, 1_000.0 + t * 10.0, t)
    }

    fn assert_pool_matches_store(state: &TrackerState) {
        let mut active: Vec<TrackId> = state.tracks.active().map(|t| t.id).collect();
        active.sort();
        let occupied: Vec<TrackId> = state.ids.occupied().collect();
        assert_eq!(active, occupied);
    }

    #[test]
    fn test_reference_three_merge_into_firm_track() {
        let mut tracker = Tracker::new(params(3));
        let events = tracker.run(&reference_measurements()[..3]);

        assert_eq!(tracker.tracks().len(), 1);
        let track = tracker.track(TrackId(1)).unwrap();
        assert_eq!(track.measurements.len(), 3);
        assert_eq!(track.hit_count, 3);
        assert_eq!(track.status, TrackStatus::Firm);
        assert_eq!(
            events.last(),
            Some(&TrackEvent::Confirmed {
                id: TrackId(1),
                timestamp: 2.0
            })
        );
    }

    #[test]
    fn test_reference_fourth_spawns_second_track() {
        let mut tracker = Tracker::new(params(3));
        let events = tracker.run(&reference_measurements()[..4]);

        assert!(events.contains(&TrackEvent::Initiated {
            id: TrackId(2),
            timestamp: 3.0
        }));
        let track = tracker.track(TrackId(2)).unwrap();
        assert_eq!(track.status, TrackStatus::Tentative);
        assert_eq!(track.hit_count, 1);
        assert_eq!(track.miss_count, 0);

        // Firm track is not charged.
        assert_eq!(tracker.track(TrackId(1)).unwrap().miss_count, 0);
    }

    #[test]
    fn test_reference_full_run() {
        let mut tracker = Tracker::new(params(3));
        tracker.run(&reference_measurements());

        let t1 = tracker.track(TrackId(1)).unwrap();
        assert!(t1.is_firm());
        assert_eq!(t1.measurements.len(), 3);

        let t2 = tracker.track(TrackId(2)).unwrap();
        assert_eq!(t2.status, TrackStatus::Tentative);
        assert_eq!(t2.measurements.len(), 1);
        assert_eq!(t2.miss_count, 1);

        let t3 = tracker.track(TrackId(3)).unwrap();
        assert_eq!(t3.status, TrackStatus::Tentative);
        assert_eq!(t3.hit_count, 2);
        assert_eq!(t3.miss_count, 0);

        assert_eq!(tracker.ids().len(), 3);
        assert_eq!(tracker.ids().occupied().count(), 3);

        let stats = tracker.stats();
        assert_eq!(stats.total_measurements, 6);
        assert_eq!(stats.tracks_initiated, 3);
        assert_eq!(stats.assigned, 3);
        assert_eq!(stats.tracks_confirmed, 1);
        assert_eq!(stats.tracks_deleted, 0);
    }

    #[test]
    fn test_single_gate_is_enough() {
        let mut tracker = Tracker::new(params(3));
        let events = tracker.run(&reference_measurements());

        // Sixth measurement: doppler within 1.0 but ~13 units away.
        assert_eq!(
            events.last(),
            Some(&TrackEvent::Assigned {
                id: TrackId(3),
                gates: GateMatch::DopplerOnly,
                timestamp: 7.0
            })
        );
    }

    #[test]
    fn test_reference_second_track_expires() {
        let mut tracker = Tracker::new(params(3));
        tracker.run(&reference_measurements()[..4]);

        for t in [10.0, 20.0, 30.0] {
            tracker.update(&isolated(t));
            assert!(tracker.track(TrackId(2)).is_some());
        }
        let events = tracker.update(&isolated(40.0));

        assert!(events.contains(&TrackEvent::Deleted {
            id: TrackId(2),
            misses: 4,
            timestamp: 40.0
        }));
        assert!(tracker.track(TrackId(2)).is_none());
        assert_eq!(tracker.ids().state(TrackId(2)), Some(SlotState::Free));
        assert!(tracker.track(TrackId(1)).unwrap().is_firm());
        assert_pool_matches_store(tracker.state());
    }

    #[test]
    fn test_deleted_track_is_tombstoned() {
        let mut tracker = Tracker::new(params(1));
        tracker.update(&isolated(0.0));
        tracker.update(&isolated(10.0));
        tracker.update(&isolated(20.0));

        let first = tracker.tracks().iter().next().unwrap();
        assert_eq!(first.id, TrackId(1));
        assert_eq!(first.status, TrackStatus::Deleted);
        assert!(first.measurements.is_empty());
        assert_eq!(tracker.snapshot(true).tracks.len(), 3);
        assert_eq!(tracker.snapshot(false).tracks.len(), 2);

        assert_eq!(tracker.purge_deleted(), 1);
        assert_eq!(tracker.tracks().len(), 2);
    }

    #[test]
    fn test_identifier_reuse_lowest_first() {
        let mut tracker = Tracker::new(params(3));
        for t in [0.0, 10.0, 20.0, 30.0] {
            tracker.update(&isolated(t));
        }

        // Track 1 now has 3 misses; the next new track pushes it over.
        let events = tracker.update(&isolated(40.0));
        assert!(events.contains(&TrackEvent::Initiated {
            id: TrackId(5),
            timestamp: 40.0
        }));
        assert!(events.contains(&TrackEvent::Deleted {
            id: TrackId(1),
            misses: 4,
            timestamp: 40.0
        }));

        // Lowest free identifier is reissued before minting 6.
        let events = tracker.update(&isolated(50.0));
        assert_eq!(events[0].id(), TrackId(1));
        assert!(events.contains(&TrackEvent::Deleted {
            id: TrackId(2),
            misses: 4,
            timestamp: 50.0
        }));

        let events = tracker.update(&isolated(60.0));
        assert_eq!(events[0].id(), TrackId(2));
        assert_eq!(tracker.ids().len(), 5);
        assert_pool_matches_store(tracker.state());
    }

    #[test]
    fn test_greedy_first_fit() {
        let mut tracker = Tracker::new(params(3));
        tracker.update(&m(10.0, 5.0, 100.0, 5.0, 0.0));
        tracker.update(&m(60.0, 5.0, 100.0, 50.0, 0.0));
        assert_eq!(tracker.tracks().len(), 2);

        // Doppler-close to track 1, position-close to track 2.
        let events = tracker.update(&m(60.0, 5.0, 101.0, 5.5, 1.0));
        assert_eq!(
            events,
            vec![TrackEvent::Assigned {
                id: TrackId(1),
                gates: GateMatch::DopplerOnly,
                timestamp: 1.0
            }]
        );
        assert_eq!(tracker.track(TrackId(1)).unwrap().measurements.len(), 2);
        assert_eq!(tracker.track(TrackId(2)).unwrap().measurements.len(), 1);
    }

    #[test]
    fn test_accepted_cycles_do_not_charge_misses() {
        let mut tracker = Tracker::new(params(3));
        tracker.update(&m(10.0, 5.0, 100.0, 5.0, 0.0));
        tracker.update(&m(60.0, 5.0, 500.0, 50.0, 0.0));
        assert_eq!(tracker.track(TrackId(1)).unwrap().miss_count, 1);

        // Feed track 2 well past the point where track 1 would have expired
        // had it been charged every cycle.
        for i in 1..=8 {
            let t = i as f64 * 0.5;
            let events = tracker.update(&m(60.0, 5.0, 500.0, 50.0, t));
            assert_eq!(events[0].id(), TrackId(2));
        }
        let t1 = tracker.track(TrackId(1)).unwrap();
        assert_eq!(t1.status, TrackStatus::Tentative);
        assert_eq!(t1.miss_count, 1);
        assert!(tracker.track(TrackId(2)).unwrap().is_firm());
    }

    #[test]
    fn test_new_track_not_charged_on_creation() {
        let mut tracker = Tracker::new(params(3));
        let events = tracker.update(&isolated(0.0));
        assert_eq!(
            events,
            vec![TrackEvent::Initiated {
                id: TrackId(1),
                timestamp: 0.0
            }]
        );
        assert_eq!(tracker.track(TrackId(1)).unwrap().miss_count, 0);

        let events = tracker.update(&isolated(10.0));
        assert_eq!(
            events,
            vec![
                TrackEvent::Initiated {
                    id: TrackId(2),
                    timestamp: 10.0
                },
                TrackEvent::Missed {
                    id: TrackId(1),
                    misses: 1,
                    timestamp: 10.0
                },
            ]
        );
        assert_eq!(tracker.track(TrackId(2)).unwrap().miss_count, 0);
    }

    #[test]
    fn test_hit_resets_miss_count() {
        let mut tracker = Tracker::new(params(3));
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        tracker.update(&m(90.0, 0.0, 900.0, 90.0, 0.5));
        tracker.update(&m(180.0, 0.0, 900.0, 180.0, 1.0));
        assert_eq!(tracker.track(TrackId(1)).unwrap().miss_count, 2);

        tracker.update(&m(0.0, 0.0, 101.0, 5.0, 1.5));
        let t1 = tracker.track(TrackId(1)).unwrap();
        assert_eq!(t1.miss_count, 0);
        assert_eq!(t1.hit_count, 2);
    }

    #[test]
    fn test_range_gate_boundary_not_accepted() {
        // Same bearing: cartesian distance equals the range difference.
        // Doppler difference equals its threshold too.
        let mut tracker = Tracker::new(params(3));
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        let events = tracker.update(&m(0.0, 0.0, 110.0, 7.0, 1.0));
        assert!(matches!(events[0], TrackEvent::Initiated { id: TrackId(2), .. }));

        let mut tracker = Tracker::new(GatingParams::new(2.0, 10.5, 3, 2.0).unwrap());
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        let events = tracker.update(&m(0.0, 0.0, 110.0, 7.0, 1.0));
        assert_eq!(
            events[0],
            TrackEvent::Assigned {
                id: TrackId(1),
                gates: GateMatch::RangeOnly,
                timestamp: 1.0
            }
        );
    }

    #[test]
    fn test_doppler_gate_boundary_not_accepted() {
        let mut tracker = Tracker::new(GatingParams::new(2.0, 10.0, 3, 2.0).unwrap());
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        let events = tracker.update(&m(0.0, 0.0, 200.0, 7.0, 1.0));
        assert!(matches!(events[0], TrackEvent::Initiated { .. }));

        let events = tracker.update(&m(0.0, 0.0, 300.0, 8.5, 1.5));
        assert_eq!(
            events[0],
            TrackEvent::Assigned {
                id: TrackId(2),
                gates: GateMatch::DopplerOnly,
                timestamp: 1.5
            }
        );
    }

    #[test]
    fn test_time_window_inclusive() {
        let mut tracker = Tracker::new(params(3));
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        let events = tracker.update(&m(0.0, 0.0, 101.0, 5.0, 2.0));
        assert_eq!(
            events[0],
            TrackEvent::Assigned {
                id: TrackId(1),
                gates: GateMatch::Both,
                timestamp: 2.0
            }
        );

        // Just past the window: both gates hold but the track is too old.
        let events = tracker.update(&m(0.0, 0.0, 102.0, 5.0, 4.001));
        assert!(matches!(events[0], TrackEvent::Initiated { id: TrackId(2), .. }));
    }

    #[test]
    fn test_promotion_at_threshold_and_sticky() {
        let mut tracker = Tracker::new(params(5));
        for i in 0..4 {
            tracker.update(&m(0.0, 0.0, 100.0 + i as f64, 5.0, i as f64));
        }
        assert_eq!(
            tracker.track(TrackId(1)).unwrap().status,
            TrackStatus::Tentative
        );
        let events = tracker.update(&m(0.0, 0.0, 104.0, 5.0, 4.0));
        assert!(events.contains(&TrackEvent::Confirmed {
            id: TrackId(1),
            timestamp: 4.0
        }));

        // Many unassigned cycles later it is still firm.
        for i in 0..20 {
            tracker.update(&isolated(100.0 + i as f64 * 10.0));
        }
        let t1 = tracker.track(TrackId(1)).unwrap();
        assert!(t1.is_firm());
        assert_eq!(t1.hit_count, 5);
        assert_eq!(t1.miss_count, 0);
    }

    #[test]
    fn test_non_positive_firm_threshold_never_reaches_tracker() {
        for firm in [0, -1, -7] {
            assert!(matches!(
                GatingParams::new(2.0, 10.0, firm, 2.0),
                Err(TrackError::InvalidFirmThreshold(n)) if n == firm
            ));
        }

        // Every constructible params value carries a usable threshold.
        let tracker = Tracker::new(GatingParams::default());
        assert!(tracker.params().firm_threshold() >= 1);
        let tracker = Tracker::new(params(1));
        assert_eq!(tracker.params().firm_threshold(), 1);
    }

    #[test]
    fn test_active_and_firm_views() {
        let mut tracker = Tracker::new(params(3));
        tracker.run(&reference_measurements()[..4]);
        for t in [10.0, 20.0, 30.0, 40.0] {
            tracker.update(&isolated(t));
        }

        // Track 2 expired on the last cycle; track 1 is the only firm one.
        let active: Vec<TrackId> = tracker.active().iter().map(|t| t.id).collect();
        assert_eq!(
            active,
            vec![TrackId(1), TrackId(3), TrackId(4), TrackId(5), TrackId(6)]
        );
        let firm: Vec<TrackId> = tracker.firm().iter().map(|t| t.id).collect();
        assert_eq!(firm, vec![TrackId(1)]);
        assert_eq!(tracker.tracks().len(), 6);
    }

    #[test]
    fn test_firm_threshold_one() {
        let mut tracker = Tracker::new(params(1));
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        assert_eq!(
            tracker.track(TrackId(1)).unwrap().status,
            TrackStatus::Tentative
        );
        tracker.update(&m(0.0, 0.0, 101.0, 5.0, 1.0));
        assert!(tracker.track(TrackId(1)).unwrap().is_firm());
    }

    #[test]
    fn test_nan_measurement_never_gates() {
        let mut tracker = Tracker::new(params(3));
        tracker.update(&m(0.0, 0.0, 100.0, 5.0, 0.0));
        let events = tracker.update(&m(f64::NAN, 0.0, 100.0, f64::NAN, 0.5));
        assert!(matches!(events[0], TrackEvent::Initiated { id: TrackId(2), .. }));

        // The NaN track never accepts anything either.
        let events = tracker.update(&m(0.0, 0.0, 100.0, 5.0, 1.0));
        assert_eq!(events[0].id(), TrackId(1));
        assert_eq!(tracker.track(TrackId(2)).unwrap().measurements.len(), 1);
    }

    #[test]
    fn test_associate_on_explicit_state() {
        let p = params(3);
        let mut state = TrackerState::new();
        for meas in reference_measurements().iter().take(3) {
            associate(&mut state, meas, &p);
        }
        let before = state.clone();
        associate(&mut state, &reference_measurements()[3], &p);

        assert_eq!(before.tracks.len(), 1);
        assert_eq!(state.tracks.len(), 2);
        assert_eq!(state.ids.occupied().count(), 2);
    }

    #[test]
    fn test_pool_tracks_store_over_long_run() {
        // Deterministic pseudo-random stream.
        let mut seed: u64 = 0x2545F4914F6CDD1D;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % 10_000) as f64 / 10_000.0
        };

        let mut state = TrackerState::new();
        let p = GatingParams::new(1.0, 15.0, 2, 1.5).unwrap();
        let mut t = 0.0;
        for _ in 0..500 {
            t += next();
            let meas = m(
                next() * 360.0,
                next() * 30.0,
                50.0 + next() * 100.0,
                next() * 20.0,
                t,
            );
            associate(&mut state, &meas, &p);
            assert_pool_matches_store(&state);
        }
        assert!(state.ids.len() >= state.tracks.active().count());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut tracker = Tracker::new(params(3));
        tracker.run(&reference_measurements());
        let json = serde_json::to_value(tracker.snapshot(false)).unwrap();

        assert_eq!(json["tracks"].as_array().unwrap().len(), 3);
        assert_eq!(json["tracks"][0]["status"], "firm");
        assert_eq!(json["tracks"][0]["id"], 1);
        assert_eq!(json["id_pool"][1]["state"], "occupied");
        assert_eq!(json["params"]["firm_threshold"], 3);
        assert_eq!(json["stats"]["tracks_initiated"], 3);
    }

    #[test]
    fn test_event_serializes_tagged() {
        let event = TrackEvent::Assigned {
            id: TrackId(4),
            gates: GateMatch::RangeOnly,
            timestamp: 1.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "assigned");
        assert_eq!(json["gates"], "range_only");
        assert_eq!(json["id"], 4);
    }
}
