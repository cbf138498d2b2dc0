//! Text and JSON rendering of tracker state.

use comfy_table::{Cell, Table};
use serde::Serialize;

use trackinit_core::{TrackEvent, TrackSnapshot};

/// Full JSON document printed by `--json`.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    #[serde(flatten)]
    pub snapshot: TrackSnapshot<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<&'a [TrackEvent]>,
}

pub fn print_json(report: &JsonReport<'_>) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_events(events: &[TrackEvent]) {
    for event in events {
        println!("{}", describe_event(event));
    }
}

fn describe_event(event: &TrackEvent) -> String {
    match event {
        TrackEvent::Initiated { id, timestamp } => {
            format!("t={timestamp:<8} measurement initiated track {id}")
        }
        TrackEvent::Assigned {
            id,
            gates,
            timestamp,
        } => format!("t={timestamp:<8} measurement assigned to track {id} ({gates} gate)"),
        TrackEvent::Confirmed { id, timestamp } => {
            format!("t={timestamp:<8} track {id} is now firm")
        }
        TrackEvent::Missed {
            id,
            misses,
            timestamp,
        } => format!("t={timestamp:<8} track {id} missed ({misses})"),
        TrackEvent::Deleted {
            id,
            misses,
            timestamp,
        } => format!("t={timestamp:<8} track {id} removed after {misses} misses"),
    }
}

pub fn print_summary(snapshot: &TrackSnapshot<'_>) {
    let p = snapshot.params;
    let s = snapshot.stats;

    println!();
    println!(
        "Gating: doppler < {}, range < {}, time <= {}, firm after {} hits",
        p.doppler_threshold(),
        p.range_threshold(),
        p.time_threshold(),
        p.firm_threshold()
    );
    println!(
        "Measurements: {} processed, {} assigned, {} initiated tracks",
        s.total_measurements, s.assigned, s.tracks_initiated
    );
    println!(
        "Tracks: {} confirmed, {} deleted",
        s.tracks_confirmed, s.tracks_deleted
    );
    println!();

    if snapshot.tracks.is_empty() {
        println!("No tracks.");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            "ID", "Status", "Hits", "Misses", "Points", "First t", "Last t", "Last Az",
            "Last El", "Last R",
        ]);

        for track in &snapshot.tracks {
            let last = track.last();
            table.add_row(vec![
                Cell::new(track.id),
                Cell::new(track.status),
                Cell::new(track.hit_count),
                Cell::new(track.miss_count),
                Cell::new(track.measurements.len()),
                Cell::new(fmt_opt(track.first_seen(), 2)),
                Cell::new(fmt_opt(track.last_seen(), 2)),
                Cell::new(fmt_opt(last.map(|m| m.azimuth), 1)),
                Cell::new(fmt_opt(last.map(|m| m.elevation), 1)),
                Cell::new(fmt_opt(last.map(|m| m.range), 1)),
            ]);
        }

        println!("{table}");
    }

    if !snapshot.id_pool.is_empty() {
        println!();
        let mut table = Table::new();
        table.set_header(vec!["Track ID", "State"]);
        for slot in snapshot.id_pool {
            table.add_row(vec![Cell::new(slot.id), Cell::new(slot.state)]);
        }
        println!("{table}");
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or("-".into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
