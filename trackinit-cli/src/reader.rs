//! CSV measurement ingestion.
//!
//! Expected header: `azimuth,elevation,range,timestamp` with an optional
//! `doppler` column. When every row carries a Doppler value it is used
//! as-is; otherwise Doppler is derived from successive ranges.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use trackinit_core::ingest::{derive_doppler, RangeSample};
use trackinit_core::Measurement;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("no measurements found")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct Row {
    azimuth: f64,
    elevation: f64,
    range: f64,
    timestamp: f64,
    #[serde(default)]
    doppler: Option<f64>,
}

/// Read measurements from a CSV file, or stdin when `path` is `-`.
pub fn read_measurements(path: &Path) -> Result<Vec<Measurement>, ReadError> {
    if path.to_str() == Some("-") {
        return read_measurements_from(io::stdin().lock());
    }

    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let measurements = read_measurements_from(file)?;
    log::info!(
        "loaded {} measurements from {}",
        measurements.len(),
        path.display()
    );
    Ok(measurements)
}

pub fn read_measurements_from<R: Read>(reader: R) -> Result<Vec<Measurement>, ReadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<Row>().enumerate() {
        let row = result.map_err(|e| ReadError::Csv {
            line: e
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 2),
            message: e.to_string(),
        })?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ReadError::Empty);
    }

    if rows.iter().all(|r| r.doppler.is_some()) {
        return Ok(rows
            .iter()
            .map(|r| {
                Measurement::new(
                    r.azimuth,
                    r.elevation,
                    r.range,
                    r.doppler.unwrap_or_default(),
                    r.timestamp,
                )
            })
            .collect());
    }

    log::debug!("doppler column missing or incomplete; deriving from range rate");
    let samples: Vec<RangeSample> = rows
        .iter()
        .map(|r| RangeSample {
            azimuth: r.azimuth,
            elevation: r.elevation,
            range: r.range,
            timestamp: r.timestamp,
        })
        .collect();
    Ok(derive_doppler(&samples))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
