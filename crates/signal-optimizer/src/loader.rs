//! Request loading and validation
//!
//! The document is first read into permissive raw structs, then checked
//! field by field so malformed observations never reach the scorer.

use crate::{OptimizationRequest, OptimizerError, Result, TrafficObservation, UNKNOWN_INTERSECTION};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Raw request document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    intersection_id: Option<String>,
    traffic_data: Option<Vec<RawObservation>>,
}

/// Raw per-direction observation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObservation {
    direction: Option<String>,
    vehicle_count: Option<i64>,
    queue_length: Option<f64>,
    avg_speed: Option<f64>,
}

fn invalid(index: usize, field: &'static str, reason: impl Into<String>) -> OptimizerError {
    OptimizerError::InvalidField {
        index,
        field,
        reason: reason.into(),
    }
}

/// Upper bound on queue length and speed; keeps every priority finite
pub const MAX_MEASUREMENT: f64 = 1_000_000.0;

/// Non-negative finite measurement no larger than [`MAX_MEASUREMENT`]
fn measurement(index: usize, field: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if (0.0..=MAX_MEASUREMENT).contains(&v) => Ok(v),
        Some(v) => Err(invalid(
            index,
            field,
            format!("expected a number in 0..={}, got {}", MAX_MEASUREMENT, v),
        )),
        None => Err(OptimizerError::MissingField { index, field }),
    }
}

fn validate_observation(index: usize, raw: RawObservation) -> Result<TrafficObservation> {
    let direction = match raw.direction {
        Some(d) if !d.trim().is_empty() => d,
        Some(_) => return Err(invalid(index, "direction", "must not be empty")),
        None => return Err(OptimizerError::MissingField { index, field: "direction" }),
    };

    let vehicle_count = match raw.vehicle_count {
        Some(n) => u32::try_from(n)
            .map_err(|_| invalid(index, "vehicleCount", format!("expected 0..={}, got {}", u32::MAX, n)))?,
        None => return Err(OptimizerError::MissingField { index, field: "vehicleCount" }),
    };

    let queue_length = measurement(index, "queueLength", raw.queue_length)?;
    let avg_speed = measurement(index, "avgSpeed", raw.avg_speed)?;

    Ok(TrafficObservation {
        direction,
        vehicle_count,
        queue_length,
        avg_speed,
    })
}

fn validate(raw: RawRequest) -> Result<OptimizationRequest> {
    let intersection_id = raw
        .intersection_id
        .unwrap_or_else(|| UNKNOWN_INTERSECTION.to_string());

    let mut seen = HashSet::new();
    let mut traffic_data = Vec::new();

    for (i, raw_obs) in raw.traffic_data.unwrap_or_default().into_iter().enumerate() {
        let obs = validate_observation(i, raw_obs)?;
        if !seen.insert(obs.direction.clone()) {
            return Err(OptimizerError::DuplicateDirection(obs.direction));
        }
        traffic_data.push(obs);
    }

    debug!(
        "Validated request for {}: {} directions",
        intersection_id,
        traffic_data.len()
    );

    Ok(OptimizationRequest {
        intersection_id,
        traffic_data,
    })
}

/// Parse and validate a request document
pub fn parse_request(json: &str) -> Result<OptimizationRequest> {
    validate(serde_json::from_str(json)?)
}

/// Parse and validate a request body
pub fn parse_request_slice(bytes: &[u8]) -> Result<OptimizationRequest> {
    validate(serde_json::from_slice(bytes)?)
}

/// Read, parse and validate a request from any reader (e.g. stdin)
pub fn read_request(mut reader: impl Read) -> Result<OptimizationRequest> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_request(&input)
}

/// Load a request document from a JSON file
pub fn load_request(path: impl AsRef<Path>) -> Result<OptimizationRequest> {
    let path = path.as_ref();
    info!("Loading traffic snapshot from {:?}", path);

    let file = File::open(path)?;
    let raw: RawRequest = serde_json::from_reader(BufReader::new(file))?;
    let request = validate(raw)?;

    info!(
        "Loaded {} observations for intersection {}",
        request.traffic_data.len(),
        request.intersection_id
    );

    Ok(request)
}
