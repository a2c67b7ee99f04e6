//! Direction priority scoring
//!
//! Implements the congestion-and-speed priority model:
//! priority = (w_v·vehicles + w_q·queue) · (1 + max(0, (v_free − speed) / v_free))
//!
//! Queue length dominates congestion; slow traffic amplifies it up to 2×
//! under total standstill. Speeds above free flow earn no bonus.

use crate::{PriorityEntry, TrafficObservation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default scoring weights
pub const W_VEHICLES: f64 = 0.4;
pub const W_QUEUE: f64 = 0.6;

/// Speed at which the slow-traffic penalty vanishes (km/h)
pub const FREE_FLOW_SPEED: f64 = 50.0;

/// Decimal digits kept on priority scores
pub const PRIORITY_DIGITS: i32 = 2;

/// Scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Weight for approaching/queued vehicle count
    pub w_vehicles: f64,
    /// Weight for queue length
    pub w_queue: f64,
    /// Speed at or above which no penalty applies
    pub free_flow_speed: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            w_vehicles: W_VEHICLES,
            w_queue: W_QUEUE,
            free_flow_speed: FREE_FLOW_SPEED,
        }
    }
}

/// Round to `digits` decimals, halves away from zero.
///
/// 0.125 becomes 0.13 at two digits. Values whose binary representation
/// falls just below a half (e.g. 1.005) round down.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Score a single direction with the given weights
pub fn score_with(
    vehicle_count: u32,
    queue_length: f64,
    avg_speed: f64,
    config: &ScorerConfig,
) -> f64 {
    let congestion = vehicle_count as f64 * config.w_vehicles + queue_length * config.w_queue;
    let speed_penalty = ((config.free_flow_speed - avg_speed) / config.free_flow_speed).max(0.0);

    round_to(congestion * (1.0 + speed_penalty), PRIORITY_DIGITS)
}

/// Score a single direction with the default weights
pub fn score(vehicle_count: u32, queue_length: f64, avg_speed: f64) -> f64 {
    score_with(vehicle_count, queue_length, avg_speed, &ScorerConfig::default())
}

/// Score every observation and rank by descending priority.
///
/// The sort is stable: equal priorities keep their input order.
pub fn score_observations(
    observations: &[TrafficObservation],
    config: &ScorerConfig,
) -> Vec<PriorityEntry> {
    let mut entries: Vec<PriorityEntry> = observations
        .iter()
        .map(|obs| {
            let priority = score_with(obs.vehicle_count, obs.queue_length, obs.avg_speed, config);
            debug!(
                "Scored {}: {:.2} (vehicles={}, queue={:.1}, speed={:.1})",
                obs.direction, priority, obs.vehicle_count, obs.queue_length, obs.avg_speed
            );
            PriorityEntry {
                direction: obs.direction.clone(),
                priority,
                vehicle_count: obs.vehicle_count,
                queue_length: obs.queue_length,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    entries
}
