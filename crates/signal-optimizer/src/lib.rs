//! Traffic Signal Optimizer
//!
//! Turns a snapshot of per-direction traffic metrics at one intersection into
//! a recommended signal cycle (green/yellow/red per direction) plus summary
//! statistics.
//!
//! # Pipeline
//!
//! ```text
//! observations → priority scoring → ranking → proportional allocation → summary
//! ```
//!
//! # Priority Model
//!
//! ```text
//! congestion = 0.4·vehicles + 0.6·queue
//! penalty    = max(0, (50 − speed) / 50)
//! priority   = congestion · (1 + penalty)
//! ```
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | cycle    | 120 s | Total cycle time per direction slot |
//! | green    | 15-45 s | Green clamp when any priority is non-zero |
//! | default  | 25 s  | Green for every direction when all priorities are zero |
//! | yellow   | 3 s   | Fixed yellow; 4 × yellow is deducted before allocation |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod allocator;
pub mod config;
pub mod loader;
pub mod optimizer;
pub mod scorer;
pub mod simulator;
pub mod summary;

pub use allocator::CycleConfig;
pub use config::OptimizerConfig;
pub use optimizer::{optimize, optimize_now};
pub use scorer::ScorerConfig;

/// Error message reported when a request carries no observations
pub const NO_TRAFFIC_DATA: &str = "No traffic data provided";

/// Intersection id used when the request omits one
pub const UNKNOWN_INTERSECTION: &str = "unknown";

#[derive(Error, Debug)]
pub enum OptimizerError {
    // Inline only, not a source: `{:#}` chains would repeat the message
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    #[error("trafficData[{index}]: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },
    #[error("trafficData[{index}]: invalid '{field}': {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },
    #[error("Duplicate direction: {0}")]
    DuplicateDirection(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;

impl From<std::io::Error> for OptimizerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Traffic conditions observed on one approach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficObservation {
    pub direction: String,
    /// Vehicles currently approaching or queued
    pub vehicle_count: u32,
    /// Queue length (vehicles or distance units)
    pub queue_length: f64,
    /// Average observed speed (km/h)
    pub avg_speed: f64,
}

impl TrafficObservation {
    pub fn new(
        direction: impl Into<String>,
        vehicle_count: u32,
        queue_length: f64,
        avg_speed: f64,
    ) -> Self {
        Self {
            direction: direction.into(),
            vehicle_count,
            queue_length,
            avg_speed,
        }
    }
}

/// A validated optimization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    pub intersection_id: String,
    pub traffic_data: Vec<TrafficObservation>,
}

impl OptimizationRequest {
    pub fn new(intersection_id: impl Into<String>, traffic_data: Vec<TrafficObservation>) -> Self {
        Self {
            intersection_id: intersection_id.into(),
            traffic_data,
        }
    }
}

/// Scored direction, carried between ranking and allocation
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityEntry {
    pub direction: String,
    pub priority: f64,
    pub vehicle_count: u32,
    pub queue_length: f64,
}

/// Recommended timing for one direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasePlan {
    pub direction: String,
    pub green_duration: u32,
    pub yellow_duration: u32,
    /// Remainder of the cycle slot; negative only for pathological timing
    pub red_duration: i32,
    pub priority: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "rule-based")]
    RuleBased,
}

/// Full cycle recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Ordered by descending priority
    pub recommendations: Vec<PhasePlan>,
    /// Percentage
    pub expected_improvement: f64,
    /// 0.5..=0.95
    pub confidence: f64,
    pub algorithm: Algorithm,
    pub timestamp: DateTime<Utc>,
    pub intersection_id: String,
    pub id: String,
}

/// Result for a request without observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoDataResult {
    pub error: String,
    pub recommendations: Vec<PhasePlan>,
    pub intersection_id: String,
    pub id: String,
}

/// What a successful invocation emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizationOutcome {
    Optimized(OptimizationResult),
    NoData(NoDataResult),
}

/// Uniform error shape for failed invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub error: String,
    pub recommendations: Vec<PhasePlan>,
    pub expected_improvement: f64,
    pub confidence: f64,
    pub algorithm: Algorithm,
}

impl FailureReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            recommendations: Vec::new(),
            expected_improvement: 0.0,
            confidence: 0.0,
            algorithm: Algorithm::RuleBased,
        }
    }
}

impl From<&OptimizerError> for FailureReport {
    fn from(err: &OptimizerError) -> Self {
        Self::new(err.to_string())
    }
}

/// Request id: `opt-<intersection>-<unix seconds>`
pub fn request_id(intersection_id: &str, at: DateTime<Utc>) -> String {
    format!("opt-{}-{}", intersection_id, at.timestamp())
}
