//! Proportional green-time allocation
//!
//! Each direction receives a share of the cycle, after a fixed yellow
//! deduction, proportional to its priority:
//!
//! ```text
//! green = clamp(⌊(p / Σp) · (cycle − 4·yellow)⌋, min_green, max_green)
//! red   = cycle − green − yellow
//! ```
//!
//! The deduction is always four yellow phases, whatever the number of
//! directions. Each plan is a split of a shared total per direction slot,
//! so green + yellow over all directions need not equal the cycle.

use crate::{OptimizerError, PhasePlan, PriorityEntry, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TOTAL_CYCLE_TIME: u32 = 120;
pub const MIN_GREEN: u32 = 15;
pub const MAX_GREEN: u32 = 45;
pub const YELLOW_TIME: u32 = 3;

/// Green assigned to every direction when no direction has priority
pub const DEFAULT_GREEN: u32 = 25;

/// Yellow phases deducted from the cycle before proportional allocation
pub const YELLOW_DEDUCTION_PHASES: u32 = 4;

/// Cycle timing configuration (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub total_cycle_time: u32,
    pub min_green: u32,
    pub max_green: u32,
    pub yellow_time: u32,
    pub default_green: u32,
    pub yellow_deduction_phases: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            total_cycle_time: TOTAL_CYCLE_TIME,
            min_green: MIN_GREEN,
            max_green: MAX_GREEN,
            yellow_time: YELLOW_TIME,
            default_green: DEFAULT_GREEN,
            yellow_deduction_phases: YELLOW_DEDUCTION_PHASES,
        }
    }
}

impl CycleConfig {
    /// Seconds shared out proportionally to priority
    pub fn allocatable_time(&self) -> u32 {
        self.total_cycle_time
            .saturating_sub(self.yellow_deduction_phases * self.yellow_time)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_green > self.max_green {
            return Err(OptimizerError::InvalidConfig(format!(
                "min_green ({}) exceeds max_green ({})",
                self.min_green, self.max_green
            )));
        }
        if !(self.min_green..=self.max_green).contains(&self.default_green) {
            return Err(OptimizerError::InvalidConfig(format!(
                "default_green ({}) outside [{}, {}]",
                self.default_green, self.min_green, self.max_green
            )));
        }
        let deduction = self.yellow_deduction_phases.checked_mul(self.yellow_time);
        if deduction.map_or(true, |d| d > self.total_cycle_time) {
            return Err(OptimizerError::InvalidConfig(format!(
                "total_cycle_time ({}) shorter than {} yellow phases of {}s",
                self.total_cycle_time, self.yellow_deduction_phases, self.yellow_time
            )));
        }
        if self.total_cycle_time > i32::MAX as u32 {
            return Err(OptimizerError::InvalidConfig(format!(
                "total_cycle_time ({}) too large",
                self.total_cycle_time
            )));
        }
        Ok(())
    }

    /// Remainder of the cycle slot after green and yellow
    fn red_duration(&self, green: u32) -> i32 {
        self.total_cycle_time as i32 - green as i32 - self.yellow_time as i32
    }
}

/// Allocate green time to ranked entries, preserving their order
pub fn allocate(entries: &[PriorityEntry], config: &CycleConfig) -> Vec<PhasePlan> {
    let total_priority: f64 = entries.iter().map(|e| e.priority).sum();
    let allocatable = config.allocatable_time() as f64;

    entries
        .iter()
        .map(|entry| {
            let green_duration = if total_priority > 0.0 {
                let raw = ((entry.priority / total_priority) * allocatable).floor();
                (raw as i64).clamp(config.min_green as i64, config.max_green as i64) as u32
            } else {
                config.default_green
            };

            debug!(
                "Allocated {}: green={}s (priority={:.2}/{:.2})",
                entry.direction, green_duration, entry.priority, total_priority
            );

            PhasePlan {
                direction: entry.direction.clone(),
                green_duration,
                yellow_duration: config.yellow_time,
                red_duration: config.red_duration(green_duration),
                priority: entry.priority,
            }
        })
        .collect()
}
