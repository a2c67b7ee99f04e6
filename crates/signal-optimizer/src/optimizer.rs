//! Request orchestration: score, rank, allocate, summarize

use crate::allocator::allocate;
use crate::scorer::score_observations;
use crate::summary::summarize;
use crate::{
    request_id, Algorithm, NoDataResult, OptimizationOutcome, OptimizationRequest,
    OptimizationResult, OptimizerConfig, NO_TRAFFIC_DATA,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Optimize one request at the given instant.
///
/// `now` only feeds the timestamp and id; the numbers depend on the
/// observations and config alone.
pub fn optimize(
    request: &OptimizationRequest,
    config: &OptimizerConfig,
    now: DateTime<Utc>,
) -> OptimizationOutcome {
    let intersection_id = request.intersection_id.clone();
    let id = request_id(&intersection_id, now);

    if request.traffic_data.is_empty() {
        warn!("No traffic data for intersection {}", intersection_id);
        return OptimizationOutcome::NoData(NoDataResult {
            error: NO_TRAFFIC_DATA.to_string(),
            recommendations: Vec::new(),
            intersection_id,
            id,
        });
    }

    let ranked = score_observations(&request.traffic_data, &config.scorer);
    let recommendations = allocate(&ranked, &config.cycle);
    let summary = summarize(&ranked);

    info!(
        "Optimized {} ({} directions): improvement={:.1}%, confidence={:.2}",
        intersection_id,
        recommendations.len(),
        summary.expected_improvement,
        summary.confidence
    );

    OptimizationOutcome::Optimized(OptimizationResult {
        recommendations,
        expected_improvement: summary.expected_improvement,
        confidence: summary.confidence,
        algorithm: Algorithm::RuleBased,
        timestamp: now,
        intersection_id,
        id,
    })
}

/// Optimize one request against the wall clock
pub fn optimize_now(request: &OptimizationRequest, config: &OptimizerConfig) -> OptimizationOutcome {
    optimize(request, config, Utc::now())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::TrafficObservation;
    use proptest::prelude::*;

    fn observation_strategy() -> impl Strategy<Value = (u32, f64, f64)> {
        (0u32..=200, 0.0f64..=150.0, 0.0f64..=90.0)
    }

    // Distinct directions, in input order
    fn request_strategy() -> impl Strategy<Value = OptimizationRequest> {
        prop::collection::vec(observation_strategy(), 1..=8).prop_map(|obs| {
            let traffic_data = obs
                .into_iter()
                .enumerate()
                .map(|(i, (v, q, s))| TrafficObservation::new(format!("dir-{i}"), v, q, s))
                .collect();
            OptimizationRequest::new("fuzz", traffic_data)
        })
    }

    fn run(request: &OptimizationRequest) -> OptimizationResult {
        match optimize_now(request, &OptimizerConfig::default()) {
            OptimizationOutcome::Optimized(result) => result,
            OptimizationOutcome::NoData(_) => unreachable!("non-empty request"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        // Every direction appears exactly once
        #[test]
        fn fuzz_directions_preserved(request in request_strategy()) {
            let result = run(&request);
            prop_assert_eq!(result.recommendations.len(), request.traffic_data.len());

            let mut expected: Vec<&str> = request.traffic_data.iter().map(|o| o.direction.as_str()).collect();
            let mut actual: Vec<&str> = result.recommendations.iter().map(|p| p.direction.as_str()).collect();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(expected, actual);
        }

        #[test]
        fn fuzz_green_bounds_and_red_identity(request in request_strategy()) {
            let result = run(&request);
            let total: f64 = result.recommendations.iter().map(|p| p.priority).sum();

            for plan in &result.recommendations {
                if total > 0.0 {
                    prop_assert!((15..=45).contains(&plan.green_duration));
                } else {
                    prop_assert_eq!(plan.green_duration, 25);
                }
                prop_assert_eq!(plan.yellow_duration, 3);
                prop_assert_eq!(plan.red_duration, 120 - plan.green_duration as i32 - 3);
            }
        }

        // Descending priority; ties keep input order
        #[test]
        fn fuzz_stable_descending_order(request in request_strategy()) {
            let result = run(&request);
            let position = |d: &str| request.traffic_data.iter().position(|o| o.direction == d).unwrap();

            for pair in result.recommendations.windows(2) {
                prop_assert!(pair[0].priority >= pair[1].priority);
                if pair[0].priority == pair[1].priority {
                    prop_assert!(position(pair[0].direction.as_str()) < position(pair[1].direction.as_str()));
                }
            }
        }

        #[test]
        fn fuzz_improvement_constant(request in request_strategy()) {
            let result = run(&request);
            let any_queue = request.traffic_data.iter().any(|o| o.queue_length > 0.0);
            let expected = if any_queue { 25.0 } else { 0.0 };
            prop_assert_eq!(result.expected_improvement, expected);
        }

        #[test]
        fn fuzz_confidence_bounds(request in request_strategy()) {
            let result = run(&request);
            prop_assert!(result.confidence >= 0.5);
            prop_assert!(result.confidence <= 0.95);
        }

        // Adding vehicles never lowers confidence
        #[test]
        fn fuzz_confidence_monotone(request in request_strategy(), extra in 0u32..=100) {
            let before = run(&request).confidence;
            let mut busier = request.clone();
            busier.traffic_data[0].vehicle_count += extra;
            prop_assert!(run(&busier).confidence >= before);
        }

        // Serialized output re-parses to identical values
        #[test]
        fn fuzz_json_round_trip(request in request_strategy()) {
            let outcome = optimize_now(&request, &OptimizerConfig::default());
            let json = serde_json::to_string(&outcome).unwrap();
            let parsed: OptimizationOutcome = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed, outcome);
        }
    }
}
