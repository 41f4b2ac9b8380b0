use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::coordinate::Coordinate;
use crate::models::location_record::{EntityRole, EntitySet};
use crate::utils::logging::{self, MatchingType, OperationCategory};
use crate::utils::traits::DistanceSource;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    InvalidThreshold(f64),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::InvalidThreshold(t) => {
                write!(f, "proximity threshold must be a finite, non-negative number of meters, got {}", t)
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// An aggressor observation that fell inside the threshold of a victim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityTrigger {
    pub aggressor_index: usize,
    pub distance_m: f64,
}

/// Matching verdict for one located victim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult {
    /// Index of the victim in its entity set.
    pub victim_index: usize,
    /// 1-based ordinal among located victims.
    pub position: usize,
    pub coordinate: Coordinate,
    pub is_near: bool,
    /// In ascending aggressor index, one entry per aggressor within range.
    pub triggers: Vec<ProximityTrigger>,
    /// Minimum over every located aggressor, not just the triggering ones.
    pub min_distance: Option<f64>,
}

impl ProximityResult {
    pub fn triggering_aggressor_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.triggers.iter().map(|t| t.aggressor_index)
    }
}

/// Ordered coordinates for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub role: EntityRole,
    pub points: Vec<Coordinate>,
}

impl Route {
    pub fn new(role: EntityRole) -> Self {
        Self { role, points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A polyline needs at least two points.
    pub fn is_drawable(&self) -> bool {
        self.points.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub threshold_m: f64,
    pub results: Vec<ProximityResult>,
    pub victim_route: Route,
    pub aggressor_route: Route,
}

impl MatchOutcome {
    pub fn near_results(&self) -> impl Iterator<Item = &ProximityResult> + '_ {
        self.results.iter().filter(|r| r.is_near)
    }

    pub fn near_count(&self) -> usize {
        self.near_results().count()
    }

    pub fn trigger_count(&self) -> usize {
        self.results.iter().map(|r| r.triggers.len()).sum()
    }
}

/// Victim x aggressor spatial join.
///
/// Every located victim is compared against every located aggressor; a pair
/// within `threshold_m` (inclusive) marks the victim as near. The aggressor
/// route holds every located aggressor, the victim route only near victims.
pub struct ProximityMatcher<D: DistanceSource> {
    distances: D,
}

impl<D: DistanceSource> ProximityMatcher<D> {
    pub fn new(distances: D) -> Self {
        Self { distances }
    }

    pub fn distances(&self) -> &D {
        &self.distances
    }

    pub fn run(&self, victims: &EntitySet, aggressors: &EntitySet, threshold_m: f64) -> Result<MatchOutcome, MatchError> {
        validate_threshold(threshold_m)?;
        let _timing = logging::start_timing("ProximityMatcher::run",
            OperationCategory::Matching { subcategory: MatchingType::Sequential });

        let located_aggressors: Vec<(usize, Coordinate)> = aggressors.located().map(|(i, _, c)| (i, c)).collect();
        let results: Vec<ProximityResult> = victims
            .located()
            .enumerate()
            .map(|(ordinal, (index, _, coordinate))| {
                self.evaluate_victim(index, ordinal + 1, coordinate, &located_aggressors, threshold_m)
            })
            .collect();

        Ok(assemble(threshold_m, results, located_aggressors))
    }

    fn evaluate_victim(
        &self,
        victim_index: usize,
        position: usize,
        coordinate: Coordinate,
        aggressors: &[(usize, Coordinate)],
        threshold_m: f64,
    ) -> ProximityResult {
        let mut triggers = Vec::new();
        let mut min_distance: Option<f64> = None;

        for &(aggressor_index, aggressor) in aggressors {
            let distance_m = self.distances.distance(&coordinate, &aggressor);
            min_distance = Some(min_distance.map_or(distance_m, |m| m.min(distance_m)));
            if distance_m <= threshold_m {
                triggers.push(ProximityTrigger { aggressor_index, distance_m });
            }
        }

        if !triggers.is_empty() {
            debug!(victim_index, position, triggers = triggers.len(), "victim within proximity threshold");
        }

        ProximityResult {
            victim_index,
            position,
            coordinate,
            is_near: !triggers.is_empty(),
            triggers,
            min_distance,
        }
    }
}

impl<D: DistanceSource + Sync> ProximityMatcher<D> {
    /// Same outcome as [`run`](Self::run), with victims spread over the rayon pool.
    pub fn run_parallel(&self, victims: &EntitySet, aggressors: &EntitySet, threshold_m: f64) -> Result<MatchOutcome, MatchError> {
        validate_threshold(threshold_m)?;
        let _timing = logging::start_timing("ProximityMatcher::run_parallel",
            OperationCategory::Matching { subcategory: MatchingType::Parallel });

        let located_aggressors: Vec<(usize, Coordinate)> = aggressors.located().map(|(i, _, c)| (i, c)).collect();
        let located_victims: Vec<(usize, Coordinate)> = victims.located().map(|(i, _, c)| (i, c)).collect();

        let results: Vec<ProximityResult> = located_victims
            .par_iter()
            .enumerate()
            .map(|(ordinal, &(index, coordinate))| {
                self.evaluate_victim(index, ordinal + 1, coordinate, &located_aggressors, threshold_m)
            })
            .collect();

        Ok(assemble(threshold_m, results, located_aggressors))
    }
}

fn validate_threshold(threshold_m: f64) -> Result<(), MatchError> {
    if threshold_m.is_finite() && threshold_m >= 0.0 {
        Ok(())
    } else {
        Err(MatchError::InvalidThreshold(threshold_m))
    }
}

fn assemble(threshold_m: f64, results: Vec<ProximityResult>, aggressors: Vec<(usize, Coordinate)>) -> MatchOutcome {
    let aggressor_route = Route {
        role: EntityRole::Aggressor,
        points: aggressors.into_iter().map(|(_, c)| c).collect(),
    };
    let victim_route = Route {
        role: EntityRole::Victim,
        points: results.iter().filter(|r| r.is_near).map(|r| r.coordinate).collect(),
    };

    info!(
        victims = results.len(),
        near = victim_route.len(),
        aggressors = aggressor_route.len(),
        threshold_m,
        "proximity matching complete"
    );

    MatchOutcome {
        threshold_m,
        results,
        victim_route,
        aggressor_route,
    }
}
