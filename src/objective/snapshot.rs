use serde::Serialize;

use crate::election::Tabulation;

/// Aggregated votes and election result for one district.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistrictResult {
    pub district: u32,
    pub precincts: usize,
    pub population: u64,
    pub red_votes: u64,
    pub blue_votes: u64,
    pub tabulation: Tabulation,
}

impl DistrictResult {
    /// Share of votes cast for blue, `None` for an empty district.
    pub fn blue_fraction(&self) -> Option<f64> {
        let total = self.red_votes + self.blue_votes;
        (total > 0).then(|| self.blue_votes as f64 / total as f64)
    }
}

/// Every score computed for one assignment, recomputed fresh on each evaluation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub districts: Vec<DistrictResult>,
    /// Relative deviation `size / mean - 1` per district id, in id order.
    pub population_deviation: Vec<f64>,
    pub population_score: f64,
    pub gerrymander_score: f64,
    pub compactness_score: f64,
    pub compactness_name: String,
    pub occupied_districts: usize,
    pub empty_districts: usize,
    pub disconnected_pieces: usize,
    pub red_seats: u32,
    pub blue_seats: u32,
    /// Weighted sum of the three scores (lower is better).
    pub objective: f64,
}

impl MetricSnapshot {
    /// Every district id is occupied and every district is contiguous.
    #[inline]
    pub fn constraints_satisfied(&self) -> bool {
        self.empty_districts == 0 && self.disconnected_pieces == 0
    }

    /// Number of relaxed-constraint violations, as weighted by the optimizer penalty.
    #[inline]
    pub fn violations(&self) -> usize {
        self.empty_districts + self.disconnected_pieces
    }
}
