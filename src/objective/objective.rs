//! Scalarization of the three map-quality scores into one objective.
//!
//! Every evaluation aggregates district totals from scratch: any single
//! reassignment can change two districts' totals, their seats and the sorted
//! order the gerrymandering fit depends on.

use serde::{Deserialize, Serialize};

use crate::{
    election::{Tabulation, tabulate},
    error::{GrreatError, Result},
    objective::{
        Compactness, DistrictResult, FitParams, MetricSnapshot,
        metric::{blue_fraction_spread, gerrymander_fit, population_deviation, population_equality},
    },
    partition::DistrictAssignment,
    population::Population,
};

/// Weight of each score in the weighted sum.
///
/// Every score is normalized so that 1 marks a clearly poor map: population
/// equality by `population_tolerance`, the gerrymandering fit by the variance
/// of precinct blue fractions, and compactness by construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub population: f64,
    pub gerrymander: f64,
    pub compactness: f64,
    /// Relative district deviation that scores 1 on the population term.
    pub population_tolerance: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self { population: 1.0, gerrymander: 1.0, compactness: 1.0, population_tolerance: 0.1 }
    }
}

/// The Metric Engine: weights, fit parameters, compactness plug-in and the
/// seat count every district elects.
///
/// ```text
/// objective = w_p * population + w_g * gerrymander + w_c * compactness
/// ```
pub struct Objective {
    weights: MetricWeights,
    fit: FitParams,
    compactness: Box<dyn Compactness>,
    seats_per_district: u32,
}

impl Objective {
    pub fn new(
        weights: MetricWeights,
        fit: FitParams,
        compactness: Box<dyn Compactness>,
        seats_per_district: u32,
    ) -> Result<Self> {
        if seats_per_district < 1 {
            return Err(GrreatError::InvalidSeatCount(seats_per_district));
        }
        let all = [weights.population, weights.gerrymander, weights.compactness];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GrreatError::config(format!("metric weights must be finite and non-negative, got {weights:?}")));
        }
        if !(weights.population_tolerance.is_finite() && weights.population_tolerance > 0.0) {
            return Err(GrreatError::config(format!(
                "population tolerance must be finite and > 0, got {}", weights.population_tolerance
            )));
        }
        if fit.width.is_some_and(|w| !(w.is_finite() && w >= 0.0)) {
            return Err(GrreatError::config(format!("fit width must be finite and non-negative, got {:?}", fit.width)));
        }
        Ok(Self { weights, fit, compactness, seats_per_district })
    }

    #[inline] pub fn weights(&self) -> &MetricWeights { &self.weights }

    #[inline] pub fn seats_per_district(&self) -> u32 { self.seats_per_district }

    /// Name of the compactness plug-in in use.
    #[inline] pub fn compactness_name(&self) -> &str { self.compactness.name() }

    /// Score `assignment` of `population`.
    pub fn evaluate(&self, population: &Population, assignment: &DistrictAssignment) -> Result<MetricSnapshot> {
        if population.grid() != assignment.grid() {
            return Err(GrreatError::assignment(format!(
                "assignment grid {:?} does not match population grid {:?}",
                assignment.grid(), population.grid()
            )));
        }

        let districts = assignment.districts()
            .map(|district| self.district_result(population, assignment, district))
            .collect::<Result<Vec<_>>>()?;

        let sizes = districts.iter().map(|d| d.precincts).collect::<Vec<_>>();
        let deviation = population_deviation(&sizes);
        let population_score = population_equality(&deviation, self.weights.population_tolerance);

        let fractions = districts.iter().filter_map(DistrictResult::blue_fraction).collect::<Vec<_>>();
        let overall = population.total_blue() as f64 / population.total() as f64;
        let spread = blue_fraction_spread(population);
        let fit = gerrymander_fit(&fractions, overall, self.fit.width_for(spread), self.fit.swing_weight);
        // A politically flat world has nothing to fit; leave its score unscaled.
        let gerrymander_score = if spread > 0.0 { fit / spread.powi(2) } else { fit };

        let compactness_score = self.compactness.score(assignment);

        let objective = self.weights.population * population_score
            + self.weights.gerrymander * gerrymander_score
            + self.weights.compactness * compactness_score;

        let empty_districts = assignment.empty_districts();
        Ok(MetricSnapshot {
            red_seats: districts.iter().map(|d| d.tabulation.red_seats).sum(),
            blue_seats: districts.iter().map(|d| d.tabulation.blue_seats).sum(),
            districts,
            population_deviation: deviation,
            population_score,
            gerrymander_score,
            compactness_score,
            compactness_name: self.compactness.name().to_string(),
            occupied_districts: assignment.num_districts() as usize - empty_districts,
            empty_districts,
            disconnected_pieces: assignment.disconnected_pieces(),
            objective,
        })
    }

    fn district_result(&self, population: &Population, assignment: &DistrictAssignment, district: u32) -> Result<DistrictResult> {
        let precincts = assignment.precincts(district);
        let red_votes = precincts.iter().map(|&u| population.red(u) as u64).sum::<u64>();
        let blue_votes = precincts.iter().map(|&u| population.blue(u) as u64).sum::<u64>();

        // Empty districts hold no election.
        let tabulation = if precincts.is_empty() {
            Tabulation::default()
        } else {
            tabulate(red_votes, blue_votes, self.seats_per_district)?
        };

        Ok(DistrictResult {
            district,
            precincts: precincts.len(),
            population: precincts.len() as u64 * population.precinct_population() as u64,
            red_votes,
            blue_votes,
            tabulation,
        })
    }
}

use std::fmt;

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Objective {{")?;
        writeln!(f, "  population  * weight={} (tolerance={})", self.weights.population, self.weights.population_tolerance)?;
        let width = self.fit.width.map_or_else(|| "auto".to_string(), |w| w.to_string());
        writeln!(f, "  gerrymander * weight={} (width={}, swing={})",
            self.weights.gerrymander, width, self.fit.swing_weight)?;
        writeln!(f, "  {} * weight={}", self.compactness.name(), self.weights.compactness)?;
        write!(f, "  seats_per_district={}\n}}", self.seats_per_district)
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
