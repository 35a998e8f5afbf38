//! Run configuration, loadable from JSON and overridable field by field.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{GrreatError, Result},
    grid::{Grid, is_one_plus_power_of_two},
    objective::{CompactnessMeasure, FitParams, MetricWeights, Objective},
    optimize::{OptimizerParams, StrategyKind},
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub districts: DistrictConfig,
    pub metrics: MetricsConfig,
    pub optimizer: OptimizerConfig,
    /// Seeds both the generation stream and the seeding and search stream.
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    pub precinct_population: u32,
    pub red_fraction: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { width: 33, height: 33, precinct_population: 1000, red_fraction: 0.5 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub distribution: Distribution,
}

/// How red voters are laid out over the world.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Clustered {
        #[serde(default = "default_geo_random_steps")]
        geo_random_steps: usize,
        #[serde(default = "default_geo_neighbor_weight")]
        geo_neighbor_weight: f64,
    },
    Uniform,
    /// Blocks of precincts alternating between two red shares.
    Checkerboard {
        block_width: usize,
        block_height: usize,
        even_red_fraction: f64,
        odd_red_fraction: f64,
    },
}

fn default_geo_random_steps() -> usize { 4 }
fn default_geo_neighbor_weight() -> f64 { 0.5 }

impl Distribution {
    /// Switch to clustered generation, keeping current clustering values
    /// (or the defaults) where no override is given.
    pub fn with_clustering(self, random_steps: Option<usize>, neighbor_weight: Option<f64>) -> Self {
        let (steps, weight) = match self {
            Distribution::Clustered { geo_random_steps, geo_neighbor_weight } => (geo_random_steps, geo_neighbor_weight),
            _ => (default_geo_random_steps(), default_geo_neighbor_weight()),
        };
        Distribution::Clustered {
            geo_random_steps: random_steps.unwrap_or(steps),
            geo_neighbor_weight: neighbor_weight.unwrap_or(weight),
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::Clustered {
            geo_random_steps: default_geo_random_steps(),
            geo_neighbor_weight: default_geo_neighbor_weight(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictConfig {
    pub num_districts: u32,
    pub seats_per_district: u32,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self { num_districts: 10, seats_per_district: 1 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub weights: MetricWeights,
    pub fit: FitParams,
    pub compactness_measure: CompactnessMeasure,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub params: OptimizerParams,
}

impl RunConfig {
    /// Read a (possibly partial) configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Check every setting, so that no bad value is discovered mid-run.
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        for (axis, value) in [("width", world.width), ("height", world.height)] {
            if !is_one_plus_power_of_two(value) {
                return Err(GrreatError::InvalidGridDimension { axis, value });
            }
        }
        if world.precinct_population < 1 {
            return Err(GrreatError::config("precinct_population must be at least 1"));
        }
        if !(0.0..=1.0).contains(&world.red_fraction) {
            return Err(GrreatError::config(format!("red_fraction must be in [0, 1], got {}", world.red_fraction)));
        }

        let nodes = world.width * world.height;
        match self.population.distribution {
            Distribution::Clustered { geo_random_steps, geo_neighbor_weight } => {
                if geo_random_steps < 4 || geo_random_steps > nodes {
                    return Err(GrreatError::config(format!(
                        "geo_random_steps must be in 4..={nodes}, got {geo_random_steps}"
                    )));
                }
                if !(0.0..=1.0).contains(&geo_neighbor_weight) {
                    return Err(GrreatError::config(format!(
                        "geo_neighbor_weight must be in [0, 1], got {geo_neighbor_weight}"
                    )));
                }
            }
            Distribution::Uniform => {}
            Distribution::Checkerboard { block_width, block_height, even_red_fraction, odd_red_fraction } => {
                if block_width == 0 || block_height == 0 {
                    return Err(GrreatError::config("checkerboard blocks must be at least one precinct wide and tall"));
                }
                if !(0.0..=1.0).contains(&even_red_fraction) || !(0.0..=1.0).contains(&odd_red_fraction) {
                    return Err(GrreatError::config("checkerboard red fractions must be in [0, 1]"));
                }
            }
        }

        let districts = &self.districts;
        if districts.num_districts < 1 || districts.num_districts as usize > nodes {
            return Err(GrreatError::config(format!(
                "num_districts must be in 1..={nodes}, got {}", districts.num_districts
            )));
        }
        if districts.seats_per_district < 1 {
            return Err(GrreatError::InvalidSeatCount(districts.seats_per_district));
        }

        self.objective()?;
        self.optimizer.strategy.build()?;
        self.optimizer.params.validate()
    }

    pub fn grid(&self) -> Result<Grid> {
        Grid::new(self.world.width, self.world.height)
    }

    /// Total voters in the world.
    pub fn total_population(&self) -> u64 {
        self.world.precinct_population as u64 * (self.world.width * self.world.height) as u64
    }

    /// Red voters in the world, `round(red_fraction * total)`.
    pub fn red_total(&self) -> u64 {
        (self.world.red_fraction * self.total_population() as f64).round() as u64
    }

    /// The Metric Engine described by the `metrics` and `districts` sections.
    pub fn objective(&self) -> Result<Objective> {
        Objective::new(
            self.metrics.weights,
            self.metrics.fit,
            self.metrics.compactness_measure.build(),
            self.districts.seats_per_district,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_population(), 33 * 33 * 1000);
        assert_eq!(config.red_total(), 33 * 33 * 500);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{
            "world": { "width": 17, "height": 9 },
            "population": { "distribution": { "kind": "clustered", "geo_random_steps": 6 } },
            "metrics": { "fit": { "width": 0.3 }, "weights": { "population_tolerance": 0.05 } },
            "optimizer": { "strategy": { "kind": "greedy" }, "max_steps": 500, "penalty": { "final": 3.0 } },
            "seed": 42
        }"#).unwrap();

        assert_eq!((config.world.width, config.world.height), (17, 9));
        assert_eq!(config.world.precinct_population, 1000);
        assert_eq!(
            config.population.distribution,
            Distribution::Clustered { geo_random_steps: 6, geo_neighbor_weight: 0.5 }
        );
        assert_eq!(config.optimizer.strategy, StrategyKind::Greedy);
        assert_eq!(config.optimizer.params.max_steps, 500);
        assert_eq!(config.optimizer.params.penalty.final_weight, 3.0);
        assert_eq!(config.optimizer.params.penalty.initial, 0.01);
        assert_eq!(config.districts.num_districts, 10);
        assert_eq!(config.metrics.fit, FitParams { width: Some(0.3), swing_weight: 4.0 });
        assert_eq!(config.metrics.weights.population_tolerance, 0.05);
        assert_eq!(config.metrics.weights.gerrymander, 1.0);
        assert_eq!(RunConfig::default().metrics.fit.width, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn clustering_overrides_switch_distribution() {
        let switched = Distribution::Uniform.with_clustering(Some(8), None);
        assert_eq!(switched, Distribution::Clustered { geo_random_steps: 8, geo_neighbor_weight: 0.5 });
        let kept = switched.with_clustering(None, Some(0.25));
        assert_eq!(kept, Distribution::Clustered { geo_random_steps: 8, geo_neighbor_weight: 0.25 });
    }

    #[test]
    fn configuration_errors_surface_up_front() {
        let mut config = RunConfig::default();
        config.world.width = 32;
        assert!(matches!(config.validate(), Err(GrreatError::InvalidGridDimension { axis: "width", value: 32 })));

        let mut config = RunConfig::default();
        config.districts.seats_per_district = 0;
        assert!(matches!(config.validate(), Err(GrreatError::InvalidSeatCount(0))));

        let mut config = RunConfig::default();
        config.population.distribution = Distribution::Clustered { geo_random_steps: 3, geo_neighbor_weight: 0.5 };
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.optimizer.params.revive_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.metrics.fit.width = Some(-0.1);
        assert!(matches!(config.validate(), Err(GrreatError::InvalidConfig(_))));
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = RunConfig::default();
        config.seed = 7;
        config.population.distribution = Distribution::Uniform;
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = RunConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.seed, 7);
        assert_eq!(loaded.population.distribution, Distribution::Uniform);
        assert_eq!(loaded.world, config.world);
        assert_eq!(loaded.districts, config.districts);
    }
}
