#![doc = "Grreat gerrymandering simulator public API"]
mod config;
mod election;
mod error;
mod grid;
mod objective;
mod optimize;
mod partition;
mod population;
mod run;

#[doc(inline)]
pub use config::{DistrictConfig, Distribution, MetricsConfig, OptimizerConfig, PopulationConfig, RunConfig, WorldConfig};

#[doc(inline)]
pub use error::{GrreatError, Result};

#[doc(inline)]
pub use grid::{Grid, is_one_plus_power_of_two};

#[doc(inline)]
pub use population::{Population, PopulationMap, Precinct, checkerboard, generate, uniform};

#[doc(inline)]
pub use election::{Tabulation, droop_quota, tabulate};

#[doc(inline)]
pub use partition::{DistrictAssignment, seed};

#[doc(inline)]
pub use objective::{
    CentroidDistance, Compactness, CompactnessMeasure, CutEdges, DistrictResult, FitParams, MetricSnapshot,
    MetricWeights, Objective,
};

#[doc(inline)]
pub use optimize::{
    Annealing, Greedy, MoveKind, Optimizer, OptimizerParams, OptimizerState, Outcome, PenaltySchedule,
    SearchStrategy, StrategyKind, Step,
};

#[doc(inline)]
pub use run::{RunOutcome, Termination, generate_population, run, run_with_population};
