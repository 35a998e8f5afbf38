mod optimizer;
mod schedule;
mod strategy;

pub use optimizer::{MoveKind, Optimizer, OptimizerParams, OptimizerState, Outcome, PenaltySchedule, Step};
pub use strategy::{Annealing, Greedy, SearchStrategy, StrategyKind};
