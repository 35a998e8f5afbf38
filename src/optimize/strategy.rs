use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    error::{GrreatError, Result},
    optimize::schedule::{EPSILON, accept_metropolis, geometric},
};

/// Acceptance rule driving the propose/evaluate/accept loop.
///
/// `delta` is the change in penalized cost (negative is an improvement). All
/// randomness must come from `rng` so that runs replay exactly from a seed.
pub trait SearchStrategy {
    fn name(&self) -> &str;

    fn accept(&mut self, delta: f64, step: usize, max_steps: usize, rng: &mut dyn RngCore) -> bool;

    /// Temperature at `step`, for strategies that have one.
    fn temperature(&self, _step: usize, _max_steps: usize) -> Option<f64> { None }
}

impl<S: SearchStrategy + ?Sized> SearchStrategy for Box<S> {
    fn name(&self) -> &str { (**self).name() }

    fn accept(&mut self, delta: f64, step: usize, max_steps: usize, rng: &mut dyn RngCore) -> bool {
        (**self).accept(delta, step, max_steps, rng)
    }

    fn temperature(&self, step: usize, max_steps: usize) -> Option<f64> {
        (**self).temperature(step, max_steps)
    }
}

/// Simulated annealing with Metropolis acceptance and a geometric cooling schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Annealing {
    initial_temp: f64,
    final_temp: f64,
}

impl Annealing {
    pub fn new(initial_temp: f64, final_temp: f64) -> Result<Self> {
        if !(initial_temp > 0.0 && final_temp > 0.0) || !initial_temp.is_finite() || !final_temp.is_finite() {
            return Err(GrreatError::config(format!(
                "annealing temperatures must be finite and > 0, got {initial_temp} and {final_temp}"
            )));
        }
        Ok(Self { initial_temp, final_temp })
    }
}

impl SearchStrategy for Annealing {
    fn name(&self) -> &str { "annealing" }

    fn accept(&mut self, delta: f64, step: usize, max_steps: usize, rng: &mut dyn RngCore) -> bool {
        let temp = geometric(self.initial_temp, self.final_temp, max_steps, step);
        accept_metropolis(delta, temp, rng)
    }

    fn temperature(&self, step: usize, max_steps: usize) -> Option<f64> {
        Some(geometric(self.initial_temp, self.final_temp, max_steps, step))
    }
}

/// Accept a proposal only when it does not make the penalized cost worse.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Greedy;

impl SearchStrategy for Greedy {
    fn name(&self) -> &str { "greedy" }

    fn accept(&mut self, delta: f64, _step: usize, _max_steps: usize, _rng: &mut dyn RngCore) -> bool {
        delta <= EPSILON
    }
}

/// Built-in strategies selectable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    Annealing { initial_temp: f64, final_temp: f64 },
    Greedy,
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::Annealing { initial_temp: 0.02, final_temp: 1e-5 }
    }
}

impl StrategyKind {
    pub fn build(self) -> Result<Box<dyn SearchStrategy>> {
        Ok(match self {
            StrategyKind::Annealing { initial_temp, final_temp } => Box::new(Annealing::new(initial_temp, final_temp)?),
            StrategyKind::Greedy => Box::new(Greedy),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn greedy_rejects_any_worsening() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut greedy = Greedy;
        assert!(greedy.accept(-0.5, 0, 10, &mut rng));
        assert!(greedy.accept(0.0, 0, 10, &mut rng));
        assert!(!greedy.accept(1e-6, 0, 10, &mut rng));
        assert_eq!(greedy.temperature(0, 10), None);
    }

    #[test]
    fn annealing_is_reproducible_from_a_seed() {
        let decisions = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut strategy = StrategyKind::default().build().unwrap();
            (0..200).map(|k| strategy.accept(0.01, k, 200, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(decisions(3), decisions(3));
    }

    #[test]
    fn annealing_cools_down() {
        let annealing = Annealing::new(1.0, 0.001).unwrap();
        assert_eq!(annealing.temperature(0, 100), Some(1.0));
        assert_eq!(annealing.temperature(100, 100), Some(0.001));
        assert!(Annealing::new(0.0, 1.0).is_err());
    }
}
