use ahash::AHashMap;
use rand::{Rng, seq::IndexedRandom};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    error::{GrreatError, Result},
    objective::{MetricSnapshot, Objective},
    optimize::{SearchStrategy, schedule::geometric},
    partition::DistrictAssignment,
    population::Population,
};

/// Geometric ramp of the weight on relaxed-constraint violations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltySchedule {
    pub initial: f64,
    #[serde(rename = "final")]
    pub final_weight: f64,
}

impl Default for PenaltySchedule {
    fn default() -> Self {
        Self { initial: 0.01, final_weight: 10.0 }
    }
}

impl PenaltySchedule {
    /// Penalty weight per violation at `step`.
    #[inline]
    pub fn weight(&self, step: usize, max_steps: usize) -> f64 {
        geometric(self.initial, self.final_weight, max_steps, step)
    }
}

/// Step budget and move mix of the optimizer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerParams {
    pub max_steps: usize,
    pub penalty: PenaltySchedule,
    /// Largest dangling piece that may travel along with a boundary flip.
    pub max_bundle: usize,
    /// Steps without a new best after which a feasible run converges (0 disables).
    pub patience: usize,
    /// Chance of proposing to refill an empty district, when one exists.
    pub revive_probability: f64,
    /// Chance of proposing to merge a stray piece into a neighbor, when one exists.
    pub repair_probability: f64,
    pub log_every: usize,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        Self {
            max_steps: 20_000,
            penalty: PenaltySchedule::default(),
            max_bundle: 8,
            patience: 0,
            revive_probability: 0.1,
            repair_probability: 0.2,
            log_every: 1000,
        }
    }
}

impl OptimizerParams {
    pub fn validate(&self) -> Result<()> {
        let PenaltySchedule { initial, final_weight } = self.penalty;
        if !(initial > 0.0 && final_weight > 0.0 && initial.is_finite() && final_weight.is_finite()) {
            return Err(GrreatError::config(format!("penalty weights must be finite and > 0, got {initial} and {final_weight}")));
        }
        for (name, p) in [("revive_probability", self.revive_probability), ("repair_probability", self.repair_probability)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GrreatError::config(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.log_every == 0 {
            return Err(GrreatError::config("log_every must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerState {
    Running,
    Converged,
    StepLimitReached,
}

impl OptimizerState {
    #[inline] pub fn is_terminal(self) -> bool { self != OptimizerState::Running }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// One boundary precinct changes district.
    Flip,
    /// A boundary precinct moves together with the pieces it would cut off.
    Bundle,
    /// A precinct founds an empty district.
    Revive,
    /// A stray piece of a disconnected district joins its best-connected neighbor.
    Absorb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected,
    /// No legal proposal could be made; the assignment is unchanged.
    Illegal,
}

/// One attempted step and the state it left behind.
#[derive(Clone, Debug)]
pub struct Step {
    pub index: usize,
    pub kind: MoveKind,
    pub outcome: Outcome,
    /// Change in penalized cost of the proposal, when one was evaluated.
    pub delta: Option<f64>,
    /// Current (last accepted) assignment after this step.
    pub assignment: DistrictAssignment,
    /// Scores of the current assignment.
    pub snapshot: MetricSnapshot,
    pub state: OptimizerState,
}

/// A proposed reassignment of `nodes`, all currently in `from`, to `to`.
struct Proposal {
    kind: MoveKind,
    nodes: Vec<usize>,
    from: u32,
    to: u32,
}

/// Relaxed-constraint local search over district assignments.
///
/// Each call to [`Iterator::next`] proposes one move, scores it with the
/// objective plus a rising penalty on empty districts and disconnected
/// pieces, and lets the strategy accept or reject it. The sequence ends
/// once the optimizer reaches a terminal state.
pub struct Optimizer<'p, S = Box<dyn SearchStrategy>> {
    population: &'p Population,
    objective: &'p Objective,
    assignment: DistrictAssignment,
    strategy: S,
    params: OptimizerParams,
    rng: ChaCha8Rng,
    current: MetricSnapshot,
    step: usize,
    state: OptimizerState,
    failed: bool,
    best_cost: f64,
    best_step: usize,
    window_accepted: usize,
    window_steps: usize,
}

impl<'p, S: SearchStrategy> Optimizer<'p, S> {
    pub fn new(
        population: &'p Population,
        objective: &'p Objective,
        assignment: DistrictAssignment,
        strategy: S,
        params: OptimizerParams,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        params.validate()?;
        assignment.validate()?;
        let current = objective.evaluate(population, &assignment)?;

        let mut optimizer = Self {
            population,
            objective,
            assignment,
            strategy,
            params,
            rng,
            best_cost: f64::INFINITY,
            best_step: 0,
            current,
            step: 0,
            state: OptimizerState::Running,
            failed: false,
            window_accepted: 0,
            window_steps: 0,
        };
        if optimizer.current.constraints_satisfied() {
            optimizer.best_cost = optimizer.cost(&optimizer.current, 0);
        }

        info!(
            strategy = optimizer.strategy.name(),
            max_steps = params.max_steps,
            objective = optimizer.current.objective,
            empty = optimizer.current.empty_districts,
            pieces = optimizer.current.disconnected_pieces,
            "[optimize] start"
        );

        if params.max_steps == 0 { optimizer.state = optimizer.final_state() }
        Ok(optimizer)
    }

    #[inline] pub fn state(&self) -> OptimizerState { self.state }

    /// Number of steps taken so far.
    #[inline] pub fn steps(&self) -> usize { self.step }

    #[inline] pub fn assignment(&self) -> &DistrictAssignment { &self.assignment }

    #[inline] pub fn snapshot(&self) -> &MetricSnapshot { &self.current }

    /// Consume the optimizer, returning the current assignment and its scores.
    pub fn into_parts(self) -> (DistrictAssignment, MetricSnapshot) {
        (self.assignment, self.current)
    }

    /// Objective plus the penalty for relaxed-constraint violations at `step`.
    fn cost(&self, snapshot: &MetricSnapshot, step: usize) -> f64 {
        snapshot.objective + self.params.penalty.weight(step, self.params.max_steps) * snapshot.violations() as f64
    }

    fn final_state(&self) -> OptimizerState {
        if self.current.constraints_satisfied() { OptimizerState::Converged } else { OptimizerState::StepLimitReached }
    }

    /// Pick the kind of move to try, then build a legal proposal of that kind.
    fn propose(&mut self) -> (MoveKind, Option<Proposal>) {
        if self.current.empty_districts > 0 && self.rng.random_bool(self.params.revive_probability) {
            return (MoveKind::Revive, self.propose_revive());
        }
        if self.current.disconnected_pieces > 0 && self.rng.random_bool(self.params.repair_probability) {
            return (MoveKind::Absorb, self.propose_absorb());
        }
        self.propose_flip()
    }

    /// Move `node` to `to`, carrying along whatever it would cut off.
    fn with_bundle(&self, kind: MoveKind, node: usize, to: u32) -> Option<Proposal> {
        let from = self.assignment.assignment(node);
        if self.assignment.check_node_contiguity(node, to) {
            return Some(Proposal { kind, nodes: vec![node], from, to });
        }
        let mut nodes = self.assignment.dangling_precincts(node);
        if nodes.len() > self.params.max_bundle { return None }
        nodes.push(node);
        let kind = if kind == MoveKind::Flip { MoveKind::Bundle } else { kind };
        Some(Proposal { kind, nodes, from, to })
    }

    fn propose_flip(&mut self) -> (MoveKind, Option<Proposal>) {
        let proposal = self.flip_proposal();
        (proposal.as_ref().map_or(MoveKind::Flip, |p| p.kind), proposal)
    }

    fn flip_proposal(&mut self) -> Option<Proposal> {
        let src = self.assignment.random_district_weighted_by_frontier(&mut self.rng)?;
        let node = self.assignment.random_frontier_node(src, &mut self.rng)?;
        let dest = self.assignment.random_neighboring_district(node, &mut self.rng)?;
        self.with_bundle(MoveKind::Flip, node, dest)
    }

    fn propose_revive(&mut self) -> Option<Proposal> {
        let dest = self.assignment.random_empty_district(&mut self.rng)?;
        let node = self.assignment.random_movable_node(&mut self.rng)?;
        self.with_bundle(MoveKind::Revive, node, dest)
    }

    /// Hand a stray piece of a disconnected district to the neighboring
    /// district it shares the most edges with.
    fn propose_absorb(&mut self) -> Option<Proposal> {
        let broken = self.assignment.districts()
            .filter(|&d| self.assignment.find_components(d).len() > 1)
            .collect::<Vec<_>>();
        let &district = broken.choose(&mut self.rng)?;
        let components = self.assignment.find_components(district);
        let stray = components[1..].choose(&mut self.rng)?.clone();

        let grid = self.assignment.grid();
        let mut shared = AHashMap::<u32, usize>::new();
        for &u in &stray {
            for v in grid.edges(u) {
                let d = self.assignment.assignment(v);
                if d != district { *shared.entry(d).or_default() += 1 }
            }
        }
        // Most shared edges, ties to the lowest id.
        let (&to, _) = shared.iter().max_by_key(|&(&d, &n)| (n, std::cmp::Reverse(d)))?;

        Some(Proposal { kind: MoveKind::Absorb, nodes: stray, from: district, to })
    }

    fn apply(&mut self, nodes: &[usize], to: u32) {
        if let [node] = nodes { self.assignment.move_node(*node, to) } else { self.assignment.move_subgraph(nodes, to) }
    }

    fn advance(&mut self) -> Result<Step> {
        let index = self.step;
        let (kind, proposal) = self.propose();

        let (outcome, delta) = match proposal {
            None => {
                trace!(step = index, ?kind, "[optimize] no legal proposal");
                (Outcome::Illegal, None)
            }
            Some(Proposal { kind, nodes, from, to }) => {
                self.apply(&nodes, to);
                let candidate = match self.objective.evaluate(self.population, &self.assignment) {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        self.apply(&nodes, from);
                        return Err(e);
                    }
                };
                let delta = self.cost(&candidate, index) - self.cost(&self.current, index);

                if self.strategy.accept(delta, index, self.params.max_steps, &mut self.rng) {
                    self.current = candidate;
                    (Outcome::Accepted, Some(delta))
                } else {
                    trace!(step = index, ?kind, moved = nodes.len(), from, to, delta, "[optimize] rejected");
                    self.apply(&nodes, from);
                    (Outcome::Rejected, Some(delta))
                }
            }
        };

        self.step += 1;
        self.window_steps += 1;
        if outcome == Outcome::Accepted { self.window_accepted += 1 }

        let cost = self.cost(&self.current, index);
        if self.current.constraints_satisfied() && cost < self.best_cost {
            self.best_cost = cost;
            self.best_step = index;
        }

        if index % self.params.log_every == 0 { self.log_progress(index, cost) }

        let patient = self.params.patience > 0 && self.step - self.best_step > self.params.patience;
        self.state = if self.current.constraints_satisfied() && patient {
            OptimizerState::Converged
        } else if self.step >= self.params.max_steps {
            self.final_state()
        } else {
            OptimizerState::Running
        };

        if self.state.is_terminal() {
            info!(
                steps = self.step,
                state = ?self.state,
                objective = self.current.objective,
                empty = self.current.empty_districts,
                pieces = self.current.disconnected_pieces,
                "[optimize] finished"
            );
        }

        Ok(Step {
            index,
            kind,
            outcome,
            delta,
            assignment: self.assignment.clone(),
            snapshot: self.current.clone(),
            state: self.state,
        })
    }

    fn log_progress(&mut self, index: usize, cost: f64) {
        let s = &self.current;
        let temp = self.strategy.temperature(index, self.params.max_steps)
            .map_or_else(|| "-".to_string(), |t| format!("{t:.6e}"));
        debug!(
            "[optimize] Iter {}: obj {:.6} | pop={:.4} fit={:.4} {}={:.4} | penalty {:.4e} x {} | best {:.6} @ {} | temp {} | accept {:.3}",
            index,
            cost,
            s.population_score,
            s.gerrymander_score,
            s.compactness_name,
            s.compactness_score,
            self.params.penalty.weight(index, self.params.max_steps),
            s.violations(),
            self.best_cost,
            self.best_step,
            temp,
            self.window_accepted as f64 / self.window_steps.max(1) as f64,
        );
        self.window_accepted = 0;
        self.window_steps = 0;
    }
}

impl<S: SearchStrategy> Iterator for Optimizer<'_, S> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.state.is_terminal() { return None }
        let step = self.advance();
        self.failed = step.is_err();
        Some(step)
    }
}
