use rand::Rng;

/// Epsilon threshold for treating small deltas as improvements (handles floating point precision).
pub(crate) const EPSILON: f64 = 1e-10;

/// Geometric schedule between two positive values.
///
/// Parameters
/// - `initial`   = value V₀ at step 0 (> 0)
/// - `target`    = value V_N at step N (> 0)
/// - `max_steps` = total number of steps N (the schedule is defined for k = 0..=N)
/// - `step`      = current step k (0-based)
///
/// Schedule
/// ```text
/// V_k = V₀ * α^k,  where  α = (V_N / V₀)^(1/N)
/// ```
/// so that V_0 = V₀ and V_N = V_N exactly. Drives both the annealing
/// temperature (falling) and the constraint penalty weight (rising).
pub(crate) fn geometric(initial: f64, target: f64, max_steps: usize, step: usize) -> f64 {
    debug_assert!(initial > 0.0 && target > 0.0, "schedule endpoints must be > 0");

    if step >= max_steps { return target }
    let alpha = (target / initial).powf(1.0 / max_steps as f64);
    let value = initial * alpha.powi(step as i32);

    if target < initial { value.max(target) } else { value.min(target) }
}

/// Boltzmann factor `exp(-delta / temp)` of a worsening move, capped at 1.
pub(crate) fn boltzmann(delta: f64, temp: f64) -> f64 {
    (-delta / temp).exp().min(1.0)
}

/// Metropolis rule: a move no worse than `EPSILON` always passes, anything
/// else passes with its Boltzmann factor at temperature `temp`.
pub(crate) fn accept_metropolis<R: Rng + ?Sized>(delta: f64, temp: f64, rng: &mut R) -> bool {
    if delta <= EPSILON { return true }
    rng.random::<f64>() < boltzmann(delta, temp)
}
