use serde::{Deserialize, Serialize};

use crate::population::Population;

/// Shape of the target seats/votes curve the gerrymandering fit compares against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitParams {
    /// Spread of the target district blue fractions around the overall blue
    /// share. `None` derives it from the population as twice the standard
    /// deviation of precinct blue fractions.
    pub width: Option<f64>,
    /// Weight of the district closest to an even split.
    pub swing_weight: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self { width: None, swing_weight: 4.0 }
    }
}

impl FitParams {
    /// Target width for a population whose precinct blue fractions have
    /// standard deviation `spread`.
    #[inline]
    pub(crate) fn width_for(&self, spread: f64) -> f64 {
        self.width.unwrap_or(2.0 * spread)
    }
}

/// Per-district relative population deviation `size / mean - 1`.
///
/// The mean is taken over every district id, so an empty district scores -1.
pub(crate) fn population_deviation(sizes: &[usize]) -> Vec<f64> {
    if sizes.is_empty() { return vec![] }
    let mean = sizes.iter().sum::<usize>() as f64 / sizes.len() as f64;
    sizes.iter().map(|&size| size as f64 / mean - 1.0).collect()
}

/// Population equality: mean fourth power of the per-district deviation,
/// measured in units of `tolerance`.
///
/// Zero exactly when every district holds the same number of precincts; a map
/// whose every district is off by `tolerance` scores 1.
pub(crate) fn population_equality(deviation: &[f64], tolerance: f64) -> f64 {
    if deviation.is_empty() { return 0.0 }
    deviation.iter().map(|d| (d / tolerance).powi(4)).sum::<f64>() / deviation.len() as f64
}

/// Standard deviation of the blue fraction across precincts.
pub(crate) fn blue_fraction_spread(population: &Population) -> f64 {
    let n = population.grid().node_count() as f64;
    let p = population.precinct_population() as f64;
    let fractions = || (0..population.grid().node_count()).map(|u| population.blue(u) as f64 / p);
    let mean = fractions().sum::<f64>() / n;
    (fractions().map(|f| (f - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Weighted least-squares distance between sorted district blue fractions and
/// a linear target curve centred on the overall blue share.
///
/// The target for the `i`-th smallest of `k` districts is
/// `overall + ((i + 0.5) / k - 0.5) * width`, clamped to `[0, 1]`. The district
/// closest to an even split carries `swing_weight`; every other district
/// carries weight 1.
pub(crate) fn gerrymander_fit(blue_fractions: &[f64], overall: f64, width: f64, swing_weight: f64) -> f64 {
    let k = blue_fractions.len();
    if k == 0 { return 0.0 }

    let mut sorted = blue_fractions.to_vec();
    sorted.sort_by(f64::total_cmp);

    let swing = sorted.iter().enumerate()
        .min_by(|(_, a), (_, b)| (*a - 0.5).abs().total_cmp(&(*b - 0.5).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let (mut weighted, mut total_weight) = (0.0, 0.0);
    for (i, &fraction) in sorted.iter().enumerate() {
        let target = (overall + ((i as f64 + 0.5) / k as f64 - 0.5) * width).clamp(0.0, 1.0);
        let weight = if i == swing { swing_weight } else { 1.0 };
        weighted += weight * (fraction - target).powi(2);
        total_weight += weight;
    }

    if total_weight > 0.0 { weighted / total_weight } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn equal_districts_have_zero_deviation() {
        let deviation = population_deviation(&[5, 5, 5, 5]);
        assert!(deviation.iter().all(|&d| d == 0.0));
        assert_eq!(population_equality(&deviation, 0.1), 0.0);
    }

    #[test]
    fn fourth_power_punishes_large_imbalance() {
        let mild = population_equality(&population_deviation(&[9, 11]), 0.1);
        let severe = population_equality(&population_deviation(&[5, 15]), 0.1);
        assert!(mild > 0.0);
        // Five times the deviation, 625 times the penalty.
        assert!((severe / mild - 625.0).abs() < 1e-9);
    }

    #[test]
    fn empty_district_counts_against_equality() {
        let deviation = population_deviation(&[6, 6, 0]);
        assert_eq!(deviation[2], -1.0);
        assert!(population_equality(&deviation, 0.1) > 0.0);
    }

    #[test]
    fn deviation_at_tolerance_scores_one() {
        // Sizes 90 and 110 sit 10% either side of the mean.
        let deviation = population_deviation(&[90, 110]);
        assert!((population_equality(&deviation, 0.1) - 1.0).abs() < 1e-9);
        assert!((population_equality(&deviation, 0.2) - 1.0 / 16.0).abs() < 1e-9);
    }

    #[test]
    fn spread_of_precinct_blue_fractions() {
        let grid = Grid::new(3, 3).unwrap();
        let flat = Population::from_red_counts(grid, 10, vec![4; 9]).unwrap();
        assert_eq!(blue_fraction_spread(&flat), 0.0);

        // Blue fractions 0.0 and 1.0, one more of the former: mean 4/9.
        let split = Population::from_red_counts(grid, 10, vec![10, 0, 10, 0, 10, 0, 10, 0, 10]).unwrap();
        let expected = (4.0f64 / 9.0 * 5.0 / 9.0).sqrt();
        assert!((blue_fraction_spread(&split) - expected).abs() < 1e-12);
        assert!((FitParams::default().width_for(0.25) - 0.5).abs() < 1e-12);
        assert_eq!(FitParams { width: Some(0.3), ..Default::default() }.width_for(0.25), 0.3);
    }

    #[test]
    fn fit_is_zero_on_target_curve() {
        // k = 4 around 0.5 with width 0.4: targets 0.35, 0.45, 0.55, 0.65.
        let fractions = [0.65, 0.35, 0.55, 0.45];
        assert!(gerrymander_fit(&fractions, 0.5, 0.4, 4.0) < 1e-12);
    }

    #[test]
    fn swing_district_error_weighs_more() {
        // Flat target at 0.5; the same error on the swing district costs more.
        let off_swing = gerrymander_fit(&[0.5, 0.9], 0.5, 0.0, 4.0);
        let on_swing = gerrymander_fit(&[0.6, 0.95], 0.5, 0.0, 4.0);
        assert!((off_swing - 0.16 / 5.0).abs() < 1e-12);
        assert!((on_swing - (4.0 * 0.01 + 0.2025) / 5.0).abs() < 1e-12);
    }
}
