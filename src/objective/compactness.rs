use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::{grid::Grid, partition::DistrictAssignment};

/// A swappable compactness score. Lower is more compact.
pub trait Compactness: Send + Sync {
    /// Short name used in logs and snapshots.
    fn name(&self) -> &str;

    /// Score the whole assignment.
    fn score(&self, assignment: &DistrictAssignment) -> f64;
}

/// Mean distance of precincts from their district centroid, normalized by the
/// mean distance within a disk of the same area, averaged over occupied districts.
///
/// A disk-shaped district scores about 1; sprawling districts score higher.
/// Centroids are circular means per axis so districts straddling the seam
/// are handled correctly.
#[derive(Clone, Copy, Debug, Default)]
pub struct CentroidDistance;

impl CentroidDistance {
    fn centroid(grid: Grid, precincts: &[usize]) -> (f64, f64) {
        let circular_mean = |values: &mut dyn Iterator<Item = usize>, period: usize| {
            let (mut sin, mut cos) = (0.0, 0.0);
            for v in values {
                let angle = TAU * v as f64 / period as f64;
                sin += angle.sin();
                cos += angle.cos();
            }
            (sin.atan2(cos) / TAU * period as f64).rem_euclid(period as f64)
        };

        let x = circular_mean(&mut precincts.iter().map(|&u| grid.coords(u).0), grid.width());
        let y = circular_mean(&mut precincts.iter().map(|&u| grid.coords(u).1), grid.height());
        (x, y)
    }

    fn district_score(grid: Grid, precincts: &[usize]) -> f64 {
        let n = precincts.len() as f64;
        let reference = 2.0 / 3.0 * (n / PI).sqrt();
        let centroid = Self::centroid(grid, precincts);
        let mean = precincts.iter()
            .map(|&u| {
                let (x, y) = grid.coords(u);
                grid.toroidal_distance_between(centroid, (x as f64, y as f64))
            })
            .sum::<f64>() / n;
        mean / reference
    }
}

impl Compactness for CentroidDistance {
    fn name(&self) -> &str { "centroid_distance" }

    fn score(&self, assignment: &DistrictAssignment) -> f64 {
        let grid = assignment.grid();
        let scores = assignment.districts()
            .filter(|&d| !assignment.is_empty_district(d))
            .map(|d| Self::district_score(grid, assignment.precincts(d)))
            .collect::<Vec<_>>();
        if scores.is_empty() { 0.0 } else { scores.iter().sum::<f64>() / scores.len() as f64 }
    }
}

/// Fraction of grid edges whose endpoints lie in different districts.
#[derive(Clone, Copy, Debug, Default)]
pub struct CutEdges;

impl Compactness for CutEdges {
    fn name(&self) -> &str { "cut_edges" }

    fn score(&self, assignment: &DistrictAssignment) -> f64 {
        let grid = assignment.grid();
        // Right and down neighbors visit each undirected edge once.
        let cut = (0..grid.node_count())
            .map(|u| {
                let [_, right, _, down] = grid.neighbors(u);
                [right, down].into_iter()
                    .filter(|&v| assignment.assignment(u) != assignment.assignment(v))
                    .count()
            })
            .sum::<usize>();
        cut as f64 / grid.edge_count() as f64
    }
}

/// Built-in compactness measures selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactnessMeasure {
    #[default]
    CentroidDistance,
    CutEdges,
}

impl CompactnessMeasure {
    pub fn build(self) -> Box<dyn Compactness> {
        match self {
            CompactnessMeasure::CentroidDistance => Box::new(CentroidDistance),
            CompactnessMeasure::CutEdges => Box::new(CutEdges),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(width: usize, height: usize, districts: u32) -> DistrictAssignment {
        let grid = Grid::new(width, height).unwrap();
        let band = width.div_ceil(districts as usize);
        let ids = (0..grid.node_count())
            .map(|u| (grid.coords(u).0 / band) as u32 + 1)
            .collect();
        DistrictAssignment::from_assignments(grid, districts, ids).unwrap()
    }

    #[test]
    fn single_district_has_no_cut_edges() {
        let grid = Grid::new(5, 5).unwrap();
        let a = DistrictAssignment::from_assignments(grid, 1, vec![1; 25]).unwrap();
        assert_eq!(CutEdges.score(&a), 0.0);
    }

    #[test]
    fn every_edge_cut_on_a_checkerboard_of_singletons() {
        let grid = Grid::new(3, 3).unwrap();
        let a = DistrictAssignment::from_assignments(grid, 9, (1..=9).collect()).unwrap();
        assert_eq!(CutEdges.score(&a), 1.0);
        // Singletons sit exactly on their centroid.
        assert!(CentroidDistance.score(&a) < 1e-9);
    }

    #[test]
    fn centroid_follows_the_wrap() {
        // Columns 4 and 0 of a 5-wide grid form one district across the seam.
        let grid = Grid::new(5, 3).unwrap();
        let precincts = (0..grid.node_count())
            .filter(|&u| matches!(grid.coords(u).0, 0 | 4))
            .collect::<Vec<_>>();
        let (x, _) = CentroidDistance::centroid(grid, &precincts);
        assert!((x - 4.5).abs() < 1e-9);
    }

    #[test]
    fn square_blocks_beat_thin_stripes() {
        let grid = Grid::new(9, 9).unwrap();
        let blocks = (0..grid.node_count())
            .map(|u| { let (x, y) = grid.coords(u); if (x < 4) == (y < 4) { 1 } else { 2 } })
            .collect::<Vec<_>>();
        let blocks = DistrictAssignment::from_assignments(grid, 2, blocks).unwrap();
        let stripes = columns(9, 9, 9);

        assert!(CentroidDistance.score(&stripes) > 0.0);
        let measure = CompactnessMeasure::CutEdges.build();
        assert_eq!(measure.name(), "cut_edges");
        assert!(measure.score(&stripes) > measure.score(&blocks));
    }
}
