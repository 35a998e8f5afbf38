use std::{fs::File, io::{BufReader, BufWriter, Write}, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::{GrreatError, Result}, grid::Grid, population::Population};

/// On-disk form of a population: dimensions plus red counts, one row per `y`.
///
/// Saved alongside run output so later runs can reuse the same underlying
/// population with different districting parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationMap {
    pub width: usize,
    pub height: usize,
    pub precinct_population: u32,
    pub red_counts: Vec<Vec<u32>>,
}

impl Population {
    /// Convert to the serializable map form.
    pub fn to_map(&self) -> PopulationMap {
        let grid = self.grid();
        PopulationMap {
            width: grid.width(),
            height: grid.height(),
            precinct_population: self.precinct_population(),
            red_counts: self.red_counts().chunks(grid.width()).map(<[u32]>::to_vec).collect(),
        }
    }

    /// Rebuild a population from its map form, validating shape and counts.
    pub fn from_map(map: PopulationMap) -> Result<Self> {
        let grid = Grid::new(map.width, map.height)?;
        if map.red_counts.len() != map.height {
            return Err(GrreatError::population_map(None, format!(
                "{} rows, expected {}", map.red_counts.len(), map.height
            )));
        }
        if let Some(y) = map.red_counts.iter().position(|row| row.len() != map.width) {
            return Err(GrreatError::population_map(Some((0, y)), format!(
                "row {y} has {} precincts, expected {}", map.red_counts[y].len(), map.width
            )));
        }
        Population::from_red_counts(grid, map.precinct_population, map.red_counts.concat())
    }

    /// Write the population map as pretty JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.to_map())?;
        writer.flush()?;
        Ok(())
    }

    /// Read a population map from a JSON file at `path`.
    pub fn read_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Self::from_map(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_form_is_row_major() {
        let grid = Grid::new(3, 3).unwrap();
        let pop = Population::from_red_counts(grid, 4, vec![0, 1, 2, 3, 4, 0, 1, 2, 3]).unwrap();
        let map = pop.to_map();
        assert_eq!(map.red_counts, vec![vec![0, 1, 2], vec![3, 4, 0], vec![1, 2, 3]]);
        assert_eq!(Population::from_map(map).unwrap(), pop);
    }

    #[test]
    fn rejects_ragged_rows() {
        let map = PopulationMap {
            width: 3, height: 3, precinct_population: 4,
            red_counts: vec![vec![0, 1, 2], vec![3, 4], vec![1, 2, 3]],
        };
        assert!(matches!(
            Population::from_map(map),
            Err(GrreatError::InvalidPopulationMap { precinct: Some((0, 1)), .. })
        ));
    }

    #[test]
    fn rejects_overfull_precinct_in_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.json");
        let json = r#"{"width": 3, "height": 3, "precinct_population": 4,
            "red_counts": [[0, 1, 2], [3, 4, 0], [1, 9, 3]]}"#;
        std::fs::write(&path, json).unwrap();

        let err = Population::read_json(&path).unwrap_err();
        assert!(matches!(err, GrreatError::InvalidPopulationMap { precinct: Some((1, 2)), .. }));
        assert!(err.to_string().contains("at precinct (1, 2)"));
    }

    #[test]
    fn rejects_missing_rows() {
        let map = PopulationMap { width: 3, height: 3, precinct_population: 4, red_counts: vec![vec![0, 1, 2]] };
        assert!(matches!(Population::from_map(map), Err(GrreatError::InvalidPopulationMap { precinct: None, .. })));
    }

    #[test]
    fn rejects_bad_dimensions() {
        let map = PopulationMap { width: 4, height: 3, precinct_population: 1, red_counts: vec![] };
        assert!(matches!(Population::from_map(map), Err(GrreatError::InvalidGridDimension { .. })));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.json");
        let grid = Grid::new(3, 5).unwrap();
        let pop = Population::from_red_counts(grid, 7, (0..15).map(|i| i % 8).collect()).unwrap();
        pop.write_json(&path).unwrap();
        assert_eq!(Population::read_json(&path).unwrap(), pop);
    }
}
