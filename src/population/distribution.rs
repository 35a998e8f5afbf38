use crate::{
    error::{GrreatError, Result},
    grid::Grid,
    population::Population,
};

/// Spread `red_total` red voters as evenly as possible over the grid.
///
/// Each precinct gets `red_total / n` red voters; the first `red_total % n`
/// precincts in row-major order get one more.
pub fn uniform(grid: Grid, precinct_population: u32, red_total: u64) -> Result<Population> {
    let nodes = grid.node_count() as u64;
    if red_total > precinct_population as u64 * nodes {
        return Err(GrreatError::config(format!(
            "{red_total} red voters exceed world population {}", precinct_population as u64 * nodes
        )));
    }

    let (base, extra) = (red_total / nodes, red_total % nodes);
    let red = (0..nodes)
        .map(|node| (base + (node < extra) as u64) as u32)
        .collect();

    Population::from_red_counts(grid, precinct_population, red)
}

/// A deterministic checkerboard of rectangular blocks.
///
/// The block containing `(0, 0)` is "even"; its horizontal and vertical
/// neighbors are "odd", alternating across the grid. Every precinct of an even
/// block holds `even_red` red voters, every precinct of an odd block `odd_red`.
/// Blocks at the far edge are truncated when the side is not a multiple of the
/// block size.
pub fn checkerboard(
    grid: Grid,
    precinct_population: u32,
    block_width: usize,
    block_height: usize,
    even_red: u32,
    odd_red: u32,
) -> Result<Population> {
    if block_width == 0 || block_height == 0 {
        return Err(GrreatError::config("checkerboard blocks must be at least one precinct wide and tall"));
    }
    if even_red > precinct_population || odd_red > precinct_population {
        return Err(GrreatError::config(format!(
            "checkerboard red counts ({even_red}, {odd_red}) exceed precinct population {precinct_population}"
        )));
    }

    let red = (0..grid.node_count())
        .map(|node| {
            let (x, y) = grid.coords(node);
            if (x / block_width + y / block_height) % 2 == 0 { even_red } else { odd_red }
        })
        .collect();

    Population::from_red_counts(grid, precinct_population, red)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_spreads_remainder_in_row_major_order() {
        let grid = Grid::new(3, 3).unwrap();
        let pop = uniform(grid, 10, 31).unwrap();
        assert_eq!(pop.red_counts(), &[4, 4, 4, 4, 3, 3, 3, 3, 3]);
        assert_eq!(pop.total_red(), 31);
    }

    #[test]
    fn uniform_rejects_too_many_red_voters() {
        let grid = Grid::new(3, 3).unwrap();
        assert!(uniform(grid, 10, 91).is_err());
    }

    #[test]
    fn checkerboard_alternates_blocks() {
        let grid = Grid::new(5, 5).unwrap();
        let pop = checkerboard(grid, 10, 2, 2, 8, 1).unwrap();
        assert_eq!(pop.precinct(0, 0).red_count, 8);
        assert_eq!(pop.precinct(1, 1).red_count, 8);
        assert_eq!(pop.precinct(2, 0).red_count, 1);
        assert_eq!(pop.precinct(0, 2).red_count, 1);
        assert_eq!(pop.precinct(2, 2).red_count, 8);
        // Truncated last column (x = 4) belongs to block 2, which is even on row-block 0.
        assert_eq!(pop.precinct(4, 0).red_count, 8);
    }

    #[test]
    fn checkerboard_validates_parameters() {
        let grid = Grid::new(3, 3).unwrap();
        assert!(checkerboard(grid, 10, 0, 1, 1, 1).is_err());
        assert!(checkerboard(grid, 10, 1, 1, 11, 1).is_err());
    }
}
