use std::collections::VecDeque;

use crate::partition::DistrictAssignment;

impl DistrictAssignment {
    /// Check if a district currently has no precincts.
    #[inline]
    pub fn is_empty_district(&self, district: u32) -> bool {
        self.district_size(district) == 0
    }

    /// Check if a precinct touches a given district.
    #[inline]
    pub fn borders_district(&self, node: usize, district: u32) -> bool {
        self.grid().edges(node).any(|v| self.assignment(v) == district)
    }

    /// Check if moving `node` into `district` keeps its current district connected.
    ///
    /// The destination must either border `node` or be empty.
    pub fn check_node_contiguity(&self, node: usize, district: u32) -> bool {
        let grid = self.grid();
        let prev = self.assignment(node);

        if !(self.is_empty_district(district) || self.borders_district(node, district)) { return false }

        // Same-district neighbors; with fewer than two, removing `node` cannot split anything.
        let neighbors = grid.edges(node)
            .filter(|&v| self.assignment(v) == prev)
            .collect::<Vec<_>>();
        if neighbors.len() <= 1 { return true }

        let mut targets = vec![false; grid.node_count()];
        neighbors.iter().for_each(|&v| targets[v] = true);

        // BFS from one neighbor within `prev`, forbidding `node`.
        let mut visited = vec![false; grid.node_count()];
        visited[node] = true;
        visited[neighbors[0]] = true;

        let mut remaining = neighbors.len() - 1;
        let mut queue = VecDeque::from([neighbors[0]]);
        while let Some(u) = queue.pop_front() {
            for v in grid.edges(u) {
                if !visited[v] && self.assignment(v) == prev {
                    visited[v] = true;
                    queue.push_back(v);
                    if targets[v] { remaining -= 1; if remaining == 0 { return true } }
                }
            }
        }

        neighbors.iter().all(|&v| visited[v])
    }

    /// Connected components (as precinct lists) of `district`, largest first.
    pub fn find_components(&self, district: u32) -> Vec<Vec<usize>> {
        let grid = self.grid();
        let mut components = Vec::new();
        let mut visited = vec![false; grid.node_count()];

        for &start in self.precincts(district) {
            if visited[start] { continue }
            visited[start] = true;
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                component.push(u);
                for v in grid.edges(u) {
                    if !visited[v] && self.assignment(v) == district {
                        visited[v] = true;
                        queue.push_back(v);
                    }
                }
            }
            components.push(component);
        }

        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }

    /// Extra connected pieces summed over every district (0 when all are contiguous).
    pub fn disconnected_pieces(&self) -> usize {
        self.districts()
            .map(|d| self.find_components(d).len().saturating_sub(1))
            .sum()
    }

    /// Check if every non-empty district is a single connected component.
    pub fn is_contiguous(&self) -> bool {
        self.districts().all(|d| self.find_components(d).len() <= 1)
    }

    /// Precincts of `node`'s district that would be cut off from its largest
    /// remaining piece if `node` left.
    ///
    /// Moving these together with `node` keeps the source district connected.
    pub fn dangling_precincts(&self, node: usize) -> Vec<usize> {
        let grid = self.grid();
        let district = self.assignment(node);

        let neighbors = grid.edges(node)
            .filter(|&v| self.assignment(v) == district)
            .collect::<Vec<_>>();
        if neighbors.len() <= 1 { return vec![] }

        let mut visited = vec![false; grid.node_count()];
        visited[node] = true;

        let mut components: Vec<Vec<usize>> = Vec::new();
        for &start in &neighbors {
            if visited[start] { continue }
            visited[start] = true;
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                component.push(u);
                for v in grid.edges(u) {
                    if !visited[v] && self.assignment(v) == district {
                        visited[v] = true;
                        queue.push_back(v);
                    }
                }
            }
            components.push(component);
        }

        // Keep the largest piece in place; everything else travels with `node`.
        let largest = components.iter().enumerate()
            .max_by_key(|(_, c)| c.len())
            .map(|(i, _)| i)
            .unwrap_or(0);

        components.into_iter().enumerate()
            .filter(|&(i, _)| i != largest)
            .flat_map(|(_, c)| c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{grid::Grid, partition::DistrictAssignment};

    fn assignment(width: usize, ids: &[u32], districts: u32) -> DistrictAssignment {
        let grid = Grid::new(width, ids.len() / width).unwrap();
        DistrictAssignment::from_assignments(grid, districts, ids.to_vec()).unwrap()
    }

    #[test]
    fn stripe_is_contiguous_through_the_wrap() {
        // District 2 occupies row 0 and row 4; they touch across the seam.
        #[rustfmt::skip]
        let a = assignment(5, &[
            2, 2, 2, 2, 2,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            2, 2, 2, 2, 2,
        ], 2);
        assert!(a.is_contiguous());
        assert_eq!(a.disconnected_pieces(), 0);
    }

    #[test]
    fn isolated_precinct_is_a_second_piece() {
        #[rustfmt::skip]
        let a = assignment(5, &[
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 2, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 2, 2, 1,
        ], 2);
        assert!(!a.is_contiguous());
        assert_eq!(a.disconnected_pieces(), 1);
        let components = a.find_components(2);
        assert_eq!(components[0].len(), 2);
        assert_eq!(components[1], vec![a.grid().index(2, 2)]);
    }

    #[test]
    fn bridge_precinct_cannot_leave_without_its_dangling_piece() {
        // District 2 is a horizontal bar in row 2; its middle is a bridge.
        #[rustfmt::skip]
        let a = assignment(5, &[
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 2, 2, 2, 1,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
        ], 2);
        let grid = a.grid();
        let middle = grid.index(2, 2);
        assert!(!a.check_node_contiguity(middle, 1));
        assert!(a.check_node_contiguity(grid.index(1, 2), 1));

        let dangling = a.dangling_precincts(middle);
        assert_eq!(dangling.len(), 1);
        assert!(dangling == vec![grid.index(1, 2)] || dangling == vec![grid.index(3, 2)]);
    }

    #[test]
    fn destination_must_border_or_be_empty() {
        #[rustfmt::skip]
        let a = assignment(5, &[
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 2, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
        ], 3);
        let grid = a.grid();
        assert!(!a.check_node_contiguity(grid.index(0, 0), 2));
        assert!(a.check_node_contiguity(grid.index(2, 1), 2));
        // District 3 is empty, so any precinct may found it.
        assert!(a.check_node_contiguity(grid.index(0, 0), 3));
    }
}
