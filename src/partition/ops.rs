use rand::{Rng, distr::{Distribution, weighted::WeightedIndex}, seq::IteratorRandom};
use smallvec::SmallVec;

use crate::partition::DistrictAssignment;

impl DistrictAssignment {
    /// Re-file `u` in the frontier according to its current neighbors.
    fn refresh_frontier(&mut self, u: usize) {
        let district = self.assignment(u);
        if self.grid().edges(u).any(|v| self.assignment(v) != district) {
            self.frontier.insert(u, district);
        } else {
            self.frontier.remove(u);
        }
    }

    /// Move a single precinct to `district`, updating frontier bookkeeping.
    /// No legality check is made here.
    pub(crate) fn move_node(&mut self, node: usize, district: u32) {
        assert!(district >= 1 && district <= self.num_districts(), "district {district} out of range");
        if self.assignment(node) == district { return }

        self.rolls.transfer(node, district);
        self.refresh_frontier(node);
        for v in self.grid().edges(node) {
            self.refresh_frontier(v);
        }
    }

    /// Move a set of precincts to `district`, updating frontier bookkeeping
    /// once for the union of their neighborhoods.
    pub(crate) fn move_subgraph(&mut self, nodes: &[usize], district: u32) {
        assert!(district >= 1 && district <= self.num_districts(), "district {district} out of range");
        if let [node] = nodes { return self.move_node(*node, district) }

        for &u in nodes {
            self.rolls.transfer(u, district);
        }

        let grid = self.grid();
        let mut touched = vec![false; grid.node_count()];
        let mut boundary = Vec::with_capacity(nodes.len() * 5);
        for &u in nodes {
            for w in std::iter::once(u).chain(grid.edges(u)) {
                if !touched[w] { touched[w] = true; boundary.push(w) }
            }
        }
        for u in boundary {
            self.refresh_frontier(u);
        }
    }

    /// Select a random district, weighted by the size of its frontier.
    pub(crate) fn random_district_weighted_by_frontier<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        let weights = self.frontier.sizes().collect::<Vec<_>>();
        let dist = WeightedIndex::new(&weights).ok()?; // None if every frontier is empty
        Some(dist.sample(rng) as u32)
    }

    /// Select a random boundary precinct of `district`.
    pub(crate) fn random_frontier_node<R: Rng + ?Sized>(&self, district: u32, rng: &mut R) -> Option<usize> {
        let frontier = self.frontier(district);
        (!frontier.is_empty()).then(|| frontier[rng.random_range(0..frontier.len())])
    }

    /// Select a random district other than the node's own among its neighbors.
    pub(crate) fn random_neighboring_district<R: Rng + ?Sized>(&self, node: usize, rng: &mut R) -> Option<u32> {
        let own = self.assignment(node);
        let mut districts = self.grid().edges(node)
            .map(|v| self.assignment(v))
            .filter(|&d| d != own)
            .collect::<SmallVec<[u32; 4]>>();
        districts.sort_unstable();
        districts.dedup();
        districts.into_iter().choose(rng)
    }

    /// Select a random precinct whose district would survive losing it.
    pub(crate) fn random_movable_node<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        (0..self.grid().node_count())
            .filter(|&u| self.district_size(self.assignment(u)) > 1)
            .choose(rng)
    }

    /// Select a random empty district id.
    pub(crate) fn random_empty_district<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        self.districts().filter(|&d| self.is_empty_district(d)).choose(rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::{grid::Grid, partition::DistrictAssignment};

    fn halves() -> DistrictAssignment {
        // Left two columns district 1, right three columns district 2.
        let grid = Grid::new(5, 5).unwrap();
        let ids = (0..25).map(|u| if u % 5 < 2 { 1 } else { 2 }).collect();
        DistrictAssignment::from_assignments(grid, 3, ids).unwrap()
    }

    fn frontier_matches_rebuild(a: &DistrictAssignment) {
        let mut rebuilt = a.clone();
        rebuilt.rebuild_frontier();
        for d in 0..=a.num_districts() {
            let mut got = a.frontier(d).to_vec();
            let mut want = rebuilt.frontier(d).to_vec();
            got.sort_unstable();
            want.sort_unstable();
            assert_eq!(got, want, "frontier of district {d} drifted");
        }
    }

    #[test]
    fn move_node_keeps_frontier_consistent() {
        let mut a = halves();
        let node = a.grid().index(2, 2);
        a.move_node(node, 1);
        assert_eq!(a.assignment(node), 1);
        assert_eq!(a.district_size(1), 11);
        frontier_matches_rebuild(&a);
    }

    #[test]
    fn move_subgraph_keeps_frontier_consistent() {
        let mut a = halves();
        let grid = a.grid();
        let column = (0..5).map(|y| grid.index(3, y)).collect::<Vec<_>>();
        a.move_subgraph(&column, 3);
        assert_eq!(a.district_size(3), 5);
        assert_eq!(a.empty_districts(), 0);
        frontier_matches_rebuild(&a);
    }

    #[test]
    fn random_selection_respects_structure() {
        let a = halves();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let district = a.random_district_weighted_by_frontier(&mut rng).unwrap();
            assert!(district == 1 || district == 2);
            let node = a.random_frontier_node(district, &mut rng).unwrap();
            assert_eq!(a.assignment(node), district);
            let dest = a.random_neighboring_district(node, &mut rng).unwrap();
            assert_ne!(dest, district);
        }
        assert_eq!(a.random_empty_district(&mut rng), Some(3));
    }

    #[test]
    fn single_district_has_no_frontier() {
        let grid = Grid::new(3, 3).unwrap();
        let a = DistrictAssignment::from_assignments(grid, 1, vec![1; 9]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(a.random_district_weighted_by_frontier(&mut rng), None);
    }
}
