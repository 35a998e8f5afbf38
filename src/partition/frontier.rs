/// Precincts on the boundary of each district, with O(1) insert/remove.
///
/// A precinct is present iff at least one of its neighbors is in another
/// district; it is filed under its own district.
#[derive(Debug, Clone)]
pub(crate) struct Frontier {
    sets: Vec<Vec<usize>>,
    index: Vec<Option<(u32, usize)>>, // index[p] = Some((district, pos)) if p is in sets[district] @ pos
}

impl Frontier {
    pub(crate) fn new(num_slots: usize, num_precincts: usize) -> Self {
        Self {
            sets: vec![Vec::new(); num_slots],
            index: vec![None; num_precincts],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.sets.iter_mut().for_each(Vec::clear);
        self.index.fill(None);
    }

    /// Boundary precincts of `district`.
    #[inline]
    pub(crate) fn get(&self, district: u32) -> &[usize] {
        &self.sets[district as usize]
    }

    /// Boundary sizes of every slot, indexed by district id.
    pub(crate) fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.sets.iter().map(Vec::len)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, precinct: usize) -> bool {
        self.index[precinct].is_some()
    }

    /// File `precinct` under `district`, moving it if it was filed elsewhere.
    pub(crate) fn insert(&mut self, precinct: usize, district: u32) {
        match self.index[precinct] {
            Some((current, _)) if current == district => {}
            Some(_) => { self.remove(precinct); self.push(precinct, district) }
            None => self.push(precinct, district),
        }
    }

    /// Drop `precinct` from whichever district it is filed under.
    pub(crate) fn remove(&mut self, precinct: usize) {
        if let Some((district, pos)) = self.index[precinct] {
            let set = &mut self.sets[district as usize];
            let last = set.pop().expect("filed precinct implies non-empty set");
            if pos < set.len() {
                set[pos] = last;
                self.index[last] = Some((district, pos));
            }
            self.index[precinct] = None;
        }
    }

    #[inline]
    fn push(&mut self, precinct: usize, district: u32) {
        let set = &mut self.sets[district as usize];
        self.index[precinct] = Some((district, set.len()));
        set.push(precinct);
    }
}

#[cfg(test)]
mod tests {
    use super::Frontier;

    #[test]
    fn insert_moves_between_districts() {
        let mut frontier = Frontier::new(3, 10);
        frontier.insert(6, 1);
        frontier.insert(6, 2);
        assert!(frontier.get(1).is_empty());
        assert_eq!(frontier.get(2), &[6]);
        assert!(frontier.contains(6));
    }

    #[test]
    fn remove_patches_swapped_index() {
        let mut frontier = Frontier::new(2, 4);
        frontier.insert(0, 1);
        frontier.insert(1, 1);
        frontier.insert(2, 1);
        frontier.remove(0);
        frontier.remove(2);

        assert_eq!(frontier.get(1), &[1]);
        assert!(!frontier.contains(0) && !frontier.contains(2));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut frontier = Frontier::new(2, 5);
        frontier.remove(3);
        assert!(frontier.sizes().all(|n| n == 0));
    }

    #[test]
    fn clear_resets_everything() {
        let mut frontier = Frontier::new(2, 6);
        frontier.insert(0, 0);
        frontier.insert(2, 1);
        frontier.clear();
        assert!(frontier.sizes().all(|n| n == 0));
        assert!((0..6).all(|p| !frontier.contains(p)));
    }
}
