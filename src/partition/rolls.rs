/// The precinct roll of every district, for O(1) transfers between them.
///
/// Rolls are indexed by district id; ids start at 1, so roll 0 is never filled.
#[derive(Debug, Clone)]
pub(crate) struct Rolls {
    rolls: Vec<Vec<usize>>,
    ids: Vec<u32>,   // district of each precinct
    line: Vec<usize>, // where each precinct is listed on its district's roll
}

impl Rolls {
    /// Enroll precinct `p` on the roll of district `ids[p]`.
    pub(crate) fn enroll(num_districts: u32, ids: Vec<u32>) -> Self {
        let mut rolls = vec![Vec::new(); num_districts as usize + 1];
        let line = ids.iter().enumerate()
            .map(|(precinct, &district)| {
                debug_assert!((1..=num_districts).contains(&district), "district {district} out of range");
                let roll = &mut rolls[district as usize];
                roll.push(precinct);
                roll.len() - 1
            })
            .collect();
        Self { rolls, ids, line }
    }

    #[inline] pub(crate) fn district_of(&self, precinct: usize) -> u32 { self.ids[precinct] }

    #[inline] pub(crate) fn roll(&self, district: u32) -> &[usize] { &self.rolls[district as usize] }

    #[inline] pub(crate) fn ids(&self) -> &[u32] { &self.ids }

    /// Strike `precinct` from its current roll and list it under `district`.
    pub(crate) fn transfer(&mut self, precinct: usize, district: u32) {
        let from = self.ids[precinct];
        if from == district { return }

        let line = self.line[precinct];
        let roll = &mut self.rolls[from as usize];
        roll.swap_remove(line);
        if let Some(&shifted) = roll.get(line) {
            self.line[shifted] = line;
        }

        let roll = &mut self.rolls[district as usize];
        self.line[precinct] = roll.len();
        roll.push(precinct);
        self.ids[precinct] = district;
    }
}
