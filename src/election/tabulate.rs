use serde::Serialize;

use crate::error::{GrreatError, Result};

/// Seats won by each party in one multi-seat contest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tabulation {
    pub red_seats: u32,
    pub blue_seats: u32,
    /// Set when at least one seat was decided by the red-favoring tie-break.
    pub tie: bool,
}

/// Droop quota: the smallest vote count that guarantees one of `seats` seats.
#[inline]
pub fn droop_quota(total_votes: u64, seats: u32) -> u64 {
    total_votes / (seats as u64 + 1) + 1
}

/// Count a multi-seat election where every voter ranks all candidates of their
/// own party first, in one fixed party order.
///
/// Under that block ranking, single transferable vote collapses to a closed
/// form: each party has one live candidate at a time; the larger live total
/// wins the next seat, gives up one quota, and passes the remainder to the
/// party's next candidate. Exact ties go to red and are flagged.
///
/// A party with no votes wins no seats.
pub fn tabulate(red_votes: u64, blue_votes: u64, seats: u32) -> Result<Tabulation> {
    if seats < 1 {
        return Err(GrreatError::InvalidSeatCount(seats));
    }

    match (red_votes, blue_votes) {
        (0, 0) => return Ok(Tabulation { red_seats: seats, blue_seats: 0, tie: true }),
        (_, 0) => return Ok(Tabulation { red_seats: seats, blue_seats: 0, tie: false }),
        (0, _) => return Ok(Tabulation { red_seats: 0, blue_seats: seats, tie: false }),
        _ => {}
    }

    // Live totals go negative once a party has spent more quotas than it has
    // votes; i128 holds both that and the sum of two u64 totals.
    let total = i128::from(red_votes) + i128::from(blue_votes);
    let quota = total / (i128::from(seats) + 1) + 1;
    let (mut red_live, mut blue_live) = (i128::from(red_votes), i128::from(blue_votes));
    let mut result = Tabulation::default();

    for _ in 0..seats {
        if red_live >= blue_live {
            result.tie |= red_live == blue_live;
            result.red_seats += 1;
            red_live -= quota;
        } else {
            result.blue_seats += 1;
            blue_live -= quota;
        }
    }

    debug_assert_eq!(result.red_seats + result.blue_seats, seats);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_more_red_vote_can_cost_red_a_seat() {
        // The ninth red vote lifts the quota from 2 to 3, so red's four
        // candidates can no longer all clear blue's single vote.
        assert_eq!((droop_quota(9, 4), droop_quota(10, 4)), (2, 3));
        let before = tabulate(8, 1, 4).unwrap();
        let after = tabulate(9, 1, 4).unwrap();
        assert_eq!((before.red_seats, before.blue_seats), (4, 0));
        assert_eq!((after.red_seats, after.blue_seats), (3, 1));
    }

    #[test]
    fn counts_near_u64_max_do_not_wrap() {
        // Quota 2^63: red, then blue, then red's remainder edges out blue's.
        let result = tabulate(u64::MAX, u64::MAX - 1, 3).unwrap();
        assert_eq!((result.red_seats, result.blue_seats), (2, 1));
        assert!(!result.tie);
    }

    #[test]
    fn worked_example() {
        // R1 takes 251 of 550 (299 left) vs B1's 450 -> B1 takes 251 (199 left) vs R2's 299 -> R2.
        assert_eq!(droop_quota(1000, 3), 251);
        let result = tabulate(550, 450, 3).unwrap();
        assert_eq!((result.red_seats, result.blue_seats), (2, 1));
        assert!(!result.tie);
    }

    #[test]
    fn single_seat_is_plurality() {
        assert_eq!(tabulate(501, 499, 1).unwrap().red_seats, 1);
        assert_eq!(tabulate(499, 501, 1).unwrap().blue_seats, 1);
    }

    #[test]
    fn exact_tie_goes_to_red_and_is_flagged() {
        let result = tabulate(500, 500, 1).unwrap();
        assert_eq!((result.red_seats, result.blue_seats), (1, 0));
        assert!(result.tie);
    }

    #[test]
    fn zero_votes_wins_nothing() {
        assert_eq!(tabulate(700, 0, 5).unwrap(), Tabulation { red_seats: 5, blue_seats: 0, tie: false });
        assert_eq!(tabulate(0, 3, 4).unwrap(), Tabulation { red_seats: 0, blue_seats: 4, tie: false });
    }

    #[test]
    fn rejects_zero_seats() {
        assert!(matches!(tabulate(1, 1, 0), Err(GrreatError::InvalidSeatCount(0))));
    }
}
