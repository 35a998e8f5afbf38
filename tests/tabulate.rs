use grreat::{GrreatError, Tabulation, droop_quota, tabulate};
use proptest::prelude::*;

proptest! {
    #[test]
    fn every_seat_is_filled(red in 0u64..100_000, blue in 0u64..100_000, seats in 1u32..12) {
        let result = tabulate(red, blue, seats).unwrap();
        prop_assert_eq!(result.red_seats + result.blue_seats, seats);
    }

    #[test]
    fn more_red_votes_never_cost_red_a_seat(red in 1u64..50_000, blue in 1u64..50_000, seats in 1u32..8) {
        // Only comparable while the extra vote leaves the quota where it was.
        prop_assume!(droop_quota(red + blue, seats) == droop_quota(red + 1 + blue, seats));
        let before = tabulate(red, blue, seats).unwrap();
        let after = tabulate(red + 1, blue, seats).unwrap();
        prop_assert!(after.red_seats >= before.red_seats);
    }

    #[test]
    fn a_party_without_votes_wins_nothing(votes in 1u64..1_000_000, seats in 1u32..20) {
        prop_assert_eq!(tabulate(votes, 0, seats).unwrap(), Tabulation { red_seats: seats, blue_seats: 0, tie: false });
        prop_assert_eq!(tabulate(0, votes, seats).unwrap(), Tabulation { red_seats: 0, blue_seats: seats, tie: false });
    }
}

#[test]
fn quota_transfer_worked_example() {
    // R1 takes 251 of 550, leaving 299; B1 takes 251 of 450, leaving 199; R2 beats 199 with 299.
    assert_eq!(droop_quota(1000, 3), 251);
    let result = tabulate(550, 450, 3).unwrap();
    assert_eq!((result.red_seats, result.blue_seats), (2, 1));
    assert!(!result.tie);
}

#[test]
fn exact_tie_goes_to_red_and_is_flagged() {
    let result = tabulate(500, 500, 1).unwrap();
    assert_eq!((result.red_seats, result.blue_seats), (1, 0));
    assert!(result.tie);
}

#[test]
fn zero_seats_are_rejected() {
    assert!(matches!(tabulate(10, 10, 0), Err(GrreatError::InvalidSeatCount(0))));
}
