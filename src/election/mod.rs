mod tabulate;

pub use tabulate::{Tabulation, droop_quota, tabulate};
