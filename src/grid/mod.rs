mod grid;

pub use grid::{Grid, is_one_plus_power_of_two};
