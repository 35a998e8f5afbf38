mod contiguity;
mod frontier;
mod ops;
mod partition;
mod rolls;
mod seed;

use frontier::Frontier;
use rolls::Rolls;
pub use partition::DistrictAssignment;
pub use seed::seed;
