mod clustered;
mod distribution;
mod io;
mod population;

pub use clustered::generate;
pub use distribution::{checkerboard, uniform};
pub use io::PopulationMap;
pub use population::{Population, Precinct};
