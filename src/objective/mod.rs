mod compactness;
mod metric;
mod objective;
mod snapshot;

pub use compactness::{CentroidDistance, Compactness, CompactnessMeasure, CutEdges};
pub use metric::FitParams;
pub use objective::{MetricWeights, Objective};
pub use snapshot::{DistrictResult, MetricSnapshot};
