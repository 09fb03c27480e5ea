#[macro_use]
extern crate log;

mod segment;
pub use segment::{ReceptorType, Region, Segment, SegmentType};

mod catalog;
pub use catalog::Catalog;

mod probability;
pub use probability::{JunctionKind, ProbabilityModel, VdjWeight};

mod error;
pub use error::CatalogError;
