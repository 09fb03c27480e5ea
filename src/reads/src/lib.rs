#[macro_use]
extern crate log;

mod error;
pub use error::ReadError;

mod length;
pub use length::{GaussianParams, PairedLengthParams, PairedLengths};

mod simulator;
pub use simulator::{pick_clone, simulate_read, ReadLengthParams, ReadRecord, ReadSpace};

pub mod fastq;
