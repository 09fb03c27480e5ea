#[macro_use]
extern crate log;

mod error;
pub use error::DistributionError;

mod distributor;
pub use distributor::{distribute, Distribution};

mod cell;
pub use cell::{Chain, ChainPicks, TcrCell};

mod repertoire;
pub use repertoire::{Repertoire, Uniqueness};
