#[macro_use]
extern crate log;

mod error;
pub use error::{ChooserError, RejectReason};

mod chooser;
pub use chooser::{Chooser, Pick};

mod recombinator;
pub use recombinator::{random_nucleotides, Recombinator, Record};
