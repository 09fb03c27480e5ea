#[macro_use]
extern crate log;

mod chromosome;
pub use chromosome::{Chromosome, Strand};

mod error;
pub use error::OracleError;

mod oracle;
pub use oracle::{Oracle, reverse_complement};
