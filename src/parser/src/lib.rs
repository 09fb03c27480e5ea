#[macro_use]
extern crate log;

mod error;
pub use error::ParserError;

mod cli;
pub use cli::{
    can_write_file, CatalogInputs, Cli, Commands, DistributionArg, ReadArgs, ReadTypeArg,
    RepertoireArgs, SpaceArg, UniquenessArg,
};

mod segments;
pub use segments::load_segment_table;

mod alleles;
pub use alleles::load_allele_fasta;

mod probability;
pub use probability::load_probability_model;
