use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("malformed segment table row ({row}): expected field '{field}'")]
    MalformedSegmentRow{field: &'static str, row: String},

    #[error("malformed allele FASTA header: {0}")]
    MalformedAlleleHeader(String),

    #[error("{0} does not exist")]
    MissingFileEntity(String),

    #[error("{0} already exists. Use --overwrite to force.")]
    CannotOverwrite(String),

    #[error("failed to parse recombination probability document at {path}: {source}")]
    ProbabilityDocument{path: String, #[source] source: serde_yaml::Error},
}
