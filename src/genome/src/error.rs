use thiserror::Error;

/// Errors raised by the Reference [`Oracle`](crate::Oracle) while registering
/// chromosome files or answering [`Oracle::read()`](crate::Oracle::read) requests.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("chromosome '{0}' has not been registered with Oracle::register()")]
    UninitializedChromosome(u8),

    #[error("invalid range {start}..={end} on chromosome '{chromosome}': start must be >= 1 and <= end")]
    InvalidRange{chromosome: u8, start: u64, end: u64},

    #[error("chromosome '{0}' was already registered")]
    DuplicateChromosome(u8),

    #[error("failed to read fasta line-width while registering chromosome '{0}'")]
    MalformedFasta(u8),
}
