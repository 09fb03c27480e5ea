use thiserror::Error;

/// Fatal mismatches between a drawn read length and what was actually
/// emitted (§4.7 post-condition).
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("emitted read length {actual} does not match the drawn length {expected}")]
    GeometryMismatch{expected: usize, actual: usize},

    #[error("gaussian length distribution requires a strictly positive mean, got {0}")]
    NonPositiveMean(f64),

    #[error("cannot pick a clone from an empty repertoire")]
    EmptyRepertoire,
}
