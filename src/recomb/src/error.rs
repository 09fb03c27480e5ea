use thiserror::Error;

/// Fatal error raised by the Segment [`crate::Chooser`]: the filtered
/// candidate set was empty. Indicates a malformed catalog or an
/// over-constrained call site, not a recoverable condition.
#[derive(Error, Debug)]
pub enum ChooserError {
    #[error("no candidate {role} segment for receptor type {receptor_type} (prior V={v_gene:?}, D={d_gene:?})")]
    NoCandidates{receptor_type: &'static str, role: &'static str, v_gene: Option<String>, d_gene: Option<String>},
}

/// Non-fatal recombination rejection reason (§4.3 step 5). The caller (the
/// TCR Cell constructor) recovers from every variant by resampling the
/// whole chain from scratch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("RNA sequence is not in frame (ATG(CTAG{{3}})+)")]
    FrameShift,

    #[error("premature stop codon found before the final codon")]
    PrematureStop,

    #[error("RNA sequence does not contain a valid CDR3 (Cys...FGxG) motif")]
    InvalidCDR3,
}
