use std::path::PathBuf;

/// Strand orientation of a genomic feature, relative to the forward strand of
/// the chromosome it is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

/// Byte-offset bookkeeping for one registered chromosome FASTA file.
///
/// `header_len` is the byte length of the header line (including its
/// trailing newline); `line_width` is the number of sequence characters per
/// wrapped line (excluding the newline). Both are measured once at
/// registration time and assumed constant for the remainder of the file, as
/// is standard for fixed-width-line FASTA.
#[derive(Debug, Clone)]
pub struct Chromosome {
    pub(crate) key: u8,
    pub(crate) path: PathBuf,
    pub(crate) header_len: u64,
    pub(crate) line_width: u64,
}

impl Chromosome {
    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}
