use std::{
    collections::BTreeMap,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use located_error::prelude::*;

use crate::{chromosome::{Chromosome, Strand}, error::OracleError};

/// Random-access reader over one or more linear chromosome sequences.
///
/// `Oracle` is intentionally not `Sync`: it keeps no internal buffering or
/// memory-mapping, reopening the underlying file on every [`read()`](Oracle::read)
/// call, which is sufficient for the bounded, single-threaded access pattern
/// of this engine (see the concurrency model: the oracle performs blocking
/// I/O directly inside the call, there is no background indexer).
#[derive(Debug, Default)]
pub struct Oracle {
    chromosomes: BTreeMap<u8, Chromosome>,
}

impl Oracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed-width-line FASTA file as the reference for
    /// `chromosome`. The header length and line width are measured from the
    /// file's first two lines.
    ///
    /// # Errors
    /// Returns [`OracleError::DuplicateChromosome`] if `chromosome` is
    /// already registered, or [`OracleError::MalformedFasta`] if the file's
    /// first two lines cannot be measured.
    pub fn register(&mut self, chromosome: u8, path: impl AsRef<Path>) -> anyhow::Result<()> {
        if self.chromosomes.contains_key(&chromosome) {
            return Err(OracleError::DuplicateChromosome(chromosome).into());
        }

        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).with_loc(|| format!("while registering chromosome {chromosome} from {path:?}"))?;
        let mut lines = std::io::BufReader::new(file).lines_with_terminators();

        let header = lines.next().loc(OracleError::MalformedFasta(chromosome))?;
        let first_seq_line = lines.next().loc(OracleError::MalformedFasta(chromosome))?;

        let header_len = header.len() as u64;
        let line_width = first_seq_line.trim_end_matches(['\n', '\r']).len() as u64;

        info!("Registered chromosome {chromosome} ({path:?}): header_len={header_len}, line_width={line_width}");
        self.chromosomes.insert(chromosome, Chromosome{key: chromosome, path, header_len, line_width});
        Ok(())
    }

    /// Return the nucleotide sequence spanning `start..=end` (1-based,
    /// forward-strand coordinates) of `chromosome`, reverse-complemented if
    /// `strand` is [`Strand::Reverse`]. Output is uppercased over
    /// `{A,C,G,T,N}`.
    ///
    /// # Errors
    /// [`OracleError::UninitializedChromosome`] if `chromosome` was never
    /// registered; [`OracleError::InvalidRange`] if `start > end` or
    /// `start == 0`.
    pub fn read(&self, chromosome: u8, start: u64, end: u64, strand: Strand) -> anyhow::Result<String> {
        if start == 0 || start > end {
            return Err(OracleError::InvalidRange{chromosome, start, end}.into());
        }
        let chr = self.chromosomes.get(&chromosome)
            .loc(OracleError::UninitializedChromosome(chromosome))?;

        let mut file = File::open(&chr.path).with_loc(|| format!("re-opening chromosome {chromosome} reference"))?;

        let seek_pos = chr.header_len + start + (start / chr.line_width) - 1;
        let read_len = (end - start + (end - start) / chr.line_width + 2) as usize;

        file.seek(SeekFrom::Start(seek_pos)).with_loc(|| format!("seeking chromosome {chromosome} at offset {seek_pos}"))?;

        let mut buf = vec![0u8; read_len];
        let n = file.read(&mut buf).with_loc(|| format!("reading chromosome {chromosome} at offset {seek_pos}"))?;
        buf.truncate(n);

        let mut data: String = String::from_utf8_lossy(&buf)
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect::<String>()
            .to_uppercase();

        let want = (end - start + 1) as usize;
        if data.len() > want {
            data.truncate(want);
        }
        if data.len() < want {
            return Err(OracleError::InvalidRange{chromosome, start, end}.into());
        }

        if strand == Strand::Reverse {
            data = reverse_complement(&data);
        }
        Ok(data)
    }
}

/// Reverse-complement a nucleotide string. `C<->G`, `A<->T`, `U` is accepted
/// on input (mapped to `A`) but never produced on output. Characters outside
/// `{A,C,G,T,U,N}` pass through unchanged, only reversed.
pub fn reverse_complement(value: &str) -> String {
    value.chars().rev().map(|c| match c {
        'C' => 'G', 'c' => 'g',
        'G' => 'C', 'g' => 'c',
        'A' => 'T', 'a' => 't',
        'T' | 'U' => 'A',
        't' | 'u' => 'a',
        other => other,
    }).collect()
}

/// Small helper giving line iteration that preserves the exact raw line
/// length (including its terminator), needed to measure FASTA header/line
/// widths without guessing at `\n` vs `\r\n`.
trait LinesWithTerminators {
    fn lines_with_terminators(self) -> RawLines<Self> where Self: Sized;
}

impl<R: std::io::BufRead> LinesWithTerminators for R {
    fn lines_with_terminators(self) -> RawLines<Self> {
        RawLines{reader: self}
    }
}

struct RawLines<R> {
    reader: R,
}

impl<R: std::io::BufRead> Iterator for RawLines<R> {
    type Item = String;
    fn next(&mut self) -> Option<String> {
        let mut buf = String::new();
        match self.reader.read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fasta(dir: &tempfile::TempDir, name: &str, header: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        writeln!(f, "{header}").unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn reverse_complement_is_involutive() {
        let seq = "ACGTTGCA";
        let rc = reverse_complement(seq);
        assert_eq!(rc, "TGCAACGT");
        assert_eq!(reverse_complement(&rc), seq);
    }

    #[test]
    fn uninitialized_chromosome_is_rejected() {
        let oracle = Oracle::new();
        let err = oracle.read(1, 1, 10, Strand::Forward).unwrap_err();
        assert!(err.to_string().contains("has not been registered") || format!("{err:?}").contains("UninitializedChromosome"));
    }

    #[test]
    fn invalid_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(&dir, "chr1.fa", ">chr1", &["ACGTACGTAC"]);
        let mut oracle = Oracle::new();
        oracle.register(1, &path).unwrap();
        let err = oracle.read(1, 5, 2, Strand::Forward).unwrap_err();
        assert!(format!("{err:?}").contains("InvalidRange"));
    }

    #[test]
    fn reads_first_line_forward() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(&dir, "chr1.fa", ">chr1 test", &["ACGTACGTACGTACGTACGT"]);
        let mut oracle = Oracle::new();
        oracle.register(1, &path).unwrap();
        let seq = oracle.read(1, 1, 4, Strand::Forward).unwrap();
        assert_eq!(seq, "ACGT");
    }

    #[test]
    fn reads_reverse_strand() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(&dir, "chr1.fa", ">chr1", &["ACGTACGTACGTACGTACGT"]);
        let mut oracle = Oracle::new();
        oracle.register(1, &path).unwrap();
        let seq = oracle.read(1, 1, 4, Strand::Reverse).unwrap();
        assert_eq!(seq, reverse_complement("ACGT"));
    }

    #[test]
    fn reads_across_line_wrap() {
        let dir = tempfile::tempdir().unwrap();
        // 10 chars per line, want positions 8..=13 which straddle the wrap.
        let path = write_fasta(&dir, "chr1.fa", ">chr1", &["AAAAAAAAAA", "CCCCCCCCCC", "GGGGGGGGGG"]);
        let mut oracle = Oracle::new();
        oracle.register(1, &path).unwrap();
        let seq = oracle.read(1, 8, 13, Strand::Forward).unwrap();
        assert_eq!(seq, "AAACCC");
    }
}
