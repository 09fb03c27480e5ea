use catalog::ReceptorType;
use genome::{reverse_complement, Oracle};
use recomb::Record;
use repertoire::{Repertoire, TcrCell};

use crate::{
    error::ReadError,
    length::{GaussianParams, PairedLengthParams},
};

/// Which record (DNA or spliced RNA) a read is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSpace {
    Dna,
    Rna,
}

/// One simulated read or read pair, with its `@STIG:...` comment tag.
#[derive(Debug, Clone)]
pub enum ReadRecord {
    Single{read: String, comment: String},
    Paired{read1: String, read2: String, comment: String},
    Amplicon{forward: String, reverse: String, comment: String},
}

/// Length-draw parameters for the three read types.
#[derive(Debug, Clone, Copy)]
pub enum ReadLengthParams {
    Single(GaussianParams),
    Paired(PairedLengthParams),
    Amplicon(GaussianParams),
}

/// Pick a clone index by drawing `r = U * population_size` and walking the
/// cumulative per-clone counts to the first that exceeds it (§4.7 step 1).
pub fn pick_clone(counts: &[u64], population_size: u64, rng: &mut fastrand::Rng) -> Result<usize, ReadError> {
    if counts.is_empty() {
        return Err(ReadError::EmptyRepertoire);
    }
    let r = rng.f64() * population_size as f64;
    let mut cumulative = 0u64;
    for (i, count) in counts.iter().enumerate() {
        cumulative += count;
        if r < cumulative as f64 {
            return Ok(i);
        }
    }
    Ok(counts.len() - 1)
}

fn chain_record<'a>(cell: &'a TcrCell, space: ReadSpace, chain_idx: usize) -> (&'a Record, ReceptorType) {
    let (chain, receptor_type) = if chain_idx == 0 {
        (&cell.chain1, cell.type1)
    } else {
        (&cell.chain2, cell.type2)
    };
    let record = match space {
        ReadSpace::Dna => &chain.dna,
        ReadSpace::Rna => &chain.rna,
    };
    (record, receptor_type)
}

/// Extend `[start_index, start_index+length)` of `record.sequence` into the
/// flanking reference as needed, per §4.7 step 5.
fn extend_with_utr(oracle: &Oracle, record: &Record, start_index: i64, length: u64) -> anyhow::Result<String> {
    let seq_len = record.sequence.chars().count() as i64;
    let length = length as i64;

    let five_utr_len = 0.max(length.min(-start_index));
    let three_utr_len = 0.max(start_index + length - seq_len);

    let five_utr = if five_utr_len > 0 {
        oracle.read(
            record.chromosome,
            (record.five_coord as i64 - five_utr_len + 1) as u64,
            record.five_coord,
            record.five_strand,
        )?
    } else {
        String::new()
    };

    let three_utr = if three_utr_len > 0 {
        oracle.read(
            record.chromosome,
            record.three_coord,
            record.three_coord + three_utr_len as u64 - 1,
            record.three_strand,
        )?
    } else {
        String::new()
    };

    let mid_start = 0.max(start_index) as usize;
    let mid_end = (0.max(start_index) + length - five_utr_len - three_utr_len) as usize;
    let chars: Vec<char> = record.sequence.chars().collect();
    let middle: String = chars.get(mid_start..mid_end.min(chars.len())).unwrap_or(&[]).iter().collect();

    Ok(format!("{five_utr}{middle}{three_utr}"))
}

/// Locate `amplicon_probe` (forward, then reverse-complement) in `sequence`,
/// returning the drawn read's start index and an optional probe-position tag.
/// Preserves the original's `find(...) > 0` check on the RC search, which
/// misses a reverse-complement match exactly at position 0.
fn amplicon_start(sequence: &str, probe: &str, length: u64) -> Option<(i64, String)> {
    if let Some(p) = sequence.find(probe) {
        return Some((p as i64, format!(":ampliconStartPos={p}")));
    }
    let rc_probe = reverse_complement(probe);
    let q = sequence.find(&rc_probe)?;
    if q > 0 {
        let start_index = q as i64 - length as i64 + probe.chars().count() as i64;
        Some((start_index, format!(":ampliconStartPos={start_index}:ampliconProbePos={q}")))
    } else {
        None
    }
}

/// Draw and emit one read (or read pair) from `repertoire`, per §4.7.
/// Returns `Ok(None)` for an amplicon draw whose probe is absent from the
/// chosen chain (skipped, not an error).
#[allow(clippy::too_many_arguments)]
pub fn simulate_read(
    repertoire: &Repertoire,
    counts: &[u64],
    population_size: u64,
    space: ReadSpace,
    length_params: ReadLengthParams,
    amplicon_probe: Option<&str>,
    read_index: u64,
    oracle: &Oracle,
    rng: &mut fastrand::Rng,
) -> anyhow::Result<Option<ReadRecord>> {
    let clone_idx = pick_clone(counts, population_size, rng)?;
    let cell = &repertoire.clones[clone_idx];

    let chain_idx = if rng.bool() {1} else {0};
    let (record, receptor_type) = chain_record(cell, space, chain_idx);

    let record_and_read = match length_params {
        ReadLengthParams::Single(gp) => {
            let length = gp.draw(rng);
            let (start_index, tag) = non_amplicon_start(record, length, rng);
            let read = extend_with_utr(oracle, record, start_index, length)?;
            check_length(&read, length as usize)?;
            let comment = format!("@STIG:readnum={read_index}:clone={clone_idx}:chain={}{tag}", receptor_type.as_str());
            ReadRecord::Single{read, comment}
        }
        ReadLengthParams::Paired(pp) => {
            let lengths = pp.draw(rng);
            let (start_index, tag) = non_amplicon_start(record, lengths.insert_length, rng);
            let read = extend_with_utr(oracle, record, start_index, lengths.insert_length)?;
            check_length(&read, lengths.insert_length as usize)?;
            let chars: Vec<char> = read.chars().collect();
            let read1: String = chars[..lengths.read1_length as usize].iter().collect();
            let tail_start = chars.len() - lengths.read2_length as usize;
            let read2 = reverse_complement(&chars[tail_start..].iter().collect::<String>());
            let comment = format!("@STIG:readnum={read_index}:clone={clone_idx}:chain={}{tag}", receptor_type.as_str());
            ReadRecord::Paired{read1, read2, comment}
        }
        ReadLengthParams::Amplicon(gp) => {
            let length = gp.draw(rng);
            let probe = amplicon_probe.unwrap_or_default();
            let Some((start_index, tag)) = amplicon_start(&record.sequence, probe, length) else {
                return Ok(None);
            };
            let read = extend_with_utr(oracle, record, start_index, length)?;
            check_length(&read, length as usize)?;
            let reverse = reverse_complement(&read);
            let comment = format!("@STIG:readnum={read_index}:clone={clone_idx}:chain={}{tag}", receptor_type.as_str());
            ReadRecord::Amplicon{forward: read, reverse, comment}
        }
    };

    Ok(Some(record_and_read))
}

fn non_amplicon_start(record: &Record, length: u64, rng: &mut fastrand::Rng) -> (i64, String) {
    let seq_len = record.sequence.chars().count() as i64;
    let lo = -(length as i64 - 1);
    let hi = seq_len - 1;
    let start_index = lo + rng.i64(0..=(hi - lo));
    (start_index, format!(":randpos={start_index}"))
}

fn check_length(read: &str, expected: usize) -> anyhow::Result<()> {
    let actual = read.chars().count();
    if actual != expected {
        return Err(ReadError::GeometryMismatch{expected, actual}.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_clone_walks_cumulative_counts() {
        let counts = vec![3, 0, 2];
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..50 {
            let idx = pick_clone(&counts, 5, &mut rng).unwrap();
            assert!(idx < counts.len());
            assert_ne!(idx, 1);
        }
    }

    #[test]
    fn amplicon_start_finds_forward_probe() {
        let (start, tag) = amplicon_start("AAACGTGGG", "CGT", 9).unwrap();
        assert_eq!(start, 3);
        assert!(tag.contains("ampliconStartPos=3"));
    }

    #[test]
    fn amplicon_start_misses_rc_probe_at_position_zero() {
        // Probe's reverse-complement sits at position 0: the quirk means this
        // is treated as not-found, matching the original's `find(...) > 0`.
        let probe = "ACG";
        let rc = reverse_complement(probe);
        let sequence = format!("{rc}TTTTTT");
        assert!(amplicon_start(&sequence, probe, 6).is_none());
    }
}
