use std::{fs, path::Path};

/// A `read` plus a Phred+33 quality string of matching length, ready to be
/// written as four FASTQ lines by the caller.
#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub sequence: String,
    pub quality: String,
}

const MAX_PHRED: u8 = 41;

fn phred_to_char(q: u8) -> char {
    (33 + q.min(MAX_PHRED)) as char
}

fn error_rate_to_phred(error_rate: f64) -> u8 {
    let q = -10.0 * error_rate.max(1e-6).log10();
    q.round().clamp(0.0, MAX_PHRED as f64) as u8
}

fn jitter(base: f64, variability: f64, rng: &mut fastrand::Rng) -> f64 {
    if variability <= 0.0 {
        return base;
    }
    let delta = (rng.f64() * 2.0 - 1.0) * variability;
    (base + delta).clamp(0.0, 1.0)
}

/// Logistic per-base error-rate profile: `(l_max - base_error) /
/// (1 + exp(-k*(i - midpoint))) + base_error`, optionally jittered.
pub fn degrade_logistic(
    read: &str,
    base_error: f64,
    l_max: f64,
    k: f64,
    midpoint: f64,
    variability: f64,
    rng: &mut fastrand::Rng,
) -> FastqRecord {
    let quality: String = read
        .chars()
        .enumerate()
        .map(|(i, _)| {
            let rate = (l_max - base_error) / (1.0 + (-k * (i as f64 - midpoint)).exp()) + base_error;
            let rate = jitter(rate, variability, rng);
            phred_to_char(error_rate_to_phred(rate))
        })
        .collect();
    FastqRecord{sequence: read.to_string(), quality}
}

/// Per-base error rate derived from an existing Phred+33 quality string,
/// extending the last character when `read` outruns `phred_string`.
pub fn degrade_phred(read: &str, phred_string: &str, variability: f64, rng: &mut fastrand::Rng) -> FastqRecord {
    let phred_chars: Vec<char> = phred_string.chars().collect();
    let last = phred_chars.last().copied().unwrap_or((33 + MAX_PHRED) as char);

    let quality: String = read
        .chars()
        .enumerate()
        .map(|(i, _)| {
            let q_char = phred_chars.get(i).copied().unwrap_or(last);
            let q = (q_char as u8).saturating_sub(33);
            let rate = 10f64.powf(-(q as f64) / 10.0);
            let rate = jitter(rate, variability, rng);
            phred_to_char(error_rate_to_phred(rate))
        })
        .collect();
    FastqRecord{sequence: read.to_string(), quality}
}

/// Read quality lines (every 4th line, offset 3) from an existing FASTQ file,
/// for reuse as an empirical error profile. Warns on a malformed line count
/// or a quality line shorter than its matching sequence line.
pub fn read_fastq_qualities(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let lines: Vec<&str> = contents.lines().collect();

    if lines.len() % 4 != 0 {
        warn!("FASTQ file {:?} has {} lines, not a multiple of 4; trailing partial record ignored", path.as_ref(), lines.len());
    }

    let mut qualities = Vec::new();
    for chunk in lines.chunks(4) {
        if chunk.len() < 4 {
            continue;
        }
        let sequence = chunk[1];
        let quality = chunk[3];
        if quality.len() != sequence.len() {
            warn!("FASTQ file {:?}: quality line length {} does not match sequence length {}", path.as_ref(), quality.len(), sequence.len());
        }
        qualities.push(quality.to_string());
    }
    Ok(qualities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_degradation_matches_read_length() {
        let mut rng = fastrand::Rng::with_seed(1);
        let record = degrade_logistic("ACGTACGT", 0.001, 0.3, 0.2, 4.0, 0.0, &mut rng);
        assert_eq!(record.quality.chars().count(), record.sequence.chars().count());
    }

    #[test]
    fn phred_degradation_extends_last_quality() {
        let mut rng = fastrand::Rng::with_seed(1);
        let record = degrade_phred("ACGTACGTACGT", "III", 0.0, &mut rng);
        assert_eq!(record.quality.chars().count(), 12);
    }

    #[test]
    fn reads_qualities_from_fastq_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.fastq");
        fs::write(&path, "@r1\nACGT\n+\nIIII\n@r2\nACGTAC\n+\nIIIIII\n").unwrap();
        let quals = read_fastq_qualities(&path).unwrap();
        assert_eq!(quals, vec!["IIII".to_string(), "IIIIII".to_string()]);
    }
}
