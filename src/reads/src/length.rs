use std::f64::consts::PI;

use crate::error::ReadError;

/// Truncated-normal length parameters: draws are resampled until
/// `|x-mean|/sd <= cutoff` and `x > 0`; `sd = 0` always yields `mean`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianParams {
    pub mean: f64,
    pub sd: f64,
    pub cutoff: f64,
}

impl GaussianParams {
    pub fn validate(&self) -> Result<(), ReadError> {
        if self.mean <= 0.0 {
            return Err(ReadError::NonPositiveMean(self.mean));
        }
        Ok(())
    }

    /// Draw one accepted length, rounded to the nearest integer.
    pub fn draw(&self, rng: &mut fastrand::Rng) -> u64 {
        if self.sd == 0.0 {
            return self.mean.round() as u64;
        }
        loop {
            let x = self.mean + self.sd * standard_normal(rng);
            if x > 0.0 && (x - self.mean).abs() / self.sd <= self.cutoff {
                return x.round() as u64;
            }
        }
    }
}

/// Paired-end length parameters: the insert length is drawn first, then
/// read1/read2 lengths, each additionally constrained `<= insertLength`.
#[derive(Debug, Clone, Copy)]
pub struct PairedLengthParams {
    pub insert: GaussianParams,
    pub read1: GaussianParams,
    pub read2: GaussianParams,
}

pub struct PairedLengths {
    pub insert_length: u64,
    pub read1_length: u64,
    pub read2_length: u64,
}

impl PairedLengthParams {
    pub fn draw(&self, rng: &mut fastrand::Rng) -> PairedLengths {
        let insert_length = self.insert.draw(rng);
        let read1_length = draw_capped(&self.read1, insert_length, rng);
        let read2_length = draw_capped(&self.read2, insert_length, rng);
        PairedLengths{insert_length, read1_length, read2_length}
    }
}

fn draw_capped(params: &GaussianParams, cap: u64, rng: &mut fastrand::Rng) -> u64 {
    if params.sd == 0.0 {
        return params.mean.round() as u64;
    }
    loop {
        let x = params.mean + params.sd * standard_normal(rng);
        if x > 0.0 && (x - params.mean).abs() / params.sd <= params.cutoff && (x.round() as u64) <= cap {
            return x.round() as u64;
        }
    }
}

fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    let u1: f64 = rng.f64().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sd_always_returns_mean() {
        let mut rng = fastrand::Rng::with_seed(1);
        let params = GaussianParams{mean: 150.0, sd: 0.0, cutoff: 2.0};
        assert_eq!(params.draw(&mut rng), 150);
    }

    #[test]
    fn draws_respect_cutoff() {
        let mut rng = fastrand::Rng::with_seed(2);
        let params = GaussianParams{mean: 100.0, sd: 10.0, cutoff: 2.0};
        for _ in 0..50 {
            let x = params.draw(&mut rng) as f64;
            assert!(x > 0.0);
            assert!((x - 100.0).abs() / 10.0 <= 2.01);
        }
    }

    #[test]
    fn paired_lengths_never_exceed_insert() {
        let mut rng = fastrand::Rng::with_seed(3);
        let params = PairedLengthParams{
            insert: GaussianParams{mean: 300.0, sd: 20.0, cutoff: 2.0},
            read1: GaussianParams{mean: 100.0, sd: 10.0, cutoff: 2.0},
            read2: GaussianParams{mean: 100.0, sd: 10.0, cutoff: 2.0},
        };
        for _ in 0..20 {
            let lengths = params.draw(&mut rng);
            assert!(lengths.read1_length <= lengths.insert_length);
            assert!(lengths.read2_length <= lengths.insert_length);
        }
    }
}
