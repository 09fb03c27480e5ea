use std::f64::consts::PI;

use crate::error::DistributionError;

/// A named clone-population distribution strategy (§4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    /// Round-robin: clone `i` gets one individual every `size` draws.
    Stripe,
    /// Each of `population_size` individuals is assigned a uniformly random clone.
    Equal,
    /// Truncated standard normal, rejecting draws with `|x| > g_cutoff`, bucketed into `size` bins.
    Unimodal{g_cutoff: f64},
    /// Truncated chi-square(k), rejecting draws `> cutoff`, bucketed into `size` bins.
    ChiSquare{k: f64, cutoff: f64},
    /// Truncated logistic(0, scale), rejecting draws with `|x| > cutoff`, sorted, shifted positive and scaled to `population_size`.
    LogisticCdf{scale: f64, cutoff: f64},
}

/// Draw one standard-normal variate via the Box-Muller transform.
fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    let u1: f64 = rng.f64().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Draw one Gamma(shape, scale) variate via the Marsaglia-Tsang algorithm,
/// boosting sub-unit shapes per the `u^(1/shape)` correction.
fn gamma_sample(shape: f64, scale: f64, rng: &mut fastrand::Rng) -> f64 {
    if shape < 1.0 {
        let u = rng.f64().max(f64::MIN_POSITIVE);
        return gamma_sample(shape + 1.0, scale, rng) * u.powf(1.0 / shape);
    }
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let mut x;
        let mut v;
        loop {
            x = standard_normal(rng);
            v = 1.0 + c * x;
            if v > 0.0 {
                break;
            }
        }
        let v3 = v * v * v;
        let u = rng.f64().max(f64::MIN_POSITIVE);
        if u < 1.0 - 0.0331 * x * x * x * x || u.ln() < 0.5 * x * x + d * (1.0 - v3 + v3.ln()) {
            return d * v3 * scale;
        }
    }
}

/// Draw a chi-square(k) variate, i.e. Gamma(k/2, 2).
fn chisquare_sample(k: f64, rng: &mut fastrand::Rng) -> f64 {
    gamma_sample(k / 2.0, 2.0, rng)
}

/// Draw a logistic(0, scale) variate via inverse-CDF sampling.
fn logistic_sample(scale: f64, rng: &mut fastrand::Rng) -> f64 {
    let u = rng.f64().max(f64::MIN_POSITIVE).min(1.0 - f64::EPSILON);
    scale * (u / (1.0 - u)).ln()
}

/// Assign `population_size` individuals across `size` clones per the chosen
/// [`Distribution`], returning per-clone counts summing to `population_size`.
pub fn distribute(
    size: usize,
    population_size: u64,
    distribution: Distribution,
    rng: &mut fastrand::Rng,
) -> Result<Vec<u64>, DistributionError> {
    if size == 0 {
        return Err(DistributionError::EmptyRepertoire);
    }
    if population_size == 0 {
        return Err(DistributionError::NonPositivePopulation(population_size));
    }

    match distribution {
        Distribution::Stripe => {
            let mut counts = vec![0u64; size];
            for i in 0..population_size {
                counts[(i as usize) % size] += 1;
            }
            Ok(counts)
        }
        Distribution::Equal => {
            let mut counts = vec![0u64; size];
            for _ in 0..population_size {
                counts[rng.usize(..size)] += 1;
            }
            Ok(counts)
        }
        Distribution::Unimodal{g_cutoff} => {
            if g_cutoff <= 0.0 {
                return Err(DistributionError::NonPositiveCutoff(g_cutoff));
            }
            let mut counts = vec![0u64; size];
            for _ in 0..population_size {
                let x = loop {
                    let x = standard_normal(rng);
                    if x.abs() <= g_cutoff {
                        break x;
                    }
                };
                let bucket = bucket_index(x, -g_cutoff, g_cutoff, size);
                counts[bucket] += 1;
            }
            Ok(counts)
        }
        Distribution::ChiSquare{k, cutoff} => {
            if k <= 0.0 || cutoff <= 0.0 {
                return Err(DistributionError::InvalidChiSquare{k, cutoff});
            }
            let mut counts = vec![0u64; size];
            for _ in 0..population_size {
                let x = loop {
                    let x = chisquare_sample(k, rng);
                    if x <= cutoff {
                        break x;
                    }
                };
                let bucket = bucket_index(x, 0.0, cutoff, size);
                counts[bucket] += 1;
            }
            Ok(counts)
        }
        Distribution::LogisticCdf{scale, cutoff} => {
            if scale <= 0.0 || cutoff <= 0.0 {
                return Err(DistributionError::InvalidLogistic{scale, cutoff});
            }
            logistic_cdf_distribute(size, population_size, scale, cutoff, rng)
        }
    }
}

/// Map `x in [lo, hi]` onto a clone index in `0..size`.
fn bucket_index(x: f64, lo: f64, hi: f64, size: usize) -> usize {
    let fraction = ((x - lo) / (hi - lo)).clamp(0.0, 1.0 - f64::EPSILON);
    ((fraction * size as f64) as usize).min(size - 1)
}

/// Draw `size` truncated-logistic samples, sort them, shift to strictly
/// positive, normalize and scale by `population_size`, rounding to integer
/// counts. Retries up to 500 times if the rounded sum doesn't match
/// `population_size`; on final failure, nudges the head/tail bucket by ±1
/// and logs a warning.
fn logistic_cdf_distribute(
    size: usize,
    population_size: u64,
    scale: f64,
    cutoff: f64,
    rng: &mut fastrand::Rng,
) -> Result<Vec<u64>, DistributionError> {
    const MAX_ATTEMPTS: u32 = 500;

    for attempt in 0..MAX_ATTEMPTS {
        let mut samples: Vec<f64> = (0..size)
            .map(|_| loop {
                let x = logistic_sample(scale, rng);
                if x.abs() <= cutoff {
                    break x;
                }
            })
            .collect();
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let min = samples[0];
        let shifted: Vec<f64> = samples.iter().map(|x| x - min + 1.0).collect();
        let total: f64 = shifted.iter().sum();
        let normalized: Vec<f64> = shifted.iter().map(|x| x / total * population_size as f64).collect();
        let counts: Vec<u64> = normalized.iter().map(|x| x.round() as u64).collect();

        let sum: u64 = counts.iter().sum();
        if sum == population_size {
            return Ok(counts);
        }
        trace!("logisticcdf distribution attempt {attempt} produced sum {sum}, expected {population_size}; retrying");
    }

    let mut counts = logistic_cdf_best_effort(size, population_size, scale, cutoff, rng);
    let sum: u64 = counts.iter().sum();
    let len = counts.len();
    if sum < population_size {
        let deficit = population_size - sum;
        warn!("logisticcdf distribution undershot population_size by {deficit} after {MAX_ATTEMPTS} attempts; correcting the tail one unit at a time");
        for i in 0..deficit as usize {
            let index = len - (i % len) - 1;
            counts[index] += 1;
        }
    } else if sum > population_size {
        let excess = sum - population_size;
        warn!("logisticcdf distribution overshot population_size by {excess} after {MAX_ATTEMPTS} attempts; correcting the head one unit at a time");
        for i in 0..excess as usize {
            let index = i % len;
            counts[index] = counts[index].saturating_sub(1);
        }
    }
    counts
}

fn logistic_cdf_best_effort(
    size: usize,
    population_size: u64,
    scale: f64,
    cutoff: f64,
    rng: &mut fastrand::Rng,
) -> Vec<u64> {
    let mut samples: Vec<f64> = (0..size)
        .map(|_| loop {
            let x = logistic_sample(scale, rng);
            if x.abs() <= cutoff {
                break x;
            }
        })
        .collect();
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let min = samples[0];
    let shifted: Vec<f64> = samples.iter().map(|x| x - min + 1.0).collect();
    let total: f64 = shifted.iter().sum();
    shifted.iter().map(|x| (x / total * population_size as f64).round() as u64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_distributes_round_robin() {
        let mut rng = fastrand::Rng::with_seed(1);
        let counts = distribute(4, 10, Distribution::Stripe, &mut rng).unwrap();
        assert_eq!(counts, vec![3, 3, 2, 2]);
    }

    #[test]
    fn equal_sums_to_population_size() {
        let mut rng = fastrand::Rng::with_seed(2);
        let counts = distribute(5, 37, Distribution::Equal, &mut rng).unwrap();
        assert_eq!(counts.iter().sum::<u64>(), 37);
    }

    #[test]
    fn unimodal_sums_to_population_size() {
        let mut rng = fastrand::Rng::with_seed(3);
        let counts = distribute(6, 50, Distribution::Unimodal{g_cutoff: 2.0}, &mut rng).unwrap();
        assert_eq!(counts.iter().sum::<u64>(), 50);
    }

    #[test]
    fn chisquare_sums_to_population_size() {
        let mut rng = fastrand::Rng::with_seed(4);
        let counts = distribute(6, 50, Distribution::ChiSquare{k: 2.0, cutoff: 8.0}, &mut rng).unwrap();
        assert_eq!(counts.iter().sum::<u64>(), 50);
    }

    #[test]
    fn logisticcdf_sums_to_population_size() {
        let mut rng = fastrand::Rng::with_seed(5);
        let counts = distribute(6, 50, Distribution::LogisticCdf{scale: 1.0, cutoff: 5.0}, &mut rng).unwrap();
        assert_eq!(counts.iter().sum::<u64>(), 50);
    }

    #[test]
    fn rejects_empty_repertoire() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(distribute(0, 10, Distribution::Stripe, &mut rng).is_err());
    }

    #[test]
    fn rejects_zero_population() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(distribute(4, 0, Distribution::Stripe, &mut rng).is_err());
    }
}
