use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of the ordered `vdj_weights` list. Tuple arity encodes the
/// selection context it applies to (see §3 of the data model); lookup keeps
/// the declaration order and returns the first match ("first match wins").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "context")]
pub enum VdjWeight {
    /// `(V_gene, weight)`
    V{v_gene: String, weight: f64},
    /// `(D_gene, V_gene, weight)`
    D{d_gene: String, v_gene: String, weight: f64},
    /// `(J_gene, V_gene, weight)` — used when no D is present (alpha/gamma).
    J{j_gene: String, v_gene: String, weight: f64},
    /// `(J_gene, V_gene, D_gene, weight)` — used for beta/delta, D present.
    Jd{j_gene: String, v_gene: String, d_gene: String, weight: f64},
}

impl VdjWeight {
    pub fn weight(&self) -> f64 {
        match self {
            Self::V{weight, ..} | Self::D{weight, ..} | Self::J{weight, ..} | Self::Jd{weight, ..} => *weight,
        }
    }
}

/// Named discrete junction-length distributions (§3): chewback and
/// N-addition draws, each a list of probabilities indexed by the drawn
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JunctionKind {
    Vchewback,
    D5chewback,
    D3chewback,
    Jchewback,
    VDaddition,
    DJaddition,
    VJaddition,
}

/// Segment-selection weights and junction-length distributions, built once
/// from the recombination probability document and thereafter read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbabilityModel {
    #[serde(rename = "segments")]
    pub vdj_weights: Vec<VdjWeight>,
    #[serde(rename = "recombination")]
    pub junction: HashMap<JunctionKind, Vec<f64>>,
}

impl ProbabilityModel {
    /// Draw a non-negative integer index from `probabilities` via
    /// cumulative weighted sampling: the remaining mass (if the array
    /// doesn't sum to 1, due to rounding) is implicitly assigned to the
    /// last index, with a warning.
    pub fn roll(probabilities: &[f64], rng: &mut fastrand::Rng) -> usize {
        let r = rng.f64();
        let mut cumulative = 0.0;
        let mut index = 0;
        for (i, p) in probabilities.iter().enumerate() {
            cumulative += p;
            index = i;
            if r < cumulative {
                return index;
            }
        }
        warn!(
            "Assigning value based on unassigned probability (array: {probabilities:?}, sum={cumulative:.6}); \
             check your probability configuration to ensure this is intentional"
        );
        index
    }

    pub fn roll_junction(&self, kind: JunctionKind, rng: &mut fastrand::Rng) -> usize {
        match self.junction.get(&kind) {
            Some(probs) => Self::roll(probs, rng),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_picks_first_index_exceeding_cumulative() {
        let mut rng = fastrand::Rng::with_seed(7);
        let probs = vec![0.5, 0.25, 0.125, 0.125];
        // Exercise many draws; every result must be a valid index.
        for _ in 0..100 {
            let idx = ProbabilityModel::roll(&probs, &mut rng);
            assert!(idx < probs.len());
        }
    }

    #[test]
    fn roll_falls_through_to_last_index_on_undersum() {
        let mut rng = fastrand::Rng::with_seed(1);
        // Sums to 0.5; rng.f64() is in [0,1), so this can fall through.
        let probs = vec![0.1, 0.1];
        let idx = ProbabilityModel::roll(&probs, &mut rng);
        assert!(idx <= 1);
    }
}
