use catalog::{Catalog, ProbabilityModel};
use genome::Oracle;

use crate::cell::TcrCell;

/// Which aspect of a clone must be unique within the repertoire, in priority
/// order when more than one would apply (§4.5). Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uniqueness {
    #[default]
    None,
    UniqueCDR3,
    UniqueChain,
    UniqueTcr,
}

/// A built pool of [`TcrCell`]s, each distinct per the requested
/// [`Uniqueness`] policy. Per-clone population counts are attached
/// separately by the Population Distributor.
pub struct Repertoire<'a> {
    pub clones: Vec<TcrCell<'a>>,
}

impl<'a> Repertoire<'a> {
    /// Build `size` clones, resampling a freshly-recombined cell against
    /// every prior clone until the uniqueness policy is satisfied.
    pub fn build(
        catalog: &'a Catalog,
        model: &ProbabilityModel,
        oracle: &Oracle,
        size: usize,
        ab_frequency: f64,
        uniqueness: Uniqueness,
        rng: &mut fastrand::Rng,
    ) -> anyhow::Result<Self> {
        let mut clones: Vec<TcrCell<'a>> = Vec::with_capacity(size);

        while clones.len() < size {
            let candidate = TcrCell::new(catalog, model, oracle, ab_frequency, rng)?;
            if uniqueness == Uniqueness::None || clones.iter().all(|existing| !collides(existing, &candidate, uniqueness)) {
                clones.push(candidate);
            } else {
                trace!("Rejected duplicate clone under uniqueness policy {uniqueness:?}, resampling");
            }
        }

        Ok(Self{clones})
    }
}

fn collides(a: &TcrCell, b: &TcrCell, uniqueness: Uniqueness) -> bool {
    match uniqueness {
        Uniqueness::None => false,
        Uniqueness::UniqueCDR3 => a.cdr3_sequences()[0] == b.cdr3_sequences()[0] || a.cdr3_sequences()[1] == b.cdr3_sequences()[1],
        Uniqueness::UniqueChain => {
            a.chain1.rna.sequence == b.chain1.rna.sequence || a.chain2.rna.sequence == b.chain2.rna.sequence
        }
        Uniqueness::UniqueTcr => {
            a.chain1.rna.sequence == b.chain1.rna.sequence && a.chain2.rna.sequence == b.chain2.rna.sequence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniqueness_default_is_none() {
        assert_eq!(Uniqueness::default(), Uniqueness::None);
    }
}
