use catalog::{Catalog, ProbabilityModel, ReceptorType, SegmentType};
use genome::Oracle;
use recomb::{Chooser, Pick, Recombinator, Record};

/// The four segment picks feeding one chain's recombination.
pub struct ChainPicks<'a> {
    pub v: Pick<'a>,
    pub d: Option<Pick<'a>>,
    pub j: Pick<'a>,
    pub c: Pick<'a>,
}

/// One recombined chain: its segment picks plus the resulting DNA/RNA records.
pub struct Chain<'a> {
    pub picks: ChainPicks<'a>,
    pub dna: Record,
    pub rna: Record,
}

/// A complete TCR cell: a pair of chains, alpha/beta or gamma/delta,
/// produced by repeated recombination until both succeed (§4.4).
pub struct TcrCell<'a> {
    pub ab_frequency: f64,
    pub type1: ReceptorType,
    pub type2: ReceptorType,
    pub chain1: Chain<'a>,
    pub chain2: Chain<'a>,
}

impl<'a> TcrCell<'a> {
    pub fn new(
        catalog: &'a Catalog,
        model: &ProbabilityModel,
        oracle: &Oracle,
        ab_frequency: f64,
        rng: &mut fastrand::Rng,
    ) -> anyhow::Result<Self> {
        let (type1, type2) = if rng.f64() <= ab_frequency {
            (ReceptorType::A, ReceptorType::B)
        } else {
            (ReceptorType::G, ReceptorType::D)
        };

        let chain1 = build_chain(catalog, model, oracle, type1, rng)?;
        let chain2 = build_chain(catalog, model, oracle, type2, rng)?;

        Ok(Self{ab_frequency, type1, type2, chain1, chain2})
    }

    /// `[cdr3(RNA1), cdr3(RNA2)]`; `None` for a chain only if its RNA
    /// somehow fails the motif it was already validated against (should not
    /// occur for a constructed cell).
    pub fn cdr3_sequences(&self) -> [Option<String>; 2] {
        [Recombinator::cdr3(&self.chain1.rna.sequence), Recombinator::cdr3(&self.chain2.rna.sequence)]
    }
}

/// Build one chain by picking V/D/J/C and recombinating, retrying the whole
/// chain (including re-picking V) on any rejection.
fn build_chain<'a>(
    catalog: &'a Catalog,
    model: &ProbabilityModel,
    oracle: &Oracle,
    receptor_type: ReceptorType,
    rng: &mut fastrand::Rng,
) -> anyhow::Result<Chain<'a>> {
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        let v = Chooser::choose(catalog, model, receptor_type, SegmentType::V, None, None, None, rng)?
            .expect("V pick is never short-circuited");
        let d = Chooser::choose(catalog, model, receptor_type, SegmentType::D, Some(&v), None, None, rng)?;
        let j = Chooser::choose(catalog, model, receptor_type, SegmentType::J, Some(&v), d.as_ref(), None, rng)?
            .expect("J pick is never short-circuited");
        let c = Chooser::choose(catalog, model, receptor_type, SegmentType::C, Some(&v), d.as_ref(), Some(&j), rng)?
            .expect("C pick is never short-circuited");

        match Recombinator::recombinate(oracle, catalog, model, &v, d.as_ref(), &j, &c, rng)? {
            Ok((dna, rna)) => {
                trace!("Chain {receptor_type:?} converged after {attempt} attempt(s)");
                return Ok(Chain{picks: ChainPicks{v, d, j, c}, dna, rna});
            }
            Err(reason) => {
                trace!("Chain {receptor_type:?} rejected on attempt {attempt}: {reason}");
                continue;
            }
        }
    }
}
