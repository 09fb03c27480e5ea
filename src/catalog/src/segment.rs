use std::collections::BTreeMap;

use genome::Strand;
use serde::{Deserialize, Serialize};

/// Receptor chain family: alpha, beta, gamma or delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReceptorType {
    A,
    B,
    G,
    D,
}

impl ReceptorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::G => "G",
            Self::D => "D",
        }
    }

    /// Whether chains of this type carry a D segment (beta/delta only).
    pub fn has_d(&self) -> bool {
        matches!(self, Self::B | Self::D)
    }
}

/// Segment role within a recombination event: Variable, Diversity, Joining or Constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentType {
    V,
    D,
    J,
    C,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V => "V",
            Self::D => "D",
            Self::J => "J",
            Self::C => "C",
        }
    }
}

/// The catalog region a coordinate-table row describes. `V-REGION`/`D-REGION`/
/// `J-REGION`/`EX1` are the CDR3-relevant loci picked by the Chooser; the
/// remaining variants are auxiliary regions consulted by the Recombinator
/// (gene units for intron-aware splicing, individual C exons).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    VRegion,
    DRegion,
    JRegion,
    VGeneUnit,
    DGeneUnit,
    JGeneUnit,
    LVGeneUnit,
    LPart1Part2,
    Ex1,
    Ex2,
    Ex3,
    Ex4,
}

impl Region {
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "V-REGION" => Self::VRegion,
            "D-REGION" => Self::DRegion,
            "J-REGION" => Self::JRegion,
            "V-GENE-UNIT" => Self::VGeneUnit,
            "D-GENE-UNIT" => Self::DGeneUnit,
            "J-GENE-UNIT" => Self::JGeneUnit,
            "L-V-GENE-UNIT" => Self::LVGeneUnit,
            "L-PART1+L-PART2" => Self::LPart1Part2,
            "EX1" => Self::Ex1,
            "EX2" => Self::Ex2,
            "EX3" => Self::Ex3,
            "EX4" => Self::Ex4,
            _ => return None,
        })
    }
}

/// One row of the segment coordinate table, immutable after load.
///
/// `chromosome` is kept as the raw cytogenetic string (e.g. `14q11.2`) for
/// display/debugging; `chromosome_key` is the parsed leading integer used to
/// address the [`genome::Oracle`].
#[derive(Debug, Clone)]
pub struct Segment {
    pub gene: String,
    pub receptor_type: ReceptorType,
    pub segment_type: SegmentType,
    pub segment_number: String,
    pub region: Region,
    pub chromosome: String,
    pub chromosome_key: u8,
    pub strand: Strand,
    pub start_position: u64,
    pub end_position: u64,
    pub alleles: BTreeMap<String, String>,
}

impl Segment {
    /// Downstream-of comparison in the coding direction: true if `self` lies
    /// strictly downstream of `other` given `self`'s strand.
    pub fn downstream_of(&self, other: &Segment) -> bool {
        match self.strand {
            Strand::Forward => self.start_position > other.start_position,
            Strand::Reverse => self.start_position < other.start_position,
        }
    }
}
