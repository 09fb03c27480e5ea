use std::collections::BTreeMap;

use crate::{
    error::CatalogError,
    segment::{Region, ReceptorType, Segment, SegmentType},
};

/// Immutable table of receptor segments (V/D/J/C and auxiliary regions),
/// indexed by the unique `(gene, region)` key.
#[derive(Debug, Default)]
pub struct Catalog {
    segments: BTreeMap<(String, Region), Segment>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment, enforcing `(gene, region)` uniqueness.
    pub fn insert(&mut self, segment: Segment) -> Result<(), CatalogError> {
        let key = (segment.gene.clone(), segment.region);
        if self.segments.contains_key(&key) {
            return Err(CatalogError::DuplicateSegment(key.0, key.1));
        }
        self.segments.insert(key, segment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, gene: &str, region: Region) -> Option<&Segment> {
        self.segments.get(&(gene.to_string(), region))
    }

    /// Attach one allele sequence to an already-inserted `(gene, region)`
    /// segment (used by the allele FASTA loader, which runs after the
    /// segment table loader). Returns `None` if no such segment exists.
    pub fn add_allele(&mut self, gene: &str, region: Region, allele: String, sequence: String) -> Option<()> {
        let segment = self.segments.get_mut(&(gene.to_string(), region))?;
        segment.alleles.insert(allele, sequence);
        Some(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    /// The sibling `L-V-GENE-UNIT` for a V gene.
    pub fn gene_unit_for(&self, v_gene: &str) -> Option<&Segment> {
        self.get(v_gene, Region::LVGeneUnit)
    }

    /// The sibling `L-PART1+L-PART2` leader for a V gene.
    pub fn leader_for(&self, v_gene: &str) -> Option<&Segment> {
        self.get(v_gene, Region::LPart1Part2)
    }

    /// All `EX1..EX4` entries sharing `gene`, in exon order (missing exons omitted).
    pub fn exons_for(&self, gene: &str) -> Vec<&Segment> {
        [Region::Ex1, Region::Ex2, Region::Ex3, Region::Ex4]
            .into_iter()
            .filter_map(|region| self.get(gene, region))
            .collect()
    }

    /// Candidate segments for `Chooser::choose`: `gene` begins with
    /// `TR<receptor_type><role>` and `region` is the CDR3-relevant locator
    /// for `role` (`EX1` stands in for the whole C segment).
    pub fn role_candidates(&self, receptor_type: ReceptorType, role: SegmentType) -> Vec<&Segment> {
        let prefix = format!("TR{}{}", receptor_type.as_str(), role.as_str());
        let wanted_region = match role {
            SegmentType::V => Region::VRegion,
            SegmentType::D => Region::DRegion,
            SegmentType::J => Region::JRegion,
            SegmentType::C => Region::Ex1,
        };
        self.segments
            .values()
            .filter(|s| s.gene.starts_with(&prefix) && s.region == wanted_region)
            .collect()
    }

    /// Validate the catalog's cross-segment invariants (§3): every V-REGION
    /// has a sibling L-V-GENE-UNIT which itself has a sibling leader, and
    /// every constant gene has at least EX1.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for segment in self.segments.values() {
            match segment.region {
                Region::VRegion => {
                    let unit = self.gene_unit_for(&segment.gene)
                        .ok_or_else(|| CatalogError::MissingGeneUnit(segment.gene.clone()))?;
                    self.leader_for(&unit.gene)
                        .ok_or_else(|| CatalogError::MissingLeaderPart(unit.gene.clone()))?;
                }
                Region::Ex2 | Region::Ex3 | Region::Ex4 => {
                    if self.get(&segment.gene, Region::Ex1).is_none() {
                        return Err(CatalogError::MissingEx1(segment.gene.clone()));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genome::Strand;

    fn seg(gene: &str, region: Region) -> Segment {
        Segment {
            gene: gene.to_string(),
            receptor_type: ReceptorType::A,
            segment_type: SegmentType::V,
            segment_number: "1".to_string(),
            region,
            chromosome: "14q11.2".to_string(),
            chromosome_key: 14,
            strand: Strand::Forward,
            start_position: 100,
            end_position: 200,
            alleles: BTreeMap::new(),
        }
    }

    #[test]
    fn duplicate_gene_region_rejected() {
        let mut catalog = Catalog::new();
        catalog.insert(seg("TRAV1-1", Region::VRegion)).unwrap();
        let err = catalog.insert(seg("TRAV1-1", Region::VRegion)).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSegment(..)));
    }

    #[test]
    fn validate_requires_gene_unit_for_v_region() {
        let mut catalog = Catalog::new();
        catalog.insert(seg("TRAV1-1", Region::VRegion)).unwrap();
        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, CatalogError::MissingGeneUnit(_)));
    }

    #[test]
    fn validate_passes_with_full_sibling_chain() {
        let mut catalog = Catalog::new();
        catalog.insert(seg("TRAV1-1", Region::VRegion)).unwrap();
        catalog.insert(seg("TRAV1-1", Region::LVGeneUnit)).unwrap();
        catalog.insert(seg("TRAV1-1", Region::LPart1Part2)).unwrap();
        catalog.validate().unwrap();
    }
}
