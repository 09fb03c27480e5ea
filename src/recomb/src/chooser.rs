use catalog::{Catalog, CatalogError, ProbabilityModel, ReceptorType, Segment, SegmentType, VdjWeight};
use located_error::prelude::*;

use crate::error::ChooserError;

/// A segment pick: a reference to the chosen catalog entry plus the allele
/// name drawn uniformly from its allele map.
#[derive(Debug, Clone)]
pub struct Pick<'a> {
    pub segment: &'a Segment,
    pub allele: String,
}

/// Samples `(segment, allele)` picks conditioned on receptor type, role, and
/// prior choices, enforcing the biological ordering/adjacency constraints of
/// §4.2.
pub struct Chooser;

impl Chooser {
    /// `role=D` returns `Ok(None)` for receptor types without a D segment
    /// (alpha/gamma); every other combination either succeeds or fails with
    /// [`ChooserError::NoCandidates`].
    pub fn choose<'a>(
        catalog: &'a Catalog,
        model: &ProbabilityModel,
        receptor_type: ReceptorType,
        role: SegmentType,
        v: Option<&Pick<'a>>,
        d: Option<&Pick<'a>>,
        j: Option<&Pick<'a>>,
        rng: &mut fastrand::Rng,
    ) -> anyhow::Result<Option<Pick<'a>>> {
        if role == SegmentType::D && !receptor_type.has_d() {
            return Ok(None);
        }
        if role == SegmentType::D && v.is_none() {
            return loc!("Chooser::choose: role=D requires a prior V pick");
        }
        if role == SegmentType::J {
            if v.is_none() {
                return loc!("Chooser::choose: role=J requires a prior V pick");
            }
            if receptor_type.has_d() && d.is_none() {
                return loc!("Chooser::choose: role=J for beta/delta requires a prior D pick");
            }
        }
        if role == SegmentType::C && (v.is_none() || j.is_none()) {
            return loc!("Chooser::choose: role=C requires prior V and J picks");
        }

        let mut candidates = catalog.role_candidates(receptor_type, role);

        if role == SegmentType::J {
            let v_seg = v.unwrap().segment;
            candidates.retain(|c| c.chromosome == v_seg.chromosome);
            if let Some(d_pick) = d {
                candidates.retain(|c| c.downstream_of(d_pick.segment));
            }
        }

        if role == SegmentType::C {
            let v_seg = v.unwrap().segment;
            let j_seg = j.unwrap().segment;
            candidates.retain(|c| c.chromosome == v_seg.chromosome && c.downstream_of(j_seg));
            if let Some(nearest) = nearest_downstream(&candidates, j_seg) {
                candidates = vec![nearest];
            }
        }

        if candidates.is_empty() {
            return Err(ChooserError::NoCandidates{
                receptor_type: receptor_type.as_str(),
                role: role.as_str(),
                v_gene: v.map(|p| p.segment.gene.clone()),
                d_gene: d.map(|p| p.segment.gene.clone()),
            }.into());
        }

        let v_gene = v.map(|p| p.segment.gene.as_str());
        let d_gene = d.map(|p| p.segment.gene.as_str());
        let has_d = d.is_some();

        let mut weights = vec![0.0; candidates.len()];
        let mut explicit_sum = 0.0;
        let mut default_idx = Vec::new();
        for (i, candidate) in candidates.iter().enumerate() {
            match explicit_weight(model, role, &candidate.gene, v_gene, d_gene, has_d) {
                Some(w) => {
                    weights[i] = w;
                    explicit_sum += w;
                }
                None => default_idx.push(i),
            }
        }
        if explicit_sum > 1.0 {
            warn!(
                "User-defined probability totals for requested TR{}{} segment is > 1.0 (sum={explicit_sum:.3}). Priors: V={v_gene:?}, D={d_gene:?}",
                receptor_type.as_str(), role.as_str(),
            );
        }
        if !default_idx.is_empty() {
            let default_weight = (1.0 - explicit_sum).max(0.0) / default_idx.len() as f64;
            for i in default_idx {
                weights[i] = default_weight;
            }
        }

        let chosen_idx = ProbabilityModel::roll(&weights, rng);
        let chosen = candidates[chosen_idx];

        if chosen.alleles.is_empty() {
            return Err(CatalogError::NoAllelesForWeightedSegment(chosen.gene.clone()).into());
        }
        let allele_keys: Vec<&String> = chosen.alleles.keys().collect();
        let allele = allele_keys[rng.usize(..allele_keys.len())].clone();

        debug!("Chose {} ({}) allele {allele}", chosen.gene, role.as_str());
        Ok(Some(Pick{segment: chosen, allele}))
    }
}

/// Among candidates already filtered to be downstream of `j`, keep the one
/// closest to `j` in the coding direction (biologically the first C exon
/// after the chosen J).
fn nearest_downstream<'a>(candidates: &[&'a Segment], j: &Segment) -> Option<&'a Segment> {
    candidates.iter().copied().min_by_key(|c| {
        match c.strand {
            genome::Strand::Forward => c.start_position.saturating_sub(j.start_position),
            genome::Strand::Reverse => j.start_position.saturating_sub(c.start_position),
        }
    })
}

fn explicit_weight(
    model: &ProbabilityModel,
    role: SegmentType,
    candidate_gene: &str,
    v_gene: Option<&str>,
    d_gene: Option<&str>,
    has_d: bool,
) -> Option<f64> {
    model.vdj_weights.iter().find_map(|entry| match (role, entry) {
        (SegmentType::V, VdjWeight::V{v_gene: vg, weight}) if vg == candidate_gene => Some(*weight),
        (SegmentType::D, VdjWeight::D{d_gene: dg, v_gene: vg, weight})
            if dg == candidate_gene && Some(vg.as_str()) == v_gene => Some(*weight),
        (SegmentType::J, VdjWeight::J{j_gene, v_gene: vg, weight})
            if !has_d && j_gene == candidate_gene && Some(vg.as_str()) == v_gene => Some(*weight),
        (SegmentType::J, VdjWeight::Jd{j_gene, v_gene: vg, d_gene: dg, weight})
            if has_d && j_gene == candidate_gene && Some(vg.as_str()) == v_gene && Some(dg.as_str()) == d_gene => Some(*weight),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use catalog::Region;
    use genome::Strand;

    fn make_segment(gene: &str, region: Region, receptor_type: ReceptorType, segment_type: SegmentType, start: u64, end: u64, strand: Strand, allele: &str) -> Segment {
        let mut alleles = BTreeMap::new();
        alleles.insert("01".to_string(), allele.to_string());
        Segment{
            gene: gene.to_string(), receptor_type, segment_type, segment_number: "1".to_string(),
            region, chromosome: "14q11.2".to_string(), chromosome_key: 14, strand,
            start_position: start, end_position: end, alleles,
        }
    }

    fn toy_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(make_segment("TRAV1-1", Region::VRegion, ReceptorType::A, SegmentType::V, 100, 200, Strand::Forward, "ACGT")).unwrap();
        catalog.insert(make_segment("TRAV1-1", Region::LVGeneUnit, ReceptorType::A, SegmentType::V, 50, 250, Strand::Forward, "TTTTACGTTTT")).unwrap();
        catalog.insert(make_segment("TRAV1-1", Region::LPart1Part2, ReceptorType::A, SegmentType::V, 50, 99, Strand::Forward, "GGGG")).unwrap();
        catalog.insert(make_segment("TRAJ1", Region::JRegion, ReceptorType::A, SegmentType::J, 300, 320, Strand::Forward, "TTGG")).unwrap();
        catalog.insert(make_segment("TRAC1", Region::Ex1, ReceptorType::A, SegmentType::C, 400, 450, Strand::Forward, "CCCC")).unwrap();
        catalog
    }

    #[test]
    fn d_role_short_circuits_for_alpha() {
        let catalog = toy_catalog();
        let model = ProbabilityModel::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let pick = Chooser::choose(&catalog, &model, ReceptorType::A, SegmentType::D, None, None, None, &mut rng).unwrap();
        assert!(pick.is_none());
    }

    #[test]
    fn v_pick_selects_unique_candidate() {
        let catalog = toy_catalog();
        let model = ProbabilityModel::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let pick = Chooser::choose(&catalog, &model, ReceptorType::A, SegmentType::V, None, None, None, &mut rng).unwrap().unwrap();
        assert_eq!(pick.segment.gene, "TRAV1-1");
    }

    #[test]
    fn c_pick_requires_v_and_j() {
        let catalog = toy_catalog();
        let model = ProbabilityModel::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let err = Chooser::choose(&catalog, &model, ReceptorType::A, SegmentType::C, None, None, None, &mut rng);
        assert!(err.is_err());
    }

    #[test]
    fn no_candidates_errors() {
        let catalog = Catalog::new();
        let model = ProbabilityModel::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let err = Chooser::choose(&catalog, &model, ReceptorType::A, SegmentType::V, None, None, None, &mut rng);
        assert!(err.is_err());
    }
}
