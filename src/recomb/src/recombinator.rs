use catalog::{Catalog, JunctionKind, ProbabilityModel, Region};
use genome::{Oracle, Strand};
use lazy_static::lazy_static;
use located_error::prelude::*;
use regex::Regex;

use crate::{chooser::Pick, error::RejectReason};

lazy_static! {
    /// Must fully match: `ATG(CTAG{3})+` — an ATG start codon followed by a
    /// whole number of further codons drawn from {C,T,A,G}.
    static ref FRAME_RE: Regex = Regex::new(r"^ATG(?:[CTAG]{3})+$").unwrap();

    /// Any premature stop codon strictly before the final codon.
    static ref STOP_RE: Regex = Regex::new(r"^(?:[CTAG]{3})*(?:TAA|TAG|TGA)(?:[CTAG]{3})+$").unwrap();

    /// Cys ... FGxG anchor: `(leading codons)(Cys)(5-32 codons)(Phe-Gly-x-Gly)`.
    static ref CDR3_RE: Regex = Regex::new(
        r"^(?:[CTAG]{3})+(TG[TC])((?:[CTAG]{3}){5,32})(TT[TC]GG[CTAG][CTAG]{3}GG[CTAG])$"
    ).unwrap();
}

/// One strand/coordinate-tagged sequence record (§3): `(chromosome,
/// 5'_coord, 5'_strand, sequence, 3'_coord, 3'_strand)`.
#[derive(Debug, Clone)]
pub struct Record {
    pub chromosome: u8,
    pub five_coord: u64,
    pub five_strand: Strand,
    pub sequence: String,
    pub three_coord: u64,
    pub three_strand: Strand,
}

/// Draw `k` independent uniform nucleotides over `{C,A,T,G}`.
pub fn random_nucleotides(k: usize, rng: &mut fastrand::Rng) -> String {
    const BASES: [u8; 4] = [b'C', b'A', b'T', b'G'];
    (0..k).map(|_| BASES[rng.usize(..4)] as char).collect()
}

fn allele_upper(pick: &Pick) -> String {
    pick.segment.alleles.get(&pick.allele).cloned().unwrap_or_default().to_uppercase()
}

fn trim_end(s: &mut String, n: usize) {
    if n == 0 {
        return;
    }
    let new_len = s.chars().count().saturating_sub(n);
    *s = s.chars().take(new_len).collect();
}

fn trim_start(s: &mut String, n: usize) {
    if n == 0 {
        return;
    }
    *s = s.chars().skip(n).collect();
}

/// Step 1, V-REGION: locate the sibling gene unit, splice the allele into
/// its genomic span, and build the spliced (intron-free) RNA leader.
fn v_segment_sequences(oracle: &Oracle, catalog: &Catalog, v: &Pick, rng: &mut fastrand::Rng) -> anyhow::Result<(String, String)> {
    let gene_unit = catalog.gene_unit_for(&v.segment.gene)
        .loc(format!("V pick {} is missing its L-V-GENE-UNIT sibling", v.segment.gene))?;

    let gene_data = oracle.read(v.segment.chromosome_key, gene_unit.start_position, gene_unit.end_position, gene_unit.strand)?;

    let (header_len, allele_len) = if v.segment.strand == Strand::Forward {
        ((v.segment.start_position - gene_unit.start_position) as usize, (v.segment.end_position - v.segment.start_position + 1) as usize)
    } else {
        ((gene_unit.end_position - v.segment.end_position) as usize, (v.segment.end_position - v.segment.start_position + 1) as usize)
    };

    let allele_seq = allele_upper(v);
    let chars: Vec<char> = gene_data.chars().collect();
    let head: String = chars.iter().take(header_len).collect();
    let tail: String = chars.iter().skip(header_len + allele_len).collect();
    let dna_data = format!("{head}{allele_seq}{tail}").to_uppercase();

    let leader = catalog.leader_for(&v.segment.gene)
        .loc(format!("V pick {} is missing its L-PART1+L-PART2 leader", v.segment.gene))?;
    let leader_allele = if let Some(seq) = leader.alleles.get(&v.allele) {
        seq.clone()
    } else if !leader.alleles.is_empty() {
        let index = rng.usize(..leader.alleles.len());
        leader.alleles.values().nth(index).cloned().unwrap_or_default()
    } else {
        String::new()
    };
    let rna_data = format!("{leader_allele}{allele_seq}").to_uppercase();

    Ok((dna_data, rna_data))
}

/// Step 1, C (EX1): DNA spans `min(start)..max(end)` of all EX1..EX4 on the
/// C strand (includes introns); RNA concatenates the chosen allele of
/// EX1..EX4, in order, with missing exons contributing an empty string.
fn c_segment_sequences(oracle: &Oracle, catalog: &Catalog, c: &Pick) -> anyhow::Result<(String, String)> {
    let exons = catalog.exons_for(&c.segment.gene);
    let start = exons.iter().map(|e| e.start_position).min()
        .loc(format!("C pick {} has no EX1..EX4 entries", c.segment.gene))?;
    let end = exons.iter().map(|e| e.end_position).max().unwrap();

    let dna = oracle.read(c.segment.chromosome_key, start, end, c.segment.strand)?;

    let mut rna = String::new();
    for region in [Region::Ex1, Region::Ex2, Region::Ex3, Region::Ex4] {
        if let Some(exon) = exons.iter().find(|e| e.region == region) {
            if let Some(seq) = exon.alleles.get(&c.allele) {
                rna.push_str(seq);
            }
        }
    }
    Ok((dna.to_uppercase(), rna.to_uppercase()))
}

/// Assembles one chain's DNA and RNA records from a `(V, D?, J, C)` pick,
/// rejecting on frame-shift, premature stop, or invalid CDR3.
pub struct Recombinator;

impl Recombinator {
    #[allow(clippy::too_many_arguments)]
    pub fn recombinate(
        oracle: &Oracle,
        catalog: &Catalog,
        model: &ProbabilityModel,
        v: &Pick,
        d: Option<&Pick>,
        j: &Pick,
        c: &Pick,
        rng: &mut fastrand::Rng,
    ) -> anyhow::Result<Result<(Record, Record), RejectReason>> {
        let chromosome = j.segment.chromosome_key;

        // ---- Step 1: per-segment sequence extraction.
        let (mut v_dna, mut v_rna) = v_segment_sequences(oracle, catalog, v, rng)?;
        let (mut j_dna, mut j_rna) = (allele_upper(j), allele_upper(j));

        // ---- Step 2: junction editing.
        let v_chew = model.roll_junction(JunctionKind::Vchewback, rng);
        trim_end(&mut v_dna, v_chew);
        trim_end(&mut v_rna, v_chew);

        // Note: per the original implementation, the trim-from-start uses
        // `d3Chewback` and the trim-from-end uses `d5Chewback` — this
        // reverses the conventional 5'/3' naming. Preserved as specified.
        let (d_dna, d_rna) = match d {
            Some(d_pick) => {
                let d5 = model.roll_junction(JunctionKind::D5chewback, rng);
                let d3 = model.roll_junction(JunctionKind::D3chewback, rng);
                let vd = random_nucleotides(model.roll_junction(JunctionKind::VDaddition, rng), rng);
                let dj = random_nucleotides(model.roll_junction(JunctionKind::DJaddition, rng), rng);
                let mut dna = allele_upper(d_pick);
                let mut rna = dna.clone();
                trim_start(&mut dna, d3);
                trim_start(&mut rna, d3);
                trim_end(&mut dna, d5);
                trim_end(&mut rna, d5);
                (format!("{vd}{dna}{dj}"), format!("{vd}{rna}{dj}"))
            }
            None => {
                let vj = random_nucleotides(model.roll_junction(JunctionKind::VJaddition, rng), rng);
                (vj.clone(), vj)
            }
        };

        let j_chew = model.roll_junction(JunctionKind::Jchewback, rng);
        trim_start(&mut j_dna, j_chew);
        trim_start(&mut j_rna, j_chew);

        // ---- Step 1 continued: C + JC intron.
        let (c_dna, c_rna) = c_segment_sequences(oracle, catalog, c)?;

        let jc_dna = if j.segment.strand == Strand::Forward {
            oracle.read(chromosome, j.segment.end_position + 1, c.segment.start_position - 1, c.segment.strand)?
        } else {
            oracle.read(chromosome, c.segment.end_position + 1, j.segment.start_position - 1, c.segment.strand)?
        };

        // ---- Step 4: assembly.
        let dna_seq = format!("{v_dna}{d_dna}{j_dna}{jc_dna}{c_dna}");
        let rna_seq = format!("{v_rna}{d_rna}{j_rna}{c_rna}");

        // ---- Step 5: validation (on RNA).
        if !FRAME_RE.is_match(&rna_seq) {
            debug!("Invalid CDR3: frame shifted (len % 3 = {})", rna_seq.len() % 3);
            return Ok(Err(RejectReason::FrameShift));
        }
        if STOP_RE.is_match(&rna_seq) {
            debug!("Invalid CDR3: premature stop codon found");
            return Ok(Err(RejectReason::PrematureStop));
        }
        if CDR3_RE.captures(&rna_seq).is_none() {
            debug!("Invalid CDR3: Cys...FGxG motif not found");
            return Ok(Err(RejectReason::InvalidCDR3));
        }

        // ---- Step 6: coordinate records.
        let gene_unit = catalog.gene_unit_for(&v.segment.gene)
            .loc(format!("V pick {} is missing its L-V-GENE-UNIT sibling", v.segment.gene))?;

        let (coord_5, coord_3) = if v.segment.strand == Strand::Forward {
            (gene_unit.start_position, c.segment.start_position + c_dna.len() as u64)
        } else {
            (gene_unit.end_position, c.segment.end_position.saturating_sub(c_dna.len() as u64))
        };

        let dna = Record{
            chromosome, five_coord: coord_5, five_strand: v.segment.strand,
            sequence: dna_seq, three_coord: coord_3, three_strand: c.segment.strand,
        };
        let rna = Record{
            chromosome, five_coord: coord_5, five_strand: v.segment.strand,
            sequence: rna_seq, three_coord: coord_3, three_strand: c.segment.strand,
        };
        Ok(Ok((dna, rna)))
    }

    /// The CDR3 nucleotide sequence of a validated RNA record: the Cys
    /// codon, the intervening codons, and the Phe-Gly-x-Gly anchor.
    pub fn cdr3(rna: &str) -> Option<String> {
        let caps = CDR3_RE.captures(rna)?;
        Some(format!("{}{}{}", &caps[1], &caps[2], &caps[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_non_triplet_length() {
        assert!(!FRAME_RE.is_match("ATGCTAGCTA"));
        assert!(FRAME_RE.is_match("ATGCTAGCT"));
    }

    #[test]
    fn cdr3_extracts_anchor_codons() {
        // leading codon + CYS(TGT) + 5 filler codons + FGxG(TTT GGC CTA GGA)
        let filler = "CTA".repeat(5);
        let rna = format!("ATGCTATGT{filler}TTTGGCCTAGGA");
        let cdr3 = Recombinator::cdr3(&rna);
        assert!(cdr3.is_some());
        assert!(cdr3.unwrap().starts_with("TGT"));
    }

    #[test]
    fn stop_codon_detected_mid_sequence() {
        let with_stop = "ATGCTATAACTACTA";
        assert!(STOP_RE.is_match(with_stop));
    }
}
