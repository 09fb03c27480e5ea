use std::{fs, path::Path};

use catalog::{Catalog, Region};

/// Parse an IMGT/GENE-DB pipe-delimited allele FASTA and attach each
/// sequence to its matching `(gene, region)` segment in `catalog` (§6).
/// Headers whose region is unrecognized are skipped with a warning; headers
/// whose `(gene, region)` has no matching segment table entry are likewise
/// skipped (the segment table is the source of truth for which genes
/// exist).
pub fn load_allele_fasta(path: impl AsRef<Path>, catalog: &mut Catalog) -> anyhow::Result<()> {
    let contents = fs::read_to_string(path.as_ref())?;

    let mut current: Option<(String, String, Region)> = None;
    let mut sequence = String::new();

    for line in contents.lines() {
        if let Some(header) = line.strip_prefix('>') {
            flush(&mut current, &mut sequence, catalog);
            current = parse_header(header);
        } else {
            sequence.push_str(line.trim());
        }
    }
    flush(&mut current, &mut sequence, catalog);
    Ok(())
}

fn flush(current: &mut Option<(String, String, Region)>, sequence: &mut String, catalog: &mut Catalog) {
    if let Some((gene, allele, region)) = current.take() {
        if !sequence.is_empty() {
            catalog.add_allele(&gene, region, allele, sequence.to_uppercase());
        }
    }
    sequence.clear();
}

fn parse_header(header: &str) -> Option<(String, String, Region)> {
    let fields: Vec<&str> = header.split('|').collect();
    if fields.len() < 16 {
        return None;
    }
    let allele_field = fields[1];
    let region = Region::parse(fields[4])?;

    let (gene, allele_number) = allele_field.split_once('*')?;
    Some((gene.to_string(), allele_number.to_string(), region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{ReceptorType, Segment, SegmentType};
    use genome::Strand;
    use std::collections::BTreeMap;

    fn seg(gene: &str, region: Region) -> Segment {
        Segment{
            gene: gene.to_string(), receptor_type: ReceptorType::A, segment_type: SegmentType::V,
            segment_number: "1".to_string(), region, chromosome: "14q11.2".to_string(), chromosome_key: 14,
            strand: Strand::Forward, start_position: 1, end_position: 10, alleles: BTreeMap::new(),
        }
    }

    #[test]
    fn attaches_wrapped_sequence_to_matching_segment() {
        let mut catalog = Catalog::new();
        catalog.insert(seg("TRAV1-1", Region::VRegion)).unwrap();

        let fasta = ">AB012345|TRAV1-1*01|Homo sapiens|F|V-REGION|1..10|10 nt|1| | | | |1|10|10+0|\nactgactg\nac\n";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alleles.fasta");
        std::fs::write(&path, fasta).unwrap();

        load_allele_fasta(&path, &mut catalog).unwrap();
        let segment = catalog.get("TRAV1-1", Region::VRegion).unwrap();
        assert_eq!(segment.alleles.get("01").unwrap(), "ACTGACTGAC");
    }

    #[test]
    fn skips_header_with_unrecognized_region() {
        let mut catalog = Catalog::new();
        let fasta = ">AB012345|TRAV1-1*01|Homo sapiens|F|NOT-A-REGION|1..10|10 nt|1| | | | |1|10|10+0|\nactg\n";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alleles.fasta");
        std::fs::write(&path, fasta).unwrap();
        load_allele_fasta(&path, &mut catalog).unwrap();
        assert_eq!(catalog.len(), 0);
    }
}
