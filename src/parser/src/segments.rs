use std::{collections::BTreeMap, fs, path::Path};

use catalog::{Catalog, Region, ReceptorType, Segment, SegmentType};
use genome::Strand;
use lazy_static::lazy_static;
use located_error::prelude::*;
use regex::Regex;

lazy_static! {
    static ref GENE_RE: Regex = Regex::new(r"^TR([ABGD])([VDJC])[0-9A-Za-z/-]+$").unwrap();
    static ref CHROMOSOME_RE: Regex = Regex::new(r"^(\d{1,2})[pq][0-9.]+$").unwrap();
}

/// Parse the 15-field gene-segment coordinate table of §6: tab-separated,
/// `#`-prefixed/blank lines ignored, trailing `#...` comments stripped.
/// Malformed rows are skipped with a warning; a duplicate `(gene, region)`
/// pair is the only fatal condition, surfaced through `Catalog::insert`.
pub fn load_segment_table(path: impl AsRef<Path>) -> anyhow::Result<Catalog> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).with_loc(|| format!("while reading segment table {path:?}"))?;

    let mut catalog = Catalog::new();
    for (line_no, raw_line) in contents.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        match parse_segment_row(line) {
            Some(segment) => {
                catalog.insert(segment).loc(format!("while inserting segment table row {}", line_no + 1))?;
            }
            None => warn!("Skipping malformed segment table row {}: {raw_line:?}", line_no + 1),
        }
    }
    Ok(catalog)
}

fn parse_segment_row(line: &str) -> Option<Segment> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 15 {
        return None;
    }

    let gene = fields[0].trim().to_string();
    let caps = GENE_RE.captures(&gene)?;
    let receptor_type = match &caps[1] {
        "A" => ReceptorType::A,
        "B" => ReceptorType::B,
        "G" => ReceptorType::G,
        "D" => ReceptorType::D,
        _ => return None,
    };
    let segment_type = match &caps[2] {
        "V" => SegmentType::V,
        "D" => SegmentType::D,
        "J" => SegmentType::J,
        "C" => SegmentType::C,
        _ => return None,
    };

    let chromosome = fields[1].trim().to_string();
    let chromosome_key: u8 = CHROMOSOME_RE.captures(&chromosome)?[1].parse().ok()?;

    let strand = match fields[2].trim() {
        "+" | "forward" | "Forward" => Strand::Forward,
        "-" | "reverse" | "Reverse" => Strand::Reverse,
        _ => return None,
    };

    let region = Region::parse(fields[8].trim())?;

    let (start_str, end_str) = fields[13].trim().split_once("..")?;
    let start_position: u64 = start_str.trim().parse().ok()?;
    let end_position: u64 = end_str.trim().parse().ok()?;
    if start_position == 0 || start_position > end_position {
        return None;
    }

    Some(Segment{
        gene,
        receptor_type,
        segment_type,
        segment_number: fields[8].trim().to_string(),
        region,
        chromosome,
        chromosome_key,
        strand,
        start_position,
        end_position,
        alleles: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_row() {
        let row = "TRAV1-1\t14q11.2\t+\tf\t.\t.\t.\t.\tV-REGION\t.\t.\t.\t.\t100..200\t.";
        let segment = parse_segment_row(row).unwrap();
        assert_eq!(segment.gene, "TRAV1-1");
        assert_eq!(segment.chromosome_key, 14);
        assert_eq!(segment.start_position, 100);
        assert_eq!(segment.end_position, 200);
    }

    #[test]
    fn skips_row_with_unparseable_gene() {
        let row = "NOTATRGENE\t14q11.2\t+\tf\t.\t.\t.\t.\tV-REGION\t.\t.\t.\t.\t100..200\t.";
        assert!(parse_segment_row(row).is_none());
    }

    #[test]
    fn strips_comment_and_blank_lines() {
        let table = "# header\n\nTRAV1-1\t14q11.2\t+\tf\t.\t.\t.\t.\tV-REGION\t.\t.\t.\t.\t100..200\t. # trailing comment\n";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.tsv");
        std::fs::write(&path, table).unwrap();
        let catalog = load_segment_table(&path).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
