use thiserror::Error;

/// Errors raised while building or querying a [`crate::Catalog`].
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("duplicate (gene, region) entry: ({0}, {1:?})")]
    DuplicateSegment(String, crate::segment::Region),

    #[error("V-REGION '{0}' has no sibling L-V-GENE-UNIT")]
    MissingGeneUnit(String),

    #[error("L-V-GENE-UNIT '{0}' has no sibling L-PART1+L-PART2")]
    MissingLeaderPart(String),

    #[error("C-segment gene '{0}' has no EX1 entry")]
    MissingEx1(String),

    #[error("malformed required field '{field}' in row: {row}")]
    MalformedRow{field: &'static str, row: String},

    #[error("segment '{0}' has a non-zero explicit weight but no alleles")]
    NoAllelesForWeightedSegment(String),
}
