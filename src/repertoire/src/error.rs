use thiserror::Error;

/// Invalid parameters to the Population Distributor (§4.6).
#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("population_size must be strictly positive, got {0}")]
    NonPositivePopulation(u64),

    #[error("unimodal g_cutoff must be strictly positive, got {0}")]
    NonPositiveCutoff(f64),

    #[error("chisquare k and cutoff must be strictly positive, got k={k}, cutoff={cutoff}")]
    InvalidChiSquare{k: f64, cutoff: f64},

    #[error("logisticcdf scale and cutoff must be strictly positive, got scale={scale}, cutoff={cutoff}")]
    InvalidLogistic{scale: f64, cutoff: f64},

    #[error("cannot distribute a population over zero clones")]
    EmptyRepertoire,
}
