use std::{error::Error, path::PathBuf};

use clap::{ArgEnum, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ParserError;

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(name = "tcr-sim", author, version, about, long_about = None)]
#[clap(propagate_version = true)]
/// tcr-sim: simulate V(D)J recombination and sequencing reads over the human TCR locus.
pub struct Cli {
    /// Set the verbosity level (-v -vv -vvv).
    ///
    /// -v: Info | -vv: Debug | -vvv: Trace
    ///
    /// Warnings are emitted by default even without this flag; use --quiet to disable them.
    #[clap(short = 'v', long, parse(from_occurrences), global = true)]
    pub verbose: u8,

    /// Disable warnings; only errors are displayed.
    #[clap(short = 'q', long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli {
    /// Log the parsed arguments as YAML at startup, for reproducibility.
    pub fn serialize(&self) -> Result<(), Box<dyn Error>> {
        let serialized = serde_yaml::to_string(&self)
            .map_err(|err| format!("Failed to serialize command line arguments. got [{err}]"))?;
        debug!("\n---- Command line args ----\n{serialized}\n---");
        Ok(())
    }
}

#[derive(Subcommand, Debug, Serialize, Deserialize)]
pub enum Commands {
    /// Build a repertoire and emit per-clone statistics rows.
    Simulate {
        #[clap(flatten)]
        inputs: CatalogInputs,
        #[clap(flatten)]
        repertoire: RepertoireArgs,
    },
    /// Build a repertoire and emit simulated sequencing reads.
    Reads {
        #[clap(flatten)]
        inputs: CatalogInputs,
        #[clap(flatten)]
        repertoire: RepertoireArgs,
        #[clap(flatten)]
        reads: ReadArgs,
    },
}

#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct CatalogInputs {
    /// Path to the tab-separated gene-segment coordinate table.
    #[clap(long)]
    pub segment_table: PathBuf,

    /// Path to the IMGT/GENE-DB allele FASTA file.
    #[clap(long)]
    pub allele_fasta: PathBuf,

    /// Path to the recombination probability YAML document.
    #[clap(long)]
    pub probability: PathBuf,

    /// Chromosome reference FASTA files, given as `<chromosome>:<path>` pairs.
    #[clap(long, multiple_values(true))]
    pub chromosome_fasta: Vec<String>,
}

#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct RepertoireArgs {
    /// Number of distinct clones to build.
    #[clap(long, default_value_t = 10)]
    pub size: usize,

    /// Total number of cells to distribute across clones.
    #[clap(long, default_value_t = 100)]
    pub population_size: u64,

    /// Population distribution strategy.
    #[clap(long, arg_enum, default_value_t = DistributionArg::Stripe)]
    pub distribution: DistributionArg,

    /// Cutoff parameter, meaning depends on --distribution (unimodal g_cutoff,
    /// chisquare/logisticcdf cutoff).
    #[clap(long, default_value_t = 2.0)]
    pub cutoff: f64,

    /// Chi-square degrees of freedom (chisquare distribution only).
    #[clap(long, default_value_t = 2.0)]
    pub chisquare_k: f64,

    /// Logistic scale parameter (logisticcdf distribution only).
    #[clap(long, default_value_t = 1.0)]
    pub logistic_scale: f64,

    /// Probability of drawing an alpha/beta cell rather than gamma/delta.
    #[clap(long, default_value_t = 0.95)]
    pub ab_frequency: f64,

    /// Uniqueness constraint enforced across built clones.
    #[clap(long, arg_enum, default_value_t = UniquenessArg::None)]
    pub uniqueness: UniquenessArg,

    /// Seed the RNG for reproducible output.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Output directory for results.
    #[clap(long, default_value = "tcr-sim-output")]
    pub output_dir: PathBuf,

    /// Overwrite existing output files.
    #[clap(short = 'w', long)]
    pub overwrite: bool,
}

#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct ReadArgs {
    /// Number of reads to emit.
    #[clap(long, default_value_t = 1000)]
    pub count: u64,

    /// Draw reads from genomic DNA or spliced RNA.
    #[clap(long, arg_enum, default_value_t = SpaceArg::Dna)]
    pub space: SpaceArg,

    /// Read geometry.
    #[clap(long, arg_enum, default_value_t = ReadTypeArg::Single)]
    pub read_type: ReadTypeArg,

    /// Mean read (or amplicon) length.
    #[clap(long, default_value_t = 100.0)]
    pub read_mean: f64,
    /// Read length standard deviation.
    #[clap(long, default_value_t = 10.0)]
    pub read_sd: f64,
    /// Read length truncation cutoff, in standard deviations.
    #[clap(long, default_value_t = 3.0)]
    pub read_cutoff: f64,

    /// Mean insert length (paired reads only).
    #[clap(long, default_value_t = 300.0)]
    pub insert_mean: f64,
    /// Insert length standard deviation (paired reads only).
    #[clap(long, default_value_t = 30.0)]
    pub insert_sd: f64,
    /// Insert length truncation cutoff, in standard deviations (paired reads only).
    #[clap(long, default_value_t = 3.0)]
    pub insert_cutoff: f64,

    /// Probe sequence to anchor amplicon reads on.
    #[clap(long)]
    pub amplicon_probe: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize, Deserialize)]
pub enum DistributionArg {
    Stripe,
    Equal,
    Unimodal,
    Chisquare,
    Logisticcdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize, Deserialize)]
pub enum UniquenessArg {
    None,
    Cdr3,
    Chain,
    Tcr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize, Deserialize)]
pub enum SpaceArg {
    Dna,
    Rna,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize, Deserialize)]
pub enum ReadTypeArg {
    Single,
    Paired,
    Amplicon,
}

impl CatalogInputs {
    /// Parse `--chromosome-fasta` entries of the form `<chromosome>:<path>`.
    pub fn parsed_chromosome_fasta(&self) -> anyhow::Result<Vec<(u8, PathBuf)>> {
        self.chromosome_fasta.iter().map(|entry| {
            let (key, path) = entry.split_once(':')
                .ok_or_else(|| ParserError::MalformedSegmentRow{field: "chromosome_fasta", row: entry.clone()})?;
            let key: u8 = key.parse()
                .map_err(|_| ParserError::MalformedSegmentRow{field: "chromosome_fasta", row: entry.clone()})?;
            Ok((key, PathBuf::from(path)))
        }).collect()
    }
}

pub fn can_write_file(output_dir: &std::path::Path, overwrite: bool) -> anyhow::Result<()> {
    if !overwrite && output_dir.exists() {
        return Err(ParserError::CannotOverwrite(output_dir.display().to_string()).into());
    }
    Ok(())
}
