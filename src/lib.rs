#[macro_use]
extern crate log;

use std::{
    error::Error,
    fs,
    io::Write,
};

use catalog::{Catalog, ProbabilityModel};
use genome::Oracle;
use parser::{
    CatalogInputs, Cli, Commands, DistributionArg, ReadArgs, ReadTypeArg, RepertoireArgs,
    SpaceArg, UniquenessArg,
};
use reads::{GaussianParams, PairedLengthParams, ReadLengthParams, ReadRecord, ReadSpace};
use repertoire::{Distribution, Repertoire, Uniqueness};

/// Load the segment catalog, recombination probability model, and chromosome
/// oracle from the paths named on `inputs` (§6).
fn load_inputs(inputs: &CatalogInputs) -> anyhow::Result<(Catalog, ProbabilityModel, Oracle)> {
    let mut catalog = parser::load_segment_table(&inputs.segment_table)?;
    parser::load_allele_fasta(&inputs.allele_fasta, &mut catalog)?;
    catalog.validate()?;

    let model = parser::load_probability_model(&inputs.probability)?;

    let mut oracle = Oracle::new();
    for (chromosome, path) in inputs.parsed_chromosome_fasta()? {
        oracle.register(chromosome, path)?;
    }

    Ok((catalog, model, oracle))
}

fn rng_from_seed(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}

fn build_repertoire<'a>(
    catalog: &'a Catalog,
    model: &ProbabilityModel,
    oracle: &Oracle,
    args: &RepertoireArgs,
    rng: &mut fastrand::Rng,
) -> anyhow::Result<(Repertoire<'a>, Vec<u64>)> {
    let uniqueness = match args.uniqueness {
        UniquenessArg::None => Uniqueness::None,
        UniquenessArg::Cdr3 => Uniqueness::UniqueCDR3,
        UniquenessArg::Chain => Uniqueness::UniqueChain,
        UniquenessArg::Tcr => Uniqueness::UniqueTcr,
    };

    info!("Building a repertoire of {} clones...", args.size);
    let repertoire = Repertoire::build(catalog, model, oracle, args.size, args.ab_frequency, uniqueness, rng)?;

    let distribution = match args.distribution {
        DistributionArg::Stripe => Distribution::Stripe,
        DistributionArg::Equal => Distribution::Equal,
        DistributionArg::Unimodal => Distribution::Unimodal{g_cutoff: args.cutoff},
        DistributionArg::Chisquare => Distribution::ChiSquare{k: args.chisquare_k, cutoff: args.cutoff},
        DistributionArg::Logisticcdf => Distribution::LogisticCdf{scale: args.logistic_scale, cutoff: args.cutoff},
    };
    info!("Distributing a population of {} across {} clones...", args.population_size, repertoire.clones.len());
    let counts = repertoire::distribute(repertoire.clones.len(), args.population_size, distribution, rng)?;

    Ok((repertoire, counts))
}

fn run_simulate(inputs: &CatalogInputs, repertoire_args: &RepertoireArgs) -> anyhow::Result<()> {
    let (catalog, model, oracle) = load_inputs(inputs)?;
    let mut rng = rng_from_seed(repertoire_args.seed);
    let (repertoire, counts) = build_repertoire(&catalog, &model, &oracle, repertoire_args, &mut rng)?;

    parser::can_write_file(&repertoire_args.output_dir, repertoire_args.overwrite)?;
    fs::create_dir_all(&repertoire_args.output_dir)?;
    let stats_path = repertoire_args.output_dir.join("repertoire.tsv");
    let mut out = fs::File::create(&stats_path)?;

    writeln!(out, "clone_index\tcell_count\tV1_allele\tJ1_allele\tCDR3_1\tRNA_1\tDNA_1\tV2_allele\tJ2_allele\tCDR3_2\tRNA_2\tDNA_2")?;
    for (clone_index, (cell, cell_count)) in repertoire.clones.iter().zip(counts.iter()).enumerate() {
        let [cdr3_1, cdr3_2] = cell.cdr3_sequences();
        writeln!(
            out,
            "{clone_index}\t{cell_count}\t{}*{}\t{}*{}\t{}\t{}\t{}\t{}*{}\t{}*{}\t{}\t{}\t{}",
            cell.chain1.picks.v.segment.gene, cell.chain1.picks.v.allele,
            cell.chain1.picks.j.segment.gene, cell.chain1.picks.j.allele,
            cdr3_1.unwrap_or_default(), cell.chain1.rna.sequence, cell.chain1.dna.sequence,
            cell.chain2.picks.v.segment.gene, cell.chain2.picks.v.allele,
            cell.chain2.picks.j.segment.gene, cell.chain2.picks.j.allele,
            cdr3_2.unwrap_or_default(), cell.chain2.rna.sequence, cell.chain2.dna.sequence,
        )?;
    }
    info!("Wrote repertoire statistics to {stats_path:?}");
    Ok(())
}

fn read_length_params(args: &ReadArgs) -> ReadLengthParams {
    let read = GaussianParams{mean: args.read_mean, sd: args.read_sd, cutoff: args.read_cutoff};
    match args.read_type {
        ReadTypeArg::Single => ReadLengthParams::Single(read),
        ReadTypeArg::Amplicon => ReadLengthParams::Amplicon(read),
        ReadTypeArg::Paired => ReadLengthParams::Paired(PairedLengthParams{
            insert: GaussianParams{mean: args.insert_mean, sd: args.insert_sd, cutoff: args.insert_cutoff},
            read1: read,
            read2: read,
        }),
    }
}

fn run_reads(inputs: &CatalogInputs, repertoire_args: &RepertoireArgs, read_args: &ReadArgs) -> anyhow::Result<()> {
    let (catalog, model, oracle) = load_inputs(inputs)?;
    let mut rng = rng_from_seed(repertoire_args.seed);
    let (repertoire, counts) = build_repertoire(&catalog, &model, &oracle, repertoire_args, &mut rng)?;

    parser::can_write_file(&repertoire_args.output_dir, repertoire_args.overwrite)?;
    fs::create_dir_all(&repertoire_args.output_dir)?;
    let reads_path = repertoire_args.output_dir.join("reads.fastq");
    let mut out = fs::File::create(&reads_path)?;

    let space = match read_args.space {
        SpaceArg::Dna => ReadSpace::Dna,
        SpaceArg::Rna => ReadSpace::Rna,
    };
    let length_params = read_length_params(read_args);

    let mut emitted = 0u64;
    for i in 0..read_args.count {
        let record = reads::simulate_read(
            &repertoire, &counts, repertoire_args.population_size, space, length_params,
            read_args.amplicon_probe.as_deref(), i, &oracle, &mut rng,
        )?;
        let Some(record) = record else {
            trace!("Skipped amplicon read {i}: probe not found in the chosen chain");
            continue;
        };
        emitted += 1;
        match record {
            ReadRecord::Single{read, comment} => writeln!(out, "{comment}\n{read}")?,
            ReadRecord::Paired{read1, read2, comment} => writeln!(out, "{comment}\n{read1}\t{read2}")?,
            ReadRecord::Amplicon{forward, reverse, comment} => writeln!(out, "{comment}\n{forward}\t{reverse}")?,
        }
    }
    info!("Wrote {emitted}/{} reads to {reads_path:?}", read_args.count);
    Ok(())
}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.commands {
        Commands::Simulate{inputs, repertoire} => run_simulate(&inputs, &repertoire)?,
        Commands::Reads{inputs, repertoire, reads} => run_reads(&inputs, &repertoire, &reads)?,
    };
    Ok(())
}
