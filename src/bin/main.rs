use std::process;

use clap::Parser;

#[macro_use]
extern crate log;

/// Parse command line arguments and run `tcr_sim::run()`.
fn main() {
    let cli = parser::Cli::parse();

    let verbosity = cli.verbose + (!cli.quiet as u8);
    logger::Logger::init(verbosity);

    if let Err(err) = cli.serialize() {
        warn!("Failed to serialize command line arguments for logging: {err}");
    }

    if let Err(err) = tcr_sim::run(cli) {
        error!("{err}");
        process::exit(1);
    }
}
