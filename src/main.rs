mod args;
mod vote;

use clap::Parser;
use log::{info, LevelFilter};

use crate::args::Args;
use crate::vote::config_reader::{build_settings, read_config, VoteConfig};
use crate::vote::{run_votes, VoteResult};

fn run(args: &Args) -> VoteResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => VoteConfig::default(),
    };
    let settings = build_settings(config, args);
    info!("settings: {:?}", settings);

    println!("============================");
    println!(" serialvote: candidate {}", settings.candidate_code);
    println!("============================");

    let summary = run_votes(&settings)?;
    info!(
        "{} answers archived in {:?}",
        summary.archived.len(),
        settings.output_directory
    );
    println!("All {} votes submitted.", summary.archived.len());
    Ok(())
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(&args) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
