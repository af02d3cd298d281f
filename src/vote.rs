use log::{debug, info};

use serial_voting::*;
use snafu::Snafu;

use std::path::PathBuf;

pub mod agent;
pub mod archiver;
pub mod config_reader;
pub mod io_votecode;

use crate::vote::agent::SubmissionAgent;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VoteError {
    #[snafu(display("Cannot open the vote code file {path}: {source}"))]
    OpeningVoteCodes {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid vote code file {path}: {source}"))]
    InvalidVoteCodes {
        source: CredentialError,
        path: String,
    },
    #[snafu(display("Cannot open the configuration file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot parse the configuration file {path}: {source}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Invalid base URL {url}: {source}"))]
    InvalidUrl {
        source: url::ParseError,
        url: String,
    },
    #[snafu(display("Unknown response encoding {label:?}"))]
    UnknownEncoding { label: String },
    #[snafu(display("Invalid request header {name}"))]
    InvalidHeader { name: String },
    #[snafu(display("Cannot create the HTTP session: {source}"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Request to {url} failed: {source}"))]
    Network { source: reqwest::Error, url: String },
    #[snafu(display("The vote page {url} has no anti-forgery token {name:?}"))]
    MissingToken { url: String, name: String },
    #[snafu(display("Cannot decode the answer (status {status}) as {encoding}"))]
    Decode { encoding: String, status: u16 },
    #[snafu(display("Cannot write the result file {path}: {source}"))]
    Archive {
        source: std::io::Error,
        path: String,
    },
}

pub type VoteResult<T> = Result<T, VoteError>;

/// What a complete run produced.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSummary {
    /// The archived answer pages, in submission order.
    pub archived: Vec<PathBuf>,
}

/// Votes once for every vote code of the input file.
///
/// The vote codes are processed in file order. The first error stops the
/// run: the remaining vote codes are not submitted.
pub fn run_votes(settings: &VoteSettings) -> VoteResult<RunSummary> {
    info!("Reading the vote codes from {:?}", settings.vote_code_file);
    let credentials = io_votecode::read_vote_codes(&settings.vote_code_file)?;
    info!("{} vote codes read", credentials.len());

    let out_dir = archiver::ensure_output_directory(&settings.output_directory)?;
    let agent = SubmissionAgent::new(settings)?;

    let mut archived: Vec<PathBuf> = Vec::new();
    for (idx, credential) in credentials.iter().enumerate() {
        println!(
            "Submitting vote code {:?} ({}/{})",
            credential.serial_number(),
            idx + 1,
            credentials.len()
        );
        let result = agent.vote(credential)?;
        let path = archiver::save_result(&out_dir, credential, &result)?;
        debug!("run_votes: archived {:?}", path);
        archived.push(path);
    }
    Ok(RunSummary { archived })
}
