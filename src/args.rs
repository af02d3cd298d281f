use clap::Parser;

/// Submits the vote form once for every vote code of a file, and keeps the answer pages.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the vote settings. Every key is optional, the defaults
    /// target the original vote campaign.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default votecode.txt) The file with the vote codes, one per line, in the form
    /// `XXXXXXXX YYYYYYYY`. Overrides the value of the configuration file.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (directory, default results) Where the answer pages are written. It is created if needed.
    /// Overrides the value of the configuration file.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default 40109) The code of the candidate to vote for.
    #[clap(long, value_parser)]
    pub candidate: Option<String>,

    /// If passed, a vote page without anti-forgery token is still submitted (with an empty token)
    /// instead of stopping the run.
    #[clap(long, takes_value = false)]
    pub allow_missing_token: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
