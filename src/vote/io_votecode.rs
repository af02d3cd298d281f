// Reading the vote code file.

use log::debug;
use snafu::prelude::*;
use std::fs;

use serial_voting::{parse_vote_codes, Credential};

use crate::vote::*;

pub fn read_vote_codes(path: &str) -> VoteResult<Vec<Credential>> {
    let content = fs::read_to_string(path).context(OpeningVoteCodesSnafu { path })?;
    debug!("read_vote_codes: {} bytes read from {:?}", content.len(), path);
    parse_vote_codes(&content).context(InvalidVoteCodesSnafu { path })
}
