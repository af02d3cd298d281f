use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;
use std::time::Duration;

use serial_voting::VoteSettings;

use crate::args::Args;
use crate::vote::*;

/// The content of the JSON configuration file. All the keys are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteConfig {
    #[serde(rename = "candidateCode")]
    pub candidate_code: Option<String>,
    #[serde(rename = "voteCodeFile")]
    pub vote_code_file: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "xsrfParamName")]
    pub xsrf_param_name: Option<String>,
    #[serde(rename = "responseEncoding")]
    pub response_encoding: Option<String>,
    #[serde(rename = "submitTimeoutSecs")]
    pub submit_timeout_secs: Option<u64>,
    #[serde(rename = "showTimeoutSecs")]
    pub show_timeout_secs: Option<u64>,
    #[serde(rename = "requireXsrfToken")]
    pub require_xsrf_token: Option<bool>,
}

pub fn read_config(path: &str) -> VoteResult<VoteConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: VoteConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Merges the defaults, the configuration file and the command line, in
/// increasing order of priority.
pub fn build_settings(config: VoteConfig, args: &Args) -> VoteSettings {
    let default = VoteSettings::default();
    VoteSettings {
        candidate_code: args
            .candidate
            .clone()
            .or(config.candidate_code)
            .unwrap_or(default.candidate_code),
        vote_code_file: args
            .input
            .clone()
            .or(config.vote_code_file)
            .unwrap_or(default.vote_code_file),
        output_directory: args
            .out
            .clone()
            .or(config.output_directory)
            .unwrap_or(default.output_directory),
        base_url: config.base_url.unwrap_or(default.base_url),
        xsrf_param_name: config.xsrf_param_name.unwrap_or(default.xsrf_param_name),
        response_encoding: config
            .response_encoding
            .unwrap_or(default.response_encoding),
        submit_timeout: config
            .submit_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(default.submit_timeout),
        show_timeout: config
            .show_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(default.show_timeout),
        require_xsrf_token: !args.allow_missing_token
            && config.require_xsrf_token.unwrap_or(default.require_xsrf_token),
    }
}
