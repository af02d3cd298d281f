// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::time::Duration;

/// One vote code, as printed on the ballot ticket.
///
/// A vote code is made of two segments of exactly
/// [`Credential::SEGMENT_LEN`] characters each. It is only built through
/// [`crate::validate_vote_code`] or [`crate::parse_vote_codes`], so the
/// width invariant always holds.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Credential {
    pub(crate) serial1: String,
    pub(crate) serial2: String,
}

impl Credential {
    pub const SEGMENT_LEN: usize = 8;

    pub fn serial1(&self) -> &str {
        &self.serial1
    }

    pub fn serial2(&self) -> &str {
        &self.serial2
    }

    /// Both segments separated by a single space, as they appear in the input file.
    pub fn serial_number(&self) -> String {
        format!("{} {}", self.serial1, self.serial2)
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.serial1, self.serial2)
    }
}

// ******** Output data structures *********

/// The answer of the vote service to one submission.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubmissionResult {
    pub status: u16,
    /// The body, already decoded from the service encoding.
    pub body: String,
}

/// Errors found while reading a list of vote codes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CredentialError {
    /// The line does not hold exactly two segments of the expected width.
    /// `lineno` starts at 1.
    Format { lineno: usize, line: String },
    /// No vote code at all.
    Empty,
}

impl Error for CredentialError {}

impl Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Format { lineno, line } => write!(
                f,
                "line {}: invalid vote code {:?}: expected the first {} and the last {} characters separated by a single space",
                lineno,
                line,
                Credential::SEGMENT_LEN,
                Credential::SEGMENT_LEN
            ),
            CredentialError::Empty => write!(f, "no vote code found"),
        }
    }
}

// ********* Configuration **********

pub const DEFAULT_CANDIDATE_CODE: &str = "40109";
pub const DEFAULT_VOTE_CODE_FILE: &str = "votecode.txt";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "results";
pub const DEFAULT_BASE_URL: &str = "http://akb48-sousenkyo.jp/web/akb2015/vote";
pub const DEFAULT_XSRF_PARAM_NAME: &str = "vote_form_sys.xsrf";
pub const DEFAULT_RESPONSE_ENCODING: &str = "shift_jis";

/// Everything that identifies the vote target and the way to talk to it.
///
/// The default values target the original voting campaign. They can all be
/// overridden from the configuration file or the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteSettings {
    pub candidate_code: String,
    pub vote_code_file: String,
    pub output_directory: String,
    /// The vote endpoints live directly under this URL (no trailing slash).
    pub base_url: String,
    pub xsrf_param_name: String,
    /// A WHATWG encoding label, used to decode the answer of the service.
    pub response_encoding: String,
    pub submit_timeout: Duration,
    pub show_timeout: Duration,
    /// When false, a vote page without token is still submitted with an empty token.
    pub require_xsrf_token: bool,
}

impl VoteSettings {
    pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_SHOW_TIMEOUT: Duration = Duration::from_secs(30);

    /// The vote page of the candidate, which carries the token.
    pub fn show_url(&self) -> String {
        format!(
            "{}/show?c={}",
            self.base_url.trim_end_matches('/'),
            self.candidate_code
        )
    }

    /// The endpoint receiving the vote form.
    pub fn vote_url(&self) -> String {
        format!("{}/thanks", self.base_url.trim_end_matches('/'))
    }
}

impl Default for VoteSettings {
    fn default() -> Self {
        VoteSettings {
            candidate_code: DEFAULT_CANDIDATE_CODE.to_string(),
            vote_code_file: DEFAULT_VOTE_CODE_FILE.to_string(),
            output_directory: DEFAULT_OUTPUT_DIRECTORY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            xsrf_param_name: DEFAULT_XSRF_PARAM_NAME.to_string(),
            response_encoding: DEFAULT_RESPONSE_ENCODING.to_string(),
            submit_timeout: VoteSettings::DEFAULT_SUBMIT_TIMEOUT,
            show_timeout: VoteSettings::DEFAULT_SHOW_TIMEOUT,
            require_xsrf_token: true,
        }
    }
}
