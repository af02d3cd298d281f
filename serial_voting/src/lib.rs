mod config;
pub mod form;
pub mod token;

use log::debug;

pub use crate::config::*;
pub use crate::form::{browser_headers, encode_vote_form, VoteForm};
pub use crate::token::find_xsrf_token;

/// Parses the content of a vote code file.
///
/// Each line holds one vote code: two segments of 8 characters separated
/// by a single space. The order of the file is preserved.
///
/// ```
/// use serial_voting::parse_vote_codes;
/// # use serial_voting::CredentialError;
///
/// let codes = parse_vote_codes("11111111 22222222\n33333333 44444444\n")?;
/// assert_eq!(codes.len(), 2);
/// assert_eq!(codes[1].serial_number(), "33333333 44444444");
///
/// # Ok::<(), CredentialError>(())
/// ```
pub fn parse_vote_codes(content: &str) -> Result<Vec<Credential>, CredentialError> {
    let mut res: Vec<Credential> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let lineno = idx + 1;
        let cred = validate_vote_code(lineno, line)?;
        debug!("parse_vote_codes: lineno: {:?} code: {:?}", lineno, cred);
        res.push(cred);
    }
    if res.is_empty() {
        return Err(CredentialError::Empty);
    }
    Ok(res)
}

/// Checks a single line of a vote code file.
pub fn validate_vote_code(lineno: usize, line: &str) -> Result<Credential, CredentialError> {
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    let splits: Vec<&str> = line.split(' ').collect();
    match splits.as_slice() {
        [s1, s2]
            if s1.chars().count() == Credential::SEGMENT_LEN
                && s2.chars().count() == Credential::SEGMENT_LEN =>
        {
            Ok(Credential {
                serial1: s1.to_string(),
                serial2: s2.to_string(),
            })
        }
        _ => Err(CredentialError::Format {
            lineno,
            line: line.to_string(),
        }),
    }
}

/// The name of the file archiving the answer for a vote code.
///
/// It embeds the status code and both segments, so distinct vote codes
/// never share a file.
pub fn result_file_name(status: u16, credential: &Credential) -> String {
    format!("{}_{}.html", status, credential.serial_number())
}
