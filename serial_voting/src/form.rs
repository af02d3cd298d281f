//! The vote form and the browser fingerprint sent with it.

use url::{form_urlencoded, Url};

use crate::config::{Credential, VoteSettings};

/// The confirmation marker expected in the `detect` field.
pub const DETECT_MARKER: &str = "判定";

pub const CANDIDATE_CODE_FIELD: &str = "vote_form_candidate_code";
pub const DETECT_FIELD: &str = "detect";
pub const SERIAL_CODE_1_FIELD: &str = "vote_form_serial_code_1";
pub const SERIAL_CODE_2_FIELD: &str = "vote_form_serial_code_2";

const USER_AGENT: &str = " Mozilla/5.0 (Linux; Android 4.1.1; Nexus 7 Build/JRO03S) AppleWebKit/535.19 (KHTML, like Gecko) Chrome/18.0.1025.166 Safari/535.19";

/// The fields of one vote submission.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteForm<'a> {
    pub candidate_code: &'a str,
    pub xsrf_param_name: &'a str,
    pub xsrf_token: &'a str,
    pub credential: &'a Credential,
}

impl<'a> VoteForm<'a> {
    /// The form fields, in submission order.
    pub fn fields(&self) -> Vec<(&'a str, &'a str)> {
        vec![
            (CANDIDATE_CODE_FIELD, self.candidate_code),
            (DETECT_FIELD, DETECT_MARKER),
            (self.xsrf_param_name, self.xsrf_token),
            (SERIAL_CODE_1_FIELD, self.credential.serial1()),
            (SERIAL_CODE_2_FIELD, self.credential.serial2()),
        ]
    }
}

/// Encodes the form as an `application/x-www-form-urlencoded` body (UTF-8).
pub fn encode_vote_form(form: &VoteForm) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.fields())
        .finish()
}

/// The request headers of the vote submission.
///
/// The service filters out clients that do not look like the stock Android
/// browser, so the values are kept as they were captured from a real device.
/// `Host`, `Origin` and `Referer` follow the configured base URL; for the
/// default URL they are the captured values.
pub fn browser_headers(
    settings: &VoteSettings,
) -> Result<Vec<(&'static str, String)>, url::ParseError> {
    let base = Url::parse(&settings.base_url)?;
    let host = match (base.host_str(), base.port()) {
        (Some(h), Some(p)) => format!("{}:{}", h, p),
        (Some(h), None) => h.to_string(),
        (None, _) => return Err(url::ParseError::EmptyHost),
    };
    Ok(vec![
        ("Host", host),
        ("Connection", "keep-alive".to_string()),
        ("Referer", settings.show_url()),
        ("Cache-Control", "max-age=0".to_string()),
        ("Origin", base.origin().ascii_serialization()),
        (
            "Content-Type",
            "application/x-www-form-urlencoded".to_string(),
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        ("X-Requested-With", "com.android.browser".to_string()),
        ("User-Agent", USER_AGENT.to_string()),
        ("Accept-Encoding", "gzip,deflate".to_string()),
        ("Accept-Language", "ja-JP, en-US;q=0.8".to_string()),
        (
            "Accept-Charset",
            "utf-8, iso-8859-1, utf-16, *;q=0.7".to_string(),
        ),
    ])
}
