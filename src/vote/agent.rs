// The HTTP side of a vote: fetching the token, then posting the form.

use encoding_rs::Encoding;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use snafu::prelude::*;
use std::time::Duration;

use serial_voting::*;

use crate::vote::*;

type ReqwestClient = reqwest::blocking::Client;

/// Submits vote codes for one candidate.
///
/// Each call to [`SubmissionAgent::vote`] opens its own session, so no cookie
/// is shared between two vote codes.
#[derive(Debug, Clone)]
pub struct SubmissionAgent {
    candidate_code: String,
    show_url: String,
    vote_url: String,
    xsrf_param_name: String,
    headers: HeaderMap,
    encoding: &'static Encoding,
    show_timeout: Duration,
    submit_timeout: Duration,
    require_xsrf_token: bool,
}

impl SubmissionAgent {
    /// Checks the settings once, before the first vote code is used.
    pub fn new(settings: &VoteSettings) -> VoteResult<SubmissionAgent> {
        let encoding = Encoding::for_label(settings.response_encoding.as_bytes()).context(
            UnknownEncodingSnafu {
                label: settings.response_encoding.clone(),
            },
        )?;
        let browser = browser_headers(settings).context(InvalidUrlSnafu {
            url: settings.base_url.clone(),
        })?;
        let mut headers = HeaderMap::new();
        for (name, value) in browser {
            let k = HeaderName::from_bytes(name.as_bytes())
                .ok()
                .context(InvalidHeaderSnafu { name })?;
            let v = HeaderValue::from_str(&value)
                .ok()
                .context(InvalidHeaderSnafu { name })?;
            headers.insert(k, v);
        }
        Ok(SubmissionAgent {
            candidate_code: settings.candidate_code.clone(),
            show_url: settings.show_url(),
            vote_url: settings.vote_url(),
            xsrf_param_name: settings.xsrf_param_name.clone(),
            headers,
            encoding,
            show_timeout: settings.show_timeout,
            submit_timeout: settings.submit_timeout,
            require_xsrf_token: settings.require_xsrf_token,
        })
    }

    /// Votes with one vote code and returns the answer of the service.
    pub fn vote(&self, credential: &Credential) -> VoteResult<SubmissionResult> {
        let client = self.open_session()?;
        let token = match self.fetch_token(&client)? {
            Some(t) => t,
            None if self.require_xsrf_token => {
                return MissingTokenSnafu {
                    url: self.show_url.clone(),
                    name: self.xsrf_param_name.clone(),
                }
                .fail();
            }
            None => {
                warn!(
                    "No token {:?} in {}, submitting {:?} without it",
                    self.xsrf_param_name,
                    self.show_url,
                    credential.serial_number()
                );
                String::new()
            }
        };
        self.submit(&client, &token, credential)
    }

    fn open_session(&self) -> VoteResult<ReqwestClient> {
        ReqwestClient::builder()
            .cookie_store(true)
            .http1_title_case_headers()
            .timeout(self.show_timeout)
            .build()
            .context(HttpClientSnafu {})
    }

    fn fetch_token(&self, client: &ReqwestClient) -> VoteResult<Option<String>> {
        let url = self.show_url.as_str();
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .context(NetworkSnafu { url })?;
        // The cookie store carries the session to the next request; this is only for the logs.
        match response.headers().get(SET_COOKIE).and_then(|v| v.to_str().ok()) {
            Some(cookie) => debug!(
                "fetch_token: session {:?}",
                cookie.split(';').next().unwrap_or(cookie)
            ),
            None => warn!("{} did not open a session (no Set-Cookie header)", url),
        }
        let page = response.text().context(NetworkSnafu { url })?;
        Ok(find_xsrf_token(&page, &self.xsrf_param_name))
    }

    fn submit(
        &self,
        client: &ReqwestClient,
        token: &str,
        credential: &Credential,
    ) -> VoteResult<SubmissionResult> {
        let url = self.vote_url.as_str();
        let body = encode_vote_form(&VoteForm {
            candidate_code: &self.candidate_code,
            xsrf_param_name: &self.xsrf_param_name,
            xsrf_token: token,
            credential,
        });
        let response = client
            .post(url)
            .headers(self.headers.clone())
            .timeout(self.submit_timeout)
            .body(body)
            .send()
            .and_then(|r| r.error_for_status())
            .context(NetworkSnafu { url })?;
        let status = response.status().as_u16();
        debug!("submit: {:?} -> {}", credential.serial_number(), status);
        let bytes = response.bytes().context(NetworkSnafu { url })?;
        let body = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .context(DecodeSnafu {
                encoding: self.encoding.name(),
                status,
            })?
            .into_owned();
        Ok(SubmissionResult { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;
    use tokio::runtime::Runtime;
    use url::form_urlencoded;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VOTE_PAGE: &str =
        r#"<form><input type="hidden" name="vote_form_sys.xsrf" value="t0k3n"></form>"#;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn credential() -> Credential {
        validate_vote_code(1, "ABCDEFGH 12345678").unwrap()
    }

    fn mount_show(rt: &Runtime, server: &MockServer, page: &str) {
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/vote/show"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("set-cookie", "JSESSIONID=abc123; Path=/")
                        .set_body_raw(page.as_bytes().to_vec(), "text/html"),
                )
                .mount(server),
        );
    }

    fn mount_thanks(rt: &Runtime, server: &MockServer, status: u16, body: Vec<u8>) {
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/vote/thanks"))
                .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html"))
                .mount(server),
        );
    }

    fn settings_for(server: &MockServer) -> VoteSettings {
        VoteSettings {
            base_url: format!("{}/vote", server.uri()),
            ..VoteSettings::default()
        }
    }

    #[test]
    fn posts_the_form_with_the_session() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, VOTE_PAGE);
        mount_thanks(&rt, &server, 200, SHIFT_JIS.encode("ありがとう").0.into_owned());

        let agent = SubmissionAgent::new(&settings_for(&server)).unwrap();
        let res = agent.vote(&credential()).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body, "ありがとう");

        let requests = rt.block_on(server.received_requests()).unwrap();
        assert_eq!(requests.len(), 2);
        let post = &requests[1];
        let h = |name: &str| post.headers.get(name).unwrap().to_str().unwrap().to_string();
        assert_eq!(h("cookie"), "JSESSIONID=abc123");
        assert_eq!(h("content-type"), "application/x-www-form-urlencoded");
        assert_eq!(h("x-requested-with"), "com.android.browser");
        assert_eq!(h("accept-language"), "ja-JP, en-US;q=0.8");
        assert!(h("user-agent").contains("Nexus 7 Build/JRO03S"));
        assert!(h("referer").ends_with("/vote/show?c=40109"));

        let fields: Vec<(String, String)> = form_urlencoded::parse(&post.body)
            .into_owned()
            .collect();
        assert_eq!(
            fields,
            vec![
                ("vote_form_candidate_code".to_string(), "40109".to_string()),
                ("detect".to_string(), "判定".to_string()),
                ("vote_form_sys.xsrf".to_string(), "t0k3n".to_string()),
                ("vote_form_serial_code_1".to_string(), "ABCDEFGH".to_string()),
                ("vote_form_serial_code_2".to_string(), "12345678".to_string()),
            ]
        );
    }

    #[test]
    fn rejected_vote_is_a_network_error() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, VOTE_PAGE);
        mount_thanks(&rt, &server, 403, b"forbidden".to_vec());

        let agent = SubmissionAgent::new(&settings_for(&server)).unwrap();
        match agent.vote(&credential()).unwrap_err() {
            VoteError::Network { source, url } => {
                assert_eq!(source.status().map(|s| s.as_u16()), Some(403));
                assert!(url.ends_with("/vote/thanks"), "{}", url);
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn slow_vote_answer_times_out() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, VOTE_PAGE);
        rt.block_on(
            Mock::given(method("POST"))
                .and(path("/vote/thanks"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_raw(b"ok".to_vec(), "text/html")
                        .set_delay(Duration::from_millis(500)),
                )
                .mount(&server),
        );

        let settings = VoteSettings {
            submit_timeout: Duration::from_millis(100),
            ..settings_for(&server)
        };
        let agent = SubmissionAgent::new(&settings).unwrap();
        match agent.vote(&credential()).unwrap_err() {
            VoteError::Network { source, .. } => assert!(source.is_timeout(), "{:?}", source),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn slow_vote_page_times_out() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/vote/show"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_raw(VOTE_PAGE.as_bytes().to_vec(), "text/html")
                        .set_delay(Duration::from_millis(500)),
                )
                .mount(&server),
        );
        mount_thanks(&rt, &server, 200, b"ok".to_vec());

        let settings = VoteSettings {
            show_timeout: Duration::from_millis(100),
            ..settings_for(&server)
        };
        let agent = SubmissionAgent::new(&settings).unwrap();
        match agent.vote(&credential()).unwrap_err() {
            VoteError::Network { source, url } => {
                assert!(source.is_timeout(), "{:?}", source);
                assert!(url.contains("/vote/show"), "{}", url);
            }
            e => panic!("unexpected error {:?}", e),
        }
        let requests = rt.block_on(server.received_requests()).unwrap();
        assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
    }

    #[test]
    fn submits_an_empty_token_when_allowed() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, "<p>no form</p>");
        mount_thanks(&rt, &server, 200, b"ok".to_vec());

        let settings = VoteSettings {
            require_xsrf_token: false,
            ..settings_for(&server)
        };
        let agent = SubmissionAgent::new(&settings).unwrap();
        assert_eq!(agent.vote(&credential()).unwrap().status, 200);

        let requests = rt.block_on(server.received_requests()).unwrap();
        let body = String::from_utf8(requests[1].body.clone()).unwrap();
        assert!(body.contains("vote_form_sys.xsrf=&"), "{}", body);
    }

    #[test]
    fn refuses_to_post_without_token() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, "<p>no form</p>");

        let agent = SubmissionAgent::new(&settings_for(&server)).unwrap();
        let err = agent.vote(&credential()).unwrap_err();
        assert!(matches!(err, VoteError::MissingToken { .. }), "{:?}", err);
        let requests = rt.block_on(server.received_requests()).unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn failing_vote_page_is_a_network_error() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server),
        );

        let agent = SubmissionAgent::new(&settings_for(&server)).unwrap();
        let err = agent.vote(&credential()).unwrap_err();
        assert!(matches!(err, VoteError::Network { .. }), "{:?}", err);
    }

    #[test]
    fn malformed_answer_is_a_decode_error() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, VOTE_PAGE);
        // A lead byte with nothing after it.
        mount_thanks(&rt, &server, 200, vec![b'o', b'k', 0x82]);

        let agent = SubmissionAgent::new(&settings_for(&server)).unwrap();
        let err = agent.vote(&credential()).unwrap_err();
        assert!(
            matches!(err, VoteError::Decode { status: 200, .. }),
            "{:?}",
            err
        );
    }

    #[test]
    fn each_vote_opens_a_new_session() {
        init();
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        mount_show(&rt, &server, VOTE_PAGE);
        mount_thanks(&rt, &server, 200, b"ok".to_vec());

        let agent = SubmissionAgent::new(&settings_for(&server)).unwrap();
        agent.vote(&credential()).unwrap();
        agent.vote(&credential()).unwrap();

        let requests = rt.block_on(server.received_requests()).unwrap();
        let gets: Vec<_> = requests
            .iter()
            .filter(|r| r.method.as_str() == "GET")
            .collect();
        assert_eq!(gets.len(), 2);
        // A fresh cookie store: the second page request carries no cookie.
        assert!(gets[1].headers.get("cookie").is_none());
    }

    #[test]
    fn rejects_unknown_encoding() {
        let settings = VoteSettings {
            response_encoding: "klingon".to_string(),
            ..VoteSettings::default()
        };
        let err = SubmissionAgent::new(&settings).unwrap_err();
        assert!(matches!(err, VoteError::UnknownEncoding { .. }), "{:?}", err);
    }

    #[test]
    fn rejects_relative_base_url() {
        let settings = VoteSettings {
            base_url: "vote".to_string(),
            ..VoteSettings::default()
        };
        let err = SubmissionAgent::new(&settings).unwrap_err();
        assert!(matches!(err, VoteError::InvalidUrl { .. }), "{:?}", err);
    }

    #[test]
    fn agent_is_checked_once() {
        let agent = SubmissionAgent::new(&VoteSettings::default()).unwrap();
        assert_eq!(agent.encoding, SHIFT_JIS);
        assert_eq!(agent.headers.len(), 12);
        assert_eq!(
            agent.headers.get("host").unwrap().to_str().unwrap(),
            "akb48-sousenkyo.jp"
        );
    }
}
