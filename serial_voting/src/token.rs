//! Extraction of the anti-forgery token from the vote page.

use log::debug;
use scraper::{Html, Selector};

/// Looks for the first `input` element named `field_name` and returns its value.
///
/// Inputs with the right name but no `value` attribute are skipped.
/// Returns `None` when the page has no such input: the caller decides
/// whether to give up or to submit an incomplete form.
///
/// ```
/// use serial_voting::find_xsrf_token;
///
/// let page = r#"<form><input type="hidden" name="vote_form_sys.xsrf" value="a1b2"></form>"#;
/// assert_eq!(find_xsrf_token(page, "vote_form_sys.xsrf"), Some("a1b2".to_string()));
/// assert_eq!(find_xsrf_token("<p>closed</p>", "vote_form_sys.xsrf"), None);
/// ```
pub fn find_xsrf_token(html: &str, field_name: &str) -> Option<String> {
    let document = Html::parse_document(html);
    // A plain tag selector: the field name may contain characters with a meaning in CSS.
    let selector = Selector::parse("input").ok()?;
    let res = document
        .select(&selector)
        .filter(|elt| elt.value().attr("name") == Some(field_name))
        .find_map(|elt| elt.value().attr("value"))
        .map(|v| v.to_string());
    debug!("find_xsrf_token: field {:?} found: {:?}", field_name, res.is_some());
    res
}
