//! Email extraction from fetched HTML pages
//!
//! A page is scanned twice: once over its visible text and once over every
//! `mailto:` link target. The two passes are unioned, keeping first-seen order.

use crate::extract::email::{extract_emails, extract_mailto};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("link selector is valid"));

/// Extracts all unique email addresses from an HTML document
///
/// # Arguments
///
/// * `html` - Raw page body as returned by the fetcher
///
/// # Returns
///
/// Unique addresses found in the page text followed by any additional
/// addresses only present in `mailto:` links.
///
/// # Example
///
/// ```
/// use careerfind::extract::extract_from_html;
///
/// let html = r#"<p>Write to jobs@acme.com</p><a href="mailto:hr@acme.com?subject=CV">HR</a>"#;
/// assert_eq!(extract_from_html(html), vec!["jobs@acme.com", "hr@acme.com"]);
/// ```
pub fn extract_from_html(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut emails = extract_emails(&page_text(&document));
    let mut seen: HashSet<String> = emails.iter().cloned().collect();

    for email in mailto_addresses(&document) {
        if seen.insert(email.clone()) {
            emails.push(email);
        }
    }

    emails
}

/// Collects the text of the whole document, one space between text nodes
///
/// Separating nodes keeps an address from running into the next word when
/// markup sits directly after it.
fn page_text(document: &Html) -> String {
    let mut text = String::new();
    for fragment in document.root_element().text() {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    text
}

/// Returns the valid addresses of every `mailto:` link in the document
fn mailto_addresses(document: &Html) -> Vec<String> {
    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(extract_mailto)
        .collect()
}
