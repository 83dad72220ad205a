//! Email address matching over plain text
//!
//! The grammar is deliberately narrow: a local part of letters, digits and
//! `._%+-`, an `@`, a domain of letters, digits, dots and hyphens, and a
//! top-level domain of at least two letters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Unanchored pattern used to find candidates inside arbitrary text
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("email pattern is a valid regex")
});

/// Anchored form of the same grammar, used to validate a whole candidate
static EMAIL_EXACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("anchored email pattern is a valid regex")
});

/// Returns true if the entire string is a single valid email address
///
/// # Example
///
/// ```
/// use careerfind::extract::is_valid_email;
///
/// assert!(is_valid_email("user.name+tag@example.co.uk"));
/// assert!(!is_valid_email("user#@example.com"));
/// ```
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_EXACT.is_match(candidate)
}

/// Extracts every unique, valid email address found in `text`
///
/// Each match is re-validated against the anchored grammar before it is
/// kept. Duplicates are removed with an exact, case-sensitive comparison and
/// the first-seen order is preserved. Empty input yields an empty vector.
///
/// # Example
///
/// ```
/// use careerfind::extract::extract_emails;
///
/// let emails = extract_emails("contact a@b.com or b@c.org");
/// assert_eq!(emails, vec!["a@b.com", "b@c.org"]);
/// ```
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut emails = Vec::new();

    for found in EMAIL_PATTERN.find_iter(text) {
        let email = found.as_str();
        if is_valid_email(email) && seen.insert(email) {
            emails.push(email.to_string());
        }
    }

    emails
}

/// Extracts the address from a `mailto:` link target
///
/// The scheme is matched case-insensitively, anything from the first `?`
/// onwards (subject, cc, body...) is discarded, and the remainder must pass
/// [`is_valid_email`].
///
/// # Example
///
/// ```
/// use careerfind::extract::extract_mailto;
///
/// assert_eq!(extract_mailto("mailto:x@y.com?subject=Hi"), Some("x@y.com".to_string()));
/// assert_eq!(extract_mailto("https://example.com"), None);
/// ```
pub fn extract_mailto(href: &str) -> Option<String> {
    let href = href.trim();
    let scheme = href.get(..7)?;
    if !scheme.eq_ignore_ascii_case("mailto:") {
        return None;
    }

    let address = href[7..].split('?').next().unwrap_or("").trim();
    if is_valid_email(address) {
        Some(address.to_string())
    } else {
        None
    }
}
