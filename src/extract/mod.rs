//! Email extraction
//!
//! Pure functions that turn text or HTML into a deduplicated list of valid
//! email addresses. Extraction never fails: no match simply means an empty
//! result.

mod email;
mod html;

pub use email::{extract_emails, extract_mailto, is_valid_email};
pub use html::extract_from_html;
