//! Notification of crawl results
//!
//! Results are summarised into a single message and sent to a chat. Telegram
//! is the only backend; [`Notifier`] keeps the pipeline independent of it.

mod telegram;

pub use telegram::{TelegramNotifier, TELEGRAM_API_BASE};

use crate::results::PageResult;
use std::fmt::Write as _;
use std::future::Future;
use thiserror::Error;

/// Errors raised while sending a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram configuration is missing")]
    MissingCredentials,

    #[error("invalid Telegram chat ID: {0}")]
    InvalidChatId(String),

    #[error("failed to send Telegram message: {0}")]
    Request(String),

    #[error("Telegram API rejected the message ({status}): {description}")]
    Api { status: u16, description: String },
}

/// Something that can deliver a text message
pub trait Notifier: Send + Sync {
    fn send(&self, message: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Renders results as the notification text
///
/// # Example
///
/// ```
/// use careerfind::notify::format_message;
///
/// assert_eq!(format_message(&[]), "📧 CareerFind Results\n\n");
/// ```
pub fn format_message(results: &[PageResult]) -> String {
    let mut message = String::from("📧 CareerFind Results\n\n");

    for result in results {
        // Writing into a String cannot fail
        let _ = writeln!(message, "📍 Location: {}", result.location);
        let _ = writeln!(message, "🕒 Time: {}", result.timestamp.format("%Y-%m-%d %H:%M:%S"));
        message.push_str("📧 Emails:\n");
        for email in &result.emails {
            let _ = writeln!(message, "- {}", email);
        }
        let _ = writeln!(message, "🔗 Source: {}", result.source);
        message.push_str("-------------------\n");
    }

    message
}
