//! Alert delivery for matched channels.
//!
//! Messages are rendered by `message` and delivered through the Telegram
//! Bot API `sendMessage` endpoint. Each alert is a single best-effort
//! attempt; the monitor decides what a failure means for dedup state.

pub mod message;
pub mod telegram;

pub use message::format_alert;
pub use telegram::TelegramNotifier;
