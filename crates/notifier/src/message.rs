use sentinel_common::types::Channel;

pub const ALERT_HEADER: &str = "🚨 New Airdrop or Token Launch Alert! 🚨";

/// Placeholder for fields the listing left empty.
const MISSING: &str = "n/a";

/// Escapes the characters Telegram's legacy `Markdown` parse mode treats as
/// entity delimiters: `_`, `*`, `` ` `` and `[`.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

fn field(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        MISSING.to_string()
    } else {
        escape_markdown(value)
    }
}

/// Render the alert text for one channel: a header line, a blank line,
/// then the labeled name, description and link.
pub fn format_alert(channel: &Channel) -> String {
    format!(
        "{ALERT_HEADER}\n\n*Channel*: {}\n*Description*: {}\n*Link*: {}",
        field(channel.name()),
        field(channel.description()),
        field(channel.url()),
    )
}
