//! Keyword matcher: flags channels whose name or description mentions an
//! alert keyword.
//!
//! Matching is case-insensitive substring containment, not word matching:
//! `airdrop` also matches `Airdropped`.

use sentinel_common::types::Channel;

/// Pure predicate over a channel's text fields.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Keywords are lower-cased on construction; blank entries are dropped
    /// since they would match every channel.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.trim().is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True if any keyword occurs in the lower-cased name or description.
    /// An empty keyword set never matches.
    pub fn matches(&self, channel: &Channel) -> bool {
        self.matched_keyword(channel).is_some()
    }

    /// The first configured keyword found in the channel, in keyword order.
    pub fn matched_keyword(&self, channel: &Channel) -> Option<&str> {
        let name = channel.name().to_lowercase();
        let description = channel.description().to_lowercase();

        self.keywords
            .iter()
            .find(|k| name.contains(k.as_str()) || description.contains(k.as_str()))
            .map(String::as_str)
    }
}
