//! Recently-used sticker detection.
//!
//! Scans chat message texts for embedded sticker references so that the
//! stickers a user just sent are not recommended again.

use regex_lite::Regex;
use stickermatch_core::error::{Error, Result};

/// Bracket markers: `[sticker:stamp0042]` or `[stamp:stamp0042]`.
const MARKER_PATTERN: &str = r"\[(?:sticker|stamp):(?P<id>[A-Za-z0-9_-]+)\]";

/// Asset paths: `.../stamp/stamp0042/stamp0042.png` or `.../stamp/stamp0042.webp`.
const ASSET_PATH_PATTERN: &str = r"stamp/(?P<id>[A-Za-z0-9_-]+)(?:/|\.[A-Za-z0-9]+)";

/// A message that is nothing but a sticker identifier.
const BARE_ID_PATTERN: &str = r"^\s*(?P<id>stamp[0-9]+[A-Za-z0-9_-]*)\s*$";

/// Extracts sticker identifiers from message texts.
///
/// Each pattern must have a named capture group `id`.
#[derive(Debug, Clone)]
pub struct RecencyExtractor {
    patterns: Vec<Regex>,
}

impl RecencyExtractor {
    /// Build an extractor from the built-in patterns (optional) plus extras.
    pub fn new(builtin: bool, extra_patterns: &[String]) -> Result<Self> {
        let builtins = [MARKER_PATTERN, ASSET_PATH_PATTERN, BARE_ID_PATTERN];
        let sources = builtins
            .iter()
            .filter(|_| builtin)
            .copied()
            .chain(extra_patterns.iter().map(String::as_str));

        let mut patterns = Vec::new();
        for source in sources {
            let re = Regex::new(source).map_err(|e| Error::Config {
                message: format!("invalid recency pattern '{source}': {e}"),
            })?;
            if !re.capture_names().any(|name| name == Some("id")) {
                return Err(Error::Config {
                    message: format!("recency pattern '{source}' has no (?P<id>...) group"),
                });
            }
            patterns.push(re);
        }

        Ok(Self { patterns })
    }

    /// Collect up to `max_count` distinct identifiers, in message order and
    /// then in order of appearance within each message.
    pub fn extract<S: AsRef<str>>(&self, messages: &[S], max_count: usize) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        if max_count == 0 {
            return found;
        }

        for message in messages {
            for id in self.references(message.as_ref()) {
                if !found.iter().any(|f| f == id) {
                    found.push(id.to_string());
                    if found.len() >= max_count {
                        return found;
                    }
                }
            }
        }

        found
    }

    /// All references in one message, ordered by start offset. At equal
    /// offsets the earlier pattern wins.
    fn references<'m>(&self, message: &'m str) -> Vec<&'m str> {
        let mut hits: Vec<(usize, usize, &'m str)> = Vec::new();
        for (index, re) in self.patterns.iter().enumerate() {
            for caps in re.captures_iter(message) {
                if let Some(id) = caps.name("id") {
                    hits.push((id.start(), index, id.as_str()));
                }
            }
        }
        hits.sort_by_key(|&(start, index, _)| (start, index));
        hits.into_iter().map(|(_, _, id)| id).collect()
    }
}

impl Default for RecencyExtractor {
    fn default() -> Self {
        let patterns = [MARKER_PATTERN, ASSET_PATH_PATTERN, BARE_ID_PATTERN]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RecencyExtractor {
        RecencyExtractor::default()
    }

    #[test]
    fn default_has_all_builtin_patterns() {
        assert_eq!(extractor().patterns.len(), 3);
        assert_eq!(RecencyExtractor::new(true, &[]).unwrap().patterns.len(), 3);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let messages: Vec<String> = vec![];
        assert!(extractor().extract(&messages, 10).is_empty());
    }

    #[test]
    fn recognizes_each_reference_shape() {
        let messages = [
            "lol [sticker:stamp0001]",
            "https://assets.example.com/stamp/stamp0002/stamp0002.png",
            "  stamp0003  ",
            "[stamp:stamp0004_b]",
            "see stamp/stamp0005.webp",
        ];
        assert_eq!(
            extractor().extract(&messages, 10),
            vec!["stamp0001", "stamp0002", "stamp0003", "stamp0004_b", "stamp0005"]
        );
    }

    #[test]
    fn plain_messages_contribute_nothing() {
        let messages = ["happy birthday!", "stamp collecting is fun", "stamp"];
        assert!(extractor().extract(&messages, 10).is_empty());
    }

    #[test]
    fn duplicates_count_once() {
        let messages = [
            "[sticker:stamp0001]",
            "[sticker:stamp0001] again",
            "[sticker:stamp0002]",
        ];
        assert_eq!(extractor().extract(&messages, 10), vec!["stamp0001", "stamp0002"]);
    }

    #[test]
    fn stops_at_max_count_in_input_order() {
        let messages: Vec<String> = (0..15).map(|i| format!("[sticker:s{i:02}]")).collect();
        let ids = extractor().extract(&messages, 10);
        assert_eq!(ids.len(), 10);
        assert_eq!(ids.first().map(String::as_str), Some("s00"));
        assert_eq!(ids.last().map(String::as_str), Some("s09"));
    }

    #[test]
    fn fewer_references_than_max_returns_all() {
        let messages = ["[sticker:a] then [sticker:b]", "nothing here", "[sticker:c]"];
        assert_eq!(extractor().extract(&messages, 10), vec!["a", "b", "c"]);
    }

    #[test]
    fn order_within_message_follows_position() {
        let messages = ["stamp/late01.png first? no: [sticker:early] comes after"];
        assert_eq!(extractor().extract(&messages, 10), vec!["late01", "early"]);
    }

    #[test]
    fn zero_max_count() {
        assert!(extractor().extract(&["[sticker:a]"], 0).is_empty());
    }

    #[test]
    fn extra_patterns_extend_builtins() {
        let extractor =
            RecencyExtractor::new(true, &[r"<:sticker:(?P<id>\d+)>".to_string()]).unwrap();
        assert_eq!(
            extractor.extract(&["<:sticker:123> and [sticker:stamp9]"], 10),
            vec!["123", "stamp9"]
        );

        let only_extra =
            RecencyExtractor::new(false, &[r"<:sticker:(?P<id>\d+)>".to_string()]).unwrap();
        assert!(only_extra.extract(&["[sticker:stamp9]"], 10).is_empty());
    }

    #[test]
    fn invalid_patterns_are_config_errors() {
        assert!(matches!(
            RecencyExtractor::new(false, &["(unclosed".to_string()]),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            RecencyExtractor::new(false, &[r"sticker:\w+".to_string()]),
            Err(Error::Config { .. })
        ));
    }
}
