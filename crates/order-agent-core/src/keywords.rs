//! Keyword parsing for model-produced query strings.
//!
//! The model answers with a comma-separated list such as
//! `"pork", "spicy" , noodles`. [`KeywordSet::parse`] turns that into the
//! trimmed, unquoted keywords used for substring matching.

use std::fmt;

/// Delimiter between keywords in a query string.
pub const KEYWORD_DELIMITER: char = ',';

/// Characters stripped from both ends of every token.
///
/// Every enclosing layer is removed, not just one pair: `""pork""` becomes
/// `pork`. Stripping a single pair would leave `"pork"`, which parses to a
/// different keyword the second time round.
const QUOTE_CHARS: [char; 3] = ['"', '\u{201C}', '\u{201D}'];

/// An ordered set of non-empty keywords.
///
/// Order follows first appearance in the query string. It does not affect
/// matching but is kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Parse a raw query string.
    ///
    /// Splits on [`KEYWORD_DELIMITER`], strips surrounding whitespace and
    /// enclosing quotes from each token, and drops tokens left empty. A
    /// keyword repeated in the input is kept once.
    pub fn parse(query: &str) -> Self {
        let mut keywords: Vec<String> = Vec::new();
        for token in query.split(KEYWORD_DELIMITER) {
            let keyword = clean_token(token);
            if keyword.is_empty() || keywords.iter().any(|k| k == keyword) {
                continue;
            }
            keywords.push(keyword.to_string());
        }
        Self { keywords }
    }

    /// True when the query held no usable keyword.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Number of distinct keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Keywords in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Keywords as a slice, in first-seen order.
    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    /// Returns a new set holding the keywords of `self` followed by the
    /// keywords of `other` that are not already present.
    pub fn union(&self, other: &KeywordSet) -> KeywordSet {
        let mut keywords = self.keywords.clone();
        for k in &other.keywords {
            if !keywords.contains(k) {
                keywords.push(k.clone());
            }
        }
        KeywordSet { keywords }
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords.join(", "))
    }
}

// Whitespace and quotes are peeled together so that `" pork "` and
// `"pork"` both yield `pork`, and re-parsing a keyword is a no-op.
fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn words(set: &KeywordSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn test_parse_plain_list() {
        let set = KeywordSet::parse("pork, spicy");
        assert_eq!(words(&set), vec!["pork", "spicy"]);
    }

    #[test]
    fn test_parse_strips_quotes_and_whitespace() {
        let set = KeywordSet::parse(r#" "pork" ,  "spicy",noodles "#);
        assert_eq!(words(&set), vec!["pork", "spicy", "noodles"]);
    }

    #[test]
    fn test_parse_quote_inside_whitespace() {
        let set = KeywordSet::parse(r#"" pork ""#);
        assert_eq!(words(&set), vec!["pork"]);
    }

    #[test]
    fn test_parse_typographic_quotes() {
        let set = KeywordSet::parse("\u{201C}猪肉\u{201D}, \u{201C}辣\u{201D}");
        assert_eq!(words(&set), vec!["猪肉", "辣"]);
    }

    #[test]
    fn test_parse_full_width_comma_is_not_a_delimiter() {
        let set = KeywordSet::parse("猪肉，辣");
        assert_eq!(words(&set), vec!["猪肉，辣"]);
    }

    #[test]
    fn test_parse_multibyte_whitespace() {
        let set = KeywordSet::parse("\u{3000}麻辣\u{3000}, 面");
        assert_eq!(words(&set), vec!["麻辣", "面"]);
    }

    #[test]
    fn test_parse_drops_empty_tokens() {
        let set = KeywordSet::parse(r#",, "" ,  , "#);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(KeywordSet::parse("").is_empty());
    }

    #[test]
    fn test_parse_strips_nested_quote_layers() {
        let set = KeywordSet::parse(r#"""pork"", "a"#);
        assert_eq!(words(&set), vec!["pork", "a"]);
        assert_eq!(KeywordSet::parse("pork"), KeywordSet::parse(r#"""pork"""#));
    }

    #[test]
    fn test_parse_keeps_inner_quotes() {
        let set = KeywordSet::parse(r#""ma "la" tang""#);
        assert_eq!(words(&set), vec![r#"ma "la" tang"#]);
    }

    #[test]
    fn test_parse_deduplicates_preserving_first_order() {
        let set = KeywordSet::parse("spicy, pork, spicy, \"pork\"");
        assert_eq!(words(&set), vec!["spicy", "pork"]);
    }

    #[test]
    fn test_display_joins_keywords() {
        let set = KeywordSet::parse("a,b , c");
        assert_eq!(set.to_string(), "a, b, c");
    }

    #[test]
    fn test_union_appends_new_keywords() {
        let a = KeywordSet::parse("pork, spicy");
        let b = KeywordSet::parse("noodles, pork");
        assert_eq!(words(&a.union(&b)), vec!["pork", "spicy", "noodles"]);
    }

    proptest! {
        #[test]
        fn prop_reparsing_a_keyword_is_identity(input in ".*") {
            for keyword in KeywordSet::parse(&input).iter() {
                let reparsed = KeywordSet::parse(keyword);
                prop_assert_eq!(reparsed.as_slice(), &[keyword.to_string()][..]);
            }
        }

        #[test]
        fn prop_keywords_are_non_empty_and_undelimited(input in ".*") {
            for keyword in KeywordSet::parse(&input).iter() {
                prop_assert!(!keyword.is_empty());
                prop_assert!(!keyword.contains(KEYWORD_DELIMITER));
                prop_assert_eq!(keyword.trim(), keyword);
            }
        }
    }
}
