//! Key matching against scan text.

use lorebook::{Entry, SelectiveLogic, WorldInfoSettings};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Matching switches for one entry, with settings applied as fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    pub case_sensitive: bool,
    pub whole_words: bool,
}

impl MatchRules {
    /// Merge an entry's overrides over the global defaults.
    pub fn resolve(entry: &Entry, settings: &WorldInfoSettings) -> Self {
        Self {
            case_sensitive: entry.case_sensitive.unwrap_or(settings.case_sensitive),
            whole_words: entry.match_whole_words.unwrap_or(settings.match_whole_words),
        }
    }
}

/// One compiled trigger key.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    /// Compile a key under the given rules.
    ///
    /// Keys written as `/pattern/flags` are regular expressions and carry
    /// their own flags. Returns `None` for empty keys and invalid patterns.
    pub fn compile(key: &str, rules: MatchRules) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if let Some((pattern, flags)) = parse_regex_key(key) {
            return match RegexBuilder::new(pattern)
                .case_insensitive(flags.contains('i'))
                .dot_matches_new_line(flags.contains('s'))
                .multi_line(flags.contains('m'))
                .build()
            {
                Ok(regex) => Some(Self { regex }),
                Err(err) => {
                    debug!(key, error = %err, "Ignoring invalid regex key");
                    None
                }
            };
        }

        let escaped = regex::escape(key);
        // The whole key, phrase or single word, must sit between non-word
        // characters or the text edges.
        let pattern = if rules.whole_words {
            format!(r"(?:^|\W){escaped}(?:$|\W)")
        } else {
            escaped
        };

        RegexBuilder::new(&pattern)
            .case_insensitive(!rules.case_sensitive)
            .build()
            .ok()
            .map(|regex| Self { regex })
    }

    /// Check whether the key occurs in any segment.
    pub fn is_match(&self, segments: &[&str]) -> bool {
        segments.iter().any(|s| self.regex.is_match(s))
    }
}

/// Split `/pattern/flags` into its parts.
fn parse_regex_key(key: &str) -> Option<(&str, &str)> {
    let body = key.strip_prefix('/')?;
    let end = body.rfind('/')?;
    let (pattern, flags) = (&body[..end], &body[end + 1..]);
    if pattern.is_empty() || !flags.chars().all(|c| "gimsuy".contains(c)) {
        return None;
    }
    Some((pattern, flags))
}

fn compile_keys(keys: &[String], rules: MatchRules) -> Vec<KeyPattern> {
    keys.iter()
        .filter_map(|k| KeyPattern::compile(k, rules))
        .collect()
}

/// Primary and secondary keys of one entry, compiled once per call.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    primary: Vec<KeyPattern>,
    secondary: Vec<KeyPattern>,
    logic: Option<SelectiveLogic>,
}

impl KeyMatcher {
    pub fn for_entry(entry: &Entry, settings: &WorldInfoSettings) -> Self {
        let rules = MatchRules::resolve(entry, settings);
        let secondary = compile_keys(&entry.key_secondary, rules);
        let logic = (entry.selective && !secondary.is_empty()).then_some(entry.selective_logic);

        Self {
            primary: compile_keys(&entry.key, rules),
            secondary,
            logic,
        }
    }

    /// Whether any key survived compilation.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Test the entry's keys against the scan segments.
    pub fn matches(&self, segments: &[&str]) -> bool {
        if !self.primary.iter().any(|k| k.is_match(segments)) {
            return false;
        }

        let Some(logic) = self.logic else {
            return true;
        };

        let mut hits = self.secondary.iter().map(|k| k.is_match(segments));
        match logic {
            SelectiveLogic::AndAny => hits.any(|hit| hit),
            SelectiveLogic::AndAll => hits.all(|hit| hit),
            SelectiveLogic::NotAny => !hits.any(|hit| hit),
            SelectiveLogic::NotAll => !hits.all(|hit| hit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSENSITIVE: MatchRules = MatchRules {
        case_sensitive: false,
        whole_words: false,
    };

    fn key(text: &str, rules: MatchRules) -> KeyPattern {
        KeyPattern::compile(text, rules).unwrap()
    }

    #[test]
    fn test_case_sensitivity() {
        let sensitive = MatchRules {
            case_sensitive: true,
            whole_words: false,
        };

        assert!(!key("hello", sensitive).is_match(&["Hello there"]));
        assert!(key("hello", INSENSITIVE).is_match(&["Hello there"]));
    }

    #[test]
    fn test_whole_words() {
        let whole = MatchRules {
            case_sensitive: false,
            whole_words: true,
        };

        assert!(key("cat", whole).is_match(&["the cat sat"]));
        assert!(key("cat", whole).is_match(&["cat"]));
        assert!(key("cat", whole).is_match(&["a cat."]));
        assert!(!key("cat", whole).is_match(&["concatenate"]));
        assert!(key("cat", INSENSITIVE).is_match(&["concatenate"]));
    }

    #[test]
    fn test_multi_word_key_under_whole_words() {
        let whole = MatchRules {
            case_sensitive: false,
            whole_words: true,
        };
        assert!(!key("black cat", whole).is_match(&["a black cats' tale"]));
        assert!(!key("black cat", whole).is_match(&["the black catalogue"]));
        assert!(!key("black cat", whole).is_match(&["ablack cat"]));
        assert!(key("black cat", whole).is_match(&["a black cat."]));
        assert!(key("black cat", whole).is_match(&["black cat"]));
    }

    #[test]
    fn test_special_characters_are_literal() {
        assert!(key("c++", INSENSITIVE).is_match(&["I write C++ daily"]));
        assert!(!key("a.b", INSENSITIVE).is_match(&["axb"]));
    }

    #[test]
    fn test_empty_key_never_compiles() {
        assert!(KeyPattern::compile("", INSENSITIVE).is_none());
        assert!(KeyPattern::compile("   ", INSENSITIVE).is_none());
    }

    #[test]
    fn test_regex_keys() {
        let sensitive = MatchRules {
            case_sensitive: true,
            whole_words: true,
        };

        let pattern = key(r"/dra(gon|ke)s?/i", sensitive);
        assert!(pattern.is_match(&["Two DRAKES appeared"]));
        assert!(!pattern.is_match(&["a drag race"]));

        assert!(KeyPattern::compile("/([unclosed/", sensitive).is_none());
    }

    #[test]
    fn test_slash_text_that_is_not_a_regex() {
        assert!(parse_regex_key("/path/to/file").is_none());
        assert!(key("and/or", INSENSITIVE).is_match(&["this and/or that"]));
    }

    #[test]
    fn test_segments_are_searched_independently() {
        assert!(key("apple", INSENSITIVE).is_match(&["nothing here", "an apple"]));
        assert!(!key("apple", INSENSITIVE).is_match(&[]));
    }

    #[test]
    fn test_overrides_fall_back_to_settings() {
        let settings = WorldInfoSettings {
            case_sensitive: true,
            ..WorldInfoSettings::default()
        };

        let inherits = Entry::new("a", "x").with_key("k");
        let overrides = Entry::new("b", "x").with_key("k").with_case_sensitive(false);

        assert!(MatchRules::resolve(&inherits, &settings).case_sensitive);
        assert!(!MatchRules::resolve(&overrides, &settings).case_sensitive);
    }

    #[test]
    fn test_selective_logic() {
        let settings = WorldInfoSettings::default();
        let entry = |logic| {
            Entry::new("castle", "x")
                .with_key("castle")
                .with_secondary_keys(logic, ["night", "storm"])
        };
        let text = ["The castle at night"];

        assert!(KeyMatcher::for_entry(&entry(SelectiveLogic::AndAny), &settings).matches(&text));
        assert!(!KeyMatcher::for_entry(&entry(SelectiveLogic::AndAll), &settings).matches(&text));
        assert!(!KeyMatcher::for_entry(&entry(SelectiveLogic::NotAny), &settings).matches(&text));
        assert!(KeyMatcher::for_entry(&entry(SelectiveLogic::NotAll), &settings).matches(&text));

        // Secondary keys never rescue a missing primary key.
        assert!(!KeyMatcher::for_entry(&entry(SelectiveLogic::NotAny), &settings)
            .matches(&["a stormy night"]));
    }

    #[test]
    fn test_secondary_keys_ignored_without_selective() {
        let settings = WorldInfoSettings::default();
        let mut entry = Entry::new("castle", "x")
            .with_key("castle")
            .with_secondary_keys(SelectiveLogic::AndAll, ["dragon"]);
        entry.selective = false;

        assert!(KeyMatcher::for_entry(&entry, &settings).matches(&["the castle"]));
    }
}
