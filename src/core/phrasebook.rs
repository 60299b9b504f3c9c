//! Per-language phrasing
//!
//! One [`LanguageProfile`] per supported tag: how "User X says:" reads in
//! that language, which tokens get respelled so the synthesizer pronounces
//! them properly, and how the language switch is confirmed in chat.

use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

pub const ENGLISH: &str = "en-US";
pub const ITALIAN: &str = "it-IT";

/// Literal substring replacements applied in a single pass.
///
/// At every position the longest matching source wins, and replaced text is
/// never rescanned, so `ddepau` is not also rewritten as `depau`.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    pattern: Option<Regex>,
    table: HashMap<String, String>,
}

impl Substitutions {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        if table.is_empty() {
            return Self::default();
        }

        let mut sources: Vec<&String> = table.keys().collect();
        sources.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = sources
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = match Regex::new(&alternation) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("⚠️ Substitution table rejected, leaving text untouched: {}", e);
                None
            }
        };

        Self { pattern, table }
    }

    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Some(re) => re
                .replace_all(text, |caps: &regex::Captures| {
                    self.table
                        .get(&caps[0])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned(),
            None => text.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub tag: String,
    /// Word for "User"
    pub user_word: String,
    /// Word for "says"
    pub says_word: String,
    pub substitutions: Substitutions,
    /// Chat confirmation once a user picks this language; `{user}` is replaced
    pub confirmation: String,
}

impl LanguageProfile {
    pub fn new(tag: &str, user_word: &str, says_word: &str) -> Self {
        Self {
            tag: tag.to_string(),
            user_word: user_word.to_string(),
            says_word: says_word.to_string(),
            substitutions: Substitutions::default(),
            confirmation: "{user}: {tag}".to_string(),
        }
    }

    pub fn with_substitutions<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.substitutions = Substitutions::new(pairs);
        self
    }

    pub fn with_confirmation(mut self, template: &str) -> Self {
        self.confirmation = template.to_string();
        self
    }
}

/// Lookup table of language profiles keyed by tag
#[derive(Debug, Clone)]
pub struct Phrasebook {
    profiles: HashMap<String, LanguageProfile>,
    aliases: HashMap<String, String>,
    fallback: LanguageProfile,
}

impl Default for Phrasebook {
    fn default() -> Self {
        let english = LanguageProfile::new(ENGLISH, "User", "says")
            .with_substitutions([("ddepau", "dee dehp ah hoo"), ("depau", "dehp ah hoo")])
            .with_confirmation("{user}, your TTS language has been set to English 🇬🇧🍔");
        let italian = LanguageProfile::new(ITALIAN, "L'utente", "dice")
            .with_substitutions([("ddepau", "di depau")])
            .with_confirmation(
                "{user}, la tua lingua per il TTS è stata impostata all'italiano 🇮🇹🤌",
            );

        let mut book = Self::new(english);
        book.insert(italian);
        for (alias, tag) in [
            ("speak", ENGLISH),
            ("eng", ENGLISH),
            ("parla", ITALIAN),
            ("ita", ITALIAN),
        ] {
            book.add_alias(alias, tag);
        }
        book
    }
}

impl Phrasebook {
    /// Create a phrasebook whose only profile is also the fallback
    pub fn new(fallback: LanguageProfile) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(fallback.tag.clone(), fallback.clone());
        Self {
            profiles,
            aliases: HashMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, profile: LanguageProfile) {
        self.profiles.insert(profile.tag.clone(), profile);
    }

    pub fn add_alias(&mut self, alias: &str, tag: &str) {
        self.aliases.insert(alias.to_lowercase(), tag.to_string());
    }

    pub fn is_supported(&self, tag: &str) -> bool {
        self.profiles.contains_key(tag)
    }

    /// Resolve a command alias such as `parla` to its language tag
    pub fn alias_language(&self, alias: &str) -> Option<&str> {
        self.aliases.get(&alias.to_lowercase()).map(String::as_str)
    }

    /// Accept either a tag or an alias
    pub fn resolve<'a>(&'a self, tag_or_alias: &'a str) -> &'a str {
        if self.is_supported(tag_or_alias) {
            tag_or_alias
        } else {
            self.alias_language(tag_or_alias).unwrap_or(tag_or_alias)
        }
    }

    /// Profile for `tag`, falling back to the default language
    pub fn profile(&self, tag: &str) -> &LanguageProfile {
        self.profiles.get(tag).unwrap_or(&self.fallback)
    }

    /// "User X says: content" in `tag`, with that language's respellings applied
    pub fn compose(&self, author: &str, content: &str, tag: &str) -> String {
        let phrasing = self.profile(tag);
        let sentence = format!(
            "{} {} {}: {}",
            phrasing.user_word, author, phrasing.says_word, content
        );

        // Respellings belong to the exact language; unknown tags get none.
        match self.profiles.get(tag) {
            Some(profile) => profile.substitutions.apply(&sentence),
            None => sentence,
        }
    }

    pub fn confirmation(&self, tag: &str, user: &str) -> String {
        self.profile(tag)
            .confirmation
            .replace("{user}", user)
            .replace("{tag}", tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_phrasing() {
        let book = Phrasebook::default();
        assert_eq!(
            book.compose("alice", "hello", ENGLISH),
            "User alice says: hello"
        );
    }

    #[test]
    fn test_italian_phrasing() {
        let book = Phrasebook::default();
        assert_eq!(
            book.compose("alice", "ciao", ITALIAN),
            "L'utente alice dice: ciao"
        );
    }

    #[test]
    fn test_unknown_tag_uses_english_phrasing() {
        let book = Phrasebook::default();
        assert_eq!(
            book.compose("bob", "hallo ddepau", "de-DE"),
            "User bob says: hallo ddepau"
        );
    }

    #[test]
    fn test_longest_match_first() {
        let book = Phrasebook::default();
        let text = book.compose("alice", "ddepau and depau", ENGLISH);
        assert_eq!(text, "User alice says: dee dehp ah hoo and dehp ah hoo");
        assert!(!text.contains("ddepau"));
    }

    #[test]
    fn test_italian_substitution() {
        let book = Phrasebook::default();
        let text = book.compose("alice", "ciao ddepau", ITALIAN);
        assert_eq!(text, "L'utente alice dice: ciao di depau");
    }

    #[test]
    fn test_replacement_not_rescanned() {
        let subs = Substitutions::new([("a", "ab"), ("ab", "x")]);
        assert_eq!(subs.apply("a ab"), "ab x");
    }

    #[test]
    fn test_substitution_sources_are_literal() {
        let subs = Substitutions::new([("a.b", "dot")]);
        assert_eq!(subs.apply("a.b axb"), "dot axb");
    }

    #[test]
    fn test_aliases() {
        let book = Phrasebook::default();
        assert_eq!(book.alias_language("parla"), Some(ITALIAN));
        assert_eq!(book.alias_language("SPEAK"), Some(ENGLISH));
        assert_eq!(book.resolve("ita"), ITALIAN);
        assert_eq!(book.resolve("it-IT"), ITALIAN);
        assert_eq!(book.resolve("fr-FR"), "fr-FR");
    }

    #[test]
    fn test_confirmation() {
        let book = Phrasebook::default();
        assert!(book
            .confirmation(ITALIAN, "alice")
            .starts_with("alice, la tua lingua"));
        assert!(book
            .confirmation(ENGLISH, "bob")
            .starts_with("bob, your TTS language has been set to English"));
    }

    #[test]
    fn test_extending_with_new_language() {
        let mut book = Phrasebook::default();
        book.insert(LanguageProfile::new("fr-FR", "L'utilisateur", "dit"));
        assert!(book.is_supported("fr-FR"));
        assert_eq!(
            book.compose("zoe", "salut", "fr-FR"),
            "L'utilisateur zoe dit: salut"
        );
    }
}
