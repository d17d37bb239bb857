// ABOUTME: Selector profiles mapping article fields to CSS locators, keyed by domain substring.
// ABOUTME: Loads the built-in table from embedded JSON and resolves a profile for a URL.

//! Domain-aware selector configuration.
//!
//! A [`SelectorTable`] is an ordered list of `(domain substring, profile)`
//! pairs plus one generic fallback profile. Lookup walks the list in order and
//! the first key contained in the page host wins, so more specific keys must
//! come before broader ones.

use serde::{Deserialize, Serialize};

use crate::article::source_of;

/// Embedded JSON with the built-in news-site profiles.
const BUILTIN_PROFILES_JSON: &str = include_str!("../../data/selector_profiles.json");

/// CSS locators for each logical article field. A missing locator leaves the field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorProfile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl SelectorProfile {
    fn locators(&self) -> impl Iterator<Item = &str> {
        [&self.title, &self.content, &self.date, &self.author]
            .into_iter()
            .filter_map(|l| l.as_deref())
    }
}

/// A profile bound to the domain substring that selects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub domain: String,
    #[serde(flatten)]
    pub profile: SelectorProfile,
}

/// Ordered domain profiles plus a generic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorTable {
    #[serde(default)]
    pub domains: Vec<DomainProfile>,
    pub fallback: SelectorProfile,
}

impl SelectorTable {
    /// Loads the built-in table from embedded JSON.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is malformed or cannot be deserialized.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_PROFILES_JSON).expect("failed to parse builtin selector profiles")
    }

    /// Parses a table from JSON of the same shape as the built-in one.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the table back to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Appends a domain profile. Earlier entries keep precedence.
    pub fn push(&mut self, domain: impl Into<String>, profile: SelectorProfile) {
        self.domains.push(DomainProfile {
            domain: domain.into(),
            profile,
        });
    }

    /// Profile for a host (already stripped of `www.`): first key contained in it, else the fallback.
    pub fn resolve(&self, host: &str) -> &SelectorProfile {
        self.domains
            .iter()
            .find(|d| !d.domain.is_empty() && host.contains(d.domain.as_str()))
            .map(|d| &d.profile)
            .unwrap_or(&self.fallback)
    }

    /// Profile for a page URL. Unparseable URLs get the fallback.
    pub fn resolve_url(&self, url: &str) -> &SelectorProfile {
        match source_of(url) {
            Some(host) => self.resolve(&host),
            None => &self.fallback,
        }
    }

    /// Every locator in the table, domain profiles first.
    pub fn locators(&self) -> impl Iterator<Item = &str> {
        self.domains
            .iter()
            .flat_map(|d| d.profile.locators())
            .chain(self.fallback.locators())
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_table_has_six_sites_in_order() {
        let table = SelectorTable::builtin();
        let keys: Vec<_> = table.domains.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "bbc.com",
                "cnn.com",
                "nytimes.com",
                "reuters.com",
                "theguardian.com",
                "washingtonpost.com"
            ]
        );
    }

    #[test]
    fn resolves_site_profiles() {
        let table = SelectorTable::builtin();
        let nyt = table.resolve_url("https://www.nytimes.com/2024/01/01/world/x.html");
        assert_eq!(nyt.content.as_deref(), Some("section[name=\"articleBody\"]"));
        assert_eq!(nyt.author.as_deref(), Some("span[itemprop=\"name\"]"));

        let cnn = table.resolve_url("https://edition.cnn.com/2024/politics/story");
        assert_eq!(cnn.title.as_deref(), Some(".headline__text"));

        let guardian = table.resolve_url("https://www.theguardian.com/world/2024/x");
        assert_eq!(guardian.date.as_deref(), Some(".content__dateline time"));
    }

    #[test]
    fn unknown_and_invalid_urls_use_fallback() {
        let table = SelectorTable::builtin();
        assert_eq!(table.resolve_url("https://example.org/post"), &table.fallback);
        assert_eq!(table.resolve_url("not a url"), &table.fallback);
        assert_eq!(
            table.fallback.content.as_deref(),
            Some("article, .article, .post, .content, .entry-content")
        );
    }

    #[test]
    fn first_matching_key_wins() {
        let mut table = SelectorTable::builtin();
        table.push(
            "news.bbc.com",
            SelectorProfile {
                title: Some(".never".to_string()),
                ..Default::default()
            },
        );
        let profile = table.resolve("news.bbc.com");
        assert_eq!(profile.title.as_deref(), Some("h1"));
    }

    #[test]
    fn from_json_accepts_custom_tables() {
        let json = r##"{
            "domains": [{"domain": "example.com", "title": ".hed", "content": "#body"}],
            "fallback": {"title": "h2"}
        }"##;
        let table = SelectorTable::from_json(json).unwrap();
        let profile = table.resolve("blog.example.com");
        assert_eq!(profile.title.as_deref(), Some(".hed"));
        assert_eq!(profile.date, None);
        assert_eq!(table.resolve("other.org").title.as_deref(), Some("h2"));
    }

    #[test]
    fn from_json_rejects_missing_fallback() {
        assert!(SelectorTable::from_json(r#"{"domains": []}"#).is_err());
    }

    #[test]
    fn json_roundtrip_preserves_table() {
        let table = SelectorTable::builtin();
        let back = SelectorTable::from_json(&table.to_json().unwrap()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn locators_cover_every_field() {
        let table = SelectorTable::builtin();
        assert_eq!(table.locators().count(), 7 * 4);
    }
}
