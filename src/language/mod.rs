//! Language prediction from URL heuristics
//!
//! Predicts the likely language of a page *before* fetching it, based only on
//! the URL string: ccTLD, subdomain, path prefix, and query parameters. The
//! predictor is used at link discovery time to avoid wasted fetches of pages
//! in languages the pipeline does not index.
//!
//! The cascade fails open: anything the heuristics cannot classify is
//! `Unknown`, which means "crawl it".

use regex::Regex;
use std::collections::{HashMap, HashSet};
use url::Url;

/// The 24 official EU languages (ISO 639-1 codes)
pub const EU_LANGUAGES: [&str; 24] = [
    "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "ga", "hr", "hu", "it", "lt",
    "lv", "mt", "nl", "pl", "pt", "ro", "sk", "sl", "sv",
];

/// ccTLD to language list. Multi-language countries list the primary
/// language first; only the first entry is ever predicted. Generic TLDs
/// (.com, .org, ...) are deliberately absent: they carry no language signal
/// and fall through to the URL-pattern checks.
const TLD_LANGUAGES: &[(&str, &[&str])] = &[
    // Single-language EU countries
    ("sk", &["sk"]),
    ("cz", &["cs"]),
    ("de", &["de"]),
    ("at", &["de"]),
    ("fr", &["fr"]),
    ("es", &["es"]),
    ("it", &["it"]),
    ("pl", &["pl"]),
    ("nl", &["nl"]),
    ("pt", &["pt"]),
    ("gr", &["el"]),
    ("ro", &["ro"]),
    ("bg", &["bg"]),
    ("hr", &["hr"]),
    ("hu", &["hu"]),
    ("lt", &["lt"]),
    ("lv", &["lv"]),
    ("ee", &["et"]),
    ("fi", &["fi"]),
    ("se", &["sv"]),
    ("dk", &["da"]),
    ("mt", &["mt"]),
    ("si", &["sl"]),
    // Multi-language EU countries
    ("be", &["nl", "fr"]),
    ("ie", &["en", "ga"]),
    ("lu", &["fr", "de"]),
    ("cy", &["el", "en"]),
    // EU institutions
    ("eu", &["en", "de", "fr", "es"]),
    // Non-EU but English-speaking
    ("uk", &["en"]),
    ("gb", &["en"]),
];

/// Domains that are always worth crawling, whatever the predicted language
const ALLOWLIST_DOMAINS: &[&str] = &[
    // Wikipedia & Wikimedia
    "wikipedia.org",
    "wikimedia.org",
    "wikidata.org",
    "wikisource.org",
    "wiktionary.org",
    "wikiquote.org",
    "wikinews.org",
    // EU institutions
    "europa.eu",
    "europarl.europa.eu",
    "ec.europa.eu",
    "consilium.europa.eu",
    "european-union.europa.eu",
    // Major European news sites
    "bbc.co.uk",
    "bbc.com",
    "theguardian.com",
    "spiegel.de",
    "lemonde.fr",
    "elpais.es",
    "corriere.it",
    "reuters.com",
    "euronews.com",
    // Archive sites
    "archive.org",
    "web.archive.org",
];

/// Known non-EU ccTLDs; a URL ending in one of these with no overriding
/// signal is skipped outright.
const NON_EU_TLDS: &[&str] = &[
    // Asian
    "jp", "cn", "kr", "tw", "hk", "sg", "th", "my", "id", "ph", "vn", "in", "pk", "bd", "lk",
    "np", "mm", "kh", "la", "bn",
    // Middle Eastern
    "ae", "sa", "qa", "kw", "bh", "om", "ye", "jo", "lb", "sy", "iq", "il",
    // African
    "za", "eg", "ng", "ke", "tz", "ug", "gh", "ci", "sn", "ma", "tn",
    // Americas
    "us", "ca", "mx", "br", "ar", "cl", "co", "pe", "ve", "ec",
    // Oceanian
    "au", "nz", "pg", "fj", "nc",
    // Russian & CIS
    "ru", "ua", "by", "kz", "ge", "am", "az", "uz", "kg", "tj", "tm",
    // Other non-EU Europe
    "ch", "no", "is", "rs", "mk", "al", "ba", "me", "xk", "tr", "md",
];

/// Outcome of a language prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    /// A 2-letter ISO 639-1 code extracted from the URL
    Language(String),

    /// No signal either way; safe to crawl
    Unknown,

    /// Definitely outside the target language set; drop without fetching
    Skip,
}

/// Predicts language from a URL using a fixed heuristic cascade
///
/// Resolution order, first match wins:
/// 1. allowlisted domain -> `Unknown` (always crawl)
/// 2. ccTLD table lookup
/// 3. 2-letter subdomain (`en.example.com`)
/// 4. leading path segment (`/en/`, `/de-de/`)
/// 5. `lang`/`language`/`locale` query parameter
/// 6. known non-EU ccTLD -> `Skip`
/// 7. otherwise `Unknown`
///
/// All lookup tables are plain data owned by the predictor, so tests and
/// deployments can override them without touching global state.
#[derive(Debug)]
pub struct LanguagePredictor {
    allowlist: Vec<String>,
    tld_languages: HashMap<String, Vec<String>>,
    non_eu_tlds: HashSet<String>,
    path_patterns: Vec<Regex>,
    query_pattern: Regex,
}

impl Default for LanguagePredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePredictor {
    /// Creates a predictor with the built-in lookup tables
    pub fn new() -> Self {
        Self::with_tables(
            ALLOWLIST_DOMAINS.iter().map(|d| d.to_string()).collect(),
            TLD_LANGUAGES
                .iter()
                .map(|(tld, langs)| {
                    (
                        tld.to_string(),
                        langs.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            NON_EU_TLDS.iter().map(|t| t.to_string()).collect(),
        )
    }

    /// Creates a predictor with caller-supplied lookup tables
    ///
    /// # Arguments
    ///
    /// * `allowlist` - domains always crawled regardless of prediction
    /// * `tld_languages` - ccTLD to language list (primary language first)
    /// * `non_eu_tlds` - ccTLDs that resolve to `Skip`
    pub fn with_tables(
        allowlist: Vec<String>,
        tld_languages: HashMap<String, Vec<String>>,
        non_eu_tlds: HashSet<String>,
    ) -> Self {
        // The patterns are fixed and known valid.
        let path_patterns = vec![
            Regex::new(r"^/([a-z]{2})(?:/|$)").expect("path language pattern is valid"),
            Regex::new(r"^/([a-z]{2})-[a-z]{2}(?:/|$)").expect("locale path pattern is valid"),
        ];
        let query_pattern = Regex::new(r"[?&](?:lang|language|locale)=([a-z]{2})")
            .expect("query language pattern is valid");

        Self {
            allowlist,
            tld_languages,
            non_eu_tlds,
            path_patterns,
            query_pattern,
        }
    }

    /// Predicts the language of a URL
    ///
    /// Deterministic and side-effect free. Malformed or empty input is never
    /// an error: it resolves to `Unknown`.
    pub fn predict(&self, url: &str) -> Prediction {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("cannot parse {} for language prediction: {}", url, e);
                return Prediction::Unknown;
            }
        };

        let host = parsed.host_str().unwrap_or("").to_lowercase();

        // 1. Allowlisted domains are always crawled
        if self.is_allowlisted(&host) {
            return Prediction::Unknown;
        }

        // 2. ccTLD lookup; unmapped TLDs fall through to the URL patterns
        let tld = extract_tld(&host);
        if let Some(tld) = &tld {
            if let Some(langs) = self.tld_languages.get(tld.as_str()) {
                if let Some(primary) = langs.first() {
                    return Prediction::Language(primary.clone());
                }
            }
        }

        // 3. Subdomain such as en.example.com
        if let Some(lang) = extract_from_subdomain(&host) {
            return Prediction::Language(lang);
        }

        // 4. Leading path segment such as /en/ or /de-de/
        if let Some(lang) = self.extract_from_path(parsed.path()) {
            return Prediction::Language(lang);
        }

        // 5. Query parameter such as ?lang=sk
        if let Some(lang) = self.extract_from_query(parsed.query().unwrap_or("")) {
            return Prediction::Language(lang);
        }

        // 6. Known non-EU ccTLD with no overriding signal
        if let Some(tld) = &tld {
            if self.non_eu_tlds.contains(tld.as_str()) {
                return Prediction::Skip;
            }
        }

        // 7. No signal at all
        Prediction::Unknown
    }

    fn is_allowlisted(&self, host: &str) -> bool {
        self.allowlist
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{}", d)))
    }

    fn extract_from_path(&self, path: &str) -> Option<String> {
        let path = path.to_lowercase();
        for pattern in &self.path_patterns {
            if let Some(captures) = pattern.captures(&path) {
                if let Some(lang) = captures.get(1) {
                    return Some(lang.as_str().to_string());
                }
            }
        }
        None
    }

    fn extract_from_query(&self, query: &str) -> Option<String> {
        let query = format!("?{}", query.to_lowercase());
        self.query_pattern
            .captures(&query)
            .and_then(|captures| captures.get(1))
            .map(|lang| lang.as_str().to_string())
    }
}

/// Extracts the last dot-separated label of a host, if it has at least two
fn extract_tld(host: &str) -> Option<String> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        parts.last().map(|tld| tld.to_string())
    } else {
        None
    }
}

/// Extracts a language code from the first subdomain label
///
/// Only hosts with at least three labels qualify, and only when the first
/// label is exactly two alphabetic characters. No validation against a real
/// ISO list happens at this stage.
fn extract_from_subdomain(host: &str) -> Option<String> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 3 {
        let subdomain = parts[0];
        if subdomain.len() == 2 && subdomain.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(subdomain.to_string());
        }
    }
    None
}
