//! Core types: backend identifiers, candidates, result cards and preferences.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A raw hit from a search backend, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHit {
    /// The result URL.
    pub url: String,
    /// The result title as shown by the backend.
    pub title: String,
}

impl RawHit {
    /// Build a hit from a URL and title.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// An unvalidated retailer link.
///
/// `domain` is derived once when the candidate is created. Rewriting the
/// URL to a site-search page goes through [`Candidate::rewrite`], which
/// replaces URL and title together and leaves the domain alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    pub domain: String,
    pub title: String,
}

impl Candidate {
    pub fn new(url: impl Into<String>, domain: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            domain: domain.into(),
            title: title.into(),
        }
    }

    /// Point this candidate at a different page on the same retailer.
    pub fn rewrite(&mut self, url: String, title: String) {
        self.url = url;
        self.title = title;
    }
}

/// A retailer card returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCard {
    /// Human-readable retailer name.
    pub retailer: String,
    /// Validated listing or site-search URL.
    pub url: String,
    /// Favicon URL derived from the domain.
    pub favicon: String,
}

/// Supported search backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// DuckDuckGo HTML endpoint. Needs no credentials; always the safety net.
    #[default]
    #[serde(rename = "ddg")]
    DuckDuckGo,
    /// SerpApi Google engine (needs `SERPAPI_KEY`).
    #[serde(rename = "serpapi")]
    SerpApi,
    /// Bing Web Search API v7 (needs `BING_KEY`).
    #[serde(rename = "bing")]
    Bing,
}

impl BackendKind {
    /// Identifier used in configuration and logs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "ddg",
            Self::SerpApi => "serpapi",
            Self::Bing => "bing",
        }
    }

    /// Parse a configured identifier, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ddg" | "duckduckgo" => Some(Self::DuckDuckGo),
            "serpapi" => Some(Self::SerpApi),
            "bing" => Some(Self::Bing),
            _ => None,
        }
    }

    /// Whether this is the default backend used as a safety net.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::DuckDuckGo)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Clothing categories the pipeline knows keyword sets for.
///
/// The declaration order is the tie-break when a query matches more than
/// one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bag,
    Earrings,
    Necklace,
    Belt,
    Jeans,
    Trousers,
    Skirt,
    Shirt,
    Tshirt,
    Kurta,
    Dress,
    Saree,
}

impl Category {
    /// All categories in tie-break order.
    pub fn all() -> &'static [Category] {
        &[
            Self::Bag,
            Self::Earrings,
            Self::Necklace,
            Self::Belt,
            Self::Jeans,
            Self::Trousers,
            Self::Skirt,
            Self::Shirt,
            Self::Tshirt,
            Self::Kurta,
            Self::Dress,
            Self::Saree,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bag => "bag",
            Self::Earrings => "earrings",
            Self::Necklace => "necklace",
            Self::Belt => "belt",
            Self::Jeans => "jeans",
            Self::Trousers => "trousers",
            Self::Skirt => "skirt",
            Self::Shirt => "shirt",
            Self::Tshirt => "tshirt",
            Self::Kurta => "kurta",
            Self::Dress => "dress",
            Self::Saree => "saree",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which retailer tier a user leans towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PreferTier {
    #[default]
    Balanced,
    Niche,
    Mainstream,
}

impl PreferTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Niche => "niche",
            Self::Mainstream => "mainstream",
        }
    }

    /// Parse a tier name case-insensitively; anything unrecognised is
    /// treated as balanced.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "niche" => Self::Niche,
            "mainstream" => Self::Mainstream,
            _ => Self::Balanced,
        }
    }
}

impl From<String> for PreferTier {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<PreferTier> for String {
    fn from(tier: PreferTier) -> Self {
        tier.as_str().to_owned()
    }
}

impl fmt::Display for PreferTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user retailer preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPrefs {
    #[serde(default)]
    pub prefer_tier: PreferTier,
    #[serde(default)]
    pub avoid_domains: BTreeSet<String>,
}

impl UserPrefs {
    /// Avoid-list domains in the same form the classifier produces
    /// (lowercase, no leading `www.`).
    pub fn normalized_avoid_domains(&self) -> BTreeSet<String> {
        self.avoid_domains
            .iter()
            .map(|d| {
                let lower = d.trim().to_ascii_lowercase();
                lower.strip_prefix("www.").unwrap_or(&lower).to_owned()
            })
            .filter(|d| !d.is_empty())
            .collect()
    }
}
