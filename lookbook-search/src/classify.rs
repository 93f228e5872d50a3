//! Domain classification.
//!
//! Pure mapping from a URL to the facts the filter and scheduler need.
//! Nothing here touches the network or fails: a URL without a usable host
//! simply classifies as blocked.

use url::Url;

use crate::catalog::Catalog;

/// What the catalog knows about one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Lowercased host with one leading `www.` removed. Empty when the URL
    /// has no host.
    pub domain: String,
    pub blocked: bool,
    pub indian: bool,
    pub mainstream: bool,
    /// The URL looks like a product or listing page rather than an article
    /// or homepage.
    pub looks_ecommerce: bool,
}

/// Extract the normalised domain of a URL.
///
/// Returns `None` if the URL does not parse or has no host.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_owned())
}

impl Catalog {
    /// Whether a normalised domain counts as Indian.
    pub fn is_indian(&self, domain: &str) -> bool {
        domain.ends_with(".in") || self.indian_brands.contains(domain)
    }

    pub fn is_mainstream(&self, domain: &str) -> bool {
        self.mainstream.contains(domain)
    }

    pub fn is_blocked(&self, domain: &str) -> bool {
        self.blocked.contains(domain)
    }

    /// Classify a URL against this catalog.
    pub fn classify(&self, url: &str) -> Classification {
        let Some(domain) = domain_of(url) else {
            return Classification {
                domain: String::new(),
                blocked: true,
                indian: false,
                mainstream: false,
                looks_ecommerce: false,
            };
        };

        let lower_url = url.to_ascii_lowercase();
        let brand = self.indian_brands.contains(&domain);
        Classification {
            blocked: self.is_blocked(&domain),
            indian: self.is_indian(&domain),
            mainstream: self.is_mainstream(&domain),
            looks_ecommerce: brand
                || self
                    .ecommerce_hints
                    .iter()
                    .any(|hint| lower_url.contains(hint.as_str())),
            domain,
        }
    }
}
