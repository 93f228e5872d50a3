//! Candidate filtering and homepage rewriting.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::types::{Candidate, Category};
use crate::variants::clean_query;

/// Title given to a candidate rewritten to a site-search page.
pub fn search_title(query: &str, domain: &str) -> String {
    format!("Search: {query} on {domain}")
}

/// Whether the candidate's title or URL mentions a keyword of `category`.
/// Always true without a category.
pub fn matches_category(catalog: &Catalog, candidate: &Candidate, category: Option<Category>) -> bool {
    let Some(category) = category else {
        return true;
    };
    let title = candidate.title.to_lowercase();
    let url = candidate.url.to_lowercase();
    catalog
        .keywords(category)
        .iter()
        .any(|k| title.contains(k.as_str()) || url.contains(k.as_str()))
}

/// Apply exclusion, allow-list and category checks, rewriting homepage-style
/// links to the retailer's own search page.
///
/// `avoid` must already be normalised (see
/// [`crate::types::UserPrefs::normalized_avoid_domains`]).
pub fn filter_candidates(
    catalog: &Catalog,
    candidates: Vec<Candidate>,
    category: Option<Category>,
    avoid: &BTreeSet<String>,
    query: &str,
) -> Vec<Candidate> {
    let allowed = category.and_then(|c| catalog.allowed_domains(c));
    let site_query = clean_query(query);

    let mut out = Vec::with_capacity(candidates.len());
    for mut candidate in candidates {
        let domain = candidate.domain.as_str();
        if domain.is_empty() || catalog.is_blocked(domain) || avoid.contains(domain) {
            continue;
        }
        if allowed.is_some_and(|set| !set.contains(domain)) {
            continue;
        }
        if !matches_category(catalog, &candidate, category) {
            continue;
        }
        if !catalog.classify(&candidate.url).looks_ecommerce {
            let Some(url) = catalog.site_search_url(domain, &site_query) else {
                continue;
            };
            let title = search_title(query, domain);
            candidate.rewrite(url, title);
        }
        out.push(candidate);
    }

    tracing::debug!(kept = out.len(), "filter done");
    out
}
