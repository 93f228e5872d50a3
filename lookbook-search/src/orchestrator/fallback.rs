//! Site-search fallback when validation comes up short.
//!
//! Builds direct site-search candidates from the category allow-list, or
//! from the generic fallback site list when the query has no category.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{fill_template, Catalog};
use crate::classify::domain_of;
use crate::types::{Candidate, Category};
use crate::variants::clean_query;

/// Domains a fallback candidate must not use.
#[derive(Debug, Default)]
pub struct Exclusions<'a> {
    /// The user's normalised avoid-list.
    pub avoid: Option<&'a BTreeSet<String>>,
    /// Domains already validated in this request.
    pub validated: BTreeSet<String>,
}

impl Exclusions<'_> {
    fn excludes(&self, catalog: &Catalog, domain: &str) -> bool {
        catalog.is_blocked(domain)
            || self.avoid.is_some_and(|a| a.contains(domain))
            || self.validated.contains(domain)
    }
}

/// Generate up to `2 * need` site-search candidates.
pub fn fallback_candidates<R: Rng + ?Sized>(
    catalog: &Catalog,
    query: &str,
    category: Option<Category>,
    need: usize,
    exclusions: &Exclusions<'_>,
    rng: &mut R,
) -> Vec<Candidate> {
    let max = need.saturating_mul(2);
    if max == 0 {
        return Vec::new();
    }
    let site_query = clean_query(query);

    let mut out = Vec::new();
    if let Some(allowed) = category.and_then(|c| catalog.allowed_domains(c)) {
        let mut domains: Vec<&String> = allowed.iter().collect();
        domains.shuffle(rng);
        for domain in domains {
            if out.len() >= max {
                break;
            }
            if exclusions.excludes(catalog, domain) {
                continue;
            }
            let Some(url) = catalog.site_search_url(domain, &site_query) else {
                continue;
            };
            out.push(Candidate::new(url, domain.clone(), format!("Search: {query}")));
        }
    } else {
        let mut sites: Vec<_> = catalog.fallback_sites.iter().collect();
        sites.shuffle(rng);
        for site in sites {
            if out.len() >= max {
                break;
            }
            let url = fill_template(&site.template, &site_query);
            let Some(domain) = domain_of(&url) else {
                continue;
            };
            if exclusions.excludes(catalog, &domain) {
                continue;
            }
            out.push(Candidate::new(url, domain, format!("Search: {query} on {}", site.name)));
        }
    }

    tracing::debug!(need, generated = out.len(), "fallback candidates");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn category_fallback_uses_allow_list_templates() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let out = fallback_candidates(
            &catalog,
            "high waist jeans navy party",
            Some(Category::Jeans),
            2,
            &Exclusions::default(),
            &mut rng,
        );
        assert_eq!(out.len(), 4);
        let allowed = catalog.allowed_domains(Category::Jeans).expect("allow-list");
        for c in &out {
            assert!(allowed.contains(&c.domain));
            assert!(c.url.contains("high+waist+jeans+navy+party"));
            assert_eq!(c.title, "Search: high waist jeans navy party");
        }
    }

    #[test]
    fn marketing_words_stay_out_of_site_search_urls() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(4);
        let out = fallback_candidates(
            &catalog,
            "navy jeans/india",
            Some(Category::Jeans),
            3,
            &Exclusions::default(),
            &mut rng,
        );
        assert!(!out.is_empty());
        for c in &out {
            assert!(!c.url.to_lowercase().contains("india"), "{}", c.url);
            assert!(c.url.contains("navy+jeans%2F"), "{}", c.url);
        }
    }

    #[test]
    fn generic_fallback_without_category() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(2);
        let out = fallback_candidates(
            &catalog,
            "navy top",
            None,
            10,
            &Exclusions::default(),
            &mut rng,
        );
        // Only ten generic sites exist; no cycling.
        assert_eq!(out.len(), 10);
        let domains: BTreeSet<&str> = out.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains.len(), 10);
        assert!(domains.contains("okhai.org"));
    }

    #[test]
    fn exclusions_respected() {
        let catalog = Catalog::builtin();
        let avoid: BTreeSet<String> = ["myntra.com".to_owned()].into();
        let exclusions = Exclusions {
            avoid: Some(&avoid),
            validated: ["ajio.com".to_owned()].into(),
        };
        let mut rng = StdRng::seed_from_u64(3);
        let out = fallback_candidates(&catalog, "jeans", Some(Category::Jeans), 6, &exclusions, &mut rng);
        assert!(out.iter().all(|c| c.domain != "myntra.com" && c.domain != "ajio.com"));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn zero_need_yields_nothing() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(0);
        let out = fallback_candidates(&catalog, "jeans", None, 0, &Exclusions::default(), &mut rng);
        assert!(out.is_empty());
    }
}
