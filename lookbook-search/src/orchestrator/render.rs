//! Mapping validated candidates to result cards.

use crate::catalog::Catalog;
use crate::types::{Candidate, ResultCard};

use super::dedup::dedup_by_domain;

/// Public suffixes with two labels that the registrable name sits in front of.
const TWO_LEVEL_SUFFIXES: &[&str] = &[
    "co.in", "net.in", "org.in", "firm.in", "gen.in", "ind.in", "co.uk", "org.uk", "com.au",
];

/// Favicon URL for a domain.
pub fn favicon_url(domain: &str) -> String {
    format!("https://www.google.com/s2/favicons?domain={domain}&sz=32")
}

/// Human-readable retailer name for a domain.
///
/// Curated overrides win; otherwise the registrable label (the one in front
/// of the public suffix) with hyphens turned into spaces, title-cased.
pub fn display_name(catalog: &Catalog, domain: &str) -> String {
    if let Some(name) = catalog.display_names.get(domain) {
        return name.clone();
    }
    title_case(&registrable_label(domain).replace('-', " "))
}

fn registrable_label(domain: &str) -> &str {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return domain;
    }
    let suffix_len = if labels.len() >= 3
        && TWO_LEVEL_SUFFIXES
            .iter()
            .any(|s| domain.ends_with(&format!(".{s}")))
    {
        2
    } else {
        1
    };
    labels[labels.len() - suffix_len - 1]
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Dedup by domain in completion order, cap at `total_k`, and render cards.
pub fn render_cards(catalog: &Catalog, validated: Vec<Candidate>, total_k: usize) -> Vec<ResultCard> {
    dedup_by_domain(validated)
        .into_iter()
        .take(total_k)
        .map(|c| ResultCard {
            retailer: display_name(catalog, &c.domain),
            favicon: favicon_url(&c.domain),
            url: c.url,
        })
        .collect()
}
