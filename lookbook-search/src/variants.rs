//! Category inference and backend query variants.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::types::Category;

/// Words that only steer a web search and confuse a retailer's own search.
static MARKETING_WORDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:buy|online|india)\b").ok());

/// Occasion word dropped from accessory queries.
static PARTY_WORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bparty\b").ok());

/// Infer the clothing category of a query.
///
/// The first category (in [`Category::all`] order) with a keyword contained
/// in the lowercased query wins.
pub fn infer_category(catalog: &Catalog, query: &str) -> Option<Category> {
    let lower = query.to_lowercase();
    Category::all().iter().copied().find(|category| {
        catalog
            .keywords(*category)
            .iter()
            .any(|keyword| lower.contains(keyword.as_str()))
    })
}

/// Strip the marketing words as whole words and collapse whitespace.
pub fn clean_query(query: &str) -> String {
    remove_words(&MARKETING_WORDS, query)
}

/// Backend query phrasings for a raw query.
///
/// Accessory categories get curated phrasings because the composed phrase
/// is often too narrow for a web search. The result is never empty and
/// holds no duplicates.
pub fn query_variants(query: &str, category: Option<Category>) -> Vec<String> {
    let cleaned = clean_query(query);

    let candidates: Vec<String> = match category {
        None => vec![cleaned],
        Some(Category::Belt) => {
            let base = non_empty_or(remove_words(&PARTY_WORD, &cleaned), "slim belt");
            vec![
                base,
                "women skinny belt".into(),
                "women slim belt".into(),
                "women waist belt".into(),
            ]
        }
        Some(cat @ (Category::Earrings | Category::Necklace)) => {
            let base = non_empty_or(remove_words(&PARTY_WORD, &cleaned), cat.name());
            vec![base, format!("women {cat}"), format!("fashion {cat}")]
        }
        Some(Category::Bag) => {
            let base = non_empty_or(remove_words(&PARTY_WORD, &cleaned), "tote bag");
            vec![base, "women tote bag".into(), "women crossbody bag".into()]
        }
        Some(_) => vec![cleaned],
    };

    let mut out: Vec<String> = Vec::with_capacity(candidates.len());
    for variant in candidates {
        if !variant.is_empty() && !out.contains(&variant) {
            out.push(variant);
        }
    }
    if out.is_empty() {
        out.push(query.to_owned());
    }
    out
}

/// Delete every match of `pattern` and collapse whitespace.
///
/// Punctuation next to a removed word stays, so `jeans/india` becomes
/// `jeans/`.
fn remove_words(pattern: &LazyLock<Option<Regex>>, text: &str) -> String {
    let stripped = match pattern.as_ref() {
        Some(re) => re.replace_all(text, ""),
        None => text.into(),
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_owned()
    } else {
        value
    }
}
