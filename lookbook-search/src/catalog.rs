//! Curated retailer reference tables.
//!
//! The [`Catalog`] holds every static list the pipeline consults: which
//! domains are mainstream, Indian, or blocked; per-category keywords and
//! allow-lists; site-search URL templates; and per-domain page markers used
//! by validation. It is built once and shared read-only behind an [`Arc`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::types::Category;

/// A generic retailer used when no category allow-list exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSite {
    /// Display name used in generated titles.
    pub name: String,
    /// Site-search URL template with a `{q}` placeholder.
    pub template: String,
}

/// Static retailer reference data.
///
/// Fields are public so tests and embedders can start from
/// [`Catalog::builtin`] and adjust individual tables.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Large, universally recognised platforms.
    pub mainstream: HashSet<String>,
    /// Indian marketplaces and brands (also counted as e-commerce domains).
    pub indian_brands: HashSet<String>,
    /// Social and Q&A sites that never yield shoppable links.
    pub blocked: HashSet<String>,
    /// URL substrings that suggest a product or listing page.
    pub ecommerce_hints: Vec<String>,
    /// Keywords per category; a query or page matches by substring.
    pub category_keywords: BTreeMap<Category, Vec<String>>,
    /// Domains allowed for a category. Categories without an entry allow any.
    pub category_allowed: HashMap<Category, BTreeSet<String>>,
    /// Site-search URL template per domain, with a `{q}` placeholder.
    pub site_search: HashMap<String, String>,
    /// Page markers that indicate real product listings, per domain.
    pub positive_markers: HashMap<String, Vec<String>>,
    /// Page markers that indicate an empty search, per domain.
    pub no_result_markers: HashMap<String, Vec<String>>,
    /// Generic site-search list for uncategorised fallback.
    pub fallback_sites: Vec<FallbackSite>,
    /// Display names that cannot be derived from the domain.
    pub display_names: HashMap<String, String>,
}

static BUILTIN: OnceLock<Arc<Catalog>> = OnceLock::new();

impl Catalog {
    /// The process-wide builtin catalog.
    pub fn shared() -> Arc<Catalog> {
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// Build the curated India-first catalog.
    pub fn builtin() -> Self {
        let mainstream = set(&[
            "amazon.in",
            "flipkart.com",
            "myntra.com",
            "ajio.com",
            "nykaafashion.com",
            "tatacliq.com",
            "tatacliq.in",
            "zara.com",
            "hm.com",
            "asos.com",
        ]);

        let blocked = set(&[
            "pinterest.com",
            "instagram.com",
            "facebook.com",
            "twitter.com",
            "x.com",
            "youtube.com",
            "reddit.com",
            "quora.com",
            "medium.com",
        ]);

        let indian_brands = set(&[
            // marketplaces
            "myntra.com",
            "ajio.com",
            "nykaafashion.com",
            "tatacliq.com",
            "tatacliq.in",
            "flipkart.com",
            "amazon.in",
            // apparel
            "fablestreet.com",
            "thelabellife.com",
            "globaldesi.in",
            "andindia.com",
            "fabindia.com",
            "wforwoman.com",
            "soch.com",
            "aurelia.com",
            "houseofindya.com",
            "bunaai.com",
            "kharakapas.com",
            "rawmango.com",
            "goodearth.in",
            "nicobar.com",
            "jaypore.com",
            "tjori.com",
            "suta.in",
            "okhai.org",
            "the-souled-store.com",
            // footwear / street
            "vegnonveg.com",
            "superkicks.in",
            // bags
            "capresebags.com",
            "baggit.com",
            "lavieworld.com",
            "hidesign.com",
            "damilano.com",
            "linoperros.com",
            "zouk.co.in",
            // jewellery
            "caratlane.com",
            "bluestone.com",
            "tribeamrapali.com",
            "amama.in",
            "voylla.com",
        ]);

        let site_search = map(&[
            ("myntra.com", "https://www.myntra.com/{q}"),
            ("ajio.com", "https://www.ajio.com/search/?text={q}"),
            ("nykaafashion.com", "https://www.nykaafashion.com/search?q={q}"),
            ("tatacliq.com", "https://www.tatacliq.com/search/?text={q}"),
            ("flipkart.com", "https://www.flipkart.com/search?q={q}"),
            ("amazon.in", "https://www.amazon.in/s?k={q}"),
            ("zara.com", "https://www.zara.com/in/en/search?searchTerm={q}"),
            ("hm.com", "https://www2.hm.com/en_in/search-results.html?q={q}"),
            ("fablestreet.com", "https://www.fablestreet.com/search?q={q}"),
            ("thelabellife.com", "https://www.thelabellife.com/search?q={q}"),
            ("globaldesi.in", "https://globaldesi.in/catalogsearch/result/?q={q}"),
            ("andindia.com", "https://www.andindia.com/search?q={q}"),
            ("fabindia.com", "https://www.fabindia.com/search?q={q}"),
            ("wforwoman.com", "https://wforwoman.com/search?q={q}"),
            ("soch.com", "https://www.soch.com/catalogsearch/result/?q={q}"),
            ("aurelia.com", "https://shopforaurelia.com/search?q={q}"),
            ("houseofindya.com", "https://www.houseofindya.com/search?q={q}"),
            ("bunaai.com", "https://bunaai.com/search?q={q}"),
            ("kharakapas.com", "https://kharakapas.com/search?q={q}"),
            ("rawmango.com", "https://www.rawmango.com/search?q={q}"),
            ("goodearth.in", "https://www.goodearth.in/search?q={q}"),
            ("nicobar.com", "https://www.nicobar.com/search?q={q}"),
            ("jaypore.com", "https://www.jaypore.com/search?q={q}"),
            ("tjori.com", "https://www.tjori.com/search?q={q}"),
            ("suta.in", "https://www.suta.in/search?q={q}"),
            ("okhai.org", "https://okhai.org/search?q={q}"),
            ("the-souled-store.com", "https://www.thesouledstore.com/search?q={q}"),
            ("vegnonveg.com", "https://www.vegnonveg.com/search?q={q}"),
            ("superkicks.in", "https://superkicks.in/pages/search-results?q={q}"),
            ("capresebags.com", "https://www.capresebags.com/search?type=product&q={q}"),
            ("baggit.com", "https://baggit.com/search?q={q}"),
            ("lavieworld.com", "https://www.lavieworld.com/search?q={q}"),
            ("hidesign.com", "https://www.hidesign.com/catalogsearch/result/?q={q}"),
            ("damilano.com", "https://www.damilano.com/catalogsearch/result/?q={q}"),
            ("linoperros.com", "https://www.lino-perros.com/search?q={q}"),
            ("zouk.co.in", "https://zouk.co.in/search?q={q}"),
            ("caratlane.com", "https://www.caratlane.com/search?q={q}"),
            ("bluestone.com", "https://www.bluestone.com/search?q={q}"),
            ("tribeamrapali.com", "https://www.tribeamrapali.com/search?q={q}"),
            ("amama.in", "https://www.amama.in/search?q={q}"),
            ("voylla.com", "https://www.voylla.com/search?type=product&q={q}"),
        ]);

        let ecommerce_hints = [
            "product",
            "products",
            "/p/",
            "/dp/",
            "/item",
            "/catalog",
            "/shop",
            "/store",
            "/collections",
            "/search",
            "/category",
            "?q=",
            "/products/",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();

        let mut category_keywords = BTreeMap::new();
        for (category, words) in [
            (Category::Bag, &["bag", "handbag", "crossbody", "sling", "tote", "satchel"][..]),
            (Category::Earrings, &["earring", "earrings", "jhumka", "studs", "hoops"][..]),
            (Category::Necklace, &["necklace", "pendant", "choker", "jewellery", "jewelry"][..]),
            (Category::Belt, &["belt", "waist belt", "skinny belt"][..]),
            (Category::Jeans, &["jeans", "denim"][..]),
            (Category::Trousers, &["trousers", "pants", "chinos"][..]),
            (Category::Skirt, &["skirt", "midi skirt", "mini skirt", "a-line"][..]),
            (Category::Shirt, &["shirt", "shirts"][..]),
            (Category::Tshirt, &["tshirt", "t-shirt", "tee"][..]),
            (Category::Kurta, &["kurta", "kurti"][..]),
            (Category::Dress, &["dress", "gown"][..]),
            (Category::Saree, &["saree", "sari"][..]),
        ] {
            category_keywords.insert(category, words.iter().map(|w| (*w).to_owned()).collect());
        }

        let core = ["myntra.com", "ajio.com", "nykaafashion.com", "tatacliq.com"];
        let jewellery = [
            "nykaafashion.com",
            "ajio.com",
            "myntra.com",
            "tatacliq.com",
            "jaypore.com",
            "tjori.com",
            "caratlane.com",
            "bluestone.com",
            "tribeamrapali.com",
            "amama.in",
            "voylla.com",
        ];
        let mut category_allowed = HashMap::new();
        for (category, extra) in [
            (Category::Belt, &["hm.com", "zara.com", "thelabellife.com", "fablestreet.com"][..]),
            (
                Category::Bag,
                &[
                    "zara.com",
                    "hm.com",
                    "thelabellife.com",
                    "capresebags.com",
                    "baggit.com",
                    "lavieworld.com",
                    "hidesign.com",
                    "damilano.com",
                    "linoperros.com",
                    "zouk.co.in",
                ][..],
            ),
            (Category::Jeans, &["zara.com", "hm.com"][..]),
            (
                Category::Trousers,
                &["zara.com", "hm.com", "fablestreet.com", "andindia.com", "globaldesi.in"][..],
            ),
            (Category::Skirt, &["zara.com", "hm.com", "thelabellife.com"][..]),
            (Category::Shirt, &["zara.com", "hm.com", "fablestreet.com"][..]),
            (Category::Tshirt, &["zara.com", "hm.com", "the-souled-store.com"][..]),
            (
                Category::Kurta,
                &["fabindia.com", "wforwoman.com", "soch.com", "aurelia.com"][..],
            ),
            (Category::Dress, &["zara.com", "hm.com", "thelabellife.com", "andindia.com"][..]),
            (
                Category::Saree,
                &["jaypore.com", "tjori.com", "suta.in", "okhai.org"][..],
            ),
        ] {
            let domains: BTreeSet<String> = core
                .iter()
                .chain(extra.iter())
                .map(|d| (*d).to_owned())
                .collect();
            category_allowed.insert(category, domains);
        }
        for category in [Category::Earrings, Category::Necklace] {
            category_allowed.insert(category, jewellery.iter().map(|d| (*d).to_owned()).collect());
        }

        const PRODUCT_LD: &str = "\"@type\":\"Product\"";
        let positive_markers = markers(&[
            ("nykaafashion.com", &[PRODUCT_LD, "product-card", "/p/"]),
            ("nicobar.com", &[PRODUCT_LD, "product-grid", "/products/"]),
            ("myntra.com", &["product-base", "results-base", PRODUCT_LD]),
            ("ajio.com", &[PRODUCT_LD, "prod-name", "/p/"]),
            ("tatacliq.com", &[PRODUCT_LD, "plp", "/product/"]),
            ("zara.com", &["product", PRODUCT_LD, "/search?searchTerm="]),
            ("hm.com", &["product-item", PRODUCT_LD]),
            ("caratlane.com", &["product-card", PRODUCT_LD]),
            ("bluestone.com", &["product-card", PRODUCT_LD]),
            ("capresebags.com", &["product-grid", PRODUCT_LD]),
            ("baggit.com", &["product-grid", PRODUCT_LD]),
            ("lavieworld.com", &["product-grid", PRODUCT_LD]),
            ("hidesign.com", &["product-list", PRODUCT_LD]),
            ("damilano.com", &["catalog-product", PRODUCT_LD]),
            ("linoperros.com", &["product-grid", PRODUCT_LD]),
            ("zouk.co.in", &["product-grid", PRODUCT_LD]),
            ("tribeamrapali.com", &["product-grid", PRODUCT_LD]),
            ("amama.in", &["product-grid", PRODUCT_LD]),
            ("voylla.com", &["product-grid", PRODUCT_LD]),
        ]);

        let no_result_markers = markers(&[
            ("nykaafashion.com", &["no results", "did not match any products"]),
            ("nicobar.com", &["no products", "no results"]),
            ("myntra.com", &["no results found"]),
            ("ajio.com", &["no results"]),
            ("tatacliq.com", &["0 results", "no products"]),
        ]);

        let fallback_sites = [
            ("Myntra", "https://www.myntra.com/{q}"),
            ("AJIO", "https://www.ajio.com/search/?text={q}"),
            ("Nykaa Fashion", "https://www.nykaafashion.com/search?q={q}"),
            ("Tata CLiQ", "https://www.tatacliq.com/search/?text={q}"),
            ("FableStreet", "https://www.fablestreet.com/search?q={q}"),
            ("The Label Life", "https://www.thelabellife.com/search?q={q}"),
            ("Jaypore", "https://www.jaypore.com/search?q={q}"),
            ("Okhai", "https://okhai.org/search?q={q}"),
            ("Suta", "https://www.suta.in/search?q={q}"),
            ("Nicobar", "https://www.nicobar.com/search?q={q}"),
        ]
        .iter()
        .map(|(name, template)| FallbackSite {
            name: (*name).to_owned(),
            template: (*template).to_owned(),
        })
        .collect();

        let display_names = map(&[
            ("nykaafashion.com", "Nykaa Fashion"),
            ("tatacliq.com", "Tata CLiQ"),
            ("hm.com", "H&M"),
        ]);

        Self {
            mainstream,
            indian_brands,
            blocked,
            ecommerce_hints,
            category_keywords,
            category_allowed,
            site_search,
            positive_markers,
            no_result_markers,
            fallback_sites,
            display_names,
        }
    }

    /// Keywords for a category, empty if the category is unknown to this catalog.
    pub fn keywords(&self, category: Category) -> &[String] {
        self.category_keywords
            .get(&category)
            .map_or(&[], Vec::as_slice)
    }

    /// The allow-list for a category, if it has one.
    pub fn allowed_domains(&self, category: Category) -> Option<&BTreeSet<String>> {
        self.category_allowed.get(&category)
    }

    /// Fill the domain's site-search template with a form-encoded query.
    pub fn site_search_url(&self, domain: &str, query: &str) -> Option<String> {
        self.site_search
            .get(domain)
            .map(|template| fill_template(template, query))
    }

    pub fn positive_markers(&self, domain: &str) -> &[String] {
        self.positive_markers.get(domain).map_or(&[], Vec::as_slice)
    }

    pub fn no_result_markers(&self, domain: &str) -> &[String] {
        self.no_result_markers.get(domain).map_or(&[], Vec::as_slice)
    }
}

/// Substitute a form-encoded query (`+` for spaces) into a `{q}` template.
pub fn fill_template(template: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    template.replace("{q}", &encoded)
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn markers(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    pairs
        .iter()
        .map(|(domain, list)| {
            (
                (*domain).to_owned(),
                list.iter().map(|m| (*m).to_owned()).collect(),
            )
        })
        .collect()
}
