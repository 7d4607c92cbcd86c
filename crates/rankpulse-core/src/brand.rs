//! Brand-name detection from a site's domain or property URL.
//!
//! Derivation is a chain of small heuristic stages. Each stage is a plain
//! function so it can be tested on its own; false positives and negatives
//! are accepted.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Lowercase substrings that mark a keyword as a search for the site's brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandVariations(BTreeSet<String>);

impl BrandVariations {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, variation: &str) -> bool {
        self.0.contains(variation)
    }
}

impl<S: AsRef<str>> FromIterator<S> for BrandVariations {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

const MIN_VARIATION_LEN: usize = 3;

/// Suffixes stripped repeatedly from the host (`acme.co.in` → `acme`).
const TLD_SUFFIXES: &[&str] = &[".com", ".in", ".org", ".net", ".co"];

/// Generic business words often glued onto a brand, longest first.
const BUSINESS_SUFFIXES: &[&str] = &[
    "servicecenter",
    "servicecentre",
    "solutions",
    "services",
    "service",
    "digital",
    "online",
    "agency",
    "studio",
    "india",
    "media",
    "group",
    "tech",
    "hq",
];

static FRAGMENT_SPLIT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]{3,}?)(soft|labs|hub|cloud|works|data|ify|ly|io|ai|app)$").ok()
});

static FIRST_SYLLABLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^aeiouy]*[aeiouy]+[^aeiouy]").ok());

/// Reduce a site name or URL to its bare brand label.
///
/// Handles `sc-domain:` properties, schemes, `www.`, paths, ports and the
/// common TLDs. Subdomains are dropped; when no known TLD was present the
/// last dotted label is treated as an unknown TLD.
pub fn bare_domain(site: &str) -> String {
    let raw = site.trim().to_lowercase();
    let raw = raw.strip_prefix("sc-domain:").unwrap_or(&raw);

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    // `Url` hands back punycode for internationalized hosts; keep the
    // Unicode form the user typed instead.
    let host = if raw.is_ascii() {
        Url::parse(&candidate)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| manual_host(raw))
    } else {
        manual_host(raw)
    };

    let mut host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    let mut stripped_tld = false;
    while let Some(tld) = TLD_SUFFIXES
        .iter()
        .find(|tld| host.len() > tld.len() && host.ends_with(*tld))
    {
        host.truncate(host.len() - tld.len());
        stripped_tld = true;
    }

    let mut labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if !stripped_tld && labels.len() > 1 {
        labels.pop();
    }
    labels.last().map(|l| l.to_string()).unwrap_or_default()
}

fn manual_host(raw: &str) -> String {
    let after_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let host = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    host.split(':').next().unwrap_or_default().trim().to_string()
}

/// Words of a hyphenated, underscored or spaced name, plus the joined forms.
///
/// Returns nothing for a single-word name.
pub fn word_variations(domain: &str) -> Vec<String> {
    let words: Vec<&str> = domain
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() < 2 {
        return Vec::new();
    }
    let mut out: Vec<String> = words
        .iter()
        .filter(|w| w.chars().count() >= MIN_VARIATION_LEN)
        .map(|w| w.to_string())
        .collect();
    out.push(words.join(" "));
    out.push(words.concat());
    out
}

/// Brand stems hidden in a single long token (`acmeservices` → `acme`).
pub fn suffix_variations(token: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut stem = token;

    if let Some(suffix) = BUSINESS_SUFFIXES
        .iter()
        .find(|s| token.ends_with(*s) && token.len() >= s.len() + MIN_VARIATION_LEN)
    {
        stem = &token[..token.len() - suffix.len()];
        out.push(stem.to_string());
        out.push(format!("{stem} {suffix}"));
    }

    out.extend(fragment_variations(stem));
    out
}

/// Split a trailing tech fragment off a stem (`acmesoft` → `acme soft`, `acme`).
pub fn fragment_variations(stem: &str) -> Vec<String> {
    let Some(re) = FRAGMENT_SPLIT.as_ref() else {
        return Vec::new();
    };
    match re.captures(stem) {
        Some(caps) => {
            let head = &caps[1];
            vec![format!("{head} {}", &caps[2]), head.to_string()]
        }
        None => Vec::new(),
    }
}

/// Leading consonants, the first vowel run and the consonant closing it.
pub fn syllable_variation(token: &str) -> Option<String> {
    let re = FIRST_SYLLABLE.as_ref()?;
    let syllable = re.find(token)?.as_str();
    (syllable.chars().count() >= MIN_VARIATION_LEN && syllable.len() < token.len())
        .then(|| syllable.to_string())
}

/// Derive the set of brand variations for a site name or property URL.
pub fn derive_brand_variations(site_name_or_url: &str) -> BrandVariations {
    let domain = bare_domain(site_name_or_url);
    if domain.is_empty() {
        return BrandVariations::default();
    }

    let mut candidates = vec![domain.clone()];
    // Punycode labels carry no readable stems to split.
    if domain.starts_with("xn--") {
        return candidates.into_iter().collect();
    }
    let words = word_variations(&domain);
    if !words.is_empty() {
        candidates.extend(words);
    } else if domain.chars().count() > 6 {
        let stems = suffix_variations(&domain);
        if stems.is_empty() {
            candidates.extend(syllable_variation(&domain));
        } else {
            candidates.extend(stems);
        }
    }

    candidates
        .into_iter()
        .filter(|c| c.chars().count() >= MIN_VARIATION_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BrandVariations {
        values.iter().collect()
    }

    #[test]
    fn bare_domain_strips_scheme_www_path_and_tld() {
        assert_eq!(bare_domain("https://www.acme.com/blog?x=1"), "acme");
        assert_eq!(bare_domain("http://acme.org:8080/"), "acme");
        assert_eq!(bare_domain("ACME.net"), "acme");
    }

    #[test]
    fn bare_domain_handles_search_console_properties() {
        assert_eq!(bare_domain("sc-domain:acme-widgets.co.in"), "acme-widgets");
    }

    #[test]
    fn bare_domain_drops_subdomains_and_unknown_tlds() {
        assert_eq!(bare_domain("https://blog.acme.com"), "acme");
        assert_eq!(bare_domain("acme.io"), "acme");
        assert_eq!(bare_domain("shop.acme.io"), "acme");
    }

    #[test]
    fn bare_domain_accepts_plain_site_names() {
        assert_eq!(bare_domain("Acme Corp"), "acme corp");
        assert_eq!(bare_domain(""), "");
    }

    #[test]
    fn bare_domain_keeps_internationalized_hosts_readable() {
        assert_eq!(bare_domain("https://café.com"), "café");
        assert_eq!(bare_domain("sc-domain:www.Café.co.in"), "café");
        assert_eq!(bare_domain("https://münchen-reisen.de/angebote"), "münchen-reisen");
    }

    #[test]
    fn word_variations_keep_long_words_and_joined_forms() {
        assert_eq!(
            word_variations("go-acme-widgets"),
            vec!["acme", "widgets", "go acme widgets", "goacmewidgets"]
        );
        assert!(word_variations("acme").is_empty());
    }

    #[test]
    fn suffix_variations_strip_business_words() {
        assert_eq!(
            suffix_variations("acmeservices"),
            vec!["acme", "acme services"]
        );
        assert_eq!(suffix_variations("acmeservicecenter")[0], "acme");
    }

    #[test]
    fn suffix_variations_require_a_real_stem() {
        assert!(suffix_variations("xxmedia").is_empty());
    }

    #[test]
    fn fragment_split_reinserts_space() {
        assert_eq!(fragment_variations("acmesoft"), vec!["acme soft", "acme"]);
        assert_eq!(fragment_variations("spotify"), vec!["spot ify", "spot"]);
        assert!(fragment_variations("acme").is_empty());
    }

    #[test]
    fn syllable_fallback() {
        assert_eq!(syllable_variation("strawberry").as_deref(), Some("straw"));
        assert_eq!(syllable_variation("oracle"), None);
    }

    #[test]
    fn derive_short_domain_is_just_the_name() {
        assert_eq!(derive_brand_variations("https://www.acme.com/"), set(&["acme"]));
    }

    #[test]
    fn derive_multi_word_domain() {
        assert_eq!(
            derive_brand_variations("sc-domain:acme-widgets.com"),
            set(&["acme", "widgets", "acme widgets", "acmewidgets", "acme-widgets"])
        );
    }

    #[test]
    fn derive_suffixed_domain() {
        assert_eq!(
            derive_brand_variations("acmeservices.in"),
            set(&["acmeservices", "acme", "acme services"])
        );
        assert_eq!(
            derive_brand_variations("acmesoft.io"),
            set(&["acmesoft", "acme soft", "acme"])
        );
    }

    #[test]
    fn derive_uses_syllable_when_nothing_else_applies() {
        assert_eq!(
            derive_brand_variations("strawberry.net"),
            set(&["strawberry", "straw"])
        );
    }

    #[test]
    fn derive_internationalized_domain_uses_the_unicode_name() {
        let variations = derive_brand_variations("https://café.com");
        assert_eq!(variations, set(&["café"]));
        assert!(!variations.contains("caf"));
        assert!(!variations.contains("dma"));
    }

    #[test]
    fn derive_punycode_domain_is_not_split() {
        assert_eq!(
            derive_brand_variations("https://xn--caf-dma.com"),
            set(&["xn--caf-dma"])
        );
    }

    #[test]
    fn derive_empty_input_yields_nothing() {
        assert!(derive_brand_variations("   ").is_empty());
    }

    #[test]
    fn from_iter_lowercases_and_drops_blanks() {
        let variations: BrandVariations = ["  Acme ", "", "ACME"].into_iter().collect();
        assert_eq!(variations.len(), 1);
        assert!(variations.contains("acme"));
    }
}
