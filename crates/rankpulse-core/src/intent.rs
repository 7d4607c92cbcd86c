//! Rule-based search intent classification.
//!
//! Each keyword is matched against fixed term tables in priority order:
//! Navigational, Transactional, Commercial, Informational. The first table
//! with a hit decides; a keyword matching nothing is Informational.
//!
//! Terms are matched as substrings of the whole normalized phrase, so "top"
//! also hits "laptop repair".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::brand::BrandVariations;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntentCategory {
    Navigational,
    Transactional,
    Commercial,
    Informational,
}

impl IntentCategory {
    /// All categories, highest priority first.
    pub const ALL: [IntentCategory; 4] = [
        IntentCategory::Navigational,
        IntentCategory::Transactional,
        IntentCategory::Commercial,
        IntentCategory::Informational,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IntentCategory::Navigational => "Navigational",
            IntentCategory::Transactional => "Transactional",
            IntentCategory::Commercial => "Commercial",
            IntentCategory::Informational => "Informational",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| CoreError::UnknownIntent(raw.to_string()))
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static NAVIGATIONAL_TERMS: &[&str] = &[
    "login",
    "sign in",
    "dashboard",
    "official site",
    "homepage",
    "customer support",
    "contact us",
];

static TRANSACTIONAL_TERMS: &[&str] = &[
    "buy",
    "purchase",
    "pricing",
    "price",
    "cost",
    "subscription",
    "order",
    "coupon",
    "discount",
    "free trial",
    "demo",
    "get started",
    "download",
    "book",
    "hire",
    "near me",
    "quote",
    "shop",
    "shopping",
    "delivery",
    "rent",
    "rental",
];

static COMMERCIAL_TERMS: &[&str] = &[
    "best",
    "top",
    "review",
    "reviews",
    "comparison",
    "compare",
    "vs",
    "alternative",
    "alternatives",
    "software",
    "tool",
    "tools",
    "solution",
    "platform",
    "services",
];

static INFORMATIONAL_TERMS: &[&str] = &[
    "how",
    "what",
    "why",
    "when",
    "guide",
    "tutorial",
    "tips",
    "examples",
    "checklist",
    "template",
    "meaning",
    "definition",
    "ideas",
];

/// Lowercase, drop punctuation, and collapse whitespace runs to one space.
///
/// Word characters (letters, digits, underscore) and whitespace survive;
/// everything else is removed without leaving a gap.
pub fn normalize(keyword: &str) -> String {
    let kept: String = keyword
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Assign a search intent to `keyword`.
///
/// Brand variations make a keyword Navigational ahead of every other rule.
/// Never fails: empty input is Informational.
pub fn classify(keyword: &str, brand_variations: &BrandVariations) -> IntentCategory {
    let normalized = normalize(keyword);
    if normalized.is_empty() {
        return IntentCategory::Informational;
    }

    let is_brand = brand_variations
        .iter()
        .any(|v| !v.is_empty() && normalized.contains(v));
    if is_brand || contains_any(&normalized, NAVIGATIONAL_TERMS) {
        return IntentCategory::Navigational;
    }
    if contains_any(&normalized, TRANSACTIONAL_TERMS) {
        return IntentCategory::Transactional;
    }
    if contains_any(&normalized, COMMERCIAL_TERMS) {
        return IntentCategory::Commercial;
    }
    if contains_any(&normalized, INFORMATIONAL_TERMS) {
        return IntentCategory::Informational;
    }
    IntentCategory::Informational
}

/// Count how many of `intents` fall in each category, in priority order.
pub fn intent_distribution<I>(intents: I) -> Vec<(IntentCategory, usize)>
where
    I: IntoIterator<Item = IntentCategory>,
{
    let mut counts = [0usize; 4];
    for intent in intents {
        counts[intent as usize] += 1;
    }
    IntentCategory::ALL.into_iter().zip(counts).collect()
}
