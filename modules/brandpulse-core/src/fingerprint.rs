use brandpulse_common::AnalysisQuery;

/// Canonical identity of an analysis query: the trimmed, lowercased
/// `(brand, location, category)` triple. Both rendered forms, the cache
/// key and the natural-language dedup question, derive from the same
/// normalized fields, so casing and whitespace variants of one query
/// always collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    brand: String,
    location: String,
    category: String,
}

impl Fingerprint {
    pub fn new(query: &AnalysisQuery) -> Self {
        Self {
            brand: normalize(&query.brand),
            location: normalize(&query.location),
            category: normalize(&query.category),
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Colon-joined form used as the result cache key.
    pub fn cache_key(&self) -> String {
        format!(
            "brand_analysis:{}:{}:{}",
            self.brand, self.location, self.category
        )
    }

    /// Sentence form used as the ledger dedup key and as the question
    /// submitted to the backend.
    pub fn question(&self) -> String {
        format!(
            "analyze the brand {} {} {}",
            self.brand, self.location, self.category
        )
    }
}

fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}
