//! Category list normalization

use serde::Deserialize;

/// A category as the service may send it: either a bare slug or an
/// object carrying the slug alongside a display name and URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryRecord {
    Slug(String),
    Detailed {
        slug: String,
        #[serde(default)]
        #[allow(dead_code)]
        name: Option<String>,
    },
}

impl CategoryRecord {
    pub fn into_slug(self) -> String {
        match self {
            CategoryRecord::Slug(slug) => slug,
            CategoryRecord::Detailed { slug, .. } => slug,
        }
    }
}

/// Normalize a raw category list into slugs, dropping blanks and duplicates
/// while keeping the service's order.
pub fn normalize_categories(records: Vec<CategoryRecord>) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::with_capacity(records.len());
    for slug in records.into_iter().map(CategoryRecord::into_slug) {
        let slug = slug.trim().to_string();
        if !slug.is_empty() && !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    slugs
}

/// Human label for a slug: first letter upper-cased
pub fn category_label(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
