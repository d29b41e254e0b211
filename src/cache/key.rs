//! Query keys identifying cached catalog reads

use std::fmt;

use serde::Serialize;

use crate::client::ListParams;

/// The kind of resource a query reads. Staleness and invalidation are
/// configured per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ProductList,
    Product,
    Categories,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::ProductList,
        ResourceKind::Product,
        ResourceKind::Categories,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::ProductList => "products",
            ResourceKind::Product => "product",
            ResourceKind::Categories => "categories",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural identity of a read.
///
/// Two keys are equal exactly when the reads they describe are the same
/// request, so each distinct combination of list parameters gets its own
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ProductList(ListParams),
    Product(u64),
    Categories,
}

impl QueryKey {
    pub fn products(params: &ListParams) -> Self {
        Self::from(params)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            QueryKey::ProductList(_) => ResourceKind::ProductList,
            QueryKey::Product(_) => ResourceKind::Product,
            QueryKey::Categories => ResourceKind::Categories,
        }
    }

    /// List parameters this key was built from, for product list keys
    #[allow(dead_code)]
    pub fn list_params(&self) -> Option<&ListParams> {
        match self {
            QueryKey::ProductList(params) => Some(params),
            _ => None,
        }
    }

    /// Short human-readable form used in logs and `cache status`
    pub fn label(&self) -> String {
        match self {
            QueryKey::ProductList(params) => {
                let mut label = format!("products limit={} skip={}", params.limit, params.skip);
                if !params.search.is_empty() {
                    label.push_str(&format!(" q={}", params.search));
                }
                if !params.category.is_empty() {
                    label.push_str(&format!(" category={}", params.category));
                }
                label
            }
            QueryKey::Product(id) => format!("product {}", id),
            QueryKey::Categories => "categories".to_string(),
        }
    }
}

impl From<&ListParams> for QueryKey {
    fn from(params: &ListParams) -> Self {
        QueryKey::ProductList(params.clone())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
