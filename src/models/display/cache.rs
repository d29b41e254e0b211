//! Cache entry display models for `cache status`

use serde::Serialize;
use tabled::Tabled;

use super::common::format_age;
use crate::cache::{CachePolicy, EntrySummary, ResourceKind};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CacheEntryDisplay {
    #[tabled(rename = "KEY")]
    pub key: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "AGE")]
    #[serde(skip)]
    pub age: String,

    #[tabled(skip)]
    pub age_secs: Option<u64>,

    #[tabled(rename = "FETCHING")]
    pub fetching: bool,

    #[tabled(rename = "OBSERVERS")]
    pub observers: usize,

    #[tabled(rename = "ERROR")]
    pub error: String,
}

impl From<&EntrySummary> for CacheEntryDisplay {
    fn from(entry: &EntrySummary) -> Self {
        Self {
            key: entry.key.clone(),
            status: entry.status.to_string(),
            age: entry.age.map(format_age).unwrap_or_else(|| "-".to_string()),
            age_secs: entry.age.map(|age| age.as_secs()),
            fetching: entry.fetching,
            observers: entry.observers,
            error: entry.error.clone().unwrap_or_default(),
        }
    }
}

/// Staleness and eviction windows per resource kind
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CachePolicyDisplay {
    #[tabled(rename = "RESOURCE")]
    pub resource: String,

    #[tabled(rename = "STALE AFTER")]
    pub stale_after: String,

    #[tabled(rename = "EVICT AFTER")]
    pub evict_after: String,
}

impl CachePolicyDisplay {
    pub fn rows(policy: &CachePolicy) -> Vec<Self> {
        ResourceKind::ALL
            .iter()
            .map(|kind| Self {
                resource: kind.to_string(),
                stale_after: format_age(policy.stale_time(*kind)),
                evict_after: format_age(policy.gc_time(*kind)),
            })
            .collect()
    }
}
