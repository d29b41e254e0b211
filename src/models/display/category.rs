//! Category display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::category_label;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CategoryDisplay {
    #[tabled(rename = "SLUG")]
    pub slug: String,

    #[tabled(rename = "NAME")]
    pub name: String,
}

impl From<&String> for CategoryDisplay {
    fn from(slug: &String) -> Self {
        Self {
            slug: slug.clone(),
            name: category_label(slug),
        }
    }
}
