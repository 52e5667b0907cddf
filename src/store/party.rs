use serde::{Deserialize, Serialize};

pub(crate) fn default_payment_term() -> String {
    "30 days".to_string()
}

/// A billable client entity, keyed by id in parties.toml
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Party {
    pub company_name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub vat_number: Option<String>,
    #[serde(default = "default_payment_term")]
    pub payment_term: String,
}
