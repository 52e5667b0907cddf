use serde::{Deserialize, Serialize};

fn default_brand_name() -> String {
    "YOUR BRAND NAME".to_string()
}

fn default_legal_name() -> String {
    "YOUR LEGAL NAME".to_string()
}

fn default_vat_note() -> String {
    "VAT not applicable, Art. 293 B of the French Tax Code".to_string()
}

/// Singleton business profile stored in business.toml.
/// The file may be absent entirely; see `load_profile`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Profile {
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
    #[serde(default = "default_legal_name")]
    pub legal_name: String,
    #[serde(default)]
    pub siret: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default = "default_vat_note")]
    pub vat_note: String,
}
