use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::party::default_payment_term;

fn default_unit() -> String {
    "days".to_string()
}

/// One billable row on an invoice
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LineItem {
    pub description: String,
    pub rate: f64,
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Items sharing a group render together under one heading
    #[serde(default)]
    pub group: Option<String>,
}

impl LineItem {
    pub fn amount(&self) -> f64 {
        self.rate * self.quantity
    }
}

/// A persisted invoice record. Line items are nested in the record,
/// so deleting an invoice always takes its items with it.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Invoice {
    pub number: String,
    pub date: NaiveDate,
    /// Party id from parties.toml
    pub party: String,
    #[serde(default = "default_payment_term")]
    pub payment_term: String,
    #[serde(default)]
    pub drive_file_id: Option<String>,
    #[serde(default)]
    pub drive_file_url: Option<String>,
    #[serde(default)]
    pub drive_folder_id: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Invoice {
    pub fn total(&self) -> f64 {
        self.line_items.iter().map(LineItem::amount).sum()
    }
}

/// All invoices, persisted as invoices.toml
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Ledger {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl Ledger {
    pub fn find(&self, number: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.number == number)
    }

    pub fn find_mut(&mut self, number: &str) -> Option<&mut Invoice> {
        self.invoices.iter_mut().find(|i| i.number == number)
    }

    pub fn numbers(&self) -> Vec<String> {
        self.invoices.iter().map(|i| i.number.clone()).collect()
    }
}
