use std::path::Path;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{QuoteError, Result};
use crate::format::to_number;

/// Numbers in drafts may be written as numbers or strings ("1,200.50");
/// anything unreadable becomes 0, the same as a form field.
fn coerced<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => to_number(&n),
        Raw::Text(s) => to_number(s.as_str()),
        Raw::Other(_) => 0.0,
    })
}

/// Seed document written to the data directory on first run.
pub const DEFAULT_PROFILE: &str = include_str!("../profile.toml");

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Company {
    pub name: String,
    pub tax_id: String,
    pub logo: String, // local path or URL
    pub address1: String,
    pub address2: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct QuotationMeta {
    pub number: String,
    pub date: String, // free text, DD/MM/YYYY when generated
    pub subject: String,
    pub to_company: String,
    pub to_address: String,
    pub greeting: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    #[serde(alias = "qty", deserialize_with = "coerced")]
    pub quantity: f64,
    #[serde(deserialize_with = "coerced")]
    pub rate: f64,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            quantity: 1.0,
            rate: 0.0,
        }
    }
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        to_number(&self.quantity) * to_number(&self.rate)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Charges {
    #[serde(deserialize_with = "coerced")]
    pub discount: f64,
    #[serde(deserialize_with = "coerced")]
    pub shipping: f64,
    #[serde(alias = "gst_percent", deserialize_with = "coerced")]
    pub tax_percent: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Signatory {
    pub name: String,
    pub designation: String,
    pub mobile: String,
    pub email: String,
}

/// The whole quotation being edited.
///
/// Owned by one editing session and replaced wholesale on every edit
/// (see `editor`). Only ever read from disk, as a seed profile or a draft.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Document {
    pub company: Company,
    pub quotation: QuotationMeta,
    pub items: Vec<LineItem>,
    pub charges: Charges,
    pub terms: Vec<String>,
    pub signatory: Signatory,
}

impl Document {
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| QuoteError::TomlParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads a draft or profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QuoteError::io(path, e))?;
        Self::from_toml(&content, path)
    }

    /// The built-in seed, used when no profile exists yet.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_PROFILE, Path::new("profile.toml"))
    }

    /// Fills the date with `today` when the seed leaves it blank.
    pub fn dated(mut self, today: &str) -> Self {
        if self.quotation.date.trim().is_empty() {
            self.quotation.date = today.to_string();
        }
        self
    }
}

/// A saved recipient, kept in the client book.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Client {
    pub name: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profile_parses() {
        let doc = Document::builtin().unwrap();
        assert_eq!(doc.company.name, "TECH AD India Network Solutions");
        assert_eq!(doc.items.len(), 4);
        assert_eq!(doc.terms.len(), 4);
        assert_eq!(doc.charges.tax_percent, 18.0);
        assert!(doc.quotation.date.is_empty());
    }

    #[test]
    fn dated_only_fills_blank_dates() {
        let doc = Document::default().dated("01/02/2026");
        assert_eq!(doc.quotation.date, "01/02/2026");

        let mut kept = Document::default();
        kept.quotation.date = "15/08/2025".into();
        assert_eq!(kept.dated("01/02/2026").quotation.date, "15/08/2025");
    }

    #[test]
    fn partial_drafts_fall_back_to_defaults() {
        let doc = Document::from_toml(
            r#"
            [quotation]
            number = "Q-1"

            [[items]]
            name = "Cable"
            qty = 3
            rate = 120.5
            "#,
            Path::new("draft.toml"),
        )
        .unwrap();
        assert_eq!(doc.quotation.number, "Q-1");
        assert_eq!(doc.items[0].quantity, 3.0);
        assert_eq!(doc.items[0].line_total(), 361.5);
        assert!(doc.terms.is_empty());
    }

    #[test]
    fn draft_numbers_are_coerced() {
        let doc = Document::from_toml(
            r#"
            [[items]]
            qty = "abc"
            rate = "1,200.50"

            [[items]]
            qty = true
            rate = []

            [charges]
            discount = "ten"
            shipping = { amount = 40 }
            gst_percent = "18"
            "#,
            Path::new("draft.toml"),
        )
        .unwrap();
        assert_eq!(doc.items[0].quantity, 0.0);
        assert_eq!(doc.items[0].rate, 1200.5);
        assert_eq!(doc.items[1].quantity, 0.0);
        assert_eq!(doc.items[1].rate, 0.0);
        assert_eq!(doc.charges.shipping, 0.0);
        assert_eq!(doc.charges.discount, 0.0);
        assert_eq!(doc.charges.tax_percent, 18.0);
    }

    #[test]
    fn line_total_ignores_non_finite_values() {
        let item = LineItem {
            quantity: f64::NAN,
            rate: 10.0,
            ..LineItem::default()
        };
        assert_eq!(item.line_total(), 0.0);
    }
}
