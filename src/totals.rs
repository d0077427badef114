use serde::Serialize;

use crate::format::{amount_in_words, to_number};
use crate::model::{Charges, LineItem};

/// Amounts derived from the items and charges. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: f64,
    pub discount: f64,
    pub shipping: f64,
    /// Subtotal after discount and shipping, never below zero.
    pub taxable: f64,
    pub tax_percent: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
}

impl Totals {
    pub fn compute(items: &[LineItem], charges: &Charges) -> Self {
        let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
        let discount = to_number(&charges.discount);
        let shipping = to_number(&charges.shipping);
        let tax_percent = to_number(&charges.tax_percent);

        let taxable = (subtotal - discount + shipping).max(0.0);
        let tax_amount = taxable * tax_percent / 100.0;

        Self {
            subtotal,
            discount,
            shipping,
            taxable,
            tax_percent,
            tax_amount,
            grand_total: taxable + tax_amount,
        }
    }

    pub fn amount_in_words(&self) -> String {
        amount_in_words(&self.grand_total)
    }
}
