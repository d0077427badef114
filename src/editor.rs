//! Typed, immutable edits on a [`Document`].
//!
//! Every operation borrows the current document and returns a new one.
//! Numeric fields go through [`to_number`], so bad input is stored as 0.
//! List operations with an out-of-range index return an unchanged copy.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::QuoteError;
use crate::format::{Numeric, to_number};
use crate::model::{Client, Document, LineItem};

// ==========================================
// Field groups
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    TaxId,
    Logo,
    Address1,
    Address2,
    Phone,
    Email,
    Website,
}

impl CompanyField {
    pub const ALL: [CompanyField; 8] = [
        CompanyField::Name,
        CompanyField::TaxId,
        CompanyField::Logo,
        CompanyField::Address1,
        CompanyField::Address2,
        CompanyField::Phone,
        CompanyField::Email,
        CompanyField::Website,
    ];
}

impl fmt::Display for CompanyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompanyField::Name => "Company Name",
            CompanyField::TaxId => "GST No",
            CompanyField::Logo => "Logo (path or URL)",
            CompanyField::Address1 => "Address 1",
            CompanyField::Address2 => "Address 2",
            CompanyField::Phone => "Phone",
            CompanyField::Email => "Email",
            CompanyField::Website => "Website",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotationField {
    Number,
    Date,
    Subject,
    ToCompany,
    ToAddress,
    Greeting,
    Message,
}

impl QuotationField {
    pub const ALL: [QuotationField; 7] = [
        QuotationField::Number,
        QuotationField::Date,
        QuotationField::Subject,
        QuotationField::ToCompany,
        QuotationField::ToAddress,
        QuotationField::Greeting,
        QuotationField::Message,
    ];
}

impl fmt::Display for QuotationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuotationField::Number => "Quotation No",
            QuotationField::Date => "Date",
            QuotationField::Subject => "Subject",
            QuotationField::ToCompany => "To (Company)",
            QuotationField::ToAddress => "To (Address)",
            QuotationField::Greeting => "Greeting",
            QuotationField::Message => "Opening Message",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Description,
    Quantity,
    Rate,
}

impl ItemField {
    pub const ALL: [ItemField; 4] = [
        ItemField::Name,
        ItemField::Description,
        ItemField::Quantity,
        ItemField::Rate,
    ];
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemField::Name => "Item name",
            ItemField::Description => "Description",
            ItemField::Quantity => "Qty",
            ItemField::Rate => "Rate",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeField {
    Discount,
    Shipping,
    TaxPercent,
}

impl ChargeField {
    pub const ALL: [ChargeField; 3] = [
        ChargeField::Discount,
        ChargeField::Shipping,
        ChargeField::TaxPercent,
    ];
}

impl fmt::Display for ChargeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChargeField::Discount => "Discount (₹)",
            ChargeField::Shipping => "Shipping/Other (₹)",
            ChargeField::TaxPercent => "GST %",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatoryField {
    Name,
    Designation,
    Mobile,
    Email,
}

impl SignatoryField {
    pub const ALL: [SignatoryField; 4] = [
        SignatoryField::Name,
        SignatoryField::Designation,
        SignatoryField::Mobile,
        SignatoryField::Email,
    ];
}

impl fmt::Display for SignatoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignatoryField::Name => "Name",
            SignatoryField::Designation => "Designation",
            SignatoryField::Mobile => "Mobile",
            SignatoryField::Email => "Email",
        })
    }
}

// ==========================================
// Dotted paths
// ==========================================

/// Any single editable value in a document.
///
/// Parses from dotted paths such as `company.name`, `items.2.qty` or
/// `charges.gstPercent`. Unknown paths fail at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Company(CompanyField),
    Quotation(QuotationField),
    Item(usize, ItemField),
    Charge(ChargeField),
    Term(usize),
    Signatory(SignatoryField),
}

impl FromStr for Field {
    type Err = QuoteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let unknown = || QuoteError::UnknownField(path.to_string());
        let parts: Vec<&str> = path.trim().split('.').collect();

        let field = match parts.as_slice() {
            ["company", key] => Field::Company(match *key {
                "name" => CompanyField::Name,
                "gst" | "taxId" | "tax_id" => CompanyField::TaxId,
                "logo" | "logoUrl" => CompanyField::Logo,
                "address1" => CompanyField::Address1,
                "address2" => CompanyField::Address2,
                "phone" => CompanyField::Phone,
                "email" => CompanyField::Email,
                "website" => CompanyField::Website,
                _ => return Err(unknown()),
            }),
            ["quotation", key] => Field::Quotation(match *key {
                "number" => QuotationField::Number,
                "date" => QuotationField::Date,
                "subject" => QuotationField::Subject,
                "toCompany" | "to_company" => QuotationField::ToCompany,
                "toAddress" | "to_address" => QuotationField::ToAddress,
                "greeting" => QuotationField::Greeting,
                "message" => QuotationField::Message,
                _ => return Err(unknown()),
            }),
            ["items", index, key] => {
                let index = index.parse().map_err(|_| unknown())?;
                Field::Item(
                    index,
                    match *key {
                        "name" => ItemField::Name,
                        "description" => ItemField::Description,
                        "qty" | "quantity" => ItemField::Quantity,
                        "rate" => ItemField::Rate,
                        _ => return Err(unknown()),
                    },
                )
            }
            ["charges", key] => Field::Charge(match *key {
                "discount" => ChargeField::Discount,
                "shipping" => ChargeField::Shipping,
                "gstPercent" | "taxPercent" | "tax_percent" => ChargeField::TaxPercent,
                _ => return Err(unknown()),
            }),
            ["terms", index] => Field::Term(index.parse().map_err(|_| unknown())?),
            ["signatory", key] => Field::Signatory(match *key {
                "name" => SignatoryField::Name,
                "designation" => SignatoryField::Designation,
                "mobile" => SignatoryField::Mobile,
                "email" => SignatoryField::Email,
                _ => return Err(unknown()),
            }),
            _ => return Err(unknown()),
        };
        Ok(field)
    }
}

/// Parses a `path=value` assignment from the command line.
pub fn parse_assignment(input: &str) -> Result<(Field, String), QuoteError> {
    let (path, value) = input
        .split_once('=')
        .ok_or_else(|| QuoteError::InvalidAssignment(input.to_string()))?;
    Ok((path.parse()?, value.to_string()))
}

// ==========================================
// Updates
// ==========================================

impl Document {
    pub fn with_field(&self, field: &Field, value: &str) -> Document {
        match *field {
            Field::Company(f) => self.with_company(f, value),
            Field::Quotation(f) => self.with_quotation(f, value),
            Field::Item(index, f) => self.with_item(index, f, value),
            Field::Charge(f) => self.with_charge(f, value),
            Field::Term(index) => self.with_term(index, value),
            Field::Signatory(f) => self.with_signatory(f, value),
        }
    }

    pub fn with_company(&self, field: CompanyField, value: &str) -> Document {
        let mut next = self.clone();
        let c = &mut next.company;
        let slot = match field {
            CompanyField::Name => &mut c.name,
            CompanyField::TaxId => &mut c.tax_id,
            CompanyField::Logo => &mut c.logo,
            CompanyField::Address1 => &mut c.address1,
            CompanyField::Address2 => &mut c.address2,
            CompanyField::Phone => &mut c.phone,
            CompanyField::Email => &mut c.email,
            CompanyField::Website => &mut c.website,
        };
        *slot = value.to_string();
        next
    }

    pub fn with_quotation(&self, field: QuotationField, value: &str) -> Document {
        let mut next = self.clone();
        let q = &mut next.quotation;
        let slot = match field {
            QuotationField::Number => &mut q.number,
            QuotationField::Date => &mut q.date,
            QuotationField::Subject => &mut q.subject,
            QuotationField::ToCompany => &mut q.to_company,
            QuotationField::ToAddress => &mut q.to_address,
            QuotationField::Greeting => &mut q.greeting,
            QuotationField::Message => &mut q.message,
        };
        *slot = value.to_string();
        next
    }

    pub fn with_signatory(&self, field: SignatoryField, value: &str) -> Document {
        let mut next = self.clone();
        let s = &mut next.signatory;
        let slot = match field {
            SignatoryField::Name => &mut s.name,
            SignatoryField::Designation => &mut s.designation,
            SignatoryField::Mobile => &mut s.mobile,
            SignatoryField::Email => &mut s.email,
        };
        *slot = value.to_string();
        next
    }

    pub fn with_charge<N: Numeric + ?Sized>(&self, field: ChargeField, value: &N) -> Document {
        let mut next = self.clone();
        let amount = to_number(value);
        match field {
            ChargeField::Discount => next.charges.discount = amount,
            ChargeField::Shipping => next.charges.shipping = amount,
            ChargeField::TaxPercent => next.charges.tax_percent = amount,
        }
        next
    }

    pub fn with_item(&self, index: usize, field: ItemField, value: &str) -> Document {
        let mut next = self.clone();
        let Some(item) = next.items.get_mut(index) else {
            debug!(index, "item edit out of range, ignored");
            return next;
        };
        match field {
            ItemField::Name => item.name = value.to_string(),
            ItemField::Description => item.description = value.to_string(),
            ItemField::Quantity => item.quantity = to_number(value),
            ItemField::Rate => item.rate = to_number(value),
        }
        next
    }

    pub fn with_item_added(&self) -> Document {
        let mut next = self.clone();
        next.items.push(LineItem::default());
        next
    }

    pub fn with_item_removed(&self, index: usize) -> Document {
        let mut next = self.clone();
        if index < next.items.len() {
            next.items.remove(index);
        }
        next
    }

    pub fn with_term(&self, index: usize, value: &str) -> Document {
        let mut next = self.clone();
        if let Some(term) = next.terms.get_mut(index) {
            *term = value.to_string();
        }
        next
    }

    pub fn with_term_added(&self) -> Document {
        let mut next = self.clone();
        next.terms.push(String::new());
        next
    }

    pub fn with_term_removed(&self, index: usize) -> Document {
        let mut next = self.clone();
        if index < next.terms.len() {
            next.terms.remove(index);
        }
        next
    }

    pub fn with_recipient(&self, client: &Client) -> Document {
        self.with_quotation(QuotationField::ToCompany, &client.name)
            .with_quotation(QuotationField::ToAddress, &client.address)
    }

    /// Fresh quotation number and today's date.
    pub fn with_new_number(&self, prefix: &str, today: NaiveDate) -> Document {
        let number = quotation_number(prefix, today, random_suffix());
        self.with_quotation(QuotationField::Number, &number)
            .with_quotation(QuotationField::Date, &format_date(today))
    }
}

// ==========================================
// Numbering
// ==========================================

/// `PREFIX/YYYYMMDD/NNN`
pub fn quotation_number(prefix: &str, date: NaiveDate, suffix: u16) -> String {
    format!("{}/{}/{}", prefix.trim_end_matches('/'), date.format("%Y%m%d"), suffix)
}

/// Three-digit suffix in 100..=999.
pub fn random_suffix() -> u16 {
    rand::random_range(100..=999)
}

/// `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
