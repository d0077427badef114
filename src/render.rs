//! Print rendition of a quotation.
//!
//! `PrintDocument::compose` turns a [`Document`] into a tree of bands and
//! pages with every amount already formatted. The tree is fed through a tera
//! template that emits Typst source, and `typst` turns that into a PDF.
//!
//! Layout contract for any template:
//! - header and footer bands are drawn on every physical page, and the body
//!   is inset by their heights so nothing overlaps them;
//! - each print page starts a new physical page and repeats the table head;
//! - the closing block (totals, terms, signatory) must not be split.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Datelike, Local};
use serde::Serialize;
use slug::slugify;
use tera::{Context, Tera, Value};
use tracing::{debug, info, warn};

use crate::error::{QuoteError, Result};
use crate::format::{format_currency, format_quantity};
use crate::model::Document;
use crate::paginate::{Page, ROWS_PER_PAGE, paginate};
use crate::totals::Totals;

pub const TEMPLATE_NAME: &str = "quotation.tera";

// Embed template at compile time to ensure availability
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/quotation.tera");

// ==========================================
// Print tree
// ==========================================

/// Band and margin sizes in millimetres.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Geometry {
    pub header_mm: u32,
    pub footer_mm: u32,
    pub side_mm: u32,
}

pub const A4_BANDS: Geometry = Geometry {
    header_mm: 36,
    footer_mm: 26,
    side_mm: 12,
};

#[derive(Debug, Clone, Serialize)]
pub struct HeaderBand {
    pub company_name: String,
    pub tax_id: String,
    /// Only set when the logo reference is a file that exists.
    pub logo_path: Option<String>,
    pub number: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterBand {
    pub address1: String,
    pub address2: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpeningBlock {
    pub to_company: String,
    pub to_address: String,
    pub subject: String,
    pub greeting: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintRow {
    pub serial: usize,
    pub name: String,
    pub description: String,
    pub rate: String,
    pub quantity: String,
    pub total: String,
}

/// Everything that prints after the last table. Kept together on one page.
#[derive(Debug, Clone, Serialize)]
pub struct ClosingBlock {
    pub subtotal: String,
    /// Already negated, `-₹500.00` for a discount of 500.
    pub discount: Option<String>,
    pub shipping: Option<String>,
    pub taxable: String,
    pub tax_label: String,
    pub tax_amount: String,
    pub grand_total: String,
    pub amount_in_words: String,
    pub terms: Vec<String>,
    pub signatory_name: String,
    pub signatory_designation: String,
    pub signatory_mobile: String,
    pub signatory_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintPage {
    pub number: usize,
    pub opening: Option<OpeningBlock>,
    pub rows: Vec<PrintRow>,
    pub closing: Option<ClosingBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintDocument {
    pub geometry: Geometry,
    pub header: HeaderBand,
    pub pages: Vec<PrintPage>,
    pub footer: FooterBand,
}

impl PrintDocument {
    pub fn compose(doc: &Document) -> Self {
        let totals = Totals::compute(&doc.items, &doc.charges);
        let pages = paginate(&doc.items, ROWS_PER_PAGE)
            .iter()
            .map(|page| compose_page(page, doc, &totals))
            .collect::<Vec<_>>();
        debug!(pages = pages.len(), grand_total = totals.grand_total, "composed print tree");

        let c = &doc.company;
        PrintDocument {
            geometry: A4_BANDS,
            header: HeaderBand {
                company_name: c.name.clone(),
                tax_id: c.tax_id.clone(),
                logo_path: local_logo(&c.logo),
                number: doc.quotation.number.clone(),
                date: doc.quotation.date.clone(),
            },
            pages,
            footer: FooterBand {
                address1: c.address1.clone(),
                address2: c.address2.clone(),
                phone: c.phone.clone(),
                email: c.email.clone(),
                website: c.website.clone(),
            },
        }
    }
}

fn compose_page(page: &Page<'_>, doc: &Document, totals: &Totals) -> PrintPage {
    let q = &doc.quotation;
    let opening = page.is_first().then(|| OpeningBlock {
        to_company: q.to_company.clone(),
        to_address: q.to_address.clone(),
        subject: q.subject.clone(),
        greeting: q.greeting.clone(),
        message: q.message.clone(),
    });

    let rows = page
        .numbered_rows()
        .map(|(serial, item)| PrintRow {
            serial,
            name: item.name.clone(),
            description: item.description.clone(),
            rate: format_currency(&item.rate),
            quantity: format_quantity(&item.quantity),
            total: format_currency(&item.line_total()),
        })
        .collect();

    let closing = page.is_last().then(|| closing_block(doc, totals));

    PrintPage {
        number: page.index + 1,
        opening,
        rows,
        closing,
    }
}

fn closing_block(doc: &Document, t: &Totals) -> ClosingBlock {
    let s = &doc.signatory;
    let nonzero = |v: f64| (v != 0.0).then(|| format_currency(&v));
    ClosingBlock {
        subtotal: format_currency(&t.subtotal),
        discount: nonzero(-t.discount),
        shipping: nonzero(t.shipping),
        taxable: format_currency(&t.taxable),
        tax_label: format!("GST ({}%)", format_quantity(&t.tax_percent)),
        tax_amount: format_currency(&t.tax_amount),
        grand_total: format_currency(&t.grand_total),
        amount_in_words: t.amount_in_words(),
        terms: doc.terms.clone(),
        signatory_name: s.name.clone(),
        signatory_designation: s.designation.clone(),
        signatory_mobile: s.mobile.clone(),
        signatory_email: s.email.clone(),
    }
}

fn local_logo(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.contains("://") {
        return None;
    }
    let path = Path::new(reference);
    if !path.is_file() {
        warn!(logo = reference, "logo file not found, using placeholder");
        return None;
    }
    fs::canonicalize(path)
        .ok()
        .map(|p| p.to_string_lossy().to_string())
}

// ==========================================
// Template rendering
// ==========================================

/// Tera filter: any value as a quoted Typst string literal.
fn typst_string(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(Value::String(out))
}

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Uses the template compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
        Ok(Self::with_filters(tera))
    }

    /// Loads `quotation.tera` from `template_dir`, writing the default first
    /// if the user has none.
    pub fn from_dir(template_dir: &Path) -> Result<Self> {
        fs::create_dir_all(template_dir).map_err(|e| QuoteError::io(template_dir, e))?;
        let template_path = template_dir.join(TEMPLATE_NAME);
        if !template_path.exists() {
            println!("✨ Initializing default template...");
            fs::write(&template_path, DEFAULT_TEMPLATE)
                .map_err(|e| QuoteError::io(&template_path, e))?;
        }
        let mut tera = Tera::default();
        tera.add_template_file(&template_path, Some(TEMPLATE_NAME))?;
        Ok(Self::with_filters(tera))
    }

    fn with_filters(mut tera: Tera) -> Self {
        tera.register_filter("typst", typst_string);
        Self { tera }
    }

    pub fn render(&self, print: &PrintDocument) -> Result<String> {
        let context = Context::from_serialize(print)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

// ==========================================
// Export
// ==========================================

#[derive(Debug, Clone)]
pub struct Exported {
    pub source: PathBuf,
    /// `None` when typst is missing or compilation failed.
    pub pdf: Option<PathBuf>,
}

/// Output file stem for a quotation number, e.g. `tains-q-20260309-417`.
pub fn file_stem(number: &str) -> String {
    let stem = slugify(number);
    if stem.is_empty() { "quotation".to_string() } else { stem }
}

/// Writes `output/{year}/{slug}.typ` and compiles it next to itself.
pub fn export(doc: &Document, renderer: &Renderer, output_root: &Path) -> Result<Exported> {
    let source = write_source(doc, renderer, output_root)?;
    let pdf = compile(&source);
    Ok(Exported { source, pdf })
}

pub fn write_source(doc: &Document, renderer: &Renderer, output_root: &Path) -> Result<PathBuf> {
    let print = PrintDocument::compose(doc);
    let rendered = renderer.render(&print)?;

    let output_dir = output_root.join(Local::now().year().to_string());
    fs::create_dir_all(&output_dir).map_err(|e| QuoteError::io(&output_dir, e))?;

    let typ_path = output_dir.join(format!("{}.typ", file_stem(&doc.quotation.number)));
    fs::write(&typ_path, rendered).map_err(|e| QuoteError::io(&typ_path, e))?;
    info!(path = %typ_path.display(), "wrote quotation source");
    Ok(typ_path)
}

fn typst_available() -> bool {
    Command::new("typst").arg("--version").output().is_ok()
}

fn compile(typ_path: &Path) -> Option<PathBuf> {
    if !typst_available() {
        warn!("typst not found on PATH");
        return None;
    }
    let pdf_path = typ_path.with_extension("pdf");
    // Root at / so absolute logo paths resolve.
    let status = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg("/")
        .arg(typ_path)
        .arg(&pdf_path)
        .status();
    match status {
        Ok(s) if s.success() => {
            info!(path = %pdf_path.display(), "compiled PDF");
            Some(pdf_path)
        }
        Ok(s) => {
            warn!(code = ?s.code(), "typst compile failed");
            None
        }
        Err(e) => {
            warn!(error = %e, "could not run typst");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn doc_with_items(n: usize) -> Document {
        let mut doc = Document::builtin().unwrap();
        doc.items = (0..n)
            .map(|i| LineItem {
                name: format!("Item {i}"),
                description: String::new(),
                quantity: 2.0,
                rate: 500.0,
            })
            .collect();
        doc
    }

    #[test]
    fn opening_on_first_page_closing_on_last() {
        let print = PrintDocument::compose(&doc_with_items(16));
        assert_eq!(print.pages.len(), 3);
        let openings: Vec<bool> = print.pages.iter().map(|p| p.opening.is_some()).collect();
        let closings: Vec<bool> = print.pages.iter().map(|p| p.closing.is_some()).collect();
        assert_eq!(openings, vec![true, false, false]);
        assert_eq!(closings, vec![false, false, true]);
        assert_eq!(print.pages[2].rows[0].serial, 15);
    }

    #[test]
    fn single_page_carries_both_blocks() {
        let print = PrintDocument::compose(&doc_with_items(0));
        assert_eq!(print.pages.len(), 1);
        assert!(print.pages[0].opening.is_some());
        assert!(print.pages[0].closing.is_some());
        assert!(print.pages[0].rows.is_empty());
    }

    #[test]
    fn closing_block_is_formatted() {
        let print = PrintDocument::compose(&doc_with_items(2));
        let closing = print.pages[0].closing.as_ref().unwrap();
        assert_eq!(closing.subtotal, "₹2,000.00");
        assert_eq!(closing.taxable, "₹2,000.00");
        assert_eq!(closing.tax_label, "GST (18%)");
        assert_eq!(closing.tax_amount, "₹360.00");
        assert_eq!(closing.grand_total, "₹2,360.00");
        assert_eq!(closing.amount_in_words, "Two Thousand Three Hundred Sixty Rupees Only");
        assert!(closing.discount.is_none());
        assert_eq!(print.pages[0].rows[1].total, "₹1,000.00");
        assert_eq!(print.pages[0].rows[1].quantity, "2");
    }

    #[test]
    fn closing_amounts_add_up_after_rounding() {
        let mut doc = doc_with_items(1);
        doc.items[0].quantity = 1.0;
        doc.items[0].rate = 191.25;
        let print = PrintDocument::compose(&doc);
        let closing = print.pages[0].closing.as_ref().unwrap();
        assert_eq!(closing.taxable, "₹191.25");
        assert_eq!(closing.tax_amount, "₹34.43");
        assert_eq!(closing.grand_total, "₹225.68");
    }

    #[test]
    fn discount_is_signed_once() {
        let mut doc = doc_with_items(2);
        doc.charges.discount = 500.0;
        let print = PrintDocument::compose(&doc);
        let closing = print.pages[0].closing.as_ref().unwrap();
        assert_eq!(closing.discount.as_deref(), Some("-₹500.00"));

        doc.charges.discount = -500.0;
        let print = PrintDocument::compose(&doc);
        let closing = print.pages[0].closing.as_ref().unwrap();
        assert_eq!(closing.discount.as_deref(), Some("₹500.00"));

        let source = Renderer::builtin().unwrap().render(&print).unwrap();
        assert!(source.contains("\"Discount\", \"₹500.00\","));
        assert!(!source.contains("--₹"));
    }

    #[test]
    fn remote_logo_falls_back_to_placeholder() {
        let print = PrintDocument::compose(&doc_with_items(1));
        assert!(print.header.logo_path.is_none());
    }

    #[test]
    fn typst_filter_escapes_quotes_and_backslashes() {
        let out = typst_string(&Value::String("Say \"hi\" \\ #bye\n".into()), &HashMap::new()).unwrap();
        assert_eq!(out, Value::String("\"Say \\\"hi\\\" \\\\ #bye\\n\"".into()));
        let num = typst_string(&serde_json::json!(15), &HashMap::new()).unwrap();
        assert_eq!(num, Value::String("\"15\"".into()));
    }

    #[test]
    fn rendered_source_keeps_closing_block_whole() {
        let renderer = Renderer::builtin().unwrap();
        let mut doc = doc_with_items(9);
        doc.quotation.to_company = "Globex \"North\"".into();
        let source = renderer.render(&PrintDocument::compose(&doc)).unwrap();

        assert_eq!(source.matches("table.header(").count(), 2);
        assert_eq!(source.matches("breakable: false").count(), 1);
        assert_eq!(source.matches("#pagebreak()").count(), 1);
        assert!(source.contains("\"Globex \\\"North\\\"\""));
        assert!(source.contains("margin: (top: 36mm, bottom: 26mm, x: 12mm)"));

        let closing_at = source.find("breakable: false").unwrap();
        let last_break = source.rfind("#pagebreak()").unwrap();
        assert!(closing_at > last_break);
    }

    #[test]
    fn file_stem_is_slugged() {
        assert_eq!(file_stem("TAINS/Q/20260309/417"), "tains-q-20260309-417");
        assert_eq!(file_stem("///"), "quotation");
    }
}
