//! Terminal rendition of the print tree.

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

use crate::format::format_currency;
use crate::model::Document;
use crate::paginate::{ROWS_PER_PAGE, paginate};
use crate::render::{ClosingBlock, PrintDocument, PrintPage};
use crate::totals::Totals;

/// One line shown after every edit.
pub fn live_summary(doc: &Document) -> String {
    let totals = Totals::compute(&doc.items, &doc.charges);
    let pages = paginate(&doc.items, ROWS_PER_PAGE).len();
    format!(
        "🧾 {} item(s) | {} page(s) | Grand Total {} ({})",
        doc.items.len(),
        pages,
        format_currency(&totals.grand_total),
        totals.amount_in_words()
    )
}

/// The whole quotation, page by page, as it will print.
pub fn render_preview(print: &PrintDocument) -> String {
    let mut out = String::new();
    let h = &print.header;
    out.push_str(&format!(
        "\n=== {} (GST No: {}) | QUOTATION {} | Date: {} ===\n",
        h.company_name, h.tax_id, h.number, h.date
    ));

    for page in &print.pages {
        out.push_str(&format!("\n--- Page {} of {} ---\n", page.number, print.pages.len()));
        if let Some(opening) = &page.opening {
            out.push_str(&format!("To: {}\n", opening.to_company));
            if !opening.to_address.is_empty() {
                out.push_str(&format!("    {}\n", opening.to_address));
            }
            out.push_str(&format!("Subject: {}\n\n{}\n{}\n\n", opening.subject, opening.greeting, opening.message));
        }
        out.push_str(&format!("{}\n", items_table(page)));
        if let Some(closing) = &page.closing {
            out.push_str(&closing_text(closing));
        }
    }

    let f = &print.footer;
    out.push_str(&format!(
        "\n=== {} | {} | {} | {} | {} ===\n",
        f.address1, f.address2, f.phone, f.email, f.website
    ));
    out
}

fn items_table(page: &PrintPage) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("S. No"),
        Cell::new("Item Description"),
        Cell::new("Rate"),
        Cell::new("Qty"),
        Cell::new("Total"),
    ]);
    for row in &page.rows {
        let description = match (row.name.is_empty(), row.description.is_empty()) {
            (true, _) => Cell::new("Item name").fg(Color::DarkGrey),
            (false, true) => Cell::new(&row.name),
            (false, false) => Cell::new(format!("{}\n{}", row.name, row.description)),
        };
        table.add_row(vec![
            Cell::new(row.serial).set_alignment(CellAlignment::Center),
            description,
            Cell::new(&row.rate).set_alignment(CellAlignment::Right),
            Cell::new(&row.quantity).set_alignment(CellAlignment::Center),
            Cell::new(&row.total).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn closing_text(c: &ClosingBlock) -> String {
    let mut totals = Table::new();
    totals.add_row(vec![Cell::new("Sub Total"), Cell::new(&c.subtotal).set_alignment(CellAlignment::Right)]);
    if let Some(discount) = &c.discount {
        totals.add_row(vec![
            Cell::new("Discount"),
            Cell::new(discount).set_alignment(CellAlignment::Right),
        ]);
    }
    if let Some(shipping) = &c.shipping {
        totals.add_row(vec![Cell::new("Shipping/Other"), Cell::new(shipping).set_alignment(CellAlignment::Right)]);
    }
    totals.add_row(vec![Cell::new("Taxable"), Cell::new(&c.taxable).set_alignment(CellAlignment::Right)]);
    totals.add_row(vec![Cell::new(&c.tax_label), Cell::new(&c.tax_amount).set_alignment(CellAlignment::Right)]);
    totals.add_row(vec![
        Cell::new("Grand Total").add_attribute(Attribute::Bold),
        Cell::new(&c.grand_total)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
    ]);

    let mut out = format!("{totals}\nAmount in words: {}\n\nTerms:\n", c.amount_in_words);
    for (i, term) in c.terms.iter().enumerate() {
        let text = if term.is_empty() { "(empty)" } else { term.as_str() };
        out.push_str(&format!("  {}. {}\n", i + 1, text));
    }
    out.push_str(&format!(
        "\nBest regards,\n{}\n{}\nMobile: {}\nEmail: {}\n",
        c.signatory_name, c.signatory_designation, c.signatory_mobile, c.signatory_email
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_lists_every_page_once() {
        let mut doc = Document::builtin().unwrap();
        doc.items = [doc.items.clone(), doc.items.clone()].concat();
        let text = render_preview(&PrintDocument::compose(&doc));
        assert!(text.contains("--- Page 1 of 2 ---"));
        assert!(text.contains("--- Page 2 of 2 ---"));
        assert_eq!(text.matches("Grand Total").count(), 1);
        assert_eq!(text.matches("Subject:").count(), 1);
        assert!(text.contains("  4. Prices quoted are as per quantity mentioned"));
    }

    #[test]
    fn summary_reports_totals_and_pages() {
        let doc = Document::builtin().unwrap();
        let line = live_summary(&doc);
        assert!(line.contains("4 item(s)"));
        assert!(line.contains("1 page(s)"));
        assert!(line.contains("₹27,35,535.00"));
    }
}
