use std::fs;

use chrono::{Datelike, Local};
use tempfile::TempDir;

use quotation_maker::Document;
use quotation_maker::editor::{ItemField, parse_assignment};
use quotation_maker::render::{Renderer, write_source};

const DRAFT: &str = r#"
terms = ["Validity: 15 days", ""]

[company]
name = "Acme \"Prime\" Traders"
tax_id = "07ABCDE1234F1Z5"
logo = "https://example.com/logo.png"
phone = "+91 11 4000 0000"

[quotation]
number = "ACME/Q/20260110/512"
to_company = "Globex"
subject = "Networking gear"

[[items]]
name = "Switch 24-port"
qty = 2
rate = "1,500"

[charges]
discount = 500
tax_percent = 18
"#;

#[test]
fn draft_renders_to_typst_source() {
    let dir = TempDir::new().unwrap();
    let draft_path = dir.path().join("draft.toml");
    fs::write(&draft_path, DRAFT).unwrap();

    let doc = Document::load(&draft_path).unwrap().dated("10/01/2026");
    let doc = (0..9).fold(doc, |d, i| {
        d.with_item_added()
            .with_item(i + 1, ItemField::Name, &format!("Patch cord {i}"))
            .with_item(i + 1, ItemField::Rate, "150")
    });
    let (field, value) = parse_assignment("signatory.name=R. Sharma").unwrap();
    let doc = doc.with_field(&field, &value);

    let renderer = Renderer::builtin().unwrap();
    let output_root = dir.path().join("output");
    let source_path = write_source(&doc, &renderer, &output_root).unwrap();

    let expected = output_root
        .join(Local::now().year().to_string())
        .join("acme-q-20260110-512.typ");
    assert_eq!(source_path, expected);

    let source = fs::read_to_string(&source_path).unwrap();
    // 10 items over two pages
    assert_eq!(source.matches("table.header(").count(), 2);
    assert_eq!(source.matches("#pagebreak()").count(), 1);
    assert_eq!(source.matches("breakable: false").count(), 1);
    assert!(source.contains("\"Acme \\\"Prime\\\" Traders\""));
    assert!(source.contains("\"10/01/2026\""));
    assert!(source.contains("\"R. Sharma\""));
    assert!(source.contains("[10],"));
    assert!(source.contains("\"(empty)\""));
    // (3000 + 9 * 150 - 500) * 1.18
    assert!(source.contains("\"₹4,543.00\""));
    assert!(source.contains("Four Thousand Five Hundred Forty Three Rupees Only"));
}

#[test]
fn malformed_draft_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let draft_path = dir.path().join("broken.toml");
    fs::write(&draft_path, DRAFT.replace("[charges]", "[charges")).unwrap();

    let err = Document::load(&draft_path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}
