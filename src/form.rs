//! Interactive editing session.
//!
//! Each prompt produces a new [`Document`] through the typed operations in
//! `editor`; the live summary is reprinted after every change. Esc inside a
//! sub-menu goes back to the main menu.

use std::fmt;

use chrono::Local;
use inquire::{Confirm, DateSelect, InquireError, Select, Text};
use tracing::{debug, info};

use crate::clients::ClientBook;
use crate::editor::{ChargeField, CompanyField, ItemField, QuotationField, SignatoryField, format_date};
use crate::error::Result;
use crate::format::{format_currency, format_quantity};
use crate::model::{Client, Document};
use crate::preview::{live_summary, render_preview};
use crate::render::{self, Exported, PrintDocument, Renderer};
use crate::settings::AppSettings;

const ADD_ITEM_OPT: &str = "➕ Add item";
const ADD_TERM_OPT: &str = "➕ Add term";
const BACK_OPT: &str = "⬅ Back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    Company,
    Quotation,
    Items,
    Charges,
    Terms,
    Signatory,
    PickClient,
    SaveClient,
    NewNumber,
    Preview,
    Export,
    Quit,
}

impl MainAction {
    const ALL: [MainAction; 12] = [
        MainAction::Company,
        MainAction::Quotation,
        MainAction::Items,
        MainAction::Charges,
        MainAction::Terms,
        MainAction::Signatory,
        MainAction::PickClient,
        MainAction::SaveClient,
        MainAction::NewNumber,
        MainAction::Preview,
        MainAction::Export,
        MainAction::Quit,
    ];
}

impl fmt::Display for MainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MainAction::Company => "🏢 Company",
            MainAction::Quotation => "📝 Quotation",
            MainAction::Items => "📦 Items",
            MainAction::Charges => "💰 Charges & Taxes",
            MainAction::Terms => "📜 Terms",
            MainAction::Signatory => "✍️  Signatory",
            MainAction::PickClient => "👥 Pick saved client",
            MainAction::SaveClient => "💾 Save recipient as client",
            MainAction::NewNumber => "🔢 New Number",
            MainAction::Preview => "👀 Preview",
            MainAction::Export => "🖨️  Print / Save PDF",
            MainAction::Quit => "🚪 Quit",
        })
    }
}

/// Maps Esc to `None` so sub-menus can fall back a level.
fn back_on_cancel<T>(answer: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub struct Session<'a> {
    doc: Document,
    settings: &'a AppSettings,
    clients: ClientBook,
}

impl<'a> Session<'a> {
    pub fn new(doc: Document, settings: &'a AppSettings) -> Self {
        Self {
            doc,
            settings,
            clients: ClientBook::in_dir(&settings.root()),
        }
    }

    fn replace(&mut self, next: Document) {
        if next != self.doc {
            debug!("document replaced");
        }
        self.doc = next;
        println!("{}", live_summary(&self.doc));
    }

    /// Runs the main menu until the user quits.
    pub fn run(&mut self) -> Result<()> {
        println!("\n--- Quotation Maker ---");
        println!("{}", live_summary(&self.doc));

        loop {
            let Some(action) =
                back_on_cancel(Select::new("What next?", MainAction::ALL.to_vec()).with_page_size(12).prompt())?
            else {
                return Ok(());
            };

            match action {
                MainAction::Company => self.edit_company()?,
                MainAction::Quotation => self.edit_quotation()?,
                MainAction::Items => self.edit_items()?,
                MainAction::Charges => self.edit_charges()?,
                MainAction::Terms => self.edit_terms()?,
                MainAction::Signatory => self.edit_signatory()?,
                MainAction::PickClient => self.pick_client()?,
                MainAction::SaveClient => self.save_client()?,
                MainAction::NewNumber => {
                    let next = self
                        .doc
                        .with_new_number(&self.settings.number_prefix, Local::now().date_naive());
                    println!("✅ Quotation No: {}", next.quotation.number);
                    self.replace(next);
                }
                MainAction::Preview => {
                    println!("{}", render_preview(&PrintDocument::compose(&self.doc)));
                }
                MainAction::Export => {
                    let exported = export_with_settings(&self.doc, self.settings)?;
                    report_export(&exported, true);
                }
                MainAction::Quit => {
                    let leave = Confirm::new("Quit? The quotation itself is not saved.")
                        .with_default(false)
                        .prompt()?;
                    if leave {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn edit_company(&mut self) -> Result<()> {
        while let Some(field) = back_on_cancel(Select::new("Company field:", CompanyField::ALL.to_vec()).prompt())? {
            let c = &self.doc.company;
            let current = match field {
                CompanyField::Name => &c.name,
                CompanyField::TaxId => &c.tax_id,
                CompanyField::Logo => &c.logo,
                CompanyField::Address1 => &c.address1,
                CompanyField::Address2 => &c.address2,
                CompanyField::Phone => &c.phone,
                CompanyField::Email => &c.email,
                CompanyField::Website => &c.website,
            };
            if let Some(value) = ask_text(&field.to_string(), current)? {
                let next = self.doc.with_company(field, &value);
                self.replace(next);
            }
        }
        Ok(())
    }

    fn edit_quotation(&mut self) -> Result<()> {
        while let Some(field) =
            back_on_cancel(Select::new("Quotation field:", QuotationField::ALL.to_vec()).prompt())?
        {
            let q = &self.doc.quotation;
            let current = match field {
                QuotationField::Number => &q.number,
                QuotationField::Date => &q.date,
                QuotationField::Subject => &q.subject,
                QuotationField::ToCompany => &q.to_company,
                QuotationField::ToAddress => &q.to_address,
                QuotationField::Greeting => &q.greeting,
                QuotationField::Message => &q.message,
            };
            let value = if field == QuotationField::Date {
                back_on_cancel(
                    DateSelect::new("Quotation Date:")
                        .with_default(Local::now().date_naive())
                        .prompt(),
                )?
                .map(format_date)
            } else {
                ask_text(&field.to_string(), current)?
            };
            if let Some(value) = value {
                let next = self.doc.with_quotation(field, &value);
                self.replace(next);
            }
        }
        Ok(())
    }

    fn edit_signatory(&mut self) -> Result<()> {
        while let Some(field) =
            back_on_cancel(Select::new("Signatory field:", SignatoryField::ALL.to_vec()).prompt())?
        {
            let s = &self.doc.signatory;
            let current = match field {
                SignatoryField::Name => &s.name,
                SignatoryField::Designation => &s.designation,
                SignatoryField::Mobile => &s.mobile,
                SignatoryField::Email => &s.email,
            };
            if let Some(value) = ask_text(&field.to_string(), current)? {
                let next = self.doc.with_signatory(field, &value);
                self.replace(next);
            }
        }
        Ok(())
    }

    fn edit_charges(&mut self) -> Result<()> {
        while let Some(field) = back_on_cancel(Select::new("Charge:", ChargeField::ALL.to_vec()).prompt())? {
            let ch = &self.doc.charges;
            let current = match field {
                ChargeField::Discount => ch.discount,
                ChargeField::Shipping => ch.shipping,
                ChargeField::TaxPercent => ch.tax_percent,
            };
            if let Some(value) = ask_text(&field.to_string(), &format_quantity(&current))? {
                let next = self.doc.with_charge(field, value.as_str());
                self.replace(next);
            }
        }
        Ok(())
    }

    fn edit_items(&mut self) -> Result<()> {
        loop {
            let mut options: Vec<String> = self
                .doc
                .items
                .iter()
                .enumerate()
                .map(|(i, it)| {
                    let name = if it.name.is_empty() { "(unnamed)" } else { it.name.as_str() };
                    format!("#{} {} | Line Total: {}", i + 1, name, format_currency(&it.line_total()))
                })
                .collect();
            options.push(ADD_ITEM_OPT.to_string());
            options.push(BACK_OPT.to_string());

            let Some(choice) = back_on_cancel(Select::new("Items:", options.clone()).with_page_size(10).prompt())?
            else {
                return Ok(());
            };
            if choice == BACK_OPT {
                return Ok(());
            }
            if choice == ADD_ITEM_OPT {
                let next = self.doc.with_item_added();
                self.replace(next);
                let index = self.doc.items.len() - 1;
                self.edit_item(index)?;
                continue;
            }
            if let Some(index) = options.iter().position(|o| *o == choice) {
                self.edit_item(index)?;
            }
        }
    }

    fn edit_item(&mut self, index: usize) -> Result<()> {
        const REMOVE_OPT: &str = "🗑  Remove";
        loop {
            let Some(item) = self.doc.items.get(index) else {
                return Ok(());
            };
            let mut options: Vec<String> = ItemField::ALL.iter().map(|f| f.to_string()).collect();
            options.push(REMOVE_OPT.to_string());
            options.push(BACK_OPT.to_string());

            let title = format!("Item #{}:", index + 1);
            let Some(choice) = back_on_cancel(Select::new(&title, options).prompt())? else {
                return Ok(());
            };
            if choice == BACK_OPT {
                return Ok(());
            }
            if choice == REMOVE_OPT {
                let next = self.doc.with_item_removed(index);
                self.replace(next);
                return Ok(());
            }
            let Some(field) = ItemField::ALL.into_iter().find(|f| f.to_string() == choice) else {
                continue;
            };
            let current = match field {
                ItemField::Name => item.name.clone(),
                ItemField::Description => item.description.clone(),
                ItemField::Quantity => format_quantity(&item.quantity),
                ItemField::Rate => format_quantity(&item.rate),
            };
            if let Some(value) = ask_text(&field.to_string(), &current)? {
                let next = self.doc.with_item(index, field, &value);
                self.replace(next);
            }
        }
    }

    fn edit_terms(&mut self) -> Result<()> {
        const REMOVE_OPT: &str = "Del";
        const EDIT_OPT: &str = "Edit";
        loop {
            let mut options: Vec<String> = self
                .doc
                .terms
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{}. {}", i + 1, if t.is_empty() { "(empty)" } else { t.as_str() }))
                .collect();
            options.push(ADD_TERM_OPT.to_string());
            options.push(BACK_OPT.to_string());

            let Some(choice) = back_on_cancel(Select::new("Terms:", options.clone()).with_page_size(10).prompt())?
            else {
                return Ok(());
            };
            if choice == BACK_OPT {
                return Ok(());
            }
            let index = if choice == ADD_TERM_OPT {
                let next = self.doc.with_term_added();
                self.replace(next);
                self.doc.terms.len() - 1
            } else {
                match options.iter().position(|o| *o == choice) {
                    Some(i) => i,
                    None => continue,
                }
            };

            let action = if choice == ADD_TERM_OPT {
                Some(EDIT_OPT)
            } else {
                back_on_cancel(Select::new("Term:", vec![EDIT_OPT, REMOVE_OPT, BACK_OPT]).prompt())?
            };
            match action {
                Some(EDIT_OPT) => {
                    let current = self.doc.terms.get(index).cloned().unwrap_or_default();
                    if let Some(value) = ask_text("Term", &current)? {
                        let next = self.doc.with_term(index, &value);
                        self.replace(next);
                    }
                }
                Some(REMOVE_OPT) => {
                    let next = self.doc.with_term_removed(index);
                    self.replace(next);
                }
                _ => {}
            }
        }
    }

    fn pick_client(&mut self) -> Result<()> {
        let clients = self.clients.get_clients()?;
        if clients.is_empty() {
            println!("❌ No saved clients yet. Use 'Save recipient as client' or `clients add`.");
            return Ok(());
        }
        let names: Vec<String> = clients.iter().map(|c| c.name.clone()).collect();
        let Some(choice) = back_on_cancel(Select::new("Client (Type to Filter):", names).prompt())? else {
            return Ok(());
        };
        if let Some(client) = clients.iter().find(|c| c.name == choice) {
            let next = self.doc.with_recipient(client);
            println!("✅ Recipient: {}", client.name);
            self.replace(next);
        }
        Ok(())
    }

    fn save_client(&mut self) -> Result<()> {
        let q = &self.doc.quotation;
        let client = Client {
            name: q.to_company.trim().to_string(),
            address: q.to_address.clone(),
        };
        if client.name.is_empty() {
            println!("❌ Recipient company is empty.");
            return Ok(());
        }
        let mut clients = self.clients.get_clients()?;
        upsert_client(&mut clients, client.clone());
        self.clients.save_clients(&clients)?;
        println!("✅ Saved client: {}", client.name);
        Ok(())
    }
}

/// Replaces a client with the same name, or appends.
pub fn upsert_client(clients: &mut Vec<Client>, client: Client) {
    match clients.iter_mut().find(|c| c.name == client.name) {
        Some(existing) => *existing = client,
        None => clients.push(client),
    }
}

fn ask_text(label: &str, current: &str) -> Result<Option<String>> {
    back_on_cancel(Text::new(&format!("{label}:")).with_initial_value(current).prompt())
}

/// Exports through the user's template directory and output folder.
pub fn export_with_settings(doc: &Document, settings: &AppSettings) -> Result<Exported> {
    let renderer = Renderer::from_dir(&settings.template_dir())?;
    println!("\n🔨 Compiling PDF...");
    let exported = render::export(doc, &renderer, &settings.output_dir())?;
    info!(source = %exported.source.display(), pdf = exported.pdf.is_some(), "exported quotation");
    Ok(exported)
}

pub fn report_export(exported: &Exported, open: bool) {
    println!("📄 Source: {}", exported.source.display());
    match &exported.pdf {
        Some(pdf) => {
            println!("✅ PDF Generated: {}", pdf.display());
            if open {
                open_and_reveal(pdf);
            }
        }
        None => println!(
            "❌ PDF not generated. Install typst (https://typst.app) and run: typst compile --root / {}",
            exported.source.display()
        ),
    }
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &std::path::Path) {
    use std::process::Command;

    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(format!("/select,{}", path.to_string_lossy())).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}
