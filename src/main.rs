use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use inquire::{Select, Text};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use quotation_maker::clients::ClientBook;
use quotation_maker::editor::{format_date, parse_assignment, quotation_number, random_suffix};
use quotation_maker::form::{Session, export_with_settings, report_export, upsert_client};
use quotation_maker::format::amount_in_words;
use quotation_maker::model::{Client, Document};
use quotation_maker::preview::{live_summary, render_preview};
use quotation_maker::render::PrintDocument;
use quotation_maker::settings::{self, AppSettings, DEFAULT_NUMBER_PREFIX};
use quotation_maker::Result;

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "quotation-maker", version, about = "Edit quotations and export print-ready PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive quotation session
    New {
        /// Start from this draft instead of the profile
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Export a draft without prompting
    Render {
        draft: PathBuf,
        /// Override a field, e.g. --set company.name="Acme" --set items.0.qty=3
        #[arg(long = "set", value_name = "PATH=VALUE")]
        set: Vec<String>,
        /// Do not open the generated PDF
        #[arg(long)]
        no_open: bool,
    },
    /// Print a draft page by page in the terminal
    Preview { draft: PathBuf },
    /// Generate a fresh quotation number
    Number,
    /// Spell out an amount in rupees
    Words { amount: String },
    /// Manage saved clients
    Clients {
        #[command(subcommand)]
        action: ClientsAction,
    },
    /// Configure data directory and numbering
    Config,
}

#[derive(Subcommand)]
enum ClientsAction {
    /// List saved clients
    List,
    /// Add or update a client
    Add,
    /// Remove a client
    Remove,
}

// ==========================================
// Main Function
// ==========================================

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancelled() => {
            println!("Cancelled");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::New { from } => {
            let settings = settings_or_wizard()?;
            let seed = match from {
                Some(path) => load_draft(&path)?,
                None => settings::load_profile(&settings.profile_path())?.dated(&today()),
            };
            Session::new(seed, &settings).run()
        }
        Commands::Render { draft, set, no_open } => {
            let settings = settings_or_wizard()?;
            let doc = apply_overrides(load_draft(&draft)?, &set)?;
            println!("{}", live_summary(&doc));
            let exported = export_with_settings(&doc, &settings)?;
            report_export(&exported, !no_open);
            Ok(())
        }
        Commands::Preview { draft } => {
            let doc = load_draft(&draft)?;
            println!("{}", render_preview(&PrintDocument::compose(&doc)));
            println!("{}", live_summary(&doc));
            Ok(())
        }
        Commands::Number => {
            let prefix = settings::load_settings(&settings::get_config_path())?
                .map(|s| s.number_prefix)
                .unwrap_or_else(|| DEFAULT_NUMBER_PREFIX.to_string());
            let today = Local::now().date_naive();
            println!("{}", quotation_number(&prefix, today, random_suffix()));
            Ok(())
        }
        Commands::Words { amount } => {
            println!("{}", amount_in_words(amount.as_str()));
            Ok(())
        }
        Commands::Clients { action } => {
            let settings = settings_or_wizard()?;
            manage_clients(&ClientBook::in_dir(&settings.root()), action)
        }
        Commands::Config => setup_config_wizard().map(|_| ()),
    }
}

fn today() -> String {
    format_date(Local::now().date_naive())
}

fn load_draft(path: &Path) -> Result<Document> {
    debug!(path = %path.display(), "loading draft");
    Ok(Document::load(path)?.dated(&today()))
}

fn apply_overrides(doc: Document, assignments: &[String]) -> Result<Document> {
    assignments.iter().try_fold(doc, |doc, raw| {
        let (field, value) = parse_assignment(raw)?;
        debug!(?field, "applying override");
        Ok(doc.with_field(&field, &value))
    })
}

// ==========================================
// Clients
// ==========================================

fn manage_clients(book: &ClientBook, action: ClientsAction) -> Result<()> {
    let mut clients = book.get_clients()?;
    match action {
        ClientsAction::List => {
            if clients.is_empty() {
                println!("(None found)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec![Cell::new("Client"), Cell::new("Address")]);
            for c in &clients {
                table.add_row(vec![Cell::new(&c.name), Cell::new(&c.address)]);
            }
            println!("{table}");
        }
        ClientsAction::Add => {
            println!("\n--- Creating New Client ---");
            let name = Text::new("Client Company:").prompt()?;
            if name.trim().is_empty() {
                println!("❌ Client name is required.");
                return Ok(());
            }
            let address = Text::new("Address:").prompt()?;
            let client = Client {
                name: name.trim().to_string(),
                address,
            };
            let name = client.name.clone();
            upsert_client(&mut clients, client);
            book.save_clients(&clients)?;
            println!("✅ Client saved: {name}");
        }
        ClientsAction::Remove => {
            if clients.is_empty() {
                println!("❌ No saved clients.");
                return Ok(());
            }
            let names: Vec<String> = clients.iter().map(|c| c.name.clone()).collect();
            let choice = Select::new("Select Client to remove:", names).prompt()?;
            clients.retain(|c| c.name != choice);
            book.save_clients(&clients)?;
            println!("✅ Removed: {choice}");
        }
    }
    Ok(())
}

// ==========================================
// Config
// ==========================================

fn settings_or_wizard() -> Result<AppSettings> {
    match settings::load_settings(&settings::get_config_path())? {
        Some(s) => Ok(s),
        None => setup_config_wizard(),
    }
}

fn setup_config_wizard() -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let path = settings::get_config_path();
    let current = settings::load_settings(&path)?.unwrap_or_default();

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Quotation Data Directory")
        .pick_folder();

    let data_root = match picked_path {
        Some(path) => path.to_string_lossy().to_string(),
        None => {
            println!("❌ No folder selected. Falling back to manual input.");
            Text::new("Enter Data Directory:")
                .with_default(&current.data_root)
                .prompt()?
        }
    };

    let number_prefix = Text::new("Quotation number prefix:")
        .with_default(&current.number_prefix)
        .prompt()?;

    let settings = AppSettings {
        data_root,
        number_prefix,
    };
    settings::save_settings(&path, &settings)?;
    println!("✅ Settings saved to {}", path.display());
    Ok(settings)
}
