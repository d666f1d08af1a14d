mod aggregate;
mod amount;
mod config;
mod dates;
mod error;
mod generate;
mod ids;
mod logging;
mod model;
mod render;
mod session;
mod store;
mod summary;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, DateSelect, MultiSelect, Select, Text};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{AppSettings, config_path, load_company_settings, load_settings, setup_config_wizard};
use crate::dates::{first_of_month, format_date, month_string, parse_date};
use crate::error::{Error, Result};
use crate::generate::generate_invoices;
use crate::ids::IdGenerator;
use crate::model::{CompanySettings, Invoice, Payment, PaymentStatus};
use crate::render::{Notice, notify};
use crate::session::BulkSession;
use crate::store::{INVOICES, JsonStore, PAYMENTS, Store};
use crate::summary::YearSummary;

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-bulk", about = "Generate next month's invoices from each customer's last one")]
struct Cli {
    /// Data directory (overrides the configured one)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk-generate new invoices by customer
    Bulk(BulkArgs),
    /// Show unique customers and their last invoice
    Customers,
    /// List invoices
    List {
        /// Only invoices dated in this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Record a payment against an invoice
    Pay,
    /// Show summary of invoices
    Summary {
        /// Year to summarize (defaults to current year)
        year: Option<i32>,
    },
    /// Configure data directory
    Config,
}

#[derive(clap::Args, Default)]
struct BulkArgs {
    /// Target month (YYYY-MM), defaults to next month
    #[arg(long)]
    month: Option<String>,
    /// Invoice date (YYYY-MM-DD), defaults to the first of the target month
    #[arg(long)]
    date: Option<String>,
    /// Select every customer
    #[arg(long)]
    all: bool,
    /// Select a customer by name (repeatable)
    #[arg(long = "select", value_name = "NAME")]
    select: Vec<String>,
    /// Set a customer's new amount (repeatable)
    #[arg(long = "amount", value_name = "NAME=VALUE")]
    amounts: Vec<String>,
    /// Generate without interactive prompts
    #[arg(short, long)]
    yes: bool,
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        notify(Notice::Error, &e.to_string());
        std::process::exit(1);
    }
}

/// Loaded data for one command.
struct Workspace {
    store: JsonStore,
    company: CompanySettings,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
}

impl Workspace {
    fn open(settings: &AppSettings) -> Result<Self> {
        let root = settings.root();
        let company = load_company_settings(&root)?;
        let store = JsonStore::new(settings.store_dir());
        let invoices: Vec<Invoice> = store.load(INVOICES)?;
        let payments: Vec<Payment> = store.load(PAYMENTS)?;
        debug!(root = %root.display(), invoices = invoices.len(), payments = payments.len(), "Workspace loaded");
        Ok(Self { store, company, invoices, payments })
    }
}

fn resolve_settings(data_dir: Option<PathBuf>) -> Result<AppSettings> {
    if let Some(dir) = data_dir {
        return Ok(AppSettings { data_root: dir.to_string_lossy().to_string() });
    }
    let path = config_path();
    match load_settings(&path)? {
        Some(settings) => Ok(settings),
        None => setup_config_wizard(&path),
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Config = command {
        setup_config_wizard(&config_path())?;
        return Ok(());
    }

    let settings = resolve_settings(cli.data_dir)?;
    let mut ws = Workspace::open(&settings)?;
    let today = Local::now().date_naive();

    match command {
        Commands::Bulk(args) => run_bulk(&mut ws, args, today),
        Commands::Customers => {
            let session = BulkSession::open(&ws.invoices, today);
            render::print_session(&session, &ws.payments, &ws.company.currency_symbol);
            Ok(())
        }
        Commands::List { month } => list_invoices(&ws, month.as_deref()),
        Commands::Pay => record_payment(&mut ws, today),
        Commands::Summary { year } => {
            let year = year.unwrap_or_else(|| today.year());
            let summary = summary::summarize(&ws.invoices, &ws.payments, year);
            if summary.monthly.is_empty() {
                println!("No invoices found for {}.", year);
                return Ok(());
            }
            render::print_summary(&summary, &ws.company.currency_symbol);
            Ok(())
        }
        Commands::Config => Ok(()),
    }
}

// ==========================================
// 1. Bulk Generation
// ==========================================

fn apply_bulk_args(session: &mut BulkSession, args: &BulkArgs) -> Result<()> {
    if let Some(month) = &args.month {
        first_of_month(month)?;
        session.set_target_month(month);
    }
    if let Some(date) = &args.date {
        session.set_invoice_date(date);
    }
    if args.all {
        session.select_all();
    }
    for name in &args.select {
        session.select_by_name(name, true)?;
    }
    for assignment in &args.amounts {
        let (name, value) = assignment
            .rsplit_once('=')
            .ok_or_else(|| Error::AmountAssignment(assignment.clone()))?;
        session.set_amount_by_name(name, value)?;
    }
    Ok(())
}

fn run_bulk(ws: &mut Workspace, args: BulkArgs, today: NaiveDate) -> Result<()> {
    let mut session = BulkSession::open(&ws.invoices, today);
    apply_bulk_args(&mut session, &args)?;
    let currency = ws.company.currency_symbol.clone();

    if args.yes {
        render::print_session(&session, &ws.payments, &currency);
        return finish_bulk(ws, &mut session);
    }

    loop {
        render::print_session(&session, &ws.payments, &currency);
        let action = Select::new("Action:", BulkAction::ALL.to_vec())
            .with_page_size(BulkAction::ALL.len())
            .prompt()?;

        match action {
            BulkAction::Choose => choose_customers(&mut session)?,
            BulkAction::SelectAll => session.select_all(),
            BulkAction::DeselectAll => session.deselect_all(),
            BulkAction::EditAmount => {
                if let Some(idx) = pick_customer(&session, "Edit amount for:")? {
                    let current = format!("{:.2}", session.customers[idx].new_total);
                    let value = Text::new("Invoice Amount:").with_default(&current).prompt()?;
                    session.set_amount(idx, &value)?;
                }
            }
            BulkAction::Remove => {
                if let Some(idx) = pick_customer(&session, "Remove from this run:")? {
                    let removed = session.remove_customer(idx)?;
                    println!("🗑️  Removed {}", removed.customer_name);
                }
            }
            BulkAction::TargetMonth => {
                let month = Text::new("Target Month (YYYY-MM):")
                    .with_default(&session.target_month)
                    .with_validator(|input: &str| Ok(month_validation(input)))
                    .prompt()?;
                session.set_target_month(&month);
            }
            BulkAction::InvoiceDate => {
                let default = session
                    .invoice_date
                    .as_deref()
                    .and_then(parse_date)
                    .unwrap_or(today);
                let date = DateSelect::new("Invoice Date:").with_default(default).prompt()?;
                session.set_invoice_date(&format_date(date));
            }
            BulkAction::Generate => {
                let totals = session.totals();
                if totals.selected > 0 {
                    let go = Confirm::new(&format!("Generate {} invoice(s)?", totals.selected))
                        .with_default(true)
                        .prompt()?;
                    if !go {
                        continue;
                    }
                }
                match finish_bulk(ws, &mut session) {
                    Err(e @ (Error::NothingSelected | Error::MissingInvoiceDate | Error::InvalidDate(_))) => {
                        notify(Notice::Warning, &e.to_string());
                        continue;
                    }
                    other => return other,
                }
            }
            BulkAction::Cancel => {
                session.close();
                println!("Operation cancelled.");
                return Ok(());
            }
        }
    }
}

fn month_validation(input: &str) -> Validation {
    match first_of_month(input) {
        Ok(_) => Validation::Valid,
        Err(_) => Validation::Invalid("Expected a month as YYYY-MM".into()),
    }
}

/// Dashboard shown after a run: the year the new invoices are dated in.
fn post_run_summary(ws: &Workspace, session: &BulkSession, today: NaiveDate) -> YearSummary {
    let year = session
        .invoice_date
        .as_deref()
        .and_then(parse_date)
        .map_or(today.year(), |d| d.year());
    summary::summarize(&ws.invoices, &ws.payments, year)
}

/// Generates, persists the whole collection, then shows the new invoices
/// and the year summary. Errors are left to the caller to report.
fn finish_bulk(ws: &mut Workspace, session: &mut BulkSession) -> Result<()> {
    let mut ids = IdGenerator::from_clock(&ws.invoices);
    let report = generate_invoices(session, &mut ws.invoices, &ws.company, &mut ids)?;

    ws.store.save(INVOICES, &ws.invoices)?;
    info!(count = report.count(), store = %ws.store.dir().display(), "Bulk invoices saved");

    let currency = &ws.company.currency_symbol;
    notify(Notice::Success, &render::report_line(&report, currency));
    for name in &report.unscaled {
        notify(
            Notice::Warning,
            &format!("{}: last invoice total was 0, line items were copied unscaled", name),
        );
    }

    for g in &report.generated {
        println!("  📄 #{} → {}", g.number, g.customer_name);
    }
    let new_ids: Vec<u64> = report.generated.iter().map(|g| g.id).collect();
    let created = ws.invoices.iter().filter(|inv| new_ids.contains(&inv.id));
    println!("{}", render::invoices_table(created, &ws.payments, currency));
    render::print_summary(&post_run_summary(ws, session, Local::now().date_naive()), currency);

    session.close();
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkAction {
    Choose,
    SelectAll,
    DeselectAll,
    EditAmount,
    Remove,
    TargetMonth,
    InvoiceDate,
    Generate,
    Cancel,
}

impl BulkAction {
    const ALL: [BulkAction; 9] = [
        BulkAction::Choose,
        BulkAction::SelectAll,
        BulkAction::DeselectAll,
        BulkAction::EditAmount,
        BulkAction::Remove,
        BulkAction::TargetMonth,
        BulkAction::InvoiceDate,
        BulkAction::Generate,
        BulkAction::Cancel,
    ];
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BulkAction::Choose => "☑️  Choose customers",
            BulkAction::SelectAll => "✓ Select All",
            BulkAction::DeselectAll => "✗ Deselect All",
            BulkAction::EditAmount => "✏️  Edit amount",
            BulkAction::Remove => "🗑️  Remove customer",
            BulkAction::TargetMonth => "📅 Target month",
            BulkAction::InvoiceDate => "📆 Invoice date",
            BulkAction::Generate => "📄 Generate Invoices",
            BulkAction::Cancel => "Cancel",
        };
        f.write_str(label)
    }
}

fn customer_labels(session: &BulkSession) -> Vec<String> {
    session
        .customers
        .iter()
        .map(|c| format!("{} ({:.2})", c.customer_name, c.new_total))
        .collect()
}

fn choose_customers(session: &mut BulkSession) -> Result<()> {
    if session.customers.is_empty() {
        println!("No customers found.");
        return Ok(());
    }
    let defaults: Vec<usize> = session
        .customers
        .iter()
        .enumerate()
        .filter(|(_, c)| c.selected)
        .map(|(i, _)| i)
        .collect();

    let chosen = MultiSelect::new("Customers (Space to toggle, type to filter):", customer_labels(session))
        .with_default(&defaults)
        .with_page_size(15)
        .raw_prompt()?;

    session.deselect_all();
    for option in chosen {
        session.toggle_select(option.index)?;
    }
    Ok(())
}

fn pick_customer(session: &BulkSession, message: &str) -> Result<Option<usize>> {
    if session.customers.is_empty() {
        println!("No customers found.");
        return Ok(None);
    }
    let choice = Select::new(message, customer_labels(session))
        .with_page_size(15)
        .raw_prompt()?;
    Ok(Some(choice.index))
}

// ==========================================
// 2. Listing
// ==========================================

fn list_invoices(ws: &Workspace, month: Option<&str>) -> Result<()> {
    if let Some(month) = month {
        first_of_month(month)?;
    }
    let matches: Vec<&Invoice> = ws
        .invoices
        .iter()
        .filter(|inv| match month {
            Some(m) => parse_date(&inv.date).is_some_and(|d| month_string(d) == m.trim()),
            None => true,
        })
        .collect();

    if matches.is_empty() {
        println!("(None found)");
        return Ok(());
    }
    println!("{}", render::invoices_table(matches, &ws.payments, &ws.company.currency_symbol));
    Ok(())
}

// ==========================================
// 3. Payments
// ==========================================

fn record_payment(ws: &mut Workspace, today: NaiveDate) -> Result<()> {
    let mut open: Vec<&Invoice> = ws
        .invoices
        .iter()
        .filter(|inv| PaymentStatus::for_invoice(inv, &ws.payments) != PaymentStatus::Paid)
        .collect();
    if open.is_empty() {
        println!("❌ No unpaid invoices found.");
        return Ok(());
    }
    open.sort_by_key(|inv| std::cmp::Reverse(parse_date(&inv.date)));

    let labels: Vec<String> = open
        .iter()
        .map(|inv| format!("#{} | {} | {} | {:.2}", inv.number, inv.to_name, inv.date, inv.total))
        .collect();
    let choice = Select::new("Select Invoice to mark payment:", labels)
        .with_page_size(10)
        .raw_prompt()?;
    let invoice = open[choice.index];

    let already: f64 = ws
        .payments
        .iter()
        .filter(|p| p.invoice_id == invoice.id)
        .map(|p| p.amount)
        .sum();
    let outstanding = (invoice.total - already).max(0.0);

    let amount = CustomType::<f64>::new("Amount received:")
        .with_default(outstanding)
        .with_error_message("Please type a valid number")
        .prompt()?;
    let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
    let date = DateSelect::new("Payment Date:").with_default(today).prompt()?;

    let payment = Payment { invoice_id: invoice.id, amount, date: format_date(date) };
    let number = invoice.number.clone();
    ws.payments.push(payment);
    ws.store.save(PAYMENTS, &ws.payments)?;
    notify(Notice::Success, &format!("Payment recorded for #{}", number));
    Ok(())
}
