use chrono::NaiveDate;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::amount::money;
use crate::dates::display_date;
use crate::generate::GenerationReport;
use crate::model::{Invoice, Payment, PaymentStatus};
use crate::session::{BulkSession, Totals};
use crate::summary::{PaidSplit, YearSummary};

const PAID: Color = Color::Rgb { r: 4, g: 120, b: 87 };
const PARTIAL: Color = Color::Rgb { r: 180, g: 110, b: 10 };
const UNPAID: Color = Color::Rgb { r: 185, g: 28, b: 28 };
const ACCENT: Color = Color::Rgb { r: 102, g: 126, b: 234 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Success,
    Warning,
    Error,
}

pub fn notify(level: Notice, message: &str) {
    match level {
        Notice::Success => println!("✅ {}", message),
        Notice::Warning => println!("⚠️  {}", message),
        Notice::Error => eprintln!("❌ {}", message),
    }
}

fn status_color(status: PaymentStatus) -> Color {
    match status {
        PaymentStatus::Paid => PAID,
        PaymentStatus::Partial => PARTIAL,
        PaymentStatus::Unpaid => UNPAID,
    }
}

pub fn customers_table(session: &BulkSession, payments: &[Payment], currency: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Sel"),
        Cell::new("Customer"),
        Cell::new("History"),
        Cell::new("Last Invoice"),
        Cell::new("Status"),
        Cell::new("Last Total"),
        Cell::new("New Amount"),
    ]);

    for (i, customer) in session.customers.iter().enumerate() {
        let last = &customer.most_recent_invoice;
        let status = PaymentStatus::for_invoice(last, payments);

        let mut contact = customer.customer_name.clone();
        contact.push('\n');
        contact.push_str(customer.address.as_deref().filter(|a| !a.is_empty()).unwrap_or("No address"));
        if let Some(phone) = customer.phone.as_deref().filter(|p| !p.is_empty()) {
            contact.push_str(&format!("\n📱 {}", phone));
        }

        let name_cell = if customer.selected {
            Cell::new(contact).add_attribute(Attribute::Bold).fg(ACCENT)
        } else {
            Cell::new(contact)
        };

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(if customer.selected { "[x]" } else { "[ ]" }),
            name_cell,
            Cell::new(format!("{} invoice(s)", customer.total_invoices)),
            Cell::new(format!("#{}\n{}", last.number, display_date(&last.date))),
            Cell::new(status).fg(status_color(status)),
            Cell::new(money(currency, last.total)),
            Cell::new(money(currency, customer.new_total)),
        ]);
    }
    table
}

pub fn totals_line(totals: Totals, currency: &str) -> String {
    format!(
        "Selected: {} customers | Total: {}",
        totals.selected,
        money(currency, totals.amount)
    )
}

pub fn print_session(session: &BulkSession, payments: &[Payment], currency: &str) {
    println!("\n--- 📅 Bulk Invoice Generator ---");
    println!(
        "Target month: {} | Invoice date: {}",
        session.target_month,
        session.invoice_date.as_deref().unwrap_or("(not set)")
    );
    if session.customers.is_empty() {
        println!("No customers found.");
        return;
    }
    println!("📊 Showing {} unique customers", session.customers.len());
    println!("{}", customers_table(session, payments, currency));
    println!("{}", totals_line(session.totals(), currency));
}

pub fn invoices_table<'a>(
    invoices: impl IntoIterator<Item = &'a Invoice>,
    payments: &[Payment],
    currency: &str,
) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Number"),
        Cell::new("Date"),
        Cell::new("Due"),
        Cell::new("Customer"),
        Cell::new("Total"),
        Cell::new("Status"),
    ]);
    for inv in invoices {
        let status = PaymentStatus::for_invoice(inv, payments);
        table.add_row(vec![
            Cell::new(&inv.number),
            Cell::new(display_date(&inv.date)),
            Cell::new(display_date(&inv.due_date)),
            Cell::new(&inv.to_name),
            Cell::new(money(currency, inv.total)),
            Cell::new(status).fg(status_color(status)),
        ]);
    }
    table
}

pub fn report_line(report: &GenerationReport, currency: &str) -> String {
    format!(
        "{} new invoice(s) generated successfully! ({})",
        report.count(),
        money(currency, report.total_amount())
    )
}

fn split_cells(split: PaidSplit, currency: &str, bold: bool) -> Vec<Cell> {
    let style = |cell: Cell| if bold { cell.add_attribute(Attribute::Bold) } else { cell };
    let paid = style(Cell::new(money(currency, split.paid)));
    let paid = if split.paid > 0.0 { paid.fg(PAID) } else { paid };
    let unpaid = style(Cell::new(money(currency, split.unpaid)));
    let unpaid = if split.unpaid > 0.0 { unpaid.fg(UNPAID) } else { unpaid };
    vec![paid, unpaid, style(Cell::new(money(currency, split.total())))]
}

pub fn print_summary(summary: &YearSummary, currency: &str) {
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Month"), Cell::new("Paid"), Cell::new("Unpaid"), Cell::new("Total")]);

    for ((year, month), split) in summary.monthly.iter().rev() {
        let month_str = NaiveDate::from_ymd_opt(*year, *month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", year, month));
        let mut row = vec![Cell::new(month_str)];
        row.extend(split_cells(*split, currency, false));
        table.add_row(row);
    }
    let mut total_row = vec![Cell::new(format!("Total ({})", summary.year)).add_attribute(Attribute::Bold)];
    total_row.extend(split_cells(summary.grand_total(), currency, true));
    table.add_row(total_row);

    println!("\n--- Monthly Invoice Summary ({}) ---", summary.year);
    println!("{table}");

    let mut customer_table = Table::new();
    customer_table.set_header(vec![Cell::new("Customer"), Cell::new("Paid"), Cell::new("Unpaid"), Cell::new("Total")]);
    for (name, split) in &summary.customers {
        let mut row = vec![Cell::new(name)];
        row.extend(split_cells(*split, currency, false));
        customer_table.add_row(row);
    }

    println!("\n--- Customer Summary ({}) ---", summary.year);
    println!("{customer_table}");
}
