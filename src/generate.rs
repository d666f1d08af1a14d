use tracing::{info, warn};

use crate::aggregate::CustomerSummary;
use crate::dates::{end_of_month, format_date, parse_date};
use crate::error::{Error, Result};
use crate::ids::{IdGenerator, company_abbreviation, invoice_number};
use crate::model::{CompanySettings, Invoice, InvoiceItem};
use crate::session::BulkSession;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInvoice {
    pub id: u64,
    pub number: String,
    pub customer_name: String,
    pub total: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedInvoice>,
    /// Customers whose source invoice total was zero; their items were
    /// copied without scaling.
    pub unscaled: Vec<String>,
}

impl GenerationReport {
    pub fn count(&self) -> usize {
        self.generated.len()
    }

    pub fn total_amount(&self) -> f64 {
        self.generated.iter().map(|g| g.total).sum()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn scale_items(items: &[InvoiceItem], ratio: f64) -> Vec<InvoiceItem> {
    items
        .iter()
        .map(|item| InvoiceItem {
            description: item.description.clone(),
            quantity: item.quantity,
            rate: item.rate * ratio,
            amount: item.amount * ratio,
        })
        .collect()
}

/// Appends one new invoice per selected customer to `invoices`, modelled on
/// each customer's most recent invoice and scaled to the edited total.
/// Existing invoices are never touched. Nothing is appended when the
/// selection is empty, the invoice date is missing or invalid, or the
/// id space cannot cover the whole batch.
pub fn generate_invoices(
    session: &BulkSession,
    invoices: &mut Vec<Invoice>,
    company: &CompanySettings,
    ids: &mut IdGenerator,
) -> Result<GenerationReport> {
    let selected: Vec<&CustomerSummary> = session.selected().collect();
    if selected.is_empty() {
        return Err(Error::NothingSelected);
    }

    let raw_date = session
        .invoice_date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or(Error::MissingInvoiceDate)?;
    let date = parse_date(raw_date).ok_or_else(|| Error::InvalidDate(raw_date.to_string()))?;
    let date_str = format_date(date);
    let due_date = format_date(end_of_month(date));

    ids.ensure_available(selected.len())?;

    let abbr = company_abbreviation(company);
    let mut report = GenerationReport::default();

    for customer in selected {
        let last = &customer.most_recent_invoice;

        let ratio = customer.new_total / last.total;
        let items = if ratio.is_finite() {
            scale_items(&last.items, ratio)
        } else {
            warn!(customer = %customer.customer_name, source = %last.number, "Source invoice total is zero, items copied unscaled");
            report.unscaled.push(customer.customer_name.clone());
            last.items.clone()
        };

        let id = ids.next_id()?;
        let number = invoice_number(&abbr, id);

        let invoice = Invoice {
            id,
            number: number.clone(),
            date: date_str.clone(),
            due_date: due_date.clone(),
            from_name: Some(non_empty(&last.from_name).unwrap_or(company.name.as_str()).to_string()),
            from_address: Some(non_empty(&last.from_address).unwrap_or(company.address.as_str()).to_string()),
            to_name: customer.customer_name.clone(),
            to_address: customer.address.clone(),
            to_phone: customer.phone.clone(),
            items,
            total: customer.new_total,
            notes: Some(match non_empty(&last.notes) {
                Some(notes) => notes.to_string(),
                None => format!("Generated for {}", session.target_month),
            }),
            bank_accounts: Some(last.bank_accounts.clone().unwrap_or_else(|| company.bank_accounts.clone())),
        };

        info!(%number, customer = %customer.customer_name, total = customer.new_total, "Generated invoice");
        invoices.push(invoice);
        report.generated.push(GeneratedInvoice {
            id,
            number,
            customer_name: customer.customer_name.clone(),
            total: customer.new_total,
        });
    }

    Ok(report)
}
