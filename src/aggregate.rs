use deunicode::deunicode;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dates::parse_date;
use crate::model::Invoice;

/// One row of the bulk generator: a customer and the invoice that new
/// invoices are modelled on.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub customer_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub most_recent_invoice: Invoice,
    pub total_invoices: usize,
    pub new_total: f64,
    pub selected: bool,
}

impl CustomerSummary {
    fn from_invoice(inv: &Invoice) -> Self {
        Self {
            customer_name: inv.to_name.clone(),
            address: inv.to_address.clone(),
            phone: inv.to_phone.clone(),
            most_recent_invoice: inv.clone(),
            total_invoices: 1,
            new_total: inv.total,
            selected: false,
        }
    }
}

/// Grouping key: lowercased, trimmed customer name.
pub fn customer_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Strictly later; an unparseable date on either side never wins.
fn is_later(candidate: &str, current: &str) -> bool {
    match (parse_date(candidate), parse_date(current)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

/// Accent- and case-insensitive first ("Émile" sorts with "E"), then
/// case-insensitive, then raw text as tie-break.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    deunicode(a)
        .to_lowercase()
        .cmp(&deunicode(b).to_lowercase())
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

pub fn aggregate_customers(invoices: &[Invoice]) -> Vec<CustomerSummary> {
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut customers: Vec<CustomerSummary> = Vec::new();

    for inv in invoices {
        let key = customer_key(&inv.to_name);
        match by_key.get(&key).copied() {
            None => {
                by_key.insert(key, customers.len());
                customers.push(CustomerSummary::from_invoice(inv));
            }
            Some(idx) => {
                let existing = &mut customers[idx];
                existing.total_invoices += 1;
                if is_later(&inv.date, &existing.most_recent_invoice.date) {
                    existing.most_recent_invoice = inv.clone();
                    existing.new_total = inv.total;
                }
            }
        }
    }

    // stable: equal names keep first-seen order
    customers.sort_by(|a, b| compare_names(&a.customer_name, &b.customer_name));
    customers
}
