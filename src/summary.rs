use chrono::Datelike;
use std::collections::BTreeMap;

use crate::aggregate::{compare_names, customer_key};
use crate::dates::parse_date;
use crate::model::{Invoice, Payment};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaidSplit {
    pub paid: f64,
    pub unpaid: f64,
}

impl PaidSplit {
    pub fn total(&self) -> f64 {
        self.paid + self.unpaid
    }

    fn add(&mut self, other: PaidSplit) {
        self.paid += other.paid;
        self.unpaid += other.unpaid;
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct YearSummary {
    pub year: i32,
    /// Keyed by (year, month).
    pub monthly: BTreeMap<(i32, u32), PaidSplit>,
    /// Sorted by total, largest first.
    pub customers: Vec<(String, PaidSplit)>,
}

impl YearSummary {
    pub fn grand_total(&self) -> PaidSplit {
        let mut total = PaidSplit::default();
        for split in self.monthly.values() {
            total.add(*split);
        }
        total
    }
}

fn split_for(invoice: &Invoice, payments: &[Payment]) -> PaidSplit {
    let received: f64 = payments
        .iter()
        .filter(|p| p.invoice_id == invoice.id)
        .map(|p| p.amount)
        .sum();
    let paid = received.clamp(0.0, invoice.total.max(0.0));
    PaidSplit { paid, unpaid: invoice.total - paid }
}

/// Paid and outstanding amounts per month and per customer for `year`.
/// Invoices with unparseable dates are skipped.
pub fn summarize(invoices: &[Invoice], payments: &[Payment], year: i32) -> YearSummary {
    let mut monthly: BTreeMap<(i32, u32), PaidSplit> = BTreeMap::new();
    let mut by_customer: BTreeMap<String, (String, PaidSplit)> = BTreeMap::new();

    for inv in invoices {
        let Some(date) = parse_date(&inv.date) else { continue };
        if date.year() != year {
            continue;
        }
        let split = split_for(inv, payments);
        monthly.entry((date.year(), date.month())).or_default().add(split);
        by_customer
            .entry(customer_key(&inv.to_name))
            .or_insert_with(|| (inv.to_name.trim().to_string(), PaidSplit::default()))
            .1
            .add(split);
    }

    let mut customers: Vec<(String, PaidSplit)> = by_customer.into_values().collect();
    customers.sort_by(|a, b| {
        b.1.total()
            .total_cmp(&a.1.total())
            .then_with(|| compare_names(&a.0, &b.0))
    });

    YearSummary { year, monthly, customers }
}
