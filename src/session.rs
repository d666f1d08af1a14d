use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::{CustomerSummary, aggregate_customers, customer_key};
use crate::amount::clamp_amount;
use crate::dates::{first_of_month, format_date, next_month};
use crate::error::{Error, Result};
use crate::model::Invoice;

/// Selection state of one bulk-generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSession {
    pub customers: Vec<CustomerSummary>,
    pub target_month: String,
    pub invoice_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub selected: usize,
    pub amount: f64,
}

impl BulkSession {
    /// Groups `invoices` by customer and targets the month after `today`.
    pub fn open(invoices: &[Invoice], today: NaiveDate) -> Self {
        let target_month = next_month(today);
        let invoice_date = first_of_month(&target_month).ok().map(format_date);
        let customers = aggregate_customers(invoices);
        debug!(customers = customers.len(), %target_month, "Opened bulk session");
        Self { customers, target_month, invoice_date }
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    fn customer_mut(&mut self, index: usize) -> Result<&mut CustomerSummary> {
        self.customers.get_mut(index).ok_or(Error::CustomerIndex(index))
    }

    fn position(&self, name: &str) -> Result<usize> {
        let key = customer_key(name);
        self.customers
            .iter()
            .position(|c| customer_key(&c.customer_name) == key)
            .ok_or_else(|| Error::CustomerNotFound(name.to_string()))
    }

    pub fn toggle_select(&mut self, index: usize) -> Result<()> {
        let customer = self.customer_mut(index)?;
        customer.selected = !customer.selected;
        Ok(())
    }

    pub fn set_amount(&mut self, index: usize, value: &str) -> Result<()> {
        self.customer_mut(index)?.new_total = clamp_amount(value);
        Ok(())
    }

    pub fn remove_customer(&mut self, index: usize) -> Result<CustomerSummary> {
        if index >= self.customers.len() {
            return Err(Error::CustomerIndex(index));
        }
        Ok(self.customers.remove(index))
    }

    pub fn select_all(&mut self) {
        self.customers.iter_mut().for_each(|c| c.selected = true);
    }

    pub fn deselect_all(&mut self) {
        self.customers.iter_mut().for_each(|c| c.selected = false);
    }

    pub fn select_by_name(&mut self, name: &str, selected: bool) -> Result<()> {
        let idx = self.position(name)?;
        self.customers[idx].selected = selected;
        Ok(())
    }

    pub fn set_amount_by_name(&mut self, name: &str, value: &str) -> Result<()> {
        let idx = self.position(name)?;
        self.set_amount(idx, value)
    }

    /// Stores the month and resets the invoice date to its first day.
    /// The month itself is not validated; an unparseable month leaves no
    /// default date.
    pub fn set_target_month(&mut self, month: &str) {
        self.target_month = month.trim().to_string();
        self.invoice_date = first_of_month(&self.target_month).ok().map(format_date);
    }

    pub fn set_invoice_date(&mut self, date: &str) {
        let date = date.trim();
        self.invoice_date = if date.is_empty() { None } else { Some(date.to_string()) };
    }

    pub fn selected(&self) -> impl Iterator<Item = &CustomerSummary> {
        self.customers.iter().filter(|c| c.selected)
    }

    pub fn totals(&self) -> Totals {
        self.selected().fold(Totals { selected: 0, amount: 0.0 }, |acc, c| Totals {
            selected: acc.selected + 1,
            amount: acc.amount + c.new_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::invoice;

    fn session() -> BulkSession {
        let invoices = vec![
            invoice(1, "Acme", "2024-01-01", 100.0),
            invoice(2, "acme ", "2024-02-01", 200.0),
            invoice(3, "Beta", "2024-02-10", 80.0),
        ];
        BulkSession::open(&invoices, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap())
    }

    #[test]
    fn test_open_defaults_to_next_month() {
        let s = session();
        assert_eq!(s.target_month, "2024-03");
        assert_eq!(s.invoice_date.as_deref(), Some("2024-03-01"));
        assert_eq!(s.customers.len(), 2);
        assert_eq!(s.totals(), Totals { selected: 0, amount: 0.0 });
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut s = session();
        let before = s.clone();
        s.toggle_select(1).unwrap();
        assert!(s.customers[1].selected);
        s.toggle_select(1).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn test_set_amount_clamps() {
        let mut s = session();
        s.set_amount(0, "-5").unwrap();
        assert_eq!(s.customers[0].new_total, 0.0);
        s.set_amount(0, "123.45").unwrap();
        assert_eq!(s.customers[0].new_total, 123.45);
        s.set_amount(0, "abc").unwrap();
        assert_eq!(s.customers[0].new_total, 0.0);
    }

    #[test]
    fn test_out_of_range_index_leaves_state() {
        let mut s = session();
        let before = s.clone();
        assert!(matches!(s.toggle_select(9), Err(Error::CustomerIndex(9))));
        assert!(matches!(s.set_amount(9, "1"), Err(Error::CustomerIndex(9))));
        assert!(matches!(s.remove_customer(9), Err(Error::CustomerIndex(9))));
        assert_eq!(s, before);
    }

    #[test]
    fn test_totals_follow_selection() {
        let mut s = session();
        s.select_all();
        assert_eq!(s.totals(), Totals { selected: 2, amount: 280.0 });

        s.set_amount(1, "20").unwrap();
        assert_eq!(s.totals(), Totals { selected: 2, amount: 220.0 });

        let removed = s.remove_customer(0).unwrap();
        assert_eq!(removed.customer_name, "Acme");
        assert_eq!(s.totals(), Totals { selected: 1, amount: 20.0 });

        s.deselect_all();
        assert_eq!(s.totals(), Totals { selected: 0, amount: 0.0 });
    }

    #[test]
    fn test_select_by_name() {
        let mut s = session();
        s.select_by_name("  ACME", true).unwrap();
        assert!(s.customers[0].selected);
        s.set_amount_by_name("beta", "15").unwrap();
        assert_eq!(s.customers[1].new_total, 15.0);
        assert!(matches!(s.select_by_name("Gamma", true), Err(Error::CustomerNotFound(_))));
    }

    #[test]
    fn test_target_month_sets_default_date() {
        let mut s = session();
        s.set_target_month("2024-07");
        assert_eq!(s.invoice_date.as_deref(), Some("2024-07-01"));

        s.set_invoice_date("2024-08-15");
        assert_eq!(s.target_month, "2024-07");
        assert_eq!(s.invoice_date.as_deref(), Some("2024-08-15"));

        s.set_invoice_date("  ");
        assert_eq!(s.invoice_date, None);
    }

    #[test]
    fn test_close_resets() {
        let mut s = session();
        s.select_all();
        s.close();
        assert_eq!(s, BulkSession::default());
        assert!(s.target_month.is_empty());
    }
}
