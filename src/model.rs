use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

/// A stored invoice. Field names follow the camelCase layout of the
/// `invoices` store so exported collections load as-is.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,
    pub number: String,
    pub date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    pub to_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_phone: Option<String>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_accounts: Option<Vec<BankAccount>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Overrides the abbreviation derived from `name` in invoice numbers.
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
}

fn default_currency() -> String {
    "R".to_string()
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            abbreviation: None,
            currency_symbol: default_currency(),
            bank_accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub invoice_id: u64,
    pub amount: f64,
    pub date: String,
}

/// Invoice status derived from recorded payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn for_invoice(invoice: &Invoice, payments: &[Payment]) -> Self {
        let paid: f64 = payments
            .iter()
            .filter(|p| p.invoice_id == invoice.id)
            .map(|p| p.amount)
            .sum();
        if paid <= 0.0 {
            PaymentStatus::Unpaid
        } else if paid >= invoice.total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "UNPAID"),
            PaymentStatus::Partial => write!(f, "PARTIAL"),
            PaymentStatus::Paid => write!(f, "PAID"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::invoice;
    use super::*;

    #[test]
    fn test_payment_status() {
        let inv = invoice(7, "Acme", "2024-01-01", 100.0);
        let pay = |amount| Payment { invoice_id: 7, amount, date: "2024-01-10".into() };
        let other = Payment { invoice_id: 8, amount: 500.0, date: "2024-01-10".into() };

        assert_eq!(PaymentStatus::for_invoice(&inv, &[other.clone()]), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::for_invoice(&inv, &[pay(40.0)]), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::for_invoice(&inv, &[pay(40.0), pay(60.0), other]), PaymentStatus::Paid);
    }

    #[test]
    fn test_invoice_reads_camel_case_store() {
        let raw = r#"{
            "id": 1706745600000,
            "number": "AC-INV-1706745600000",
            "date": "2024-02-01",
            "dueDate": "2024-02-29",
            "toName": "Acme",
            "toPhone": "012 345 6789",
            "items": [{"description": "Svc", "quantity": 2, "rate": 50, "amount": 100}],
            "total": 100,
            "bankAccounts": [{"bankName": "FNB", "accountName": "Acme", "accountNumber": "123"}]
        }"#;
        let inv: Invoice = serde_json::from_str(raw).unwrap();
        assert_eq!(inv.id, 1706745600000);
        assert_eq!(inv.due_date, "2024-02-29");
        assert_eq!(inv.to_phone.as_deref(), Some("012 345 6789"));
        assert_eq!(inv.items[0].quantity, 2.0);
        assert!(inv.notes.is_none());
        assert_eq!(inv.bank_accounts.unwrap()[0].branch_code, None);
    }
}
