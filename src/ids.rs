use slug::slugify;

use crate::error::{Error, Result};
use crate::model::{CompanySettings, Invoice};

const FALLBACK_ABBR: &str = "CO";

/// Monotonic invoice id source. Starts above both the wall clock (in
/// milliseconds) and every id already in the collection, so a batch never
/// collides with itself or with history. `None` once the id space is used
/// up (an existing id of `u64::MAX`, or the last id handed out).
#[derive(Debug)]
pub struct IdGenerator {
    next: Option<u64>,
}

impl IdGenerator {
    pub fn new(existing: &[Invoice], now_millis: u64) -> Self {
        let next = existing.iter().fold(Some(now_millis), |next, inv| {
            let above = inv.id.checked_add(1)?;
            next.map(|n| n.max(above))
        });
        Self { next }
    }

    pub fn from_clock(existing: &[Invoice]) -> Self {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::new(existing, now)
    }

    /// Fails unless `count` more ids can be issued.
    pub fn ensure_available(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let last = self
            .next
            .and_then(|n| u64::try_from(count - 1).ok().and_then(|extra| n.checked_add(extra)));
        last.map(|_| ()).ok_or(Error::IdsExhausted)
    }

    pub fn next_id(&mut self) -> Result<u64> {
        let id = self.next.ok_or(Error::IdsExhausted)?;
        self.next = id.checked_add(1);
        Ok(id)
    }
}

/// Prefix used in invoice numbers: the configured abbreviation, or the
/// initials of the company name ("Acme Widget Co" -> "AWC"). A single-word
/// name contributes its first three letters.
pub fn company_abbreviation(company: &CompanySettings) -> String {
    if let Some(abbr) = company.abbreviation.as_deref() {
        let abbr = abbr.trim();
        if !abbr.is_empty() {
            return abbr.to_uppercase();
        }
    }

    let slug = slugify(&company.name);
    let words: Vec<&str> = slug.split('-').filter(|w| !w.is_empty()).collect();
    let abbr: String = match words.as_slice() {
        [] => return FALLBACK_ABBR.to_string(),
        [single] => single.chars().take(3).collect(),
        many => many.iter().filter_map(|w| w.chars().next()).collect(),
    };
    abbr.to_uppercase()
}

pub fn invoice_number(abbr: &str, id: u64) -> String {
    format!("{}-INV-{}", abbr, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::invoice;

    fn company(name: &str, abbreviation: Option<&str>) -> CompanySettings {
        CompanySettings {
            name: name.to_string(),
            abbreviation: abbreviation.map(str::to_string),
            ..CompanySettings::default()
        }
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut ids = IdGenerator::new(&[], 1_000);
        let batch: Vec<u64> = (0..5).map(|_| ids.next_id().unwrap()).collect();
        assert_eq!(batch, vec![1_000, 1_001, 1_002, 1_003, 1_004]);
    }

    #[test]
    fn test_ids_start_above_existing() {
        let existing = vec![invoice(5_000, "Acme", "2024-01-01", 10.0), invoice(4_000, "Beta", "2024-01-01", 10.0)];
        let mut ids = IdGenerator::new(&existing, 1_000);
        assert_eq!(ids.next_id().unwrap(), 5_001);

        let mut ids = IdGenerator::new(&existing, 9_000);
        assert_eq!(ids.next_id().unwrap(), 9_000);
    }

    #[test]
    fn test_max_existing_id_exhausts_generator() {
        let existing = vec![invoice(u64::MAX, "Acme", "2024-01-01", 10.0)];
        let mut ids = IdGenerator::new(&existing, 1_000);
        assert!(matches!(ids.ensure_available(1), Err(Error::IdsExhausted)));
        assert!(matches!(ids.next_id(), Err(Error::IdsExhausted)));
        assert!(ids.ensure_available(0).is_ok());
    }

    #[test]
    fn test_last_id_is_issued_once() {
        let existing = vec![invoice(u64::MAX - 2, "Acme", "2024-01-01", 10.0)];
        let mut ids = IdGenerator::new(&existing, 0);
        assert!(ids.ensure_available(2).is_ok());
        assert!(matches!(ids.ensure_available(3), Err(Error::IdsExhausted)));

        assert_eq!(ids.next_id().unwrap(), u64::MAX - 1);
        assert_eq!(ids.next_id().unwrap(), u64::MAX);
        assert!(matches!(ids.next_id(), Err(Error::IdsExhausted)));
    }

    #[test]
    fn test_company_abbreviation() {
        assert_eq!(company_abbreviation(&company("Acme Widget Co", None)), "AWC");
        assert_eq!(company_abbreviation(&company("Zebra", None)), "ZEB");
        assert_eq!(company_abbreviation(&company("Acme Widget Co", Some(" awx "))), "AWX");
        assert_eq!(company_abbreviation(&company("", Some("  "))), "CO");
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(invoice_number("AWC", 42), "AWC-INV-42");
    }
}
