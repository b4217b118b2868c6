use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{datetime, Error, Member, Result, Retrieve};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentFilter {
    pub id: Option<u32>,
    pub member_id: Option<u32>,
    pub date_before: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
}

/// A manually recorded ledger row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub member_id: u32,
    pub amount: f64,
    pub date: NaiveDate,
    pub method: Option<String>,
    pub note: Option<String>,
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            id: 0,
            member_id: 0,
            amount: 0.0,
            date: datetime::today(),
            method: Some("Cash".to_string()),
            note: None,
        }
    }
}

impl Payment {
    pub fn new(member_id: u32, amount: f64) -> Self {
        Self {
            member_id,
            amount,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::validation(format!(
                "payment amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    /// Get the paying member
    pub async fn member<DB>(&self, db: &DB) -> Result<Member>
    where
        DB: Retrieve<Member, Key = u32>,
    {
        db.retrieve(self.member_id).await
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub method: Option<String>,
    pub note: Option<String>,
}

impl PaymentUpdate {
    pub fn apply(self, payment: &mut Payment) {
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(date) = self.date {
            payment.date = date;
        }
        if let Some(method) = self.method {
            payment.method = Some(method);
        }
        if let Some(note) = self.note {
            payment.note = Some(note);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_defaults() {
        let payment = Payment::new(1, 20.0);
        assert_eq!(payment.date, datetime::today());
        assert_eq!(payment.method.as_deref(), Some("Cash"));
        assert!(payment.validate().is_ok());
    }

    #[test]
    fn test_payment_amount_validation() {
        assert!(Payment::new(1, 0.0).validate().is_err());
        assert!(Payment::new(1, -5.0).validate().is_err());
        assert!(Payment::new(1, f64::NAN).validate().is_err());
    }
}
