use super::account::{AccountId, Money};
use serde::{Deserialize, Serialize};

pub type PaymentCategory = String;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum PaymentStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail,
    #[default]
    #[serde(rename = "InProgress")]
    InProgress,
}

/// A payment made from an account.
///
/// The amount never changes after creation; only `status` transitions.
/// Field order is also the column order of the `payments.dump` rows.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Payment {
    pub id: String,
    pub account_id: AccountId,
    pub amount: Money,
    pub category: PaymentCategory,
    pub status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_row_deserialization() {
        let row = "p-1;7;2500;auto;InProgress\n";
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_reader(row.as_bytes());
        let mut iter = reader.deserialize();

        let payment: Payment = iter
            .next()
            .unwrap()
            .expect("Failed to deserialize payment");

        assert_eq!(payment.id, "p-1");
        assert_eq!(payment.account_id, 7);
        assert_eq!(payment.amount, Money::new(2500));
        assert_eq!(payment.status, PaymentStatus::InProgress);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Ok).unwrap(), "\"OK\"");
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Fail).unwrap(),
            "\"FAIL\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::InProgress).unwrap(),
            "\"InProgress\""
        );
    }
}
