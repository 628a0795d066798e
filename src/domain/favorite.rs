use super::account::{AccountId, Money};
use super::payment::PaymentCategory;
use serde::{Deserialize, Serialize};

/// A saved payment template. Paying from a favorite creates a new payment
/// with the same account, amount and category.
///
/// Field order is also the column order of the `favorites.dump` rows.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Favorite {
    pub id: String,
    pub account_id: AccountId,
    pub amount: Money,
    pub name: String,
    pub category: PaymentCategory,
}
