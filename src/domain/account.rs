use crate::error::WalletError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AccountId = i64;

/// A signed monetary value in minor currency units.
///
/// Balances and payment totals are kept as whole minor units so that
/// aggregation is exact integer arithmetic. Arithmetic is checked: a result
/// outside the `i64` range is `WalletError::AmountOverflow`, never a wrap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(pub i64);

/// A strictly positive monetary amount, as accepted by deposits and payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Money);

impl Amount {
    pub fn new(value: Money) -> Result<Self, WalletError> {
        if value > Money::ZERO {
            Ok(Self(value))
        } else {
            Err(WalletError::AmountMustBePositive)
        }
    }

    pub fn value(&self) -> Money {
        self.0
    }
}

impl TryFrom<Money> for Amount {
    type Error = WalletError;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// The value in major units with two decimal places.
    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, WalletError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(WalletError::AmountOverflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, WalletError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(WalletError::AmountOverflow)
    }

    /// Sums the values, failing on the first partial total that overflows.
    pub fn checked_sum<I>(values: I) -> Result<Self, WalletError>
    where
        I: IntoIterator<Item = Self>,
    {
        values
            .into_iter()
            .try_fold(Self::ZERO, |total, value| total.checked_add(value))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A phone number, unique across registered accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone(pub String);

impl From<&str> for Phone {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered wallet account.
///
/// Field order is also the column order of the `accounts.dump` rows.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Account {
    pub id: AccountId,
    pub phone: Phone,
    pub balance: Money,
}

impl Account {
    pub fn new(id: AccountId, phone: Phone) -> Self {
        Self {
            id,
            phone,
            balance: Money::ZERO,
        }
    }

    /// Credits the balance. On overflow the balance is left untouched.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), WalletError> {
        self.balance = self.balance.checked_add(amount.value())?;
        Ok(())
    }

    /// Debits the balance if it covers the amount.
    pub fn debit(&mut self, amount: Amount) -> Result<(), WalletError> {
        if self.balance < amount.value() {
            return Err(WalletError::NotEnoughBalance);
        }
        self.balance = self.balance.checked_sub(amount.value())?;
        Ok(())
    }

    /// Returns a previously debited amount to the balance.
    pub fn refund(&mut self, amount: Money) -> Result<(), WalletError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }
}
