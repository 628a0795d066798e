#![allow(dead_code)]

use async_trait::async_trait;
use rand::Rng;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use wallet::domain::account::{Account, AccountId, Money, Phone};
use wallet::domain::payment::{Payment, PaymentStatus};
use wallet::domain::ports::PaymentSource;
use wallet::error::{Result, WalletError};

/// A fixed set of accounts and payments exposed through the `PaymentSource` port.
pub struct FixedSource {
    pub accounts: Vec<Account>,
    pub payments: Arc<[Payment]>,
}

impl FixedSource {
    pub fn new(account_ids: &[AccountId], payments: Vec<Payment>) -> Self {
        let accounts = account_ids
            .iter()
            .map(|&id| Account::new(id, Phone(format!("+{id}"))))
            .collect();
        Self {
            accounts,
            payments: payments.into(),
        }
    }
}

#[async_trait]
impl PaymentSource for FixedSource {
    async fn payments(&self) -> Result<Arc<[Payment]>> {
        Ok(Arc::clone(&self.payments))
    }

    async fn find_account(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(WalletError::AccountNotFound)
    }
}

pub fn payment(id: usize, account_id: AccountId, amount: i64) -> Payment {
    Payment {
        id: format!("p-{id}"),
        account_id,
        amount: Money::new(amount),
        category: "auto".to_string(),
        status: PaymentStatus::InProgress,
    }
}

/// One acct-11 payment, eight acct-12 payments, one acct-11 payment, each 100000.
pub fn mixed_payments() -> Vec<Payment> {
    let mut payments = vec![payment(0, 11, 100_000)];
    payments.extend((1..=8).map(|i| payment(i, 12, 100_000)));
    payments.push(payment(9, 11, 100_000));
    payments
}

/// `rows` payments with random owners in `1..=accounts` and random positive amounts.
pub fn random_payments(rows: usize, accounts: AccountId) -> Vec<Payment> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|i| payment(i, rng.gen_range(1..=accounts), rng.gen_range(1..1_000_000)))
        .collect()
}

/// Writes dump files directly, bypassing the service.
pub fn write_dumps(dir: &Path, accounts: &str, payments: &str, favorites: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("accounts.dump"), accounts).unwrap();
    fs::write(dir.join("payments.dump"), payments).unwrap();
    fs::write(dir.join("favorites.dump"), favorites).unwrap();
}
