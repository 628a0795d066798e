use super::account::{Account, AccountId, Phone};
use super::favorite::Favorite;
use super::payment::Payment;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, account: Account) -> Result<()>;
    async fn get(&self, id: AccountId) -> Result<Option<Account>>;
    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>>;
    /// All accounts, ascending by id.
    async fn get_all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Payment>>;
    /// All payments, in insertion order.
    async fn get_all(&self) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn store(&self, favorite: Favorite) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Favorite>>;
    /// All favorites, in insertion order.
    async fn get_all(&self) -> Result<Vec<Favorite>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type FavoriteStoreBox = Box<dyn FavoriteStore>;

/// Read access to a ledger's payments, as consumed by the aggregator.
///
/// The aggregator only ever sees an immutable snapshot, never the store that
/// produced it.
#[async_trait]
pub trait PaymentSource: Send + Sync {
    /// A stable snapshot of every payment, in insertion order.
    async fn payments(&self) -> Result<Arc<[Payment]>>;

    /// Resolves a registered account, or fails with `AccountNotFound`.
    async fn find_account(&self, id: AccountId) -> Result<Account>;
}
