use crate::domain::account::{Account, AccountId, Phone};
use crate::domain::favorite::Favorite;
use crate::domain::payment::Payment;
use crate::domain::ports::{AccountStore, FavoriteStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for accounts.
///
/// Uses `Arc<RwLock<BTreeMap<AccountId, Account>>>` so `get_all` comes back
/// ordered by id without sorting.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<BTreeMap<AccountId, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &Phone) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| &a.phone == phone).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}

/// Insertion-ordered records with an id index. Storing an existing id
/// replaces the record in place.
#[derive(Debug)]
struct Journal<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone> Journal<T> {
    fn upsert(&mut self, id: &str, item: T) {
        match self.index.get(id) {
            Some(&position) => self.items[position] = item,
            None => {
                self.index.insert(id.to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    fn get(&self, id: &str) -> Option<T> {
        self.index.get(id).map(|&position| self.items[position].clone())
    }

    fn all(&self) -> Vec<T> {
        self.items.clone()
    }
}

/// A thread-safe in-memory store for payments, kept in creation order.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<Journal<Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        let id = payment.id.clone();
        payments.upsert(&id, payment);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id))
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.all())
    }
}

/// A thread-safe in-memory store for favorites, kept in creation order.
#[derive(Default, Clone)]
pub struct InMemoryFavoriteStore {
    favorites: Arc<RwLock<Journal<Favorite>>>,
}

impl InMemoryFavoriteStore {
    /// Creates a new, empty in-memory favorite store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteStore for InMemoryFavoriteStore {
    async fn store(&self, favorite: Favorite) -> Result<()> {
        let mut favorites = self.favorites.write().await;
        let id = favorite.id.clone();
        favorites.upsert(&id, favorite);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites.get(id))
    }

    async fn get_all(&self) -> Result<Vec<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Money;
    use crate::domain::payment::PaymentStatus;

    fn payment(id: &str, amount: i64) -> Payment {
        Payment {
            id: id.to_string(),
            account_id: 1,
            amount: Money::new(amount),
            category: "auto".to_string(),
            status: PaymentStatus::InProgress,
        }
    }

    #[tokio::test]
    async fn test_in_memory_account_store() {
        let store = InMemoryAccountStore::new();
        let mut account = Account::new(1, Phone::from("+1"));
        account.balance = Money::new(100);

        store.store(account.clone()).await.unwrap();
        let retrieved = store.get(1).await.unwrap().unwrap();
        assert_eq!(retrieved, account);

        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_account_store_find_by_phone() {
        let store = InMemoryAccountStore::new();
        store.store(Account::new(1, Phone::from("+1"))).await.unwrap();

        let found = store.find_by_phone(&Phone::from("+1")).await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(1));
        assert!(
            store
                .find_by_phone(&Phone::from("+2"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_in_memory_account_store_get_all_ordered() {
        let store = InMemoryAccountStore::new();
        store.store(Account::new(3, Phone::from("+3"))).await.unwrap();
        store.store(Account::new(1, Phone::from("+1"))).await.unwrap();
        store.store(Account::new(2, Phone::from("+2"))).await.unwrap();

        let ids: Vec<AccountId> = store.get_all().await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_in_memory_payment_store_preserves_insertion_order() {
        let store = InMemoryPaymentStore::new();
        store.store(payment("b", 1)).await.unwrap();
        store.store(payment("a", 2)).await.unwrap();
        store.store(payment("c", 3)).await.unwrap();

        let ids: Vec<String> = store.get_all().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_in_memory_payment_store_replaces_in_place() {
        let store = InMemoryPaymentStore::new();
        store.store(payment("a", 1)).await.unwrap();
        store.store(payment("b", 2)).await.unwrap();

        let mut failed = payment("a", 1);
        failed.status = PaymentStatus::Fail;
        store.store(failed.clone()).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], failed);
        assert_eq!(store.get("a").await.unwrap(), Some(failed));
    }

    #[tokio::test]
    async fn test_in_memory_favorite_store() {
        let store = InMemoryFavoriteStore::new();
        let favorite = Favorite {
            id: "f-1".to_string(),
            account_id: 1,
            amount: Money::new(10),
            name: "phone bill".to_string(),
            category: "mobile".to_string(),
        };

        store.store(favorite.clone()).await.unwrap();
        assert_eq!(store.get("f-1").await.unwrap(), Some(favorite));
        assert!(store.get("f-2").await.unwrap().is_none());
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
