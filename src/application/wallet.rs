use super::aggregator::Aggregator;
use crate::domain::account::{Account, AccountId, Amount, Money, Phone};
use crate::domain::favorite::Favorite;
use crate::domain::payment::{Payment, PaymentCategory, PaymentStatus};
use crate::domain::ports::{AccountStoreBox, FavoriteStoreBox, PaymentSource, PaymentStoreBox};
use crate::error::{Result, WalletError};
use crate::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryFavoriteStore, InMemoryPaymentStore,
};
use crate::interfaces::csv::dump::{
    ACCOUNTS_DUMP, FAVORITES_DUMP, PAYMENTS_DUMP, read_dump, write_dump,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Counts of records merged by [`WalletService::import`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub replaced: usize,
    pub unchanged: usize,
}

impl ImportSummary {
    fn record<T: PartialEq>(&mut self, existing: Option<&T>, incoming: &T) -> bool {
        match existing {
            Some(current) if current == incoming => {
                self.unchanged += 1;
                false
            }
            Some(_) => {
                self.replaced += 1;
                true
            }
            None => {
                self.added += 1;
                true
            }
        }
    }
}

/// The ledger: owns accounts, payments and favorites and answers aggregate
/// queries over them.
///
/// Mutations are serialized behind a single write lock, so a read-check-write
/// sequence such as a payment debit never interleaves with another mutation.
pub struct WalletService {
    account_store: AccountStoreBox,
    payment_store: PaymentStoreBox,
    favorite_store: FavoriteStoreBox,
    last_account_id: AtomicI64,
    write_lock: Mutex<()>,
}

impl WalletService {
    /// Creates a new `WalletService` instance.
    ///
    /// # Arguments
    ///
    /// * `account_store` - The store for registered accounts.
    /// * `payment_store` - The store for payment history.
    /// * `favorite_store` - The store for favorite payment templates.
    pub fn new(
        account_store: AccountStoreBox,
        payment_store: PaymentStoreBox,
        favorite_store: FavoriteStoreBox,
    ) -> Self {
        Self {
            account_store,
            payment_store,
            favorite_store,
            last_account_id: AtomicI64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// A service backed by empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(InMemoryAccountStore::new()),
            Box::new(InMemoryPaymentStore::new()),
            Box::new(InMemoryFavoriteStore::new()),
        )
    }

    pub async fn register_account(&self, phone: Phone) -> Result<Account> {
        let _guard = self.write_lock.lock().await;

        if self.account_store.find_by_phone(&phone).await?.is_some() {
            return Err(WalletError::PhoneRegistered);
        }

        let id = self.last_account_id.fetch_add(1, Ordering::SeqCst) + 1;
        let account = Account::new(id, phone);
        self.account_store.store(account.clone()).await?;

        info!(account_id = id, "registered account");
        Ok(account)
    }

    pub async fn find_account_by_id(&self, id: AccountId) -> Result<Account> {
        self.account_store
            .get(id)
            .await?
            .ok_or(WalletError::AccountNotFound)
    }

    /// Credits an account. Deposits are not recorded as payments.
    pub async fn deposit(&self, id: AccountId, amount: Money) -> Result<()> {
        let amount = Amount::new(amount)?;
        let _guard = self.write_lock.lock().await;

        let mut account = self.find_account_by_id(id).await?;
        account.deposit(amount)?;
        self.account_store.store(account).await?;

        info!(account_id = id, amount = %amount.value(), "deposited");
        Ok(())
    }

    /// Debits an account and records an in-progress payment.
    pub async fn pay(
        &self,
        id: AccountId,
        amount: Money,
        category: impl Into<PaymentCategory>,
    ) -> Result<Payment> {
        let amount = Amount::new(amount)?;
        let _guard = self.write_lock.lock().await;

        let mut account = self.find_account_by_id(id).await?;
        account.debit(amount)?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            account_id: id,
            amount: amount.into(),
            category: category.into(),
            status: PaymentStatus::InProgress,
        };
        self.account_store.store(account).await?;
        self.payment_store.store(payment.clone()).await?;

        info!(account_id = id, payment_id = %payment.id, amount = %payment.amount, "payment created");
        Ok(payment)
    }

    pub async fn find_payment_by_id(&self, id: &str) -> Result<Payment> {
        self.payment_store
            .get(id)
            .await?
            .ok_or(WalletError::PaymentNotFound)
    }

    /// Marks a payment as failed and refunds its amount to the owner.
    ///
    /// Rejecting an already failed payment changes nothing.
    pub async fn reject(&self, payment_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut payment = self.find_payment_by_id(payment_id).await?;
        let mut account = self.find_account_by_id(payment.account_id).await?;
        if payment.status == PaymentStatus::Fail {
            debug!(payment_id, "payment already rejected");
            return Ok(());
        }

        payment.status = PaymentStatus::Fail;
        account.refund(payment.amount)?;
        self.payment_store.store(payment).await?;
        self.account_store.store(account).await?;

        info!(payment_id, "payment rejected");
        Ok(())
    }

    /// Pays again with the account, amount and category of an earlier payment.
    pub async fn repeat(&self, payment_id: &str) -> Result<Payment> {
        let payment = self.find_payment_by_id(payment_id).await?;
        self.pay(payment.account_id, payment.amount, payment.category)
            .await
    }

    /// Saves an earlier payment as a named template.
    pub async fn favorite_payment(&self, payment_id: &str, name: &str) -> Result<Favorite> {
        let payment = self.find_payment_by_id(payment_id).await?;
        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            account_id: payment.account_id,
            amount: payment.amount,
            name: name.to_string(),
            category: payment.category,
        };
        self.favorite_store.store(favorite.clone()).await?;

        info!(favorite_id = %favorite.id, payment_id, "favorite saved");
        Ok(favorite)
    }

    pub async fn find_favorite_by_id(&self, id: &str) -> Result<Favorite> {
        self.favorite_store
            .get(id)
            .await?
            .ok_or(WalletError::FavoriteNotFound)
    }

    pub async fn pay_from_favorite(&self, favorite_id: &str) -> Result<Payment> {
        let favorite = self.find_favorite_by_id(favorite_id).await?;
        self.pay(favorite.account_id, favorite.amount, favorite.category)
            .await
    }

    /// Sums all payment amounts across `workers` concurrent workers.
    pub async fn sum_payments(&self, workers: usize) -> Result<Money> {
        Aggregator::new(self).sum_all(workers).await
    }

    /// Lists an account's payments, filtered across `workers` concurrent workers.
    pub async fn filter_payments(
        &self,
        account_id: AccountId,
        workers: usize,
    ) -> Result<Vec<Payment>> {
        Aggregator::new(self)
            .filter_by_account(account_id, workers)
            .await
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.account_store.get_all().await
    }

    pub async fn favorites(&self) -> Result<Vec<Favorite>> {
        self.favorite_store.get_all().await
    }

    /// Writes `accounts.dump`, `payments.dump` and `favorites.dump` into `dir`.
    ///
    /// All three files are always rewritten, even when a collection is empty.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref().to_path_buf();
        let _guard = self.write_lock.lock().await;

        let dumps = Dumps {
            accounts: self.account_store.get_all().await?,
            payments: self.payment_store.get_all().await?,
            favorites: self.favorite_store.get_all().await?,
        };
        let (accounts, payments, favorites) = dumps.counts();
        let target = dir.clone();
        tokio::task::spawn_blocking(move || dumps.write(&target)).await??;

        info!(
            dir = %dir.display(),
            accounts,
            payments,
            favorites,
            "exported ledger"
        );
        Ok(())
    }

    /// Merges the dumps found in `dir` into the ledger.
    ///
    /// Missing files are skipped. Records with a new id are added, records
    /// whose id exists with different content replace the stored one.
    ///
    /// All three dumps are read and validated before anything is stored, so a
    /// failed import leaves the ledger as it was.
    pub async fn import(&self, dir: impl AsRef<Path>) -> Result<ImportSummary> {
        let dir = dir.as_ref().to_path_buf();
        let _guard = self.write_lock.lock().await;

        let source = dir.clone();
        let dumps = tokio::task::spawn_blocking(move || Dumps::read(&source)).await??;
        self.validate(&dumps).await?;

        let mut summary = ImportSummary::default();
        for account in dumps.accounts {
            let existing = self.account_store.get(account.id).await?;
            if summary.record(existing.as_ref(), &account) {
                if existing.is_some() {
                    warn!(account_id = account.id, "replacing account from dump");
                }
                self.last_account_id.fetch_max(account.id, Ordering::SeqCst);
                self.account_store.store(account).await?;
            }
        }

        for payment in dumps.payments {
            let existing = self.payment_store.get(&payment.id).await?;
            if summary.record(existing.as_ref(), &payment) {
                if existing.is_some() {
                    warn!(payment_id = %payment.id, "replacing payment from dump");
                }
                self.payment_store.store(payment).await?;
            }
        }

        for favorite in dumps.favorites {
            let existing = self.favorite_store.get(&favorite.id).await?;
            if summary.record(existing.as_ref(), &favorite) {
                if existing.is_some() {
                    warn!(favorite_id = %favorite.id, "replacing favorite from dump");
                }
                self.favorite_store.store(favorite).await?;
            }
        }

        info!(
            dir = %dir.display(),
            added = summary.added,
            replaced = summary.replaced,
            unchanged = summary.unchanged,
            "imported ledger"
        );
        Ok(summary)
    }

    /// Checks imported records against the ledger invariants: non-negative
    /// balances, positive payment and favorite amounts, and one account per
    /// phone once the dump is merged over the stored accounts.
    async fn validate(&self, dumps: &Dumps) -> Result<()> {
        for account in &dumps.accounts {
            if account.balance < Money::ZERO {
                return Err(malformed(
                    ACCOUNTS_DUMP,
                    format!(
                        "account {} has negative balance {}",
                        account.id, account.balance
                    ),
                ));
            }
        }

        let stored = self.account_store.get_all().await?;
        let mut phones: BTreeMap<AccountId, &Phone> =
            stored.iter().map(|a| (a.id, &a.phone)).collect();
        for account in &dumps.accounts {
            phones.insert(account.id, &account.phone);
        }
        let mut owners: HashMap<&Phone, AccountId> = HashMap::new();
        for (id, phone) in phones {
            if let Some(owner) = owners.insert(phone, id) {
                return Err(malformed(
                    ACCOUNTS_DUMP,
                    format!("phone {phone} belongs to accounts {owner} and {id}"),
                ));
            }
        }

        for payment in &dumps.payments {
            ensure_positive(PAYMENTS_DUMP, &payment.id, payment.amount)?;
        }
        for favorite in &dumps.favorites {
            ensure_positive(FAVORITES_DUMP, &favorite.id, favorite.amount)?;
        }
        Ok(())
    }
}

/// The three ledger collections as they are laid out on disk.
struct Dumps {
    accounts: Vec<Account>,
    payments: Vec<Payment>,
    favorites: Vec<Favorite>,
}

impl Dumps {
    fn read(dir: &Path) -> Result<Self> {
        Ok(Self {
            accounts: read_dump(&dir.join(ACCOUNTS_DUMP))?.unwrap_or_default(),
            payments: read_dump(&dir.join(PAYMENTS_DUMP))?.unwrap_or_default(),
            favorites: read_dump(&dir.join(FAVORITES_DUMP))?.unwrap_or_default(),
        })
    }

    fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        write_dump(&dir.join(ACCOUNTS_DUMP), &self.accounts)?;
        write_dump(&dir.join(PAYMENTS_DUMP), &self.payments)?;
        write_dump(&dir.join(FAVORITES_DUMP), &self.favorites)
    }

    fn counts(&self) -> (usize, usize, usize) {
        (self.accounts.len(), self.payments.len(), self.favorites.len())
    }
}

fn ensure_positive(file: &str, id: &str, amount: Money) -> Result<()> {
    if amount > Money::ZERO {
        Ok(())
    } else {
        Err(malformed(file, format!("record {id} has non-positive amount {amount}")))
    }
}

fn malformed(file: &str, reason: String) -> WalletError {
    WalletError::MalformedRecord {
        file: file.to_string(),
        reason,
    }
}

#[async_trait]
impl PaymentSource for WalletService {
    async fn payments(&self) -> Result<Arc<[Payment]>> {
        Ok(self.payment_store.get_all().await?.into())
    }

    async fn find_account(&self, id: AccountId) -> Result<Account> {
        self.find_account_by_id(id).await
    }
}
