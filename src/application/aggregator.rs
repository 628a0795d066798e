use super::partition::Partitioner;
use crate::domain::account::{AccountId, Money};
use crate::domain::payment::Payment;
use crate::domain::ports::PaymentSource;
use crate::error::{Result, WalletError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::debug;

/// Answers aggregate queries over a payment source by splitting the payment
/// snapshot across concurrent workers and merging their partial results.
///
/// Each worker computes over its own chunk without holding any lock, then
/// takes the shared accumulator's lock only to merge. Every call waits for
/// all of its workers before returning.
pub struct Aggregator<'a> {
    source: &'a dyn PaymentSource,
}

impl<'a> Aggregator<'a> {
    pub fn new(source: &'a dyn PaymentSource) -> Self {
        Self { source }
    }

    /// Sums every payment amount using up to `workers` workers.
    ///
    /// Zero or one worker sums sequentially. The result is the arithmetic sum
    /// for every worker count, or `AmountOverflow` if it leaves the `i64` range.
    pub async fn sum_all(&self, workers: usize) -> Result<Money> {
        let payments = self.source.payments().await?;
        sum_payments(payments, workers).await
    }

    /// Returns the payments owned by `account_id`, in creation order.
    ///
    /// Fails with `AccountNotFound` if the account is not registered. A
    /// registered account without payments yields an empty list.
    pub async fn filter_by_account(
        &self,
        account_id: AccountId,
        workers: usize,
    ) -> Result<Vec<Payment>> {
        self.source.find_account(account_id).await?;

        let payments = self.source.payments().await?;
        let owned: Arc<[Payment]> = payments
            .iter()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();

        debug!(
            account_id,
            matched = owned.len(),
            scanned = payments.len(),
            "filtered payments by account"
        );
        collect_payments(owned, workers).await
    }
}

/// Sums a payment snapshot, one worker per chunk.
///
/// Partial sums and the merge into the total are both checked. The first
/// overflow fails the whole call.
pub async fn sum_payments(payments: Arc<[Payment]>, workers: usize) -> Result<Money> {
    let chunks = Partitioner::for_workers(workers).split(payments.len());
    debug!(
        payments = payments.len(),
        workers,
        chunks = chunks.len(),
        "summing payments"
    );

    let total = Arc::new(Mutex::new(Money::ZERO));
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();
    for chunk in chunks {
        let payments = Arc::clone(&payments);
        let total = Arc::clone(&total);
        tasks.spawn(async move {
            let partial = Money::checked_sum(payments[chunk].iter().map(|p| p.amount))?;
            let mut total = total.lock().await;
            *total = total.checked_add(partial)?;
            Ok(())
        });
    }
    join_all(tasks).await?;

    let total = *total.lock().await;
    Ok(total)
}

/// Copies a payment snapshot through one worker per chunk.
///
/// Partial lists are merged by chunk index, so the output order matches the
/// snapshot regardless of which worker finishes first.
pub async fn collect_payments(payments: Arc<[Payment]>, workers: usize) -> Result<Vec<Payment>> {
    let chunks = Partitioner::for_workers(workers).split(payments.len());
    debug!(
        payments = payments.len(),
        workers,
        chunks = chunks.len(),
        "collecting payments"
    );

    let merged = Arc::new(Mutex::new(vec![Vec::<Payment>::new(); chunks.len()]));
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();
    for (index, chunk) in chunks.into_iter().enumerate() {
        let payments = Arc::clone(&payments);
        let merged = Arc::clone(&merged);
        tasks.spawn(async move {
            let partial = payments[chunk].to_vec();
            merged.lock().await[index] = partial;
            Ok(())
        });
    }
    join_all(tasks).await?;

    let parts = std::mem::take(&mut *merged.lock().await);
    Ok(parts.into_iter().flatten().collect())
}

/// Waits for every task, then reports the first failure in join order.
async fn join_all(mut tasks: JoinSet<Result<()>>) -> Result<()> {
    let mut outcome = Ok(());
    while let Some(joined) = tasks.join_next().await {
        let result = joined.map_err(WalletError::from).and_then(|done| done);
        if outcome.is_ok() {
            outcome = result;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;

    fn snapshot(amounts: &[(AccountId, i64)]) -> Arc<[Payment]> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &(account_id, amount))| Payment {
                id: format!("p-{i}"),
                account_id,
                amount: Money::new(amount),
                category: "auto".to_string(),
                status: PaymentStatus::InProgress,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_sum_empty_snapshot_is_zero() {
        for workers in [0, 1, 2, 7] {
            let total = sum_payments(snapshot(&[]), workers).await.unwrap();
            assert_eq!(total, Money::ZERO);
        }
    }

    #[tokio::test]
    async fn test_sum_sequential() {
        let payments = snapshot(&[(1, 100), (2, 250), (1, 650)]);
        let total = sum_payments(payments, 0).await.unwrap();
        assert_eq!(total, Money::new(1_000));
    }

    #[tokio::test]
    async fn test_concurrent_sum_matches_sequential() {
        // Each worker sums only its own chunk, so no scaling is applied for k > 1
        let payments = snapshot(&[(11, 100_000); 10]);
        let sequential = sum_payments(Arc::clone(&payments), 0).await.unwrap();
        for workers in 2..=12 {
            let concurrent = sum_payments(Arc::clone(&payments), workers).await.unwrap();
            assert_eq!(concurrent, sequential, "workers = {workers}");
        }
        assert_eq!(sequential, Money::new(1_000_000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sum_overflow_is_an_error_for_every_worker_count() {
        // Each chunk fits on its own, so some worker counts only overflow at the merge
        let payments = snapshot(&[(1, i64::MAX), (1, i64::MAX), (2, 1)]);
        for workers in [0, 1, 2, 3, 8] {
            let result = sum_payments(Arc::clone(&payments), workers).await;
            assert!(
                matches!(result, Err(WalletError::AmountOverflow)),
                "workers = {workers}"
            );
        }
    }

    #[tokio::test]
    async fn test_sum_negative_partial_cancels_before_overflow() {
        let payments = snapshot(&[(1, i64::MAX), (1, -1), (1, 1)]);
        let total = sum_payments(payments, 0).await.unwrap();
        assert_eq!(total, Money::new(i64::MAX));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_collect_preserves_snapshot_order() {
        let payments = snapshot(&(0..97).map(|i| (1, i)).collect::<Vec<_>>());
        for workers in [0, 1, 3, 8, 97, 200] {
            let collected = collect_payments(Arc::clone(&payments), workers).await.unwrap();
            assert_eq!(collected.as_slice(), &payments[..], "workers = {workers}");
        }
    }

    #[tokio::test]
    async fn test_collect_empty_snapshot() {
        let collected = collect_payments(snapshot(&[]), 3).await.unwrap();
        assert!(collected.is_empty());
    }
}
