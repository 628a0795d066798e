//! Application layer containing the ledger orchestration and the concurrent
//! aggregation of payments.
//!
//! `WalletService` is the entry point for account, payment and favorite
//! operations. Aggregate queries are answered by the `Aggregator`, which
//! splits a payment snapshot with the `Partitioner` and fans the chunks out
//! to `tokio` tasks that merge into a mutex-guarded accumulator.

pub mod aggregator;
pub mod partition;
pub mod wallet;
