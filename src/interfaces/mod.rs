//! Adapters between the ledger and the outside world: dump files and CLI
//! reports.

pub mod csv;
