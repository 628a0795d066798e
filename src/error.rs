use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("phone already registered")]
    PhoneRegistered,
    #[error("amount must be greater than zero")]
    AmountMustBePositive,
    #[error("account not found")]
    AccountNotFound,
    #[error("not enough balance")]
    NotEnoughBalance,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("favorite not found")]
    FavoriteNotFound,
    #[error("amount overflow")]
    AmountOverflow,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("malformed record in {file}: {reason}")]
    MalformedRecord { file: String, reason: String },
}

pub type Result<T> = std::result::Result<T, WalletError>;
