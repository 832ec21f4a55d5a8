use thiserror::Error;

/// Failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    InsufficientFunds,
    NotAuthorized,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid_input",
            Self::InsufficientFunds => "insufficient_funds",
            Self::NotAuthorized => "not_authorized",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("cosmetic not found: {0}")]
    CosmeticNotFound(i64),

    #[error("trade not found: {0}")]
    TradeNotFound(i64),

    #[error("game not found: {0}")]
    GameNotFound(i64),

    #[error("{item} {id} is already owned")]
    AlreadyOwned { item: &'static str, id: i64 },

    #[error("trade {0} is no longer pending")]
    TradeNotPending(i64),

    #[error("cosmetic {cosmetic_id} is not held by user {user_id}")]
    CosmeticNotOwned { user_id: String, cosmetic_id: i64 },

    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EconomyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_)
            | Self::CosmeticNotFound(_)
            | Self::TradeNotFound(_)
            | Self::GameNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyOwned { .. } | Self::TradeNotPending(_) | Self::CosmeticNotOwned { .. } => {
                ErrorKind::Conflict
            }
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::NotAuthorized(_) => ErrorKind::NotAuthorized,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Storage(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type EconomyResult<T> = Result<T, EconomyError>;
