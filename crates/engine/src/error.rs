//! The module contains the error the engine can throw.
//!
//! The errors fall into a few families:
//!
//! - validation errors ([`InvalidName`], [`InvalidAmount`],
//!   [`InvalidChargeCycle`], [`UnknownCategory`], [`InvalidRole`],
//!   [`InvalidId`], [`InvalidDateRange`]) thrown when caller input cannot be
//!   accepted.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ExistingKey`] thrown when a uniqueness rule would be broken.
//! - [`Unauthorized`] and [`Forbidden`] thrown when the caller lacks the
//!   role required on a budget.
//! - [`DependencyUnavailable`] thrown when the transaction provider fails or
//!   times out.
//! - [`Encryption`] thrown when a stored access token cannot be sealed or
//!   opened.
//!
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidChargeCycle`]: EngineError::InvalidChargeCycle
//!  [`UnknownCategory`]: EngineError::UnknownCategory
//!  [`InvalidRole`]: EngineError::InvalidRole
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidDateRange`]: EngineError::InvalidDateRange
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`DependencyUnavailable`]: EngineError::DependencyUnavailable
//!  [`Encryption`]: EngineError::Encryption
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("expense_charge_cycle {0} is not valid")]
    InvalidChargeCycle(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidChargeCycle(a), Self::InvalidChargeCycle(b)) => a == b,
            (Self::UnknownCategory(a), Self::UnknownCategory(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidDateRange(a), Self::InvalidDateRange(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::DependencyUnavailable(a), Self::DependencyUnavailable(b)) => a == b,
            (Self::Encryption(a), Self::Encryption(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
