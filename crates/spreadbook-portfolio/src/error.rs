//! Error types for trade and portfolio operations.

use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that can occur while composing trades and portfolios.
#[derive(Error, Debug, Clone)]
pub enum PortfolioError {
    /// A trade with this ID is already in the portfolio.
    #[error("Duplicate trade: {id}")]
    DuplicateTrade {
        /// The duplicated trade ID.
        id: String,
    },

    /// No trade with this ID exists.
    #[error("Unknown trade: {id}")]
    UnknownTrade {
        /// The missing trade ID.
        id: String,
    },

    /// A position's instrument class does not fit the trade's structure.
    #[error("Instrument class mismatch on trade '{id}': {reason}")]
    InstrumentClassMismatch {
        /// The trade ID.
        id: String,
        /// Why the position does not fit.
        reason: String,
    },
}

impl PortfolioError {
    /// Creates a duplicate trade error.
    #[must_use]
    pub fn duplicate_trade(id: impl Into<String>) -> Self {
        Self::DuplicateTrade { id: id.into() }
    }

    /// Creates an unknown trade error.
    #[must_use]
    pub fn unknown_trade(id: impl Into<String>) -> Self {
        Self::UnknownTrade { id: id.into() }
    }

    /// Creates an instrument class mismatch error.
    #[must_use]
    pub fn class_mismatch(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstrumentClassMismatch {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
