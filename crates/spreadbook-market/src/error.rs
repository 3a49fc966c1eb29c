//! Error types for market data and valuation providers.

use thiserror::Error;

/// A specialized Result type for provider operations.
pub type MarketResult<T> = Result<T, MarketError>;

/// Errors returned by market data and valuation collaborators.
#[derive(Error, Debug, Clone)]
pub enum MarketError {
    /// No standalone quote is available for an instrument.
    #[error("Quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable {
        /// Instrument atom or contract symbol.
        symbol: String,
        /// Description of why the quote is missing.
        reason: String,
    },

    /// Currency or sub-code has no template mapping.
    #[error("Unknown currency code: {code}")]
    UnknownCurrency {
        /// The unrecognized currency/sub-code.
        code: String,
    },

    /// The valuation engine rejected an instrument creation request.
    #[error("Instrument build rejected: {reason}")]
    BuildRejected {
        /// Description of the rejection.
        reason: String,
    },

    /// A present-value or risk query failed.
    #[error("Valuation failed: {reason}")]
    ValuationFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl MarketError {
    /// Creates a quote unavailable error.
    #[must_use]
    pub fn quote_unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::QuoteUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown currency error.
    #[must_use]
    pub fn unknown_currency(code: impl Into<String>) -> Self {
        Self::UnknownCurrency { code: code.into() }
    }

    /// Creates a build rejected error.
    #[must_use]
    pub fn build_rejected(reason: impl Into<String>) -> Self {
        Self::BuildRejected {
            reason: reason.into(),
        }
    }

    /// Creates a valuation failed error.
    #[must_use]
    pub fn valuation_failed(reason: impl Into<String>) -> Self {
        Self::ValuationFailed {
            reason: reason.into(),
        }
    }
}
