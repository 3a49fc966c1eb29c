//! Quote provider interfaces for curve instruments and futures contracts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};
use spreadbook_core::Date;

/// An observed par rate for a curve instrument atom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParRate {
    /// Par rate in percentage points (e.g. 3.15 for 3.15%).
    pub rate: Decimal,
    /// Date the observation belongs to.
    pub as_of: Date,
}

impl ParRate {
    /// Creates a new par rate observation.
    #[must_use]
    pub fn new(rate: Decimal, as_of: Date) -> Self {
        Self { rate, as_of }
    }
}

/// Provider of standalone par rates for curve instrument atoms
/// (e.g. "aud.5y5y", "usd.0y10y").
pub trait CurveQuoteProvider: Send + Sync {
    /// Most recent par rate for the given atom.
    fn par_rate(&self, atom: &str) -> MarketResult<ParRate>;
}

/// Contract details for a listed futures instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Last traded (mid) price.
    pub last_price: Decimal,
    /// Minimum price increment.
    pub tick_size: Decimal,
    /// Value of one tick per lot, in portfolio currency.
    pub tick_value: Decimal,
}

impl ContractSpec {
    /// Creates a new contract spec.
    #[must_use]
    pub fn new(last_price: Decimal, tick_size: Decimal, tick_value: Decimal) -> Self {
        Self {
            last_price,
            tick_size,
            tick_value,
        }
    }
}

/// Provider of futures contract prices and tick economics.
pub trait FuturesQuoteProvider: Send + Sync {
    /// Current contract details for the given symbol (e.g. "xmz5 comdty").
    fn contract_spec(&self, symbol: &str) -> MarketResult<ContractSpec>;

    /// Contract details as of a historical snapshot date.
    ///
    /// Providers without dated futures marks keep the default, which
    /// reports the quote as unavailable; series valuation omits such dates.
    fn contract_spec_at(&self, symbol: &str, date: Date) -> MarketResult<ContractSpec> {
        Err(MarketError::quote_unavailable(
            symbol,
            format!("no historical mark for {date}"),
        ))
    }
}
