//! # Spreadbook Portfolio
//!
//! Trade grouping and portfolio-level P&L aggregation.
//!
//! A [`Trade`] composes a primary side and an optional secondary side of a
//! different instrument class (the exchange-for-physical shape), each side
//! holding any number of concurrently open positions with independent
//! insertion dates. A [`Portfolio`] keys trades by ID and aggregates point
//! P&L across all of them, zero-filling and recording failures instead of
//! aborting.
//!
//! Historical series from multiple positions are combined by date; the
//! union-versus-intersection choice is an explicit [`SeriesMergePolicy`]
//! on each trade.

#![warn(missing_docs)]

pub mod error;
pub mod portfolio;
pub mod trade;

pub use error::{PortfolioError, PortfolioResult};
pub use portfolio::{Portfolio, PortfolioSummary, TradeBreakdown};
pub use trade::{
    OpenPosition, PositionPnl, SeriesMergePolicy, Side, Trade, TradePnl, TradeSeries,
};
