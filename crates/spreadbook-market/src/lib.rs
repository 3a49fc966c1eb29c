//! # Spreadbook Market
//!
//! Collaborator interfaces the pricing core consumes:
//!
//! - [`SnapshotCatalog`]: dated market/curve snapshots available for valuation
//! - [`CurveQuoteProvider`]: standalone par rates for curve instrument atoms
//! - [`FuturesQuoteProvider`]: futures prices and tick economics
//! - [`ValuationEngine`]: instrument creation, present value, risk sensitivity
//! - [`TemplateRegistry`]: currency/sub-code to curve template lookup
//!
//! All interfaces are synchronous; retries, timeouts, and loading
//! concurrency belong to the providers behind them. An [`InMemoryMarket`]
//! fixture implementing every trait ships for tests and development.

#![warn(missing_docs)]

pub mod error;
pub mod ids;
pub mod memory;
pub mod quotes;
pub mod snapshot;
pub mod templates;
pub mod valuation;

pub use error::{MarketError, MarketResult};
pub use ids::{InstrumentHandle, TemplateId, TradeId};
pub use memory::InMemoryMarket;
pub use quotes::{ContractSpec, CurveQuoteProvider, FuturesQuoteProvider, ParRate};
pub use snapshot::SnapshotCatalog;
pub use templates::{CurveTemplate, StaticTemplateRegistry, TemplateRegistry};
pub use valuation::{InstrumentSpec, ValuationEngine};
