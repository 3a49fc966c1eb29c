//! # Spreadbook Pricing
//!
//! The valuation core for compound, spread-quoted trading structures:
//!
//! - [`expression`] - compound expression parsing into signed legs
//! - [`resolver`] - atom to template identity and absolute date range
//! - [`solver`] - implied-level solving so the traded spread is reproduced
//! - [`sizing`] - risk-based notional sizing via unit-notional probes
//! - [`position`] - swap position build state machine, point and series valuation
//! - [`futures`] - futures combinations valued off tick economics
//!
//! Everything is synchronous and takes its market collaborators through an
//! explicit [`MarketContext`]; there are no process-wide caches and no
//! ambient clock.
//!
//! ## Quick start
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use spreadbook_core::Date;
//! use spreadbook_market::{InMemoryMarket, ParRate, StaticTemplateRegistry};
//! use spreadbook_pricing::{MarketContext, SpreadQuote, SwapPosition};
//!
//! let today = Date::from_ymd(2025, 8, 7).unwrap();
//! let market = InMemoryMarket::new();
//! market.set_sensitivity("AUDIRS-SS", 450.0);
//! market.set_par_rate("aud.5y5y", ParRate::new(dec!(3.00), today));
//!
//! let ctx = MarketContext {
//!     catalog: &market,
//!     curve_quotes: &market,
//!     futures_quotes: &market,
//!     engine: &market,
//!     registry: StaticTemplateRegistry::global(),
//!     today,
//! };
//!
//! let mut position = SwapPosition::new("aud.5y5y.10y10y");
//! position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();
//! assert_eq!(position.legs()[0].level, dec!(3.15));
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod expression;
pub mod futures;
pub mod position;
pub mod resolver;
pub mod sizing;
pub mod solver;

pub use context::MarketContext;
pub use error::{PricingError, PricingResult};
pub use expression::{parse_curve_expression, parse_futures_expression, ParsedLeg};
pub use futures::{FuturesLeg, FuturesPosition, LotSize};
pub use position::{
    InstrumentClass, LegValuation, Position, PositionState, PositionValue, SeriesPoint,
    SpreadQuote, SwapPosition, ValuationIssue,
};
pub use resolver::{resolve_leg, resolve_legs, LegDescriptor};
pub use sizing::{
    size_and_build_leg, BuiltLeg, DEGENERATE_NOTIONAL_SCALE, SENSITIVITY_FLOOR, UNIT_NOTIONAL,
};
pub use solver::{
    solve_curve_levels, solve_for_spread, solve_target_index, LegLevel, LevelSource, SolvedLevels,
    FALLBACK_PAR_RATE,
};
