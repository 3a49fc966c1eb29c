//! Swap valuation positions.
//!
//! A [`SwapPosition`] owns every leg of one compound expression instance.
//! Building runs parse -> resolve -> solve -> size for each leg; any leg
//! error fails the whole position (there is no partial build). Valuation of
//! a built position is the opposite: per-leg errors are collected and
//! skipped so a partial total is still reported.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::MarketContext;
use crate::error::{PricingError, PricingResult};
use crate::expression::parse_curve_expression;
use crate::futures::FuturesPosition;
use crate::resolver::resolve_legs;
use crate::sizing::{size_and_build_leg, BuiltLeg};
use crate::solver::{solve_curve_levels, SolvedLevels};
use rust_decimal::Decimal;
use spreadbook_core::Date;
use spreadbook_market::ValuationEngine;

/// The single traded value for a compound expression, plus the risk amount
/// to run. Each quote drives exactly one solve and one sizing pass; a new
/// quote means a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadQuote {
    /// Traded spread value in percentage points.
    pub value: Decimal,
    /// Requested risk amount (sensitivity per basis point to run).
    pub risk_size: f64,
}

impl SpreadQuote {
    /// Creates a new spread quote.
    #[must_use]
    pub fn new(value: Decimal, risk_size: f64) -> Self {
        Self { value, risk_size }
    }
}

/// Build state of a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PositionState {
    /// Never built.
    Unbuilt,
    /// All legs built; the position is usable for valuation.
    Built,
    /// A leg failed; the position is unusable (no partial aggregation).
    Failed(PricingError),
}

impl PositionState {
    /// Whether the position is usable for valuation.
    #[must_use]
    pub fn is_built(&self) -> bool {
        matches!(self, PositionState::Built)
    }
}

/// Value contribution of one leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegValuation {
    /// Instrument atom or contract symbol.
    pub atom: String,
    /// Present value of the leg.
    pub value: f64,
}

/// A recorded per-leg valuation problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationIssue {
    /// Instrument atom or contract symbol.
    pub atom: String,
    /// Description of the problem.
    pub error: String,
}

/// Point-in-time value of a position: the partial total over the legs that
/// valued, plus whatever went wrong with the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValue {
    /// Sum of the valued legs.
    pub total: f64,
    /// Per-leg values, in leg order, for legs that valued.
    pub legs: Vec<LegValuation>,
    /// Per-leg problems, for legs that did not.
    pub errors: Vec<ValuationIssue>,
}

impl PositionValue {
    /// Whether every leg valued.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One point of a historical value series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Snapshot date.
    pub date: Date,
    /// Position value at that snapshot.
    pub value: f64,
}

/// All legs of one compound curve expression instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapPosition {
    expression: String,
    state: PositionState,
    quote: Option<SpreadQuote>,
    legs: Vec<BuiltLeg>,
    levels: Option<SolvedLevels>,
}

impl SwapPosition {
    /// Creates an unbuilt position for the given expression.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            state: PositionState::Unbuilt,
            quote: None,
            legs: Vec::new(),
            levels: None,
        }
    }

    /// The compound expression this position trades.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Current build state.
    #[must_use]
    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// The built legs with their audit records. Empty unless built.
    #[must_use]
    pub fn legs(&self) -> &[BuiltLeg] {
        &self.legs
    }

    /// The solved per-leg levels from the last successful build.
    #[must_use]
    pub fn levels(&self) -> Option<&SolvedLevels> {
        self.levels.as_ref()
    }

    /// The quote of the last successful build.
    #[must_use]
    pub fn quote(&self) -> Option<SpreadQuote> {
        self.quote
    }

    /// Builds (or rebuilds) the position from a spread quote.
    ///
    /// Any previously built instruments are replaced wholesale; engine
    /// handles are immutable, so re-quoting means re-creating.
    ///
    /// # Errors
    ///
    /// Parse, resolution, solve, and per-leg build errors are fatal: the
    /// position transitions to `Failed` and the error is returned.
    pub fn build(&mut self, quote: SpreadQuote, market: &MarketContext<'_>) -> PricingResult<()> {
        self.legs.clear();
        self.levels = None;
        self.quote = None;

        match build_legs(&self.expression, quote, market) {
            Ok((legs, levels)) => {
                debug!(expression = %self.expression, legs = legs.len(), "position built");
                self.legs = legs;
                self.levels = Some(levels);
                self.quote = Some(quote);
                self.state = PositionState::Built;
                Ok(())
            }
            Err(e) => {
                warn!(expression = %self.expression, error = %e, "position build failed");
                self.state = PositionState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Rebuilds the position from its last quote, replacing every
    /// instrument.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` if the position has never been
    /// given a quote; otherwise as [`SwapPosition::build`].
    pub fn rebuild(&mut self, market: &MarketContext<'_>) -> PricingResult<()> {
        let quote = self
            .quote
            .ok_or_else(|| PricingError::not_built(&self.expression))?;
        self.build(quote, market)
    }

    /// Values the position against one snapshot.
    ///
    /// Per-leg valuation errors are recorded and skipped; they never abort
    /// the other legs.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` unless the position is built.
    pub fn value_at(
        &self,
        snapshot: Date,
        engine: &dyn ValuationEngine,
    ) -> PricingResult<PositionValue> {
        if !self.state.is_built() {
            return Err(PricingError::not_built(&self.expression));
        }

        let mut total = 0.0;
        let mut legs = Vec::new();
        let mut errors = Vec::new();

        for leg in &self.legs {
            match engine.present_value(snapshot, &leg.handle) {
                Ok(value) => {
                    total += value;
                    legs.push(LegValuation {
                        atom: leg.atom.clone(),
                        value,
                    });
                }
                Err(e) => {
                    warn!(atom = %leg.atom, %snapshot, error = %e, "leg valuation failed");
                    errors.push(ValuationIssue {
                        atom: leg.atom.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(PositionValue {
            total,
            legs,
            errors,
        })
    }

    /// Values the position for every catalog snapshot in `[from, today]`.
    ///
    /// Snapshots where no leg values — no usable data for this instrument
    /// class that day — are omitted; partially valued snapshots are
    /// included. No interpolation is performed.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` unless the position is built.
    pub fn value_series(
        &self,
        from: Date,
        market: &MarketContext<'_>,
    ) -> PricingResult<Vec<SeriesPoint>> {
        if !self.state.is_built() {
            return Err(PricingError::not_built(&self.expression));
        }

        let mut series = Vec::new();
        for date in market.catalog.available_dates() {
            if date < from || date > market.today {
                continue;
            }
            let value = self.value_at(date, market.engine)?;
            if value.legs.is_empty() {
                continue;
            }
            series.push(SeriesPoint {
                date,
                value: value.total,
            });
        }
        Ok(series)
    }
}

fn build_legs(
    expression: &str,
    quote: SpreadQuote,
    market: &MarketContext<'_>,
) -> PricingResult<(Vec<BuiltLeg>, SolvedLevels)> {
    let parsed = parse_curve_expression(expression)?;
    let descriptors = resolve_legs(&parsed, market.today, market.registry)?;
    let levels = solve_curve_levels(&descriptors, quote.value, market.curve_quotes)?;

    let mut legs = Vec::with_capacity(descriptors.len());
    for (descriptor, level) in descriptors.iter().zip(&levels.levels) {
        legs.push(size_and_build_leg(
            descriptor,
            level.level,
            quote.risk_size,
            market.engine,
            market.today,
        )?);
    }
    Ok((legs, levels))
}

/// Instrument class of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentClass {
    /// Curve (swap) legs valued by the external engine.
    Swap,
    /// Listed futures legs valued off tick data.
    Futures,
}

/// Either kind of valuation position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Position {
    /// A compound curve (swap) position.
    Swap(SwapPosition),
    /// A futures combination position.
    Futures(FuturesPosition),
}

impl Position {
    /// Instrument class of this position.
    #[must_use]
    pub fn class(&self) -> InstrumentClass {
        match self {
            Position::Swap(_) => InstrumentClass::Swap,
            Position::Futures(_) => InstrumentClass::Futures,
        }
    }

    /// The compound expression this position trades.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Position::Swap(p) => p.expression(),
            Position::Futures(p) => p.expression(),
        }
    }

    /// Whether the position is usable for valuation.
    #[must_use]
    pub fn is_built(&self) -> bool {
        match self {
            Position::Swap(p) => p.state().is_built(),
            Position::Futures(p) => p.state().is_built(),
        }
    }

    /// Rebuilds the position from its last quote or spread.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` if the position was never given a
    /// quote.
    pub fn rebuild(&mut self, market: &MarketContext<'_>) -> PricingResult<()> {
        match self {
            Position::Swap(p) => p.rebuild(market),
            Position::Futures(p) => p.rebuild(market.futures_quotes),
        }
    }

    /// Values the position as of the context's "today".
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` unless the position is built.
    pub fn value_today(&self, market: &MarketContext<'_>) -> PricingResult<PositionValue> {
        match self {
            Position::Swap(p) => p.value_at(market.today, market.engine),
            Position::Futures(p) => p.value_now(market.futures_quotes),
        }
    }

    /// Historical value series over `[from, today]`.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` unless the position is built.
    pub fn value_series(
        &self,
        from: Date,
        market: &MarketContext<'_>,
    ) -> PricingResult<Vec<SeriesPoint>> {
        match self {
            Position::Swap(p) => p.value_series(from, market),
            Position::Futures(p) => p.value_series(from, market),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use spreadbook_market::{InMemoryMarket, ParRate, SnapshotCatalog, StaticTemplateRegistry};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn today() -> Date {
        date(2025, 8, 7)
    }

    fn context<'a>(market: &'a InMemoryMarket) -> MarketContext<'a> {
        MarketContext {
            catalog: market,
            curve_quotes: market,
            futures_quotes: market,
            engine: market,
            registry: StaticTemplateRegistry::global(),
            today: today(),
        }
    }

    fn seeded_market() -> InMemoryMarket {
        let market = InMemoryMarket::new();
        market.set_sensitivity("AUDIRS-SS", 450.0);
        market.set_par_rate("aud.5y5y", ParRate::new(dec!(3.00), today()));
        market
    }

    #[test]
    fn test_build_transitions_to_built() {
        let market = seeded_market();
        let ctx = context(&market);

        let mut position = SwapPosition::new("aud.5y5y.10y10y");
        assert!(matches!(position.state(), PositionState::Unbuilt));

        position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();
        assert!(position.state().is_built());
        assert_eq!(position.legs().len(), 2);

        // Long leg solved at 3.15, short at the quoted 3.00.
        assert_eq!(position.legs()[0].level, dec!(3.15));
        assert_eq!(position.legs()[1].level, dec!(3.00));
    }

    #[test]
    fn test_build_failure_marks_failed() {
        let market = seeded_market();
        let ctx = context(&market);

        let mut position = SwapPosition::new("sek.5y5y.10y10y");
        let err = position
            .build(SpreadQuote::new(dec!(0.15), 500.0), &ctx)
            .unwrap_err();
        assert!(matches!(err, PricingError::ResolutionFailed { .. }));
        assert!(matches!(position.state(), PositionState::Failed(_)));
        assert!(position.legs().is_empty());
    }

    #[test]
    fn test_parse_failure_marks_failed() {
        let market = seeded_market();
        let ctx = context(&market);

        let mut position = SwapPosition::new("not an expression");
        assert!(position
            .build(SpreadQuote::new(dec!(0.15), 500.0), &ctx)
            .is_err());
        assert!(!position.state().is_built());
    }

    #[test]
    fn test_rebuild_replaces_instruments() {
        let market = seeded_market();
        let ctx = context(&market);

        let mut position = SwapPosition::new("aud.5y5y.10y10y");
        position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();
        let first_handles: Vec<_> = position.legs().iter().map(|l| l.handle.clone()).collect();

        position.build(SpreadQuote::new(dec!(0.20), 500.0), &ctx).unwrap();
        let second_handles: Vec<_> = position.legs().iter().map(|l| l.handle.clone()).collect();

        assert_eq!(position.legs()[0].level, dec!(3.20));
        assert!(first_handles
            .iter()
            .all(|h| !second_handles.contains(h)));
    }

    #[test]
    fn test_value_at_unbuilt_is_error() {
        let market = seeded_market();
        let position = SwapPosition::new("aud.5y5y.10y10y");
        let err = position.value_at(today(), &market).unwrap_err();
        assert!(matches!(err, PricingError::NotBuilt { .. }));
    }

    #[test]
    fn test_value_at_sums_legs() {
        let market = seeded_market();
        let ctx = context(&market);
        market.add_snapshot(today());
        market.set_snapshot_level(today(), "AUDIRS-SS", dec!(3.10));

        let mut position = SwapPosition::new("aud.5y5y.10y10y");
        position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();

        let value = position.value_at(today(), &market).unwrap();
        assert!(value.is_complete());
        assert_eq!(value.legs.len(), 2);
        let leg_sum: f64 = value.legs.iter().map(|l| l.value).sum();
        assert!((value.total - leg_sum).abs() < 1e-9);
    }

    #[test]
    fn test_value_series_filters_catalog() {
        let market = seeded_market();
        let ctx = context(&market);

        // Three snapshots, but only the middle two have curve levels.
        for day in [4, 5, 6, 7] {
            market.add_snapshot(date(2025, 8, day));
        }
        market.set_snapshot_level(date(2025, 8, 5), "AUDIRS-SS", dec!(3.05));
        market.set_snapshot_level(date(2025, 8, 6), "AUDIRS-SS", dec!(3.08));

        let mut position = SwapPosition::new("aud.5y5y.10y10y");
        position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();

        let series = position.value_series(date(2025, 8, 5), &ctx).unwrap();
        let dates: Vec<Date> = series.iter().map(|p| p.date).collect();

        // 8/4 is before `from`, 8/7 has no usable data and is omitted.
        assert_eq!(dates, vec![date(2025, 8, 5), date(2025, 8, 6)]);
    }

    #[test]
    fn test_series_dates_subset_of_catalog() {
        let market = seeded_market();
        let ctx = context(&market);
        for day in 1..=7 {
            market.add_snapshot(date(2025, 8, day));
            market.set_snapshot_level(date(2025, 8, day), "AUDIRS-SS", dec!(3.05));
        }

        let mut position = SwapPosition::new("aud.5y5y");
        position.build(SpreadQuote::new(dec!(3.10), 500.0), &ctx).unwrap();

        let series = position.value_series(date(2025, 8, 3), &ctx).unwrap();
        let catalog = market.available_dates();
        assert!(series.iter().all(|p| catalog.contains(&p.date)));
        assert!(series.iter().all(|p| p.date >= date(2025, 8, 3)));
        assert_eq!(series.len(), 5);
    }
}
