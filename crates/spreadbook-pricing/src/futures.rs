//! Futures combination positions.
//!
//! Futures structures share the curve machinery's shape — parse the
//! expression, solve per-contract entry prices from the traded spread —
//! but they are sized in lots and valued off tick economics instead of an
//! external engine:
//!
//! ```text
//! leg P&L = (entry - mark) / tick_size * tick_value * lots * coefficient
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::MarketContext;
use crate::error::{PricingError, PricingResult};
use crate::expression::parse_futures_expression;
use crate::position::{LegValuation, PositionState, PositionValue, SeriesPoint, ValuationIssue};
use crate::solver::{solve_for_spread, LevelSource};
use spreadbook_core::Date;
use spreadbook_market::{ContractSpec, FuturesQuoteProvider, MarketResult};

/// Lots to run, either one size across all contracts or one per contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LotSize {
    /// Same number of lots on every contract.
    Uniform(f64),
    /// Explicit lots per contract, in leg order.
    PerContract(Vec<f64>),
}

impl LotSize {
    fn for_leg(&self, index: usize) -> f64 {
        match self {
            LotSize::Uniform(lots) => *lots,
            LotSize::PerContract(lots) => lots[index],
        }
    }
}

/// One contract of a futures combination, with its solved entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturesLeg {
    /// Contract symbol, e.g. "xmz5 comdty".
    pub symbol: String,
    /// Signed multiplier from the expression.
    pub coefficient: Decimal,
    /// Entry price implied from the traded spread.
    pub entry_price: Decimal,
    /// Provenance of the entry price's reference.
    pub entry_source: LevelSource,
    /// Lots on this contract.
    pub lots: f64,
}

/// A futures combination position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesPosition {
    expression: String,
    state: PositionState,
    spread: Option<Decimal>,
    lots: Option<LotSize>,
    legs: Vec<FuturesLeg>,
}

impl FuturesPosition {
    /// Creates an unbuilt position for the given expression.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            state: PositionState::Unbuilt,
            spread: None,
            lots: None,
            legs: Vec::new(),
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

    /// The built contract legs. Empty unless built.
    #[must_use]
    pub fn legs(&self) -> &[FuturesLeg] {
        &self.legs
    }

    /// Builds (or rebuilds) the position from a traded spread price and lot
    /// sizing.
    ///
    /// Contracts whose current price is unavailable fall back to the spread
    /// value as their reference, flagged [`LevelSource::Fallback`]; only
    /// parse and solve problems are fatal.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed expressions, a build error for
    /// mismatched per-contract lot counts, and a solve error when the solve
    /// is impossible.
    pub fn build(
        &mut self,
        spread: Decimal,
        lots: LotSize,
        provider: &dyn FuturesQuoteProvider,
    ) -> PricingResult<()> {
        self.legs.clear();
        self.spread = None;
        self.lots = None;

        match build_futures_legs(&self.expression, spread, &lots, provider) {
            Ok(legs) => {
                debug!(expression = %self.expression, legs = legs.len(), "futures position built");
                self.legs = legs;
                self.spread = Some(spread);
                self.lots = Some(lots);
                self.state = PositionState::Built;
                Ok(())
            }
            Err(e) => {
                warn!(expression = %self.expression, error = %e, "futures position build failed");
                self.state = PositionState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Rebuilds the position from its last spread and lot sizing,
    /// re-solving entry prices against current marks.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` if the position has never been
    /// given a spread; otherwise as [`FuturesPosition::build`].
    pub fn rebuild(&mut self, provider: &dyn FuturesQuoteProvider) -> PricingResult<()> {
        let (spread, lots) = match (self.spread, self.lots.clone()) {
            (Some(spread), Some(lots)) => (spread, lots),
            _ => return Err(PricingError::not_built(&self.expression)),
        };
        self.build(spread, lots, provider)
    }

    /// Values the position against current contract marks.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` unless the position is built.
    pub fn value_now(&self, provider: &dyn FuturesQuoteProvider) -> PricingResult<PositionValue> {
        self.value_with(|symbol| provider.contract_spec(symbol))
    }

    /// Values the position against marks as of a snapshot date.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NotBuilt` unless the position is built.
    pub fn value_at(
        &self,
        date: Date,
        provider: &dyn FuturesQuoteProvider,
    ) -> PricingResult<PositionValue> {
        self.value_with(|symbol| provider.contract_spec_at(symbol, date))
    }

    /// Historical value series over `[from, today]`.
    ///
    /// Snapshot dates without dated futures marks for any contract are
    /// omitted.
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
            let value = self.value_at(date, market.futures_quotes)?;
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

    fn value_with<F>(&self, fetch: F) -> PricingResult<PositionValue>
    where
        F: Fn(&str) -> MarketResult<ContractSpec>,
    {
        if !self.state.is_built() {
            return Err(PricingError::not_built(&self.expression));
        }

        let mut total = 0.0;
        let mut legs = Vec::new();
        let mut errors = Vec::new();

        for leg in &self.legs {
            match fetch(&leg.symbol).map_err(|e| e.to_string()).and_then(|spec| {
                tick_pnl(leg, &spec).ok_or_else(|| format!("zero tick size for {}", leg.symbol))
            }) {
                Ok(value) => {
                    total += value;
                    legs.push(LegValuation {
                        atom: leg.symbol.clone(),
                        value,
                    });
                }
                Err(error) => {
                    warn!(symbol = %leg.symbol, %error, "contract valuation failed");
                    errors.push(ValuationIssue {
                        atom: leg.symbol.clone(),
                        error,
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
}

fn tick_pnl(leg: &FuturesLeg, spec: &ContractSpec) -> Option<f64> {
    if spec.tick_size.is_zero() {
        return None;
    }
    let ticks = (leg.entry_price - spec.last_price) / spec.tick_size;
    let per_lot = (ticks * spec.tick_value).to_f64()?;
    Some(per_lot * leg.lots * leg.coefficient.to_f64()?)
}

fn build_futures_legs(
    expression: &str,
    spread: Decimal,
    lots: &LotSize,
    provider: &dyn FuturesQuoteProvider,
) -> PricingResult<Vec<FuturesLeg>> {
    let parsed = parse_futures_expression(expression)?;

    if let LotSize::PerContract(sizes) = lots {
        if sizes.len() != parsed.len() {
            return Err(PricingError::build_failed(
                expression,
                format!(
                    "{} lot sizes for {} contracts",
                    sizes.len(),
                    parsed.len()
                ),
            ));
        }
    }

    let references: Vec<(Decimal, LevelSource)> = parsed
        .iter()
        .map(|leg| match provider.contract_spec(&leg.atom) {
            Ok(spec) => (spec.last_price, LevelSource::Quoted),
            Err(e) => {
                warn!(symbol = %leg.atom, error = %e, "contract price unavailable, using spread as reference");
                (spread, LevelSource::Fallback)
            }
        })
        .collect();

    let coefficients: Vec<Decimal> = parsed.iter().map(|l| l.coefficient).collect();
    let reference_prices: Vec<Decimal> = references.iter().map(|(p, _)| *p).collect();
    let (solve_index, solved) = solve_for_spread(&coefficients, &reference_prices, spread)?;

    Ok(parsed
        .into_iter()
        .enumerate()
        .map(|(i, leg)| {
            let (entry_price, entry_source) = if i == solve_index {
                (solved, LevelSource::Solved)
            } else {
                references[i]
            };
            FuturesLeg {
                symbol: leg.atom,
                coefficient: leg.coefficient,
                entry_price,
                entry_source,
                lots: lots.for_leg(i),
            }
        })
        .collect())
}
