//! Trades: groups of concurrently open positions.
//!
//! A trade composes a primary side and an optional secondary side of a
//! different instrument class — the combination shape of an exchange-for-
//! physical, where a swap package trades against a futures strip. Each side
//! may hold several open positions entered on different dates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PortfolioError, PortfolioResult};
use spreadbook_core::Date;
use spreadbook_market::TradeId;
use spreadbook_pricing::{InstrumentClass, MarketContext, Position, SeriesPoint};

/// How multi-position series are combined across dates.
///
/// Combining by union conflates "no data that day" with "contributed
/// exactly zero that day"; the two are semantically different, so the
/// choice is explicit rather than baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeriesMergePolicy {
    /// Union of all dates; a position without an entry on a date
    /// contributes zero there.
    #[default]
    UnionZeroFill,
    /// Only dates where every position has an entry.
    Intersection,
}

/// Which side of the trade a position sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Main leg of the structure.
    Primary,
    /// Offsetting leg of a different instrument class.
    Secondary,
}

/// A position together with the date it was entered.
///
/// The insertion date floors that position's historical series; a position
/// never shows value on dates before it existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    /// The valuation position.
    pub position: Position,
    /// Date the position was entered.
    pub inserted: Date,
}

/// Point P&L of one position within a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPnl {
    /// Side the position sits on.
    pub side: Side,
    /// The position's compound expression.
    pub expression: String,
    /// Position value; zero when the position errored.
    pub value: f64,
    /// Error, for positions that could not be valued.
    pub error: Option<String>,
}

/// Point P&L of a whole trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePnl {
    /// Combined total over both sides.
    pub total: f64,
    /// Primary-side subtotal.
    pub primary: f64,
    /// Secondary-side subtotal.
    pub secondary: f64,
    /// Per-position rows.
    pub positions: Vec<PositionPnl>,
    /// Collected position errors; failures zero-fill, they never abort.
    pub errors: Vec<String>,
}

/// Historical P&L series of a whole trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSeries {
    /// Combined per-date values.
    pub points: Vec<SeriesPoint>,
    /// Positions excluded from the combination, with the reason.
    pub errors: Vec<String>,
}

/// One trade: primary positions plus an optional secondary side of a
/// different instrument class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    id: TradeId,
    primary: Vec<OpenPosition>,
    secondary: Vec<OpenPosition>,
    merge_policy: SeriesMergePolicy,
    cached_point: Option<TradePnl>,
    cached_series: Option<(Date, TradeSeries)>,
}

impl Trade {
    /// Creates an empty trade.
    #[must_use]
    pub fn new(id: impl Into<TradeId>) -> Self {
        Self {
            id: id.into(),
            primary: Vec::new(),
            secondary: Vec::new(),
            merge_policy: SeriesMergePolicy::default(),
            cached_point: None,
            cached_series: None,
        }
    }

    /// Sets the series merge policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: SeriesMergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Trade identifier.
    #[must_use]
    pub fn id(&self) -> &TradeId {
        &self.id
    }

    /// Primary-side positions.
    #[must_use]
    pub fn primary(&self) -> &[OpenPosition] {
        &self.primary
    }

    /// Secondary-side positions.
    #[must_use]
    pub fn secondary(&self) -> &[OpenPosition] {
        &self.secondary
    }

    /// Instrument class of the primary side, if any positions exist.
    #[must_use]
    pub fn primary_class(&self) -> Option<InstrumentClass> {
        self.primary.first().map(|p| p.position.class())
    }

    /// Adds a position to the primary side.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InstrumentClassMismatch` if the position's
    /// class differs from positions already on this side.
    pub fn add_primary(&mut self, position: Position, inserted: Date) -> PortfolioResult<()> {
        if let Some(existing) = self.primary_class() {
            if position.class() != existing {
                return Err(PortfolioError::class_mismatch(
                    self.id.as_str(),
                    "primary positions must share one instrument class",
                ));
            }
        }
        self.invalidate();
        self.primary.push(OpenPosition { position, inserted });
        Ok(())
    }

    /// Adds a position to the secondary side.
    ///
    /// The secondary side must be a different instrument class from the
    /// primary side — that asymmetry is what makes the trade a combination
    /// structure.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InstrumentClassMismatch` if the class
    /// matches the primary side or differs from positions already on the
    /// secondary side.
    pub fn add_secondary(&mut self, position: Position, inserted: Date) -> PortfolioResult<()> {
        if self.primary_class() == Some(position.class()) {
            return Err(PortfolioError::class_mismatch(
                self.id.as_str(),
                "secondary side must be a different instrument class",
            ));
        }
        if let Some(existing) = self.secondary.first().map(|p| p.position.class()) {
            if position.class() != existing {
                return Err(PortfolioError::class_mismatch(
                    self.id.as_str(),
                    "secondary positions must share one instrument class",
                ));
            }
        }
        self.invalidate();
        self.secondary.push(OpenPosition { position, inserted });
        Ok(())
    }

    /// Rebuilds every position from its stored quote, replacing all engine
    /// instruments. Positions that cannot rebuild are reported; the rest
    /// proceed.
    pub fn rebuild(&mut self, market: &MarketContext<'_>) -> Vec<String> {
        self.invalidate();
        let mut errors = Vec::new();
        for open in self.primary.iter_mut().chain(self.secondary.iter_mut()) {
            if let Err(e) = open.position.rebuild(market) {
                errors.push(format!("{}: {e}", open.position.expression()));
            }
        }
        errors
    }

    /// Recomputes and caches point P&L over every open position on both
    /// sides: combined total plus primary/secondary subtotals.
    ///
    /// Position failures contribute zero and are recorded; they never
    /// abort the other positions. With no state change in between, repeated
    /// calls return identical results.
    pub fn point_pnl(&mut self, market: &MarketContext<'_>) -> &TradePnl {
        let mut pnl = TradePnl {
            total: 0.0,
            primary: 0.0,
            secondary: 0.0,
            positions: Vec::new(),
            errors: Vec::new(),
        };

        for (side, open) in self
            .primary
            .iter()
            .map(|p| (Side::Primary, p))
            .chain(self.secondary.iter().map(|p| (Side::Secondary, p)))
        {
            let expression = open.position.expression().to_string();
            match open.position.value_today(market) {
                Ok(value) => {
                    for issue in &value.errors {
                        pnl.errors
                            .push(format!("{expression}: {}: {}", issue.atom, issue.error));
                    }
                    pnl.total += value.total;
                    match side {
                        Side::Primary => pnl.primary += value.total,
                        Side::Secondary => pnl.secondary += value.total,
                    }
                    pnl.positions.push(PositionPnl {
                        side,
                        expression,
                        value: value.total,
                        error: None,
                    });
                }
                Err(e) => {
                    pnl.errors.push(format!("{expression}: {e}"));
                    pnl.positions.push(PositionPnl {
                        side,
                        expression,
                        value: 0.0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        debug!(id = %self.id, total = pnl.total, "trade point P&L recomputed");
        self.cached_point = Some(pnl);
        self.cached_point.as_ref().expect("just cached")
    }

    /// The last computed point P&L, if any.
    #[must_use]
    pub fn cached_point_pnl(&self) -> Option<&TradePnl> {
        self.cached_point.as_ref()
    }

    /// Recomputes and caches the historical P&L series from `from`.
    ///
    /// Each position's series starts no earlier than its insertion date;
    /// per-date values are then combined across positions according to the
    /// trade's [`SeriesMergePolicy`]. Positions that cannot produce a
    /// series are excluded and reported.
    pub fn series_pnl(&mut self, from: Date, market: &MarketContext<'_>) -> &TradeSeries {
        let mut series_list = Vec::new();
        let mut errors = Vec::new();

        for open in self.primary.iter().chain(self.secondary.iter()) {
            let start = from.max(open.inserted);
            match open.position.value_series(start, market) {
                Ok(series) => series_list.push(series),
                Err(e) => errors.push(format!("{}: {e}", open.position.expression())),
            }
        }

        let points = merge_series(&series_list, self.merge_policy);
        debug!(id = %self.id, points = points.len(), "trade series P&L recomputed");
        self.cached_series = Some((from, TradeSeries { points, errors }));
        &self.cached_series.as_ref().expect("just cached").1
    }

    /// The last computed series, if it was computed from the same date.
    #[must_use]
    pub fn cached_series_pnl(&self, from: Date) -> Option<&TradeSeries> {
        match &self.cached_series {
            Some((cached_from, series)) if *cached_from == from => Some(series),
            _ => None,
        }
    }

    fn invalidate(&mut self) {
        self.cached_point = None;
        self.cached_series = None;
    }
}

/// Combines position series by date according to the merge policy.
fn merge_series(series_list: &[Vec<SeriesPoint>], policy: SeriesMergePolicy) -> Vec<SeriesPoint> {
    let mut by_date: BTreeMap<Date, (f64, usize)> = BTreeMap::new();
    for series in series_list {
        for point in series {
            let entry = by_date.entry(point.date).or_insert((0.0, 0));
            entry.0 += point.value;
            entry.1 += 1;
        }
    }

    by_date
        .into_iter()
        .filter(|(_, (_, count))| match policy {
            SeriesMergePolicy::UnionZeroFill => true,
            SeriesMergePolicy::Intersection => *count == series_list.len(),
        })
        .map(|(date, (value, _))| SeriesPoint { date, value })
        .collect()
}
