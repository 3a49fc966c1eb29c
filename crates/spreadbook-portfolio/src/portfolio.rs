//! Portfolio aggregation across trades.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PortfolioError, PortfolioResult};
use crate::trade::Trade;
use spreadbook_market::TradeId;
use spreadbook_pricing::MarketContext;

/// One trade's row in the portfolio summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBreakdown {
    /// Trade identifier.
    pub id: TradeId,
    /// Trade total; zero when the trade reported errors only.
    pub total: f64,
    /// Number of open positions across both sides.
    pub positions: usize,
}

/// Result of the last portfolio recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum over all trades.
    pub total: f64,
    /// Per-trade rows, in trade-ID order.
    pub per_trade: Vec<TradeBreakdown>,
    /// Collected trade-level errors; a failing trade contributes zero.
    pub errors: Vec<String>,
    /// When the recomputation ran.
    pub updated_at: DateTime<Utc>,
}

/// The trade blotter: every trade keyed by ID, plus the last aggregate
/// totals.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Portfolio {
    trades: BTreeMap<TradeId, Trade>,
    last_summary: Option<PortfolioSummary>,
}

impl Portfolio {
    /// Creates an empty portfolio.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// Whether the portfolio holds no trades.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Adds a trade.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::DuplicateTrade` if the ID is taken.
    pub fn add_trade(&mut self, trade: Trade) -> PortfolioResult<()> {
        if self.trades.contains_key(trade.id()) {
            return Err(PortfolioError::duplicate_trade(trade.id().as_str()));
        }
        self.trades.insert(trade.id().clone(), trade);
        Ok(())
    }

    /// Removes and returns a trade.
    pub fn remove_trade(&mut self, id: &TradeId) -> Option<Trade> {
        self.trades.remove(id)
    }

    /// Looks up a trade.
    #[must_use]
    pub fn trade(&self, id: &TradeId) -> Option<&Trade> {
        self.trades.get(id)
    }

    /// Looks up a trade mutably.
    pub fn trade_mut(&mut self, id: &TradeId) -> Option<&mut Trade> {
        self.trades.get_mut(id)
    }

    /// Iterates over trades in ID order.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.values()
    }

    /// Recomputes point P&L for every trade and stores the aggregate.
    ///
    /// Aggregation never aborts: a trade whose positions all fail
    /// contributes zero and its errors are collected on the summary.
    pub fn recompute(&mut self, market: &MarketContext<'_>) -> &PortfolioSummary {
        let mut total = 0.0;
        let mut per_trade = Vec::with_capacity(self.trades.len());
        let mut errors = Vec::new();

        for (id, trade) in &mut self.trades {
            let pnl = trade.point_pnl(market).clone();
            total += pnl.total;
            per_trade.push(TradeBreakdown {
                id: id.clone(),
                total: pnl.total,
                positions: trade.primary().len() + trade.secondary().len(),
            });
            for error in &pnl.errors {
                warn!(trade = %id, %error, "trade error during portfolio recompute");
                errors.push(format!("{id}: {error}"));
            }
        }

        debug!(total, trades = per_trade.len(), "portfolio recomputed");
        self.last_summary = Some(PortfolioSummary {
            total,
            per_trade,
            errors,
            updated_at: Utc::now(),
        });
        self.last_summary.as_ref().expect("just stored")
    }

    /// The last stored summary, if the portfolio has been recomputed.
    #[must_use]
    pub fn last_summary(&self) -> Option<&PortfolioSummary> {
        self.last_summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut portfolio = Portfolio::new();
        portfolio.add_trade(Trade::new("t1")).unwrap();
        portfolio.add_trade(Trade::new("t2")).unwrap();
        assert_eq!(portfolio.len(), 2);

        let err = portfolio.add_trade(Trade::new("t1")).unwrap_err();
        assert!(matches!(err, PortfolioError::DuplicateTrade { .. }));

        assert!(portfolio.remove_trade(&TradeId::new("t1")).is_some());
        assert!(portfolio.remove_trade(&TradeId::new("t1")).is_none());
        assert_eq!(portfolio.len(), 1);
    }

    #[test]
    fn test_trades_iterate_in_id_order() {
        let mut portfolio = Portfolio::new();
        portfolio.add_trade(Trade::new("b")).unwrap();
        portfolio.add_trade(Trade::new("a")).unwrap();
        portfolio.add_trade(Trade::new("c")).unwrap();

        let ids: Vec<&str> = portfolio.trades().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
