//! Valuation engine interface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MarketResult;
use crate::ids::{InstrumentHandle, TemplateId};
use spreadbook_core::Date;

/// Economic terms of a single-leg instrument submitted to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Curve template the instrument prices off.
    pub template: TemplateId,
    /// Effective (start) date.
    pub start: Date,
    /// Termination (end) date.
    pub end: Date,
    /// Signed notional amount.
    pub notional: f64,
    /// Traded fixed level, in percentage points.
    pub level: Decimal,
}

impl InstrumentSpec {
    /// Creates a new instrument spec.
    #[must_use]
    pub fn new(template: TemplateId, start: Date, end: Date, notional: f64, level: Decimal) -> Self {
        Self {
            template,
            start,
            end,
            notional,
            level,
        }
    }
}

/// External analytics engine that owns instrument valuation.
///
/// The engine hands back opaque [`InstrumentHandle`]s; present value and
/// risk sensitivity are queried per snapshot date against those handles.
pub trait ValuationEngine: Send + Sync {
    /// Registers an instrument with the engine and returns its handle.
    fn create_instrument(&self, spec: &InstrumentSpec) -> MarketResult<InstrumentHandle>;

    /// Present value of the instrument against the given snapshot.
    fn present_value(&self, snapshot: Date, handle: &InstrumentHandle) -> MarketResult<f64>;

    /// Sensitivity of the instrument's value to a one basis point move in
    /// its level, against the given snapshot.
    fn risk_sensitivity(&self, snapshot: Date, handle: &InstrumentHandle) -> MarketResult<f64>;
}
