//! In-memory market fixture.
//!
//! Provides a simple in-memory implementation of every provider trait in
//! this crate. Useful for testing and development; nothing is persisted.
//!
//! The valuation model is deliberately linear: each template carries a
//! risk sensitivity per million notional, each (snapshot, template) pair a
//! market level, and present value is the basis-point gap between the
//! market level and the instrument's traded level scaled by sensitivity
//! and notional.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{MarketError, MarketResult};
use crate::ids::{InstrumentHandle, TemplateId};
use crate::quotes::{ContractSpec, CurveQuoteProvider, FuturesQuoteProvider, ParRate};
use crate::snapshot::SnapshotCatalog;
use crate::valuation::{InstrumentSpec, ValuationEngine};
use spreadbook_core::Date;

/// In-memory market data and valuation fixture.
///
/// Thread-safe through interior `RwLock`s, so a single instance can back
/// catalog, quote, and engine roles at once.
///
/// # Example
///
/// ```rust
/// use spreadbook_market::InMemoryMarket;
/// use spreadbook_core::Date;
///
/// let market = InMemoryMarket::new();
/// market.add_snapshot(Date::from_ymd(2025, 8, 1).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMarket {
    snapshots: RwLock<BTreeSet<Date>>,
    par_rates: RwLock<HashMap<String, ParRate>>,
    contracts: RwLock<HashMap<String, ContractSpec>>,
    dated_contracts: RwLock<HashMap<(String, Date), ContractSpec>>,
    snapshot_levels: RwLock<HashMap<(Date, TemplateId), Decimal>>,
    sensitivities: RwLock<HashMap<TemplateId, f64>>,
    instruments: RwLock<HashMap<InstrumentHandle, InstrumentSpec>>,
    next_handle: AtomicU64,
}

impl InMemoryMarket {
    /// Creates an empty fixture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a snapshot date in the catalog.
    pub fn add_snapshot(&self, date: Date) {
        self.snapshots.write().unwrap().insert(date);
    }

    /// Sets the standalone par rate for an atom.
    pub fn set_par_rate(&self, atom: impl Into<String>, rate: ParRate) {
        self.par_rates.write().unwrap().insert(atom.into(), rate);
    }

    /// Sets the current contract details for a futures symbol.
    pub fn set_contract(&self, symbol: impl Into<String>, spec: ContractSpec) {
        self.contracts.write().unwrap().insert(symbol.into(), spec);
    }

    /// Sets a dated contract mark for a futures symbol.
    pub fn set_contract_at(&self, symbol: impl Into<String>, date: Date, spec: ContractSpec) {
        self.dated_contracts
            .write()
            .unwrap()
            .insert((symbol.into(), date), spec);
    }

    /// Sets the market level for a template at a snapshot date.
    pub fn set_snapshot_level(&self, date: Date, template: impl Into<TemplateId>, level: Decimal) {
        self.snapshot_levels
            .write()
            .unwrap()
            .insert((date, template.into()), level);
    }

    /// Sets the risk sensitivity per million notional for a template.
    pub fn set_sensitivity(&self, template: impl Into<TemplateId>, per_million: f64) {
        self.sensitivities
            .write()
            .unwrap()
            .insert(template.into(), per_million);
    }

    /// Returns the spec behind a handle, if the handle is live.
    #[must_use]
    pub fn instrument(&self, handle: &InstrumentHandle) -> Option<InstrumentSpec> {
        self.instruments.read().unwrap().get(handle).cloned()
    }

    /// Number of instruments created so far.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.instruments.read().unwrap().len()
    }

    /// Clears all registered data.
    pub fn clear(&self) {
        self.snapshots.write().unwrap().clear();
        self.par_rates.write().unwrap().clear();
        self.contracts.write().unwrap().clear();
        self.dated_contracts.write().unwrap().clear();
        self.snapshot_levels.write().unwrap().clear();
        self.sensitivities.write().unwrap().clear();
        self.instruments.write().unwrap().clear();
    }

    fn sensitivity_per_million(&self, template: &TemplateId) -> MarketResult<f64> {
        self.sensitivities
            .read()
            .unwrap()
            .get(template)
            .copied()
            .ok_or_else(|| {
                MarketError::valuation_failed(format!("no sensitivity for template {template}"))
            })
    }
}

impl SnapshotCatalog for InMemoryMarket {
    fn available_dates(&self) -> Vec<Date> {
        self.snapshots.read().unwrap().iter().copied().collect()
    }

    fn is_available(&self, date: Date) -> bool {
        self.snapshots.read().unwrap().contains(&date)
    }
}

impl CurveQuoteProvider for InMemoryMarket {
    fn par_rate(&self, atom: &str) -> MarketResult<ParRate> {
        self.par_rates
            .read()
            .unwrap()
            .get(atom)
            .copied()
            .ok_or_else(|| MarketError::quote_unavailable(atom, "no par rate registered"))
    }
}

impl FuturesQuoteProvider for InMemoryMarket {
    fn contract_spec(&self, symbol: &str) -> MarketResult<ContractSpec> {
        self.contracts
            .read()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketError::quote_unavailable(symbol, "no contract registered"))
    }

    fn contract_spec_at(&self, symbol: &str, date: Date) -> MarketResult<ContractSpec> {
        self.dated_contracts
            .read()
            .unwrap()
            .get(&(symbol.to_string(), date))
            .copied()
            .ok_or_else(|| {
                MarketError::quote_unavailable(symbol, format!("no mark for {date}"))
            })
    }
}

impl ValuationEngine for InMemoryMarket {
    fn create_instrument(&self, spec: &InstrumentSpec) -> MarketResult<InstrumentHandle> {
        if spec.end <= spec.start {
            return Err(MarketError::build_rejected(format!(
                "end {} not after start {}",
                spec.end, spec.start
            )));
        }
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let handle = InstrumentHandle::new(format!("mem-{id}"));
        self.instruments
            .write()
            .unwrap()
            .insert(handle.clone(), spec.clone());
        Ok(handle)
    }

    fn present_value(&self, snapshot: Date, handle: &InstrumentHandle) -> MarketResult<f64> {
        let spec = self
            .instrument(handle)
            .ok_or_else(|| MarketError::valuation_failed(format!("unknown handle {handle}")))?;
        let market_level = self
            .snapshot_levels
            .read()
            .unwrap()
            .get(&(snapshot, spec.template.clone()))
            .copied()
            .ok_or_else(|| {
                MarketError::valuation_failed(format!(
                    "no {} level for snapshot {snapshot}",
                    spec.template
                ))
            })?;
        let per_million = self.sensitivity_per_million(&spec.template)?;

        // 1bp of level move is worth `per_million` per million notional.
        let bp_gap = ((market_level - spec.level) * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0);
        Ok(bp_gap * per_million * (spec.notional / 1_000_000.0))
    }

    fn risk_sensitivity(&self, _snapshot: Date, handle: &InstrumentHandle) -> MarketResult<f64> {
        let spec = self
            .instrument(handle)
            .ok_or_else(|| MarketError::valuation_failed(format!("unknown handle {handle}")))?;
        let per_million = self.sensitivity_per_million(&spec.template)?;
        Ok(per_million * (spec.notional / 1_000_000.0))
    }
}
