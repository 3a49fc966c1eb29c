//! Bundled view of the market collaborators a build or valuation needs.

use spreadbook_core::Date;
use spreadbook_market::{
    CurveQuoteProvider, FuturesQuoteProvider, SnapshotCatalog, TemplateRegistry, ValuationEngine,
};

/// Borrowed handles to every collaborator the core consumes, plus the
/// injected "today".
///
/// Threading an explicit context keeps the core pure and testable: no
/// process-wide caches, no ambient clock. The valuation date is whatever
/// the caller says it is.
#[derive(Clone, Copy)]
pub struct MarketContext<'a> {
    /// Catalog of valuation snapshots.
    pub catalog: &'a dyn SnapshotCatalog,
    /// Par rates for curve instrument atoms.
    pub curve_quotes: &'a dyn CurveQuoteProvider,
    /// Futures prices and tick economics.
    pub futures_quotes: &'a dyn FuturesQuoteProvider,
    /// Instrument creation and valuation.
    pub engine: &'a dyn ValuationEngine,
    /// Currency/sub-code to template lookup.
    pub registry: &'a dyn TemplateRegistry,
    /// Valuation "today": anchor for relative tenors and point P&L.
    pub today: Date,
}
