//! Risk-based leg sizing.
//!
//! Multi-leg structures are risk-balanced, not notional-balanced: each leg
//! is sized so its risk sensitivity equals the requested risk amount times
//! its coefficient. A probe instrument at unit notional measures the
//! sensitivity per million, and the final notional is scaled from that.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PricingError, PricingResult};
use crate::resolver::LegDescriptor;
use spreadbook_core::Date;
use spreadbook_market::{InstrumentHandle, InstrumentSpec, ValuationEngine};

/// Notional of the sizing probe instrument.
pub const UNIT_NOTIONAL: f64 = 1_000_000.0;

/// Probe sensitivities below this magnitude are treated as degenerate.
pub const SENSITIVITY_FLOOR: f64 = 0.01;

/// Notional per unit of target sensitivity in the degenerate case.
pub const DEGENERATE_NOTIONAL_SCALE: f64 = 1_000.0;

/// A leg sized and registered with the valuation engine, retained for
/// audit: what was traded, at what level, in what size, and what the probe
/// measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltLeg {
    /// Instrument atom.
    pub atom: String,
    /// Signed multiplier from the expression.
    pub coefficient: Decimal,
    /// Traded level in percentage points.
    pub level: Decimal,
    /// Signed notional of the final instrument.
    pub notional: f64,
    /// Probe sensitivity per [`UNIT_NOTIONAL`].
    pub probe_sensitivity: f64,
    /// Engine handle of the final instrument.
    pub handle: InstrumentHandle,
}

/// Sizes one leg from the requested risk amount and registers the final
/// instrument with the engine.
///
/// Target sensitivity is `risk_size * coefficient`; the required notional
/// is `target / probe * UNIT_NOTIONAL`. A near-zero probe sensitivity
/// falls back to `target * DEGENERATE_NOTIONAL_SCALE` — an explicit
/// degenerate-case policy, not a failure.
///
/// # Errors
///
/// Returns `PricingError::BuildFailed` if the engine rejects either the
/// probe or the final instrument, or if the probe risk query fails.
pub fn size_and_build_leg(
    leg: &LegDescriptor,
    level: Decimal,
    risk_size: f64,
    engine: &dyn ValuationEngine,
    snapshot: Date,
) -> PricingResult<BuiltLeg> {
    let probe_spec = InstrumentSpec::new(
        leg.template.clone(),
        leg.start,
        leg.end,
        UNIT_NOTIONAL,
        level,
    );
    let probe = engine
        .create_instrument(&probe_spec)
        .map_err(|e| PricingError::build_failed(&leg.atom, e.to_string()))?;
    let probe_sensitivity = engine
        .risk_sensitivity(snapshot, &probe)
        .map_err(|e| PricingError::build_failed(&leg.atom, e.to_string()))?;

    let target = risk_size * leg.coefficient.to_f64().unwrap_or(0.0);
    let notional = if probe_sensitivity.abs() < SENSITIVITY_FLOOR {
        warn!(
            atom = %leg.atom,
            probe_sensitivity,
            "degenerate probe sensitivity, applying fallback notional scale"
        );
        target * DEGENERATE_NOTIONAL_SCALE
    } else {
        (target / probe_sensitivity) * UNIT_NOTIONAL
    };

    let spec = InstrumentSpec::new(leg.template.clone(), leg.start, leg.end, notional, level);
    let handle = engine
        .create_instrument(&spec)
        .map_err(|e| PricingError::build_failed(&leg.atom, e.to_string()))?;

    debug!(atom = %leg.atom, notional, probe_sensitivity, "sized leg");

    Ok(BuiltLeg {
        atom: leg.atom.clone(),
        coefficient: leg.coefficient,
        level,
        notional,
        probe_sensitivity,
        handle,
    })
}
