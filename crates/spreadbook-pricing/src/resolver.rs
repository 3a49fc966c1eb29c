//! Leg resolution: instrument atom to template identity and date range.
//!
//! Relative tenors ("10y", "5y5y") anchor on the injected as-of date;
//! fixed-date atoms ("aud.130526.1y") anchor on the literal parsed date.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};
use crate::expression::{is_bare_tenor, split_forward_tenor, ParsedLeg};
use spreadbook_core::{Date, Tenor};
use spreadbook_market::{TemplateId, TemplateRegistry};

/// A fully resolved leg: atom, signed coefficient, absolute date range, and
/// curve template identity.
///
/// Descriptors are ephemeral; they are recomputed on every build rather
/// than cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegDescriptor {
    /// Instrument atom, e.g. "aud.5y5y".
    pub atom: String,
    /// Signed multiplier applied to this leg's level.
    pub coefficient: Decimal,
    /// Effective (start) date.
    pub start: Date,
    /// Termination (end) date.
    pub end: Date,
    /// Engine template for this leg's currency/sub-code.
    pub template: TemplateId,
    /// Floating reference index the template fixes against.
    pub reference_index: String,
}

fn parse_tenor(atom: &str, part: &str) -> PricingResult<Tenor> {
    part.parse()
        .map_err(|e: spreadbook_core::CoreError| PricingError::resolution_failed(atom, e.to_string()))
}

/// Resolves a parsed leg against an as-of date and template registry.
///
/// # Errors
///
/// Returns `PricingError::ResolutionFailed` for unresolvable atoms,
/// unmapped currency codes, or out-of-range dates.
pub fn resolve_leg(
    leg: &ParsedLeg,
    as_of: Date,
    registry: &dyn TemplateRegistry,
) -> PricingResult<LegDescriptor> {
    let atom = leg.atom.as_str();
    let parts: Vec<&str> = atom.split('.').collect();

    let (code, start, tenor) = match parts.as_slice() {
        [code, tenor_part] => {
            if let Some((forward, tenor)) = split_forward_tenor(tenor_part) {
                let forward = parse_tenor(atom, forward)?;
                let start = forward
                    .offset_from(as_of)
                    .map_err(|e| PricingError::resolution_failed(atom, e.to_string()))?;
                (*code, start, parse_tenor(atom, tenor)?)
            } else if is_bare_tenor(tenor_part) {
                (*code, as_of, parse_tenor(atom, tenor_part)?)
            } else {
                return Err(PricingError::resolution_failed(
                    atom,
                    format!("unrecognized tenor part {tenor_part:?}"),
                ));
            }
        }
        [code, date_part, tenor_part] => {
            let start = Date::from_ddmmyy(date_part)
                .map_err(|e| PricingError::resolution_failed(atom, e.to_string()))?;
            (*code, start, parse_tenor(atom, tenor_part)?)
        }
        _ => {
            return Err(PricingError::resolution_failed(
                atom,
                "expected code.tenor or code.DDMMYY.tenor",
            ))
        }
    };

    let end = tenor
        .offset_from(start)
        .map_err(|e| PricingError::resolution_failed(atom, e.to_string()))?;

    let curve = registry
        .resolve(code)
        .map_err(|e| PricingError::resolution_failed(atom, e.to_string()))?;

    Ok(LegDescriptor {
        atom: leg.atom.clone(),
        coefficient: leg.coefficient,
        start,
        end,
        template: curve.template,
        reference_index: curve.reference_index,
    })
}

/// Resolves every leg of a parsed expression in order.
///
/// # Errors
///
/// Fails on the first unresolvable leg; resolution failures are fatal to
/// the whole build.
pub fn resolve_legs(
    legs: &[ParsedLeg],
    as_of: Date,
    registry: &dyn TemplateRegistry,
) -> PricingResult<Vec<LegDescriptor>> {
    legs.iter()
        .map(|leg| resolve_leg(leg, as_of, registry))
        .collect()
}
