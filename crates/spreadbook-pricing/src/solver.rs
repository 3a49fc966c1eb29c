//! Implied-level solving for spread-quoted structures.
//!
//! A compound trade is quoted as a single spread value, not as levels for
//! its legs. Every leg except one keeps its independently observed
//! reference level; the remaining leg — the one carrying the largest
//! absolute coefficient, whose standalone quote is the least reliable — is
//! solved so the traded spread is reproduced exactly:
//!
//! ```text
//! solved = (spread - sum(coeff_i * reference_i, i != k)) / coeff_k
//! ```
//!
//! The same rearrangement applies to futures combinations, with last-traded
//! prices in place of par rates.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PricingError, PricingResult};
use crate::resolver::LegDescriptor;
use spreadbook_core::Date;
use spreadbook_market::CurveQuoteProvider;

/// Par-rate sentinel substituted when a leg's standalone quote is
/// unavailable. Flagged on the output as [`LevelSource::Fallback`], never
/// silently applied.
pub const FALLBACK_PAR_RATE: Decimal = dec!(3.00);

/// Where a leg's final level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelSource {
    /// Independently observed market quote.
    Quoted,
    /// The documented fallback sentinel; the standalone quote was missing.
    Fallback,
    /// Implied from the traded spread and the other legs.
    Solved,
}

/// Final level for one leg, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegLevel {
    /// Instrument atom the level belongs to.
    pub atom: String,
    /// Level in percentage points (curve legs) or price (futures legs).
    pub level: Decimal,
    /// Provenance of the level.
    pub source: LevelSource,
    /// Observation date, when the level was quoted.
    pub as_of: Option<Date>,
}

/// Per-leg levels with the solved leg identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedLevels {
    /// One entry per leg, in leg order.
    pub levels: Vec<LegLevel>,
    /// Index of the solved leg.
    pub solve_index: usize,
}

/// Picks the leg to solve for: the first occurrence of the maximal
/// absolute coefficient, in leg order.
///
/// Leg order is the parser's deterministic emission order, so the
/// tie-break is stable for a given expression.
pub fn solve_target_index(coefficients: &[Decimal]) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;
    for (i, c) in coefficients.iter().enumerate() {
        let magnitude = c.abs();
        match best {
            Some((_, current)) if magnitude <= current => {}
            _ => best = Some((i, magnitude)),
        }
    }
    best.map(|(i, _)| i)
}

/// Solves for the level of the largest-coefficient leg so that
/// `sum(coeff_i * level_i) == spread` holds exactly.
///
/// Returns the solve index and the solved level.
///
/// # Errors
///
/// Returns `PricingError::SolveFailed` when there are no legs, the
/// reference count does not match, or the solve coefficient is zero.
pub fn solve_for_spread(
    coefficients: &[Decimal],
    references: &[Decimal],
    spread: Decimal,
) -> PricingResult<(usize, Decimal)> {
    if coefficients.len() != references.len() {
        return Err(PricingError::solve_failed(format!(
            "{} coefficients but {} reference levels",
            coefficients.len(),
            references.len()
        )));
    }
    let solve_index = solve_target_index(coefficients)
        .ok_or_else(|| PricingError::solve_failed("no legs to solve"))?;

    let solve_coeff = coefficients[solve_index];
    if solve_coeff.is_zero() {
        return Err(PricingError::solve_failed(
            "largest coefficient is zero; spread carries no information",
        ));
    }

    let other_sum: Decimal = coefficients
        .iter()
        .zip(references)
        .enumerate()
        .filter(|(i, _)| *i != solve_index)
        .map(|(_, (c, r))| c * r)
        .sum();

    let solved = (spread - other_sum)
        .checked_div(solve_coeff)
        .ok_or_else(|| PricingError::solve_failed("division overflow in spread solve"))?;

    debug!(%solve_coeff, %other_sum, %solved, "solved spread leg");
    Ok((solve_index, solved))
}

/// Fetches each curve leg's independent par rate and solves the spread.
///
/// Missing quotes substitute [`FALLBACK_PAR_RATE`] and are flagged
/// [`LevelSource::Fallback`]; the solved leg is flagged
/// [`LevelSource::Solved`].
///
/// # Errors
///
/// Returns `PricingError::SolveFailed` when the solve itself is impossible;
/// missing quotes alone never fail the solve.
pub fn solve_curve_levels(
    legs: &[LegDescriptor],
    spread: Decimal,
    quotes: &dyn CurveQuoteProvider,
) -> PricingResult<SolvedLevels> {
    let mut levels: Vec<LegLevel> = legs
        .iter()
        .map(|leg| match quotes.par_rate(&leg.atom) {
            Ok(quote) => LegLevel {
                atom: leg.atom.clone(),
                level: quote.rate,
                source: LevelSource::Quoted,
                as_of: Some(quote.as_of),
            },
            Err(e) => {
                warn!(atom = %leg.atom, error = %e, "par rate unavailable, using fallback sentinel");
                LegLevel {
                    atom: leg.atom.clone(),
                    level: FALLBACK_PAR_RATE,
                    source: LevelSource::Fallback,
                    as_of: None,
                }
            }
        })
        .collect();

    let coefficients: Vec<Decimal> = legs.iter().map(|l| l.coefficient).collect();
    let references: Vec<Decimal> = levels.iter().map(|l| l.level).collect();
    let (solve_index, solved) = solve_for_spread(&coefficients, &references, spread)?;

    levels[solve_index].level = solved;
    levels[solve_index].source = LevelSource::Solved;
    levels[solve_index].as_of = None;

    Ok(SolvedLevels {
        levels,
        solve_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parse_curve_expression;
    use crate::resolver::resolve_legs;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use spreadbook_market::{InMemoryMarket, ParRate, StaticTemplateRegistry};

    fn as_of() -> Date {
        Date::from_ymd(2025, 8, 7).unwrap()
    }

    fn resolved(expr: &str) -> Vec<LegDescriptor> {
        let parsed = parse_curve_expression(expr).unwrap();
        resolve_legs(&parsed, as_of(), StaticTemplateRegistry::global()).unwrap()
    }

    #[test]
    fn test_single_leg_takes_spread_level() {
        // One leg: the solved level is the spread itself.
        let market = InMemoryMarket::new();
        let legs = resolved("aud.10y");
        let solved = solve_curve_levels(&legs, dec!(3.20), &market).unwrap();

        assert_eq!(solved.solve_index, 0);
        assert_eq!(solved.levels[0].level, dec!(3.20));
        assert_eq!(solved.levels[0].source, LevelSource::Solved);
    }

    #[test]
    fn test_two_leg_spread() {
        // aud.10y10y - aud.5y5y = 0.15, with aud.5y5y quoted at 3.00.
        let market = InMemoryMarket::new();
        market.set_par_rate("aud.5y5y", ParRate::new(dec!(3.00), as_of()));

        let legs = resolved("aud.5y5y.10y10y");
        let solved = solve_curve_levels(&legs, dec!(0.15), &market).unwrap();

        assert_eq!(solved.solve_index, 0); // long leg, first occurrence of |1|
        assert_eq!(solved.levels[0].level, dec!(3.15));
        assert_eq!(solved.levels[1].level, dec!(3.00));
        assert_eq!(solved.levels[1].source, LevelSource::Quoted);
    }

    #[test]
    fn test_butterfly_solves_body() {
        // 2*aud.5y5y - aud.2y2y - aud.10y10y = 0.05
        let market = InMemoryMarket::new();
        market.set_par_rate("aud.2y2y", ParRate::new(dec!(2.50), as_of()));
        market.set_par_rate("aud.10y10y", ParRate::new(dec!(3.50), as_of()));

        let legs = resolved("2*aud.5y5y - aud.2y2y - aud.10y10y");
        let solved = solve_curve_levels(&legs, dec!(0.05), &market).unwrap();

        assert_eq!(solved.solve_index, 0);
        // otherSum = -2.50 - 3.50 = -6.00; solved = (0.05 + 6.00) / 2
        assert_eq!(solved.levels[0].level, dec!(3.025));
    }

    #[test]
    fn test_spread_identity_holds_exactly() {
        let market = InMemoryMarket::new();
        market.set_par_rate("aud.2y2y", ParRate::new(dec!(2.50), as_of()));
        market.set_par_rate("aud.10y10y", ParRate::new(dec!(3.50), as_of()));

        let legs = resolved("2*aud.5y5y - aud.2y2y - aud.10y10y");
        let spread = dec!(0.05);
        let solved = solve_curve_levels(&legs, spread, &market).unwrap();

        let reproduced: Decimal = legs
            .iter()
            .zip(&solved.levels)
            .map(|(leg, lvl)| leg.coefficient * lvl.level)
            .sum();
        assert_eq!(reproduced, spread);
    }

    #[test]
    fn test_missing_quote_uses_flagged_fallback() {
        // No quotes registered at all: the non-solved leg falls back to the
        // sentinel and is flagged as such.
        let market = InMemoryMarket::new();
        let legs = resolved("aud.5y5y.10y10y");
        let solved = solve_curve_levels(&legs, dec!(0.15), &market).unwrap();

        assert_eq!(solved.levels[1].level, FALLBACK_PAR_RATE);
        assert_eq!(solved.levels[1].source, LevelSource::Fallback);
        assert_eq!(solved.levels[0].level, dec!(3.15));
    }

    #[test]
    fn test_tie_break_first_occurrence() {
        assert_eq!(
            solve_target_index(&[dec!(1), dec!(-1), dec!(1)]),
            Some(0)
        );
        assert_eq!(
            solve_target_index(&[dec!(-1), dec!(2), dec!(-2)]),
            Some(1)
        );
        assert_eq!(solve_target_index(&[]), None);
    }

    #[test]
    fn test_zero_solve_coefficient_fails() {
        let err = solve_for_spread(&[dec!(0), dec!(0)], &[dec!(3), dec!(3)], dec!(0.1))
            .unwrap_err();
        assert!(matches!(err, PricingError::SolveFailed { .. }));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let err = solve_for_spread(&[dec!(1)], &[], dec!(0.1)).unwrap_err();
        assert!(matches!(err, PricingError::SolveFailed { .. }));
    }

    proptest! {
        /// The solve always reproduces the traded spread exactly,
        /// whatever the references.
        #[test]
        fn prop_solve_reproduces_spread(
            coeffs in proptest::collection::vec(-4i64..=4, 1..6),
            refs in proptest::collection::vec(-500i64..=500, 6),
            spread in -1000i64..=1000,
        ) {
            let coefficients: Vec<Decimal> =
                coeffs.iter().map(|c| Decimal::from(*c)).collect();
            prop_assume!(coefficients.iter().any(|c| !c.is_zero()));

            let references: Vec<Decimal> = refs[..coefficients.len()]
                .iter()
                .map(|r| Decimal::from(*r) / dec!(100))
                .collect();
            let spread = Decimal::from(spread) / dec!(100);

            let (k, solved) =
                solve_for_spread(&coefficients, &references, spread).unwrap();

            let mut levels = references.clone();
            levels[k] = solved;
            let reproduced: Decimal = coefficients
                .iter()
                .zip(&levels)
                .map(|(c, l)| c * l)
                .sum();
            prop_assert!((reproduced - spread).abs() < dec!(0.000000001));
        }
    }
}
