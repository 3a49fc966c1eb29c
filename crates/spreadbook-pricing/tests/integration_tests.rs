//! Integration tests for spreadbook-pricing.
//!
//! These exercise the full build pipeline — parse, resolve, solve, size,
//! register with the engine — against the in-memory market fixture.

use approx::assert_relative_eq;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use spreadbook_core::Date;
use spreadbook_market::{
    InMemoryMarket, ParRate, SnapshotCatalog, StaticTemplateRegistry, ValuationEngine,
};
use spreadbook_pricing::{
    LevelSource, MarketContext, SpreadQuote, SwapPosition, UNIT_NOTIONAL,
};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn today() -> Date {
    date(2025, 8, 7)
}

fn context(market: &InMemoryMarket) -> MarketContext<'_> {
    MarketContext {
        catalog: market,
        curve_quotes: market,
        futures_quotes: market,
        engine: market,
        registry: StaticTemplateRegistry::global(),
        today: today(),
    }
}

fn spread_identity(position: &SwapPosition) -> Decimal {
    position
        .legs()
        .iter()
        .map(|leg| leg.coefficient * leg.level)
        .sum()
}

#[test]
fn outright_takes_spread_as_level() {
    // One leg, coefficient +1: the solved level is the traded value itself.
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    let ctx = context(&market);

    let mut position = SwapPosition::new("aud.10y");
    position.build(SpreadQuote::new(dec!(3.20), 500.0), &ctx).unwrap();

    assert_eq!(position.legs().len(), 1);
    assert_eq!(position.legs()[0].coefficient, dec!(1));
    assert_eq!(position.legs()[0].level, dec!(3.20));
}

#[test]
fn forward_spread_solves_long_leg() {
    // aud.5y5y.10y10y traded at 0.15 with aud.5y5y quoted at 3.00:
    // the long leg is implied at 3.15.
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    market.set_par_rate("aud.5y5y", ParRate::new(dec!(3.00), today()));
    let ctx = context(&market);

    let mut position = SwapPosition::new("aud.5y5y.10y10y");
    position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();

    let legs = position.legs();
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[0].atom, "aud.10y10y");
    assert_eq!(legs[0].coefficient, dec!(1));
    assert_eq!(legs[0].level, dec!(3.15));
    assert_eq!(legs[1].atom, "aud.5y5y");
    assert_eq!(legs[1].coefficient, dec!(-1));

    assert_eq!(spread_identity(&position), dec!(0.15));
}

#[test]
fn butterfly_solves_body_from_wings() {
    // 2*aud.5y5y - aud.2y2y - aud.10y10y = 0.05 with wings at 2.50/3.50:
    // otherSum = -6.00, body = (0.05 + 6.00) / 2 = 3.025.
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    market.set_par_rate("aud.2y2y", ParRate::new(dec!(2.50), today()));
    market.set_par_rate("aud.10y10y", ParRate::new(dec!(3.50), today()));
    let ctx = context(&market);

    let mut position = SwapPosition::new("2*aud.5y5y - aud.2y2y - aud.10y10y");
    position.build(SpreadQuote::new(dec!(0.05), 500.0), &ctx).unwrap();

    let legs = position.legs();
    assert_eq!(legs[0].atom, "aud.5y5y");
    assert_eq!(legs[0].level, dec!(3.025));

    let levels = position.levels().unwrap();
    assert_eq!(levels.solve_index, 0);
    assert_eq!(levels.levels[0].source, LevelSource::Solved);
    assert_eq!(levels.levels[1].source, LevelSource::Quoted);

    assert_eq!(spread_identity(&position), dec!(0.05));
}

#[test]
fn risk_sizing_from_probe_sensitivity() {
    // Requested risk 500, coefficient +1, probe shows 950 per million:
    // required notional ~ 526,316.
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 950.0);
    let ctx = context(&market);

    let mut position = SwapPosition::new("aud.10y");
    position.build(SpreadQuote::new(dec!(3.20), 500.0), &ctx).unwrap();

    let leg = &position.legs()[0];
    assert_relative_eq!(leg.probe_sensitivity, 950.0);
    assert_relative_eq!(leg.notional, 500.0 / 950.0 * UNIT_NOTIONAL, max_relative = 1e-9);
    assert_relative_eq!(leg.notional, 526_315.789, max_relative = 1e-6);
}

#[test]
fn risk_invariant_per_leg() {
    // For every leg of a built structure, the engine sensitivity of the
    // final instrument equals risk_size x coefficient.
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    market.set_par_rate("aud.2y2y", ParRate::new(dec!(2.50), today()));
    market.set_par_rate("aud.10y10y", ParRate::new(dec!(3.50), today()));
    let ctx = context(&market);

    let mut position = SwapPosition::new("2*aud.5y5y - aud.2y2y - aud.10y10y");
    position.build(SpreadQuote::new(dec!(0.05), 500.0), &ctx).unwrap();

    for leg in position.legs() {
        let achieved = market.risk_sensitivity(today(), &leg.handle).unwrap();
        let target = 500.0 * leg.coefficient.to_f64().unwrap();
        assert_relative_eq!(achieved, target, max_relative = 1e-9);
    }
}

#[test]
fn cross_currency_legs_use_their_own_templates() {
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    market.set_sensitivity("EURIRS-AS", 520.0);
    market.set_par_rate("aud.10y10y", ParRate::new(dec!(3.80), today()));
    let ctx = context(&market);

    let mut position = SwapPosition::new("eur.10y10y - aud.10y10y");
    position.build(SpreadQuote::new(dec!(-1.20), 500.0), &ctx).unwrap();

    let eur = market.instrument(&position.legs()[0].handle).unwrap();
    let aud = market.instrument(&position.legs()[1].handle).unwrap();
    assert_eq!(eur.template.as_str(), "EURIRS-AS");
    assert_eq!(aud.template.as_str(), "AUDIRS-SS");

    // eur leg solved: -1.20 + 3.80 = 2.60
    assert_eq!(position.legs()[0].level, dec!(2.60));
}

#[test]
fn fixed_date_leg_builds_from_literal_date() {
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    let ctx = context(&market);

    let mut position = SwapPosition::new("aud.130526.1y");
    position.build(SpreadQuote::new(dec!(3.45), 500.0), &ctx).unwrap();

    let spec = market.instrument(&position.legs()[0].handle).unwrap();
    assert_eq!(spec.start, date(2026, 5, 13));
    assert_eq!(spec.end, date(2027, 5, 13));
}

#[test]
fn point_value_is_idempotent() {
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    market.set_par_rate("aud.5y5y", ParRate::new(dec!(3.00), today()));
    market.add_snapshot(today());
    market.set_snapshot_level(today(), "AUDIRS-SS", dec!(3.12));
    let ctx = context(&market);

    let mut position = SwapPosition::new("aud.5y5y.10y10y");
    position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();

    let first = position.value_at(today(), &market).unwrap();
    let second = position.value_at(today(), &market).unwrap();
    assert_eq!(first, second);
}

#[test]
fn series_respects_catalog_and_window() {
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    market.set_par_rate("aud.5y5y", ParRate::new(dec!(3.00), today()));

    for day in 1..=10 {
        let d = date(2025, 8, day);
        market.add_snapshot(d);
        market.set_snapshot_level(d, "AUDIRS-SS", dec!(3.00) + Decimal::from(day) / dec!(100));
    }
    let ctx = context(&market);

    let mut position = SwapPosition::new("aud.5y5y.10y10y");
    position.build(SpreadQuote::new(dec!(0.15), 500.0), &ctx).unwrap();

    let series = position.value_series(date(2025, 8, 4), &ctx).unwrap();
    let catalog = market.available_dates();

    // Dates are a subset of the catalog, clamped to [from, today].
    assert!(series.iter().all(|p| catalog.contains(&p.date)));
    assert_eq!(series.first().unwrap().date, date(2025, 8, 4));
    assert_eq!(series.last().unwrap().date, today());
    assert_eq!(series.len(), 4);
}

#[test]
fn failed_build_keeps_no_instruments() {
    let market = InMemoryMarket::new();
    market.set_sensitivity("AUDIRS-SS", 450.0);
    let ctx = context(&market);

    // Second leg resolves to an unknown currency: the whole build fails and
    // nothing is left behind to aggregate.
    let mut position = SwapPosition::new("aud.10y10y - sek.10y10y");
    assert!(position
        .build(SpreadQuote::new(dec!(0.15), 500.0), &ctx)
        .is_err());
    assert!(position.legs().is_empty());
    assert!(position.value_at(today(), &market).is_err());
}
