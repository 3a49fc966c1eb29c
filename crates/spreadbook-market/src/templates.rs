//! Curve template registry.
//!
//! Maps the currency/sub-code prefix of an instrument atom (the part before
//! the first dot, e.g. "aud" in "aud.5y5y" or "eurxc" in "eurxc.10y") to the
//! curve template and floating reference index used to build that leg.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};
use crate::ids::TemplateId;

/// Template and reference index for one currency/sub-code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveTemplate {
    /// Engine template identifier.
    pub template: TemplateId,
    /// Floating reference index the template fixes against.
    pub reference_index: String,
}

impl CurveTemplate {
    /// Creates a new curve template entry.
    #[must_use]
    pub fn new(template: impl Into<TemplateId>, reference_index: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            reference_index: reference_index.into(),
        }
    }
}

/// Lookup from currency/sub-code to curve template identity.
pub trait TemplateRegistry: Send + Sync {
    /// Resolves a currency/sub-code to its template and reference index.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::UnknownCurrency` for unmapped codes.
    fn resolve(&self, code: &str) -> MarketResult<CurveTemplate>;
}

/// Built-in registry covering the traded currency set.
///
/// Sub-codes select basis and cross-currency variants: "audbs" is the
/// BBSW/SOFR basis curve, "audxc" the AONIA/SOFR cross-currency curve, and
/// so on.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTemplateRegistry;

impl StaticTemplateRegistry {
    /// Returns the shared registry instance.
    #[must_use]
    pub fn global() -> &'static Self {
        static INSTANCE: StaticTemplateRegistry = StaticTemplateRegistry;
        &INSTANCE
    }

    fn table() -> &'static HashMap<&'static str, (&'static str, &'static str)> {
        static TABLE: OnceLock<HashMap<&'static str, (&'static str, &'static str)>> =
            OnceLock::new();
        TABLE.get_or_init(|| {
            HashMap::from([
                ("aud", ("AUDIRS-SS", "BBSW-6M")),
                ("audbs", ("BBSW-SOFR", "BBSW-3M")),
                ("audxc", ("AONIA-SOFR", "AONIA")),
                ("audbob", ("AUDBOB-3M", "BBSW-3M")),
                ("aud6s3s", ("AUDBASIS-6X3", "BBSW-6M")),
                ("gbp", ("GBPOIS", "SONIA")),
                ("gbpxc", ("SONIA-SOFR", "SONIA")),
                ("usd", ("USDSOFR", "SOFR")),
                ("eur", ("EURIRS-AS", "ESTR")),
                ("eurxc", ("ESTR-SOFR", "ESTR")),
                ("eurbob", ("EURESTR-EURIBOR3M", "EURIBOR-3M")),
                ("eur6s3s", ("EURBASIS-6X3", "EURIBOR-6M")),
                ("jpy", ("JPYOIS", "TONAR")),
                ("jpyxc", ("TONAR-SOFR", "TONAR")),
                ("cad", ("CADOIS", "CORRA")),
                ("cadxc", ("CORRA-SOFR", "CORRA")),
                ("nzd", ("NZDIRS-SQ", "BKBM-3M")),
                ("nzdbs", ("BKBM-SOFR", "BKBM-3M")),
                ("nzdxc", ("NZOCR-SOFR", "NZOCR")),
            ])
        })
    }
}

impl TemplateRegistry for StaticTemplateRegistry {
    fn resolve(&self, code: &str) -> MarketResult<CurveTemplate> {
        Self::table()
            .get(code)
            .map(|(template, index)| CurveTemplate::new(*template, *index))
            .ok_or_else(|| MarketError::unknown_currency(code))
    }
}
