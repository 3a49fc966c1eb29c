//! Identifier types shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Curve template identifier (e.g. "AUDIRS-SS", "USDSOFR").
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl TemplateId {
    /// Create a new template ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Trade identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl TradeId {
    /// Create a new trade ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TradeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TradeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque handle to an instrument held by the valuation engine.
///
/// Handles are issued by [`crate::ValuationEngine::create_instrument`] and
/// are only meaningful to the engine that issued them. The economic terms
/// behind a handle are immutable; re-quoting or re-sizing a leg means
/// creating a new instrument, never mutating an existing one.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct InstrumentHandle(pub String);

impl InstrumentHandle {
    /// Create a new instrument handle.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_display() {
        let id = TemplateId::new("AUDIRS-SS");
        assert_eq!(id.to_string(), "AUDIRS-SS");
        assert_eq!(id.as_str(), "AUDIRS-SS");
    }

    #[test]
    fn test_trade_id_ordering() {
        let a = TradeId::new("trade-001");
        let b = TradeId::new("trade-002");
        assert!(a < b);
    }
}
