//! Error types for expression parsing, solving, and position valuation.
//!
//! Fatal errors (parse, resolution, solve, build) make a position unusable.
//! Per-leg valuation problems are collected on result objects instead of
//! being raised, so partially-valuable structures still report whatever is
//! computable.

use thiserror::Error;

/// A specialized Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors raised while building or valuing positions.
#[derive(Error, Debug, Clone)]
pub enum PricingError {
    /// Malformed expression or no recognizable instrument atoms.
    #[error("Cannot parse '{expression}': {reason}")]
    ParseFailed {
        /// The offending expression.
        expression: String,
        /// Description of the parse problem.
        reason: String,
    },

    /// An atom could not be resolved to a template and date range.
    #[error("Cannot resolve leg '{atom}': {reason}")]
    ResolutionFailed {
        /// The offending instrument atom.
        atom: String,
        /// Description of the resolution problem.
        reason: String,
    },

    /// The implied-level solve could not be performed.
    #[error("Spread solve failed: {reason}")]
    SolveFailed {
        /// Description of the solve problem.
        reason: String,
    },

    /// The valuation engine rejected a leg instrument.
    #[error("Cannot build leg '{atom}': {reason}")]
    BuildFailed {
        /// The instrument atom of the rejected leg.
        atom: String,
        /// Description of the rejection.
        reason: String,
    },

    /// A present-value or risk query failed.
    #[error("Valuation failed: {reason}")]
    ValuationFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The position has not been (successfully) built.
    #[error("Position '{expression}' is not built")]
    NotBuilt {
        /// Expression of the unbuilt position.
        expression: String,
    },
}

impl PricingError {
    /// Creates a parse error.
    #[must_use]
    pub fn parse_failed(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Creates a resolution error.
    #[must_use]
    pub fn resolution_failed(atom: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            atom: atom.into(),
            reason: reason.into(),
        }
    }

    /// Creates a solve error.
    #[must_use]
    pub fn solve_failed(reason: impl Into<String>) -> Self {
        Self::SolveFailed {
            reason: reason.into(),
        }
    }

    /// Creates a leg build error.
    #[must_use]
    pub fn build_failed(atom: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BuildFailed {
            atom: atom.into(),
            reason: reason.into(),
        }
    }

    /// Creates a valuation error.
    #[must_use]
    pub fn valuation_failed(reason: impl Into<String>) -> Self {
        Self::ValuationFailed {
            reason: reason.into(),
        }
    }

    /// Creates a not-built error.
    #[must_use]
    pub fn not_built(expression: impl Into<String>) -> Self {
        Self::NotBuilt {
            expression: expression.into(),
        }
    }
}

// Errors serialize as their display string and are not round-tripped;
// deserialized errors come back as opaque valuation failures.
impl serde::Serialize for PricingError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PricingError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let message = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(PricingError::valuation_failed(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PricingError::parse_failed("aud.banana", "unrecognized tenor");
        assert!(err.to_string().contains("aud.banana"));

        let err = PricingError::build_failed("aud.5y5y", "engine offline");
        assert!(err.to_string().contains("aud.5y5y"));
        assert!(err.to_string().contains("engine offline"));
    }
}
