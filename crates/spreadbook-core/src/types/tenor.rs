//! Tenor representation for curve instruments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// Unit of a tenor period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Calendar days
    Days,
    /// Calendar months
    Months,
    /// Calendar years
    Years,
}

/// A tenor period (e.g. 10y, 6m, 90d).
///
/// Tenors are written lowercase in instrument atoms: a digit run followed by
/// one of `y`, `m`, `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenor {
    /// Number of units.
    pub count: u32,
    /// Period unit.
    pub unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor from a count and unit.
    #[must_use]
    pub fn new(count: u32, unit: TenorUnit) -> Self {
        Self { count, unit }
    }

    /// A zero-length tenor (used for spot-starting outrights).
    #[must_use]
    pub fn zero() -> Self {
        Self::new(0, TenorUnit::Years)
    }

    /// Returns true for a zero-length tenor.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.count == 0
    }

    /// Offsets a date forward by this tenor using calendar arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the offset date is out of range.
    pub fn offset_from(&self, date: Date) -> CoreResult<Date> {
        match self.unit {
            TenorUnit::Days => Ok(date.add_days(i64::from(self.count))),
            TenorUnit::Months => date.add_months(self.count as i32),
            TenorUnit::Years => date.add_years(self.count as i32),
        }
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 2 {
            return Err(CoreError::invalid_tenor(format!("too short: {s:?}")));
        }
        let (num_str, unit_str) = s.split_at(s.len() - 1);
        if !num_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::invalid_tenor(format!(
                "invalid tenor number: {num_str:?}"
            )));
        }
        let count: u32 = num_str
            .parse()
            .map_err(|_| CoreError::invalid_tenor(format!("invalid tenor number: {num_str:?}")))?;

        let unit = match unit_str {
            "d" => TenorUnit::Days,
            "m" => TenorUnit::Months,
            "y" => TenorUnit::Years,
            _ => {
                return Err(CoreError::invalid_tenor(format!(
                    "invalid tenor unit: {unit_str:?}"
                )))
            }
        };

        Ok(Tenor::new(count, unit))
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TenorUnit::Days => 'd',
            TenorUnit::Months => 'm',
            TenorUnit::Years => 'y',
        };
        write!(f, "{}{}", self.count, unit)
    }
}
