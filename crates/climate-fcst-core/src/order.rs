//! Non-seasonal and seasonal model orders.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

fn non_negative(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        ForecastError::Configuration(format!("{} must be non-negative, got {}", name, value))
    })
}

/// Autoregressive, differencing and moving-average term counts `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Order {
    /// Validate signed components, rejecting any negative term count.
    pub fn new(p: i64, d: i64, q: i64) -> Result<Self> {
        Ok(Self {
            p: non_negative("p", p)?,
            d: non_negative("d", d)?,
            q: non_negative("q", q)?,
        })
    }
}

impl TryFrom<[i64; 3]> for Order {
    type Error = ForecastError;

    fn try_from([p, d, q]: [i64; 3]) -> Result<Self> {
        Order::new(p, d, q)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal counterparts `(P, D, Q)` plus the period length `s`.
///
/// `s` must exceed 1 whenever any seasonal term is non-zero. The all-zero
/// order (with any `s`) disables the seasonal part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub s: usize,
}

impl SeasonalOrder {
    pub fn new(p: i64, d: i64, q: i64, s: i64) -> Result<Self> {
        let order = Self {
            p: non_negative("P", p)?,
            d: non_negative("D", d)?,
            q: non_negative("Q", q)?,
            s: non_negative("s", s)?,
        };

        if order.has_terms() && order.s <= 1 {
            return Err(ForecastError::Configuration(format!(
                "Seasonal period must be greater than 1 when seasonal terms are set, got s={}",
                order.s
            )));
        }

        Ok(order)
    }

    /// Seasonal part disabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// True when any of `P`, `D`, `Q` is non-zero.
    pub fn has_terms(&self) -> bool {
        self.p + self.d + self.q > 0
    }

    /// Period used in lag arithmetic; zero when the seasonal part is disabled.
    pub(crate) fn period(&self) -> usize {
        if self.has_terms() {
            self.s
        } else {
            0
        }
    }
}

impl TryFrom<[i64; 4]> for SeasonalOrder {
    type Error = ForecastError;

    fn try_from([p, d, q, s]: [i64; 4]) -> Result<Self> {
        SeasonalOrder::new(p, d, q, s)
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.p, self.d, self.q, self.s)
    }
}
