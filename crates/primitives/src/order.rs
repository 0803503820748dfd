//! Model order definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-seasonal (p, d, q) order of an ARIMA model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl ArimaOrder {
    /// Create a new order.
    #[must_use]
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal (P, D, Q, s) order of a SARIMA model.
///
/// A period below 2 means the model has no seasonal part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal autoregressive order.
    pub p: usize,
    /// Seasonal differencing order.
    pub d: usize,
    /// Seasonal moving-average order.
    pub q: usize,
    /// Season length in observations.
    pub period: usize,
}

impl SeasonalOrder {
    /// Create a new seasonal order.
    #[must_use]
    pub const fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// The empty seasonal order.
    #[must_use]
    pub const fn none() -> Self {
        Self { p: 0, d: 0, q: 0, period: 0 }
    }

    /// Whether this order contributes any seasonal terms.
    #[must_use]
    pub const fn is_seasonal(&self) -> bool {
        self.period > 1 && (self.p > 0 || self.d > 0 || self.q > 0)
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_seasonal() {
            write!(f, "({},{},{})[{}]", self.p, self.d, self.q, self.period)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SeasonalOrder::new(1, 0, 0, 12), true)]
    #[case(SeasonalOrder::new(0, 0, 0, 12), false)]
    #[case(SeasonalOrder::new(1, 1, 1, 1), false)]
    #[case(SeasonalOrder::none(), false)]
    fn seasonal_detection(#[case] order: SeasonalOrder, #[case] expected: bool) {
        assert_eq!(order.is_seasonal(), expected);
    }

    #[test]
    fn display_orders() {
        assert_eq!(ArimaOrder::new(2, 1, 0).to_string(), "ARIMA(2,1,0)");
        assert_eq!(SeasonalOrder::new(0, 1, 1, 7).to_string(), "(0,1,1)[7]");
        assert_eq!(SeasonalOrder::none().to_string(), "");
    }
}
