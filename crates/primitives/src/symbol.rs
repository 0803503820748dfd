//! Ticker symbol.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Stock ticker symbol, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol, normalising to upper case.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name under which the raw price history of this symbol is cached.
    #[must_use]
    pub fn history_file_name(&self) -> String {
        format!("{}_historical.csv", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalised() {
        let sym: Symbol = " aapl ".into();
        assert_eq!(sym.as_str(), "AAPL");
        assert_eq!(sym.to_string(), "AAPL");
    }

    #[test]
    fn history_file_name() {
        assert_eq!(Symbol::new("msft").history_file_name(), "MSFT_historical.csv");
    }
}
