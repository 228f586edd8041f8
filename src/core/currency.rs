use crate::core::error::{LedgerError, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Currencies an entry or a group can be denominated in.
///
/// The textual form is the variant name, case-sensitive, so `"Euro"`
/// parses and `"euro"` does not.
///
/// # Examples
///
/// ```
/// use money_pool::core::currency::Currency;
///
/// let usd: Currency = "USD".parse().unwrap();
/// assert_eq!(usd, Currency::USD);
/// assert_eq!(Currency::Euro.to_string(), "Euro");
/// ```
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Currency {
    #[default]
    Euro,
    USD,
    GBP,
    CHF,
    JPY,
    SEK,
    NOK,
    DKK,
    PLN,
    CZK,
}

impl Currency {
    /// Every currency, in declaration order.
    pub const ALL: [Currency; 10] = [
        Currency::Euro,
        Currency::USD,
        Currency::GBP,
        Currency::CHF,
        Currency::JPY,
        Currency::SEK,
        Currency::NOK,
        Currency::DKK,
        Currency::PLN,
        Currency::CZK,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Euro => "Euro",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::DKK => "DKK",
            Currency::PLN => "PLN",
            Currency::CZK => "CZK",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| ParseError::InvalidCurrency(s.to_string()))
    }
}

/// Exchange rates of a group, relative to its base currency.
///
/// A rate is the amount of foreign currency worth one unit of the base
/// currency. The base currency never carries a rate of its own.
/// Conversions always read the current table, so changing a rate
/// re-prices every entry recorded in that currency.
///
/// # Examples
///
/// ```
/// use money_pool::core::currency::{Currency, ExchangeRates};
///
/// let mut rates = ExchangeRates::new(Currency::Euro);
/// rates.set_rate(Currency::USD, 1.25).unwrap();
///
/// assert_eq!(rates.exchange(125.0, Currency::USD).unwrap(), 100.0);
/// assert_eq!(rates.exchange(40.0, Currency::Euro).unwrap(), 40.0);
/// assert!(rates.exchange(10.0, Currency::GBP).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRates {
    base: Currency,
    rates: BTreeMap<Currency, f64>,
}

impl ExchangeRates {
    pub fn new(base: Currency) -> Self {
        Self {
            base,
            rates: BTreeMap::new(),
        }
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    /// Set or replace the rate for `currency`.
    pub fn set_rate(&mut self, currency: Currency, rate: f64) -> Result<(), LedgerError> {
        if currency == self.base {
            return Err(LedgerError::BaseCurrencyRate(currency));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(LedgerError::InvalidRate { currency, rate });
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// The configured rate, or `None` for the base currency and for
    /// currencies without a rate.
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates.get(&currency).copied()
    }

    /// Convert `amount` of `currency` into the base currency.
    pub fn exchange(&self, amount: f64, currency: Currency) -> Result<f64, LedgerError> {
        if currency == self.base {
            return Ok(amount);
        }
        self.rate(currency)
            .map(|rate| amount / rate)
            .ok_or(LedgerError::NoExchangeRate {
                currency,
                base: self.base,
            })
    }

    /// Configured rates in currency declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.rates.iter().map(|(c, r)| (*c, *r))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_currency_names_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(currency.name().parse::<Currency>().unwrap(), currency);
        }
    }

    #[test]
    fn test_currency_parse_is_case_sensitive() {
        assert_eq!(
            "euro".parse::<Currency>(),
            Err(ParseError::InvalidCurrency("euro".to_string()))
        );
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_currency_serde_uses_variant_name() {
        assert_eq!(serde_json::to_string(&Currency::Euro).unwrap(), "\"Euro\"");
        let usd: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(usd, Currency::USD);
    }

    #[test]
    fn test_exchange_base_is_identity() {
        let rates = ExchangeRates::new(Currency::Euro);
        assert_eq!(rates.exchange(12.5, Currency::Euro).unwrap(), 12.5);
    }

    #[test]
    fn test_exchange_divides_by_rate() {
        let mut rates = ExchangeRates::new(Currency::Euro);
        rates.set_rate(Currency::USD, 1.19).unwrap();
        let converted = rates.exchange(200.0, Currency::USD).unwrap();
        assert_relative_eq!(converted, 200.0 / 1.19);
        assert_relative_eq!(converted * 1.19, 200.0);
    }

    #[test]
    fn test_exchange_without_rate() {
        let rates = ExchangeRates::new(Currency::Euro);
        assert_eq!(
            rates.exchange(1.0, Currency::CHF),
            Err(LedgerError::NoExchangeRate {
                currency: Currency::CHF,
                base: Currency::Euro,
            })
        );
    }

    #[test]
    fn test_rate_can_be_replaced() {
        let mut rates = ExchangeRates::new(Currency::Euro);
        rates.set_rate(Currency::USD, 2.0).unwrap();
        assert_eq!(rates.exchange(10.0, Currency::USD).unwrap(), 5.0);
        rates.set_rate(Currency::USD, 4.0).unwrap();
        assert_eq!(rates.exchange(10.0, Currency::USD).unwrap(), 2.5);
        assert_eq!(rates.len(), 1);
    }

    #[test]
    fn test_invalid_rate() {
        let mut rates = ExchangeRates::new(Currency::Euro);
        assert!(rates.set_rate(Currency::USD, 0.0).is_err());
        assert!(rates.set_rate(Currency::USD, -1.5).is_err());
        assert!(rates.set_rate(Currency::USD, f64::NAN).is_err());
        assert_eq!(
            rates.set_rate(Currency::Euro, 1.0),
            Err(LedgerError::BaseCurrencyRate(Currency::Euro))
        );
        assert!(rates.is_empty());
    }

    #[test]
    fn test_iter_in_declaration_order() {
        let mut rates = ExchangeRates::new(Currency::Euro);
        rates.set_rate(Currency::JPY, 160.0).unwrap();
        rates.set_rate(Currency::USD, 1.1).unwrap();
        let order: Vec<Currency> = rates.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Currency::USD, Currency::JPY]);
    }
}
