use crate::core::currency::Currency;
use thiserror::Error;

/// Errors raised by ledger mutations and derived reads.
///
/// Every variant is a validation failure. The operation that raised it
/// has not touched the group.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("member name must not be blank")]
    InvalidName,
    #[error("duplicate member name \"{0}\"")]
    DuplicateName(String),
    #[error("no member with name \"{0}\"")]
    UnknownMember(String),
    #[error("no exchange rate configured for {currency} (group currency {base})")]
    NoExchangeRate { currency: Currency, base: Currency },
    #[error("amount must be positive, got {0}")]
    InvalidAmount(f64),
    #[error("an entry needs at least one recipient")]
    NoRecipients,
    #[error("a {kind} needs exactly one recipient, got {count}")]
    InvalidRecipientCount { kind: &'static str, count: usize },
    #[error("exchange rate must be positive, got {rate} for {currency}")]
    InvalidRate { currency: Currency, rate: f64 },
    #[error("{0} is the group currency and cannot carry an exchange rate")]
    BaseCurrencyRate(Currency),
    #[error("only pending balances can be promoted to transfers")]
    NotABalance,
    #[error("balance belongs to another group")]
    ForeignBalance,
    #[error("no entry with id {0}")]
    UnknownEntry(usize),
}

/// Errors raised when reading values from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid timestamp \"{0}\", expected dd.MM.yyyy or dd.MM.yyyy HH:mm:ss")]
    InvalidTimeStamp(String),
    #[error("unknown currency code \"{0}\"")]
    InvalidCurrency(String),
}
