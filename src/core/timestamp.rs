use crate::core::error::ParseError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%d.%m.%Y";
const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// A point in time stamped on every ledger record.
///
/// Renders as `dd.MM.yyyy` when the time of day is midnight and as
/// `dd.MM.yyyy HH:mm:ss` otherwise. Parsing accepts both forms.
///
/// # Examples
///
/// ```
/// use money_pool::core::timestamp::TimeStamp;
///
/// let date: TimeStamp = "23.06.2021".parse().unwrap();
/// assert_eq!(date.to_string(), "23.06.2021");
///
/// let moment: TimeStamp = "23.06.2021 07:54:09".parse().unwrap();
/// assert_eq!(moment.to_string(), "23.06.2021 07:54:09");
/// assert!(date < moment);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeStamp(NaiveDateTime);

impl TimeStamp {
    /// The current local time, truncated to whole seconds.
    pub fn now() -> Self {
        let now = Local::now().naive_local();
        Self(now.with_nanosecond(0).unwrap_or(now))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.0
    }

    /// True when no time of day is attached.
    pub fn is_date_only(&self) -> bool {
        self.0.time() == NaiveTime::MIN
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_date_only() {
            write!(f, "{}", self.0.format(DATE_FORMAT))
        } else {
            write!(f, "{}", self.0.format(DATE_TIME_FORMAT))
        }
    }
}

impl FromStr for TimeStamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(time) = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT) {
            return Ok(Self(time));
        }
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Self::from_date)
            .map_err(|_| ParseError::InvalidTimeStamp(s.to_string()))
    }
}

impl TryFrom<String> for TimeStamp {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeStamp> for String {
    fn from(stamp: TimeStamp) -> Self {
        stamp.to_string()
    }
}
