use crate::logs::error::LogError;
use crate::logs::types::LogRecord;
use chrono::{DateTime, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})([dhm])$").expect("valid period regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("'{value}' is not a valid period (expected 1-99 followed by d, h or m)")]
    Invalid { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Days,
    Hours,
    Minutes,
}

/// Look-back window such as `1h`, `30m` or `7d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSpec {
    quantity: u32,
    unit: PeriodUnit,
}

impl PeriodSpec {
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    pub fn duration(&self) -> TimeDelta {
        let n = i64::from(self.quantity);
        match self.unit {
            PeriodUnit::Days => TimeDelta::days(n),
            PeriodUnit::Hours => TimeDelta::hours(n),
            PeriodUnit::Minutes => TimeDelta::minutes(n),
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl FromStr for PeriodSpec {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodError::Invalid {
            value: s.to_string(),
        };
        let caps = PERIOD.captures(s).ok_or_else(invalid)?;

        let quantity: u32 = caps[1].parse().map_err(|_| invalid())?;
        let unit = match &caps[2] {
            "d" => PeriodUnit::Days,
            "h" => PeriodUnit::Hours,
            "m" => PeriodUnit::Minutes,
            _ => return Err(invalid()),
        };

        Ok(Self {
            quantity: quantity.max(1),
            unit,
        })
    }
}

impl fmt::Display for PeriodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            PeriodUnit::Days => 'd',
            PeriodUnit::Hours => 'h',
            PeriodUnit::Minutes => 'm',
        };
        write!(f, "{}{}", self.quantity, unit)
    }
}

/// Records received at or after `cutoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    cutoff: DateTime<Utc>,
}

impl TimeWindow {
    pub fn since(period: PeriodSpec, now: DateTime<Utc>) -> Self {
        Self::starting_at(period.cutoff(now))
    }

    pub fn starting_at(cutoff: DateTime<Utc>) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn contains(&self, record: &LogRecord) -> bool {
        record.time_received.with_timezone(&Utc) >= self.cutoff
    }

    /// Keeps in-window records; errors pass through untouched.
    pub fn filter<I>(self, records: I) -> impl Iterator<Item = Result<LogRecord, LogError>>
    where
        I: IntoIterator<Item = Result<LogRecord, LogError>>,
    {
        records.into_iter().filter(move |item| match item {
            Ok(record) => self.contains(record),
            Err(_) => true,
        })
    }
}
