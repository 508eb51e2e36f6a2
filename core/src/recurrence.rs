//! Recurrence rule codec (`FREQ=WEEKLY;COUNT=3`).
//!
//! The client only encodes and validates rules; expanding a rule into
//! instances is the backend's job.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(RuleParseError::UnknownFrequency(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("malformed rule part `{0}`, expected KEY=VALUE")]
    MalformedPart(String),
    #[error("unknown rule key `{0}`")]
    UnknownKey(String),
    #[error("rule key `{0}` given more than once")]
    DuplicateKey(&'static str),
    #[error("unknown frequency `{0}`")]
    UnknownFrequency(String),
    #[error("invalid COUNT `{0}`, expected a positive integer")]
    InvalidCount(String),
    #[error("rule is missing {0}")]
    Missing(&'static str),
}

/// Repeat frequency plus occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub count: u32,
}

impl RecurrenceRule {
    pub const fn new(frequency: Frequency, count: u32) -> Self {
        Self { frequency, count }
    }

    /// Choices offered by the recurrence form, default first.
    pub const PRESETS: [RecurrenceRule; 3] = [
        RecurrenceRule::new(Frequency::Weekly, 3),
        RecurrenceRule::new(Frequency::Daily, 5),
        RecurrenceRule::new(Frequency::Monthly, 6),
    ];

    pub fn label(&self) -> String {
        format!("{} ({} occurrences)", self.frequency.label(), self.count)
    }
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::PRESETS[0]
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={};COUNT={}", self.frequency.as_str(), self.count)
    }
}

impl FromStr for RecurrenceRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut frequency = None;
        let mut count = None;

        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| RuleParseError::MalformedPart(part.to_string()))?;
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => {
                    if frequency.is_some() {
                        return Err(RuleParseError::DuplicateKey("FREQ"));
                    }
                    frequency = Some(value.parse::<Frequency>()?);
                }
                "COUNT" => {
                    if count.is_some() {
                        return Err(RuleParseError::DuplicateKey("COUNT"));
                    }
                    let n = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| RuleParseError::InvalidCount(value.trim().to_string()))?;
                    count = Some(n);
                }
                other => return Err(RuleParseError::UnknownKey(other.to_string())),
            }
        }

        Ok(RecurrenceRule {
            frequency: frequency.ok_or(RuleParseError::Missing("FREQ"))?,
            count: count.ok_or(RuleParseError::Missing("COUNT"))?,
        })
    }
}
