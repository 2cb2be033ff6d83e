// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Calendar collaborator: timezone-aware parsing, locale-aware formatting, and step arithmetic.
//!
//! The layout engine never does date math itself. Everything that depends on calendar rules
//! (month lengths, offsets, locale month names) goes through the [`Calendar`] trait so hosts can
//! plug in their own rules; [`ChronoCalendar`] is the default implementation.

use std::fmt;
use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::{
    DateTime, FixedOffset, Locale, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone,
};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point in time in the chart's timezone.
pub type Instant = DateTime<FixedOffset>;

/// Upper bound for the number of boundaries a single split may produce.
pub const MAX_BOUNDARIES: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl StepUnit {
    /// Pattern used to turn a column boundary into its lookup key.
    pub fn key_pattern(self) -> &'static str {
        match self {
            Self::Minute => "%Y-%m-%dT%H:%M",
            Self::Hour => "%Y-%m-%dT%H",
            Self::Day | Self::Week => "%Y-%m-%d",
            Self::Month => "%Y-%m",
            Self::Year => "%Y",
        }
    }

    /// Default pattern for column header labels.
    pub fn header_pattern(self) -> &'static str {
        match self {
            Self::Minute => "%H:%M",
            Self::Hour => "%H:00",
            Self::Day => "%d %b",
            Self::Week => "W%V",
            Self::Month => "%b %Y",
            Self::Year => "%Y",
        }
    }

    /// Parses unit names and their common abbreviations (`"d"`, `"hours"`, `"mo"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let unit = match name.to_ascii_lowercase().as_str() {
            "min" | "mins" | "minute" | "minutes" => Self::Minute,
            "h" | "hr" | "hrs" | "hour" | "hours" => Self::Hour,
            "d" | "day" | "days" => Self::Day,
            "w" | "wk" | "week" | "weeks" => Self::Week,
            "mo" | "month" | "months" => Self::Month,
            "y" | "yr" | "year" | "years" => Self::Year,
            _ => return None,
        };
        Some(unit)
    }
}

impl fmt::Display for StepUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        };
        f.write_str(name)
    }
}

/// A calendar duration used as the width of one axis column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CalendarStep {
    pub unit: StepUnit,
    pub amount: u32,
}

impl CalendarStep {
    pub fn new(unit: StepUnit, amount: u32) -> Self {
        Self { unit, amount }
    }

    pub fn days(amount: u32) -> Self {
        Self::new(StepUnit::Day, amount)
    }
}

impl fmt::Display for CalendarStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidTimezone { value: String },
    InvalidLocale { value: String },
    UnparseableValue { value: String },
    ZeroStep,
    Overflow { step: CalendarStep, count: i64 },
    TooManyBoundaries { limit: usize },
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimezone { value } => write!(f, "invalid timezone offset {value:?}"),
            Self::InvalidLocale { value } => write!(f, "unknown locale {value:?}"),
            Self::UnparseableValue { value } => write!(f, "cannot parse {value:?} as a date"),
            Self::ZeroStep => f.write_str("calendar step must be positive"),
            Self::Overflow { step, count } => {
                write!(f, "advancing by {count} x {step} leaves the representable range")
            }
            Self::TooManyBoundaries { limit } => {
                write!(f, "range splits into more than {limit} columns")
            }
        }
    }
}

impl std::error::Error for CalendarError {}

/// Date/time rules consumed by the axis builder and drag moves.
pub trait Calendar: Send + Sync {
    /// Timezone naive values are interpreted in.
    fn timezone(&self) -> FixedOffset;

    fn parse(&self, value: &str, timezone: FixedOffset) -> Result<Instant, CalendarError>;

    fn format(&self, instant: &Instant, pattern: &str) -> String;

    /// Moves `instant` by `count` steps (negative counts move backwards).
    fn advance(
        &self,
        instant: &Instant,
        step: CalendarStep,
        count: i64,
    ) -> Result<Instant, CalendarError>;

    /// Returns `start, start + step, ...` up to and including `end`.
    ///
    /// Every boundary is computed from `start` directly, so month-end clamping never drifts.
    fn split_range(
        &self,
        start: &Instant,
        end: &Instant,
        step: CalendarStep,
    ) -> Result<Vec<Instant>, CalendarError> {
        if step.amount == 0 {
            return Err(CalendarError::ZeroStep);
        }

        let mut boundaries = Vec::new();
        let mut count = 0i64;
        loop {
            let boundary = match self.advance(start, step, count) {
                Ok(boundary) => boundary,
                Err(CalendarError::Overflow { .. }) => break,
                Err(err) => return Err(err),
            };
            if boundary > *end {
                break;
            }
            if boundaries.len() >= MAX_BOUNDARIES {
                return Err(CalendarError::TooManyBoundaries {
                    limit: MAX_BOUNDARIES,
                });
            }
            boundaries.push(boundary);
            count += 1;
        }
        Ok(boundaries)
    }
}

/// [`Calendar`] backed by `chrono` with a fixed UTC offset and a formatting locale.
#[derive(Debug, Clone, Copy)]
pub struct ChronoCalendar {
    timezone: FixedOffset,
    locale: Locale,
}

impl Default for ChronoCalendar {
    fn default() -> Self {
        Self {
            timezone: utc(),
            locale: Locale::en_US,
        }
    }
}

impl ChronoCalendar {
    pub fn new(timezone: &str, locale: &str) -> Result<Self, CalendarError> {
        let timezone = parse_timezone(timezone)?;
        let locale = Locale::try_from(locale).map_err(|_| CalendarError::InvalidLocale {
            value: locale.to_owned(),
        })?;
        Ok(Self { timezone, locale })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl Calendar for ChronoCalendar {
    fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    fn parse(&self, value: &str, timezone: FixedOffset) -> Result<Instant, CalendarError> {
        let trimmed = value.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(instant.with_timezone(&timezone));
        }

        let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|pattern| NaiveDateTime::parse_from_str(trimmed, pattern).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            });

        naive
            .and_then(|naive| timezone.from_local_datetime(&naive).single())
            .ok_or_else(|| CalendarError::UnparseableValue {
                value: value.to_owned(),
            })
    }

    fn format(&self, instant: &Instant, pattern: &str) -> String {
        let mut out = String::new();
        if write!(out, "{}", instant.format_localized(pattern, self.locale)).is_err() {
            // Unknown specifiers make chrono's formatter fail; fall back to a stable rendering.
            out.clear();
            out.push_str(&instant.to_rfc3339());
        }
        out
    }

    fn advance(
        &self,
        instant: &Instant,
        step: CalendarStep,
        count: i64,
    ) -> Result<Instant, CalendarError> {
        let overflow = || CalendarError::Overflow { step, count };
        let units = i64::from(step.amount).checked_mul(count).ok_or_else(overflow)?;

        let delta = match step.unit {
            StepUnit::Minute => TimeDelta::try_minutes(units),
            StepUnit::Hour => TimeDelta::try_hours(units),
            StepUnit::Day => TimeDelta::try_days(units),
            StepUnit::Week => TimeDelta::try_weeks(units),
            StepUnit::Month | StepUnit::Year => {
                let months = if step.unit == StepUnit::Year {
                    units.checked_mul(12).ok_or_else(overflow)?
                } else {
                    units
                };
                let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| overflow())?;
                let shifted = if months >= 0 {
                    instant.checked_add_months(Months::new(magnitude))
                } else {
                    instant.checked_sub_months(Months::new(magnitude))
                };
                return shifted.ok_or_else(overflow);
            }
        };

        delta
            .and_then(|delta| instant.checked_add_signed(delta))
            .ok_or_else(overflow)
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!("zero offset is always valid"))
}

fn offset_regex() -> &'static Regex {
    static OFFSET: OnceLock<Regex> = OnceLock::new();
    OFFSET.get_or_init(|| {
        Regex::new(r"^([+-])(\d{2}):?(\d{2})$").unwrap_or_else(|err| panic!("offset regex: {err}"))
    })
}

/// Parses `UTC`, `Z`, `+HH:MM`, `-HH:MM` or `+HHMM` into a fixed offset.
pub fn parse_timezone(value: &str) -> Result<FixedOffset, CalendarError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(utc());
    }

    let invalid = || CalendarError::InvalidTimezone {
        value: value.to_owned(),
    };
    let caps = offset_regex().captures(trimmed).ok_or_else(invalid)?;
    let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    let seconds = hours * 3600 + minutes * 60;
    let seconds = if &caps[1] == "-" { -seconds } else { seconds };
    FixedOffset::east_opt(seconds).ok_or_else(invalid)
}
