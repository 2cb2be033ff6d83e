// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Chart configuration and the JSON document format read by the CLI.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, CalendarError, CalendarStep, ChronoCalendar, StepUnit};
use crate::interact::DragMetrics;
use crate::layout::axis::{AxisRange, AxisStep};
use crate::model::BarRecord;

/// One end of the axis range: a raw index or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AxisBound {
    Index(i64),
    Date(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RangeConfig {
    pub start: AxisBound,
    pub end: AxisBound,
}

/// Axis granularity: an index increment, a unit name such as `"day"` or `"6 hours"`, or an
/// explicit `{ "unit": "week", "amount": 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StepConfig {
    Increment(i64),
    Named(String),
    Custom {
        unit: StepUnit,
        #[serde(default = "one")]
        amount: u32,
    },
}

fn one() -> u32 {
    1
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

fn default_locale() -> String {
    "en_US".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartConfig {
    pub range: RangeConfig,
    /// Defaults to `1` for index ranges and `"day"` for date ranges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<StepConfig>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// `strftime` pattern for header labels; the step unit picks one when unset.
    #[serde(default, alias = "headerPattern", skip_serializing_if = "Option::is_none")]
    pub header_pattern: Option<String>,
    #[serde(default)]
    pub drag: DragMetrics,
}

impl ChartConfig {
    pub fn index(start: i64, end: i64) -> Self {
        Self::with_range(AxisBound::Index(start), AxisBound::Index(end))
    }

    pub fn dated(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::with_range(AxisBound::Date(start.into()), AxisBound::Date(end.into()))
    }

    fn with_range(start: AxisBound, end: AxisBound) -> Self {
        Self {
            range: RangeConfig { start, end },
            step: None,
            timezone: default_timezone(),
            locale: default_locale(),
            header_pattern: None,
            drag: DragMetrics::default(),
        }
    }

    pub fn step(mut self, step: StepConfig) -> Self {
        self.step = Some(step);
        self
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.drag.is_valid() {
            return Err(ConfigError::InvalidDragMetrics {
                column_width: self.drag.column_width,
                row_height: self.drag.row_height,
            });
        }
        Ok(())
    }

    pub fn is_index_mode(&self) -> bool {
        matches!(self.range.start, AxisBound::Index(_))
    }

    pub fn calendar(&self) -> Result<ChronoCalendar, ConfigError> {
        Ok(ChronoCalendar::new(&self.timezone, &self.locale)?)
    }

    pub fn axis_range(&self, calendar: &dyn Calendar) -> Result<AxisRange, ConfigError> {
        match (&self.range.start, &self.range.end) {
            (AxisBound::Index(start), AxisBound::Index(end)) => {
                Ok(AxisRange::Index { start: *start, end: *end })
            }
            (AxisBound::Date(start), AxisBound::Date(end)) => {
                let timezone = calendar.timezone();
                Ok(AxisRange::Calendar {
                    start: calendar.parse(start, timezone)?,
                    end: calendar.parse(end, timezone)?,
                })
            }
            _ => Err(ConfigError::ModeMismatch),
        }
    }

    pub fn axis_step(&self) -> Result<AxisStep, ConfigError> {
        let index_mode = self.is_index_mode();
        match (&self.step, index_mode) {
            (None, true) => Ok(AxisStep::Index(1)),
            (None, false) => Ok(AxisStep::Calendar(CalendarStep::days(1))),
            (Some(StepConfig::Increment(increment)), true) => Ok(AxisStep::Index(*increment)),
            (Some(StepConfig::Named(name)), false) => {
                Ok(AxisStep::Calendar(parse_step_name(name)?))
            }
            (Some(StepConfig::Custom { unit, amount }), false) => {
                Ok(AxisStep::Calendar(CalendarStep::new(*unit, *amount)))
            }
            _ => Err(ConfigError::ModeMismatch),
        }
    }
}

/// A chart config together with its bars, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartDocument {
    pub config: ChartConfig,
    #[serde(default)]
    pub bars: Vec<BarRecord>,
}

impl ChartDocument {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let document: Self = serde_json::from_str(text).map_err(ConfigError::from)?;
        document.config.validate()?;
        Ok(document)
    }

    pub fn schema() -> schemars::Schema {
        schemars::schema_for!(ChartDocument)
    }
}

fn step_regex() -> &'static Regex {
    static STEP: OnceLock<Regex> = OnceLock::new();
    STEP.get_or_init(|| {
        Regex::new(r"^\s*(\d+)?\s*([a-zA-Z]+)\s*$").unwrap_or_else(|err| panic!("step regex: {err}"))
    })
}

/// Parses `"day"`, `"2d"`, `"6 hours"` and similar shorthands.
pub fn parse_step_name(value: &str) -> Result<CalendarStep, ConfigError> {
    let invalid = || ConfigError::InvalidStep { value: value.to_owned() };
    let captures = step_regex().captures(value).ok_or_else(invalid)?;
    let amount = match captures.get(1) {
        Some(digits) => digits.as_str().parse::<u32>().map_err(|_| invalid())?,
        None => 1,
    };
    let unit = captures
        .get(2)
        .and_then(|name| StepUnit::from_name(name.as_str()))
        .ok_or_else(invalid)?;
    Ok(CalendarStep::new(unit, amount))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidStep { value: String },
    ModeMismatch,
    InvalidDragMetrics { column_width: f64, row_height: f64 },
    Calendar(CalendarError),
    Json { message: String, line: usize, column: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep { value } => write!(f, "invalid step {value:?}"),
            Self::ModeMismatch => {
                f.write_str("range and step must both be index values or both be calendar values")
            }
            Self::InvalidDragMetrics { column_width, row_height } => write!(
                f,
                "drag metrics must be positive (column_width={column_width}, row_height={row_height})"
            ),
            Self::Calendar(err) => write!(f, "{err}"),
            Self::Json { message, line, column } => {
                write!(f, "invalid chart JSON at {line}:{column}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Calendar(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CalendarError> for ConfigError {
    fn from(err: CalendarError) -> Self {
        Self::Calendar(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json { message: err.to_string(), line: err.line(), column: err.column() }
    }
}
