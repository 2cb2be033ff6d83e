// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use smol_str::SmolStr;

use crate::calendar::{Calendar, CalendarError, CalendarStep, Instant, MAX_BOUNDARIES};

/// Bounds of an axis, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRange {
    Index { start: i64, end: i64 },
    Calendar { start: Instant, end: Instant },
}

/// Width of one column: a plain increment (index mode) or a calendar duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisStep {
    Index(i64),
    Calendar(CalendarStep),
}

impl fmt::Display for AxisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(increment) => write!(f, "+{increment}"),
            Self::Calendar(step) => write!(f, "{step}"),
        }
    }
}

/// A raw position on the axis, before it is mapped to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisValue {
    Index(i64),
    Instant(Instant),
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(value) => write!(f, "{value}"),
            Self::Instant(instant) => f.write_str(&instant.to_rfc3339()),
        }
    }
}

/// Lookup key of a column.
///
/// `Outside` is produced for values that do not fall into any column; it never resolves to an
/// index, so callers get "no column" instead of a clamped one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AxisKey {
    Index(i64),
    Label(SmolStr),
    Outside(SmolStr),
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(value) => write!(f, "{value}"),
            Self::Label(label) => f.write_str(label),
            Self::Outside(raw) => write!(f, "<outside {raw}>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    index: usize,
    key: AxisKey,
}

impl Column {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key(&self) -> &AxisKey {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisError {
    InvalidRange { start: String, end: String },
    InvalidStep { step: String },
    ModeMismatch,
    TooManyColumns { limit: usize },
    Calendar(CalendarError),
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { start, end } => {
                write!(f, "axis end {end} precedes start {start}")
            }
            Self::InvalidStep { step } => write!(f, "axis step {step} must be positive"),
            Self::ModeMismatch => {
                f.write_str("index ranges need an integer step and date ranges a calendar step")
            }
            Self::TooManyColumns { limit } => {
                write!(f, "axis would have more than {limit} columns")
            }
            Self::Calendar(err) => write!(f, "calendar error: {err}"),
        }
    }
}

impl std::error::Error for AxisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Calendar(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CalendarError> for AxisError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::ZeroStep => Self::InvalidStep {
                step: "0".to_owned(),
            },
            CalendarError::TooManyBoundaries { limit } => Self::TooManyColumns { limit },
            other => Self::Calendar(other),
        }
    }
}

/// The discrete column axis of a chart.
///
/// Built once per `(range, step)` pair. Column `i` starts at boundary `i`; in calendar mode the
/// last column extends one step past its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    range: AxisRange,
    step: AxisStep,
    columns: Vec<Column>,
    lookup: HashMap<AxisKey, usize>,
    boundaries: Vec<Instant>,
    span_end: Option<Instant>,
}

impl Axis {
    pub fn build(
        range: AxisRange,
        step: AxisStep,
        calendar: &dyn Calendar,
    ) -> Result<Self, AxisError> {
        match (range, step) {
            (AxisRange::Index { start, end }, AxisStep::Index(increment)) => {
                Self::build_index(start, end, increment)
            }
            (AxisRange::Calendar { start, end }, AxisStep::Calendar(step)) => {
                Self::build_calendar(start, end, step, calendar)
            }
            _ => Err(AxisError::ModeMismatch),
        }
    }

    pub fn build_index(start: i64, end: i64, increment: i64) -> Result<Self, AxisError> {
        if end < start {
            return Err(AxisError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if increment <= 0 {
            return Err(AxisError::InvalidStep {
                step: increment.to_string(),
            });
        }

        let count = (i128::from(end) - i128::from(start)) / i128::from(increment) + 1;
        let count = usize::try_from(count)
            .ok()
            .filter(|count| *count <= MAX_BOUNDARIES)
            .ok_or(AxisError::TooManyColumns {
                limit: MAX_BOUNDARIES,
            })?;

        let keys = (0..count).map(|idx| AxisKey::Index(start + increment * idx as i64));
        let axis = Self::from_keys(
            AxisRange::Index { start, end },
            AxisStep::Index(increment),
            keys,
            Vec::new(),
            None,
        );
        log::debug!("built index axis {start}..={end} step {increment}: {count} columns");
        Ok(axis)
    }

    pub fn build_calendar(
        start: Instant,
        end: Instant,
        step: CalendarStep,
        calendar: &dyn Calendar,
    ) -> Result<Self, AxisError> {
        if end < start {
            return Err(AxisError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        if step.amount == 0 {
            return Err(AxisError::InvalidStep {
                step: step.to_string(),
            });
        }

        let boundaries = calendar.split_range(&start, &end, step)?;
        let span_end = boundaries
            .last()
            .and_then(|last| calendar.advance(last, step, 1).ok());

        let pattern = step.unit.key_pattern();
        let keys = boundaries
            .iter()
            .map(|boundary| AxisKey::Label(SmolStr::new(calendar.format(boundary, pattern))))
            .collect::<Vec<_>>();

        let axis = Self::from_keys(
            AxisRange::Calendar { start, end },
            AxisStep::Calendar(step),
            keys,
            boundaries,
            span_end,
        );
        log::debug!(
            "built calendar axis {} ..= {} step {step}: {} columns",
            start.to_rfc3339(),
            end.to_rfc3339(),
            axis.columns_number()
        );
        Ok(axis)
    }

    fn from_keys(
        range: AxisRange,
        step: AxisStep,
        keys: impl IntoIterator<Item = AxisKey>,
        boundaries: Vec<Instant>,
        span_end: Option<Instant>,
    ) -> Self {
        let columns = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| Column { index, key })
            .collect::<Vec<_>>();

        let mut lookup = HashMap::with_capacity(columns.len());
        for column in &columns {
            let previous = lookup.insert(column.key.clone(), column.index);
            debug_assert!(previous.is_none(), "duplicate axis key {}", column.key);
        }

        Self {
            range,
            step,
            columns,
            lookup,
            boundaries,
            span_end,
        }
    }

    pub fn range(&self) -> AxisRange {
        self.range
    }

    pub fn step(&self) -> AxisStep {
        self.step
    }

    pub fn is_index_mode(&self) -> bool {
        matches!(self.step, AxisStep::Index(_))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_number(&self) -> usize {
        self.columns.len()
    }

    /// Normalizes a raw value to the key of the column containing it.
    pub fn key_for(&self, value: AxisValue) -> AxisKey {
        match (self.range, self.step, value) {
            (AxisRange::Index { start, end }, AxisStep::Index(increment), AxisValue::Index(v)) => {
                if v < start || v > end {
                    return AxisKey::Outside(SmolStr::new(v.to_string()));
                }
                let offset = (i128::from(v) - i128::from(start)) / i128::from(increment);
                match i64::try_from(i128::from(start) + offset * i128::from(increment)) {
                    Ok(snapped) => AxisKey::Index(snapped),
                    Err(_) => AxisKey::Outside(SmolStr::new(v.to_string())),
                }
            }
            (AxisRange::Calendar { .. }, AxisStep::Calendar(_), AxisValue::Instant(instant)) => {
                let after_span = self.span_end.is_some_and(|span_end| instant >= span_end);
                let position = self.boundaries.partition_point(|boundary| *boundary <= instant);
                if position == 0 || after_span {
                    return AxisKey::Outside(SmolStr::new(instant.to_rfc3339()));
                }
                self.columns[position - 1].key.clone()
            }
            _ => AxisKey::Outside(SmolStr::new(value.to_string())),
        }
    }

    /// Column position of `key`, or `None` when the key lies outside the axis.
    pub fn index_of(&self, key: &AxisKey) -> Option<usize> {
        self.lookup.get(key).copied()
    }

    pub fn column_of(&self, value: AxisValue) -> Option<usize> {
        self.index_of(&self.key_for(value))
    }

    /// The boundary value where column `index` starts.
    pub fn value_of(&self, index: usize) -> Option<AxisValue> {
        match (self.range, self.step) {
            (AxisRange::Index { start, .. }, AxisStep::Index(increment)) => {
                (index < self.columns.len()).then(|| AxisValue::Index(start + increment * index as i64))
            }
            _ => self.boundaries.get(index).copied().map(AxisValue::Instant),
        }
    }

    /// Builds one header label per column.
    ///
    /// Labels are produced as independent per-column tasks and joined in column order.
    pub fn header_labels(&self, calendar: &dyn Calendar, pattern: Option<&str>) -> Vec<String> {
        match self.step {
            AxisStep::Index(_) => self
                .columns
                .par_iter()
                .map(|column| match column.key {
                    AxisKey::Index(value) => itoa::Buffer::new().format(value).to_owned(),
                    ref other => other.to_string(),
                })
                .collect(),
            AxisStep::Calendar(step) => {
                let pattern = pattern.unwrap_or_else(|| step.unit.header_pattern());
                self.boundaries
                    .par_iter()
                    .map(|boundary| calendar.format(boundary, pattern))
                    .collect()
            }
        }
    }
}
