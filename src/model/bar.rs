// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{BarId, IdError};
use crate::calendar::{Calendar, CalendarError, Instant};
use crate::layout::axis::{Axis, AxisValue};

/// A caller-supplied bar, before it is resolved against an axis.
///
/// Index-mode charts read `start_index`/`end_index` (axis values, not column positions);
/// calendar-mode charts read `start`/`end`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BarRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, alias = "startIndex", skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(default, alias = "endIndex", skip_serializing_if = "Option::is_none")]
    pub end_index: Option<i64>,
    #[serde(default, alias = "connectedTo", skip_serializing_if = "Vec::is_empty")]
    pub connected_to: Vec<String>,
}

impl BarRecord {
    pub fn index(id: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            id: id.into(),
            start_index: Some(start),
            end_index: Some(end),
            ..Self::default()
        }
    }

    pub fn dated(id: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: Some(start.into()),
            end: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn connect(mut self, target: impl Into<String>) -> Self {
        self.connected_to.push(target.into());
        self
    }
}

/// The underlying values a bar was placed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BarSpan {
    Index { start: i64, end: i64 },
    Calendar { start: Instant, end: Instant },
}

impl BarSpan {
    pub fn start_value(&self) -> AxisValue {
        match self {
            Self::Index { start, .. } => AxisValue::Index(*start),
            Self::Calendar { start, .. } => AxisValue::Instant(*start),
        }
    }

    pub fn end_value(&self) -> AxisValue {
        match self {
            Self::Index { end, .. } => AxisValue::Index(*end),
            Self::Calendar { end, .. } => AxisValue::Instant(*end),
        }
    }

    /// Comparable start position (index value or Unix milliseconds).
    pub fn start_ordinal(&self) -> i64 {
        match self {
            Self::Index { start, .. } => *start,
            Self::Calendar { start, .. } => start.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    id: BarId,
    span: BarSpan,
    start_index: usize,
    end_index: usize,
    connected_to: BTreeSet<BarId>,
    row_index: usize,
}

impl Bar {
    pub fn id(&self) -> &BarId {
        &self.id
    }

    pub fn span(&self) -> &BarSpan {
        &self.span
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Number of columns covered minus one.
    pub fn width(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn connected_to(&self) -> &BTreeSet<BarId> {
        &self.connected_to
    }

    /// Row assigned by the last packing pass.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn snapshot(&self) -> BarSnapshot {
        BarSnapshot {
            id: self.id.clone(),
            start_index: self.start_index,
            end_index: self.end_index,
            row_index: self.row_index,
            span: self.span,
        }
    }

    pub(crate) fn set_row_index(&mut self, row_index: usize) {
        self.row_index = row_index;
    }

    pub(crate) fn place(&mut self, start_index: usize, end_index: usize, span: BarSpan) {
        debug_assert!(start_index <= end_index);
        self.start_index = start_index;
        self.end_index = end_index;
        self.span = span;
    }

    /// Puts the bar back exactly where `snapshot` saw it.
    pub(crate) fn restore(&mut self, snapshot: &BarSnapshot) {
        debug_assert_eq!(self.id, snapshot.id);
        self.start_index = snapshot.start_index;
        self.end_index = snapshot.end_index;
        self.row_index = snapshot.row_index;
        self.span = snapshot.span;
    }
}

/// Immutable copy of a bar's position, carried by notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarSnapshot {
    pub id: BarId,
    pub start_index: usize,
    pub end_index: usize,
    pub row_index: usize,
    pub span: BarSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarError {
    InvalidId { id: String, source: IdError },
    DuplicateBar { id: BarId },
    UnknownConnection { bar_id: BarId, target: String },
    InvalidIndexBar { id: BarId, reason: &'static str },
    MissingCalendarValue { id: BarId },
    ReversedDates { id: BarId },
    UnknownAxisKey { id: BarId, value: String },
    Calendar { id: BarId, source: CalendarError },
}

impl fmt::Display for BarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { id, source } => write!(f, "invalid bar id {id:?}: {source}"),
            Self::DuplicateBar { id } => write!(f, "bar {id} is defined more than once"),
            Self::UnknownConnection { bar_id, target } => {
                write!(f, "bar {bar_id} connects to unknown bar {target:?}")
            }
            Self::InvalidIndexBar { id, reason } => write!(f, "index bar {id}: {reason}"),
            Self::MissingCalendarValue { id } => {
                write!(f, "bar {id} needs both start and end dates")
            }
            Self::ReversedDates { id } => write!(f, "bar {id} ends before it starts"),
            Self::UnknownAxisKey { id, value } => {
                write!(f, "bar {id}: {value} falls outside the axis")
            }
            Self::Calendar { id, source } => write!(f, "bar {id}: {source}"),
        }
    }
}

impl std::error::Error for BarError {}

/// All bars of a chart, in caller order.
///
/// The order matters: row packing breaks ties by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarSet {
    bars: Vec<Bar>,
    positions: BTreeMap<BarId, usize>,
}

impl BarSet {
    /// Resolves caller records against `axis`.
    ///
    /// Fails on the first invalid record; nothing is partially resolved.
    pub fn resolve(
        records: &[BarRecord],
        axis: &Axis,
        calendar: &dyn Calendar,
    ) -> Result<Self, BarError> {
        let mut bars = Vec::with_capacity(records.len());
        let mut positions = BTreeMap::new();

        for record in records {
            let id = BarId::new(record.id.clone()).map_err(|source| BarError::InvalidId {
                id: record.id.clone(),
                source,
            })?;
            if positions.contains_key(&id) {
                return Err(BarError::DuplicateBar { id });
            }

            let span = resolve_span(&id, record, axis, calendar)?;
            let (start_index, end_index) = locate(&id, &span, axis)?;

            positions.insert(id.clone(), bars.len());
            bars.push(Bar {
                id,
                span,
                start_index,
                end_index,
                connected_to: BTreeSet::new(),
                row_index: 0,
            });
        }

        for (record, position) in records.iter().zip(0..) {
            let mut targets = BTreeSet::new();
            for target in &record.connected_to {
                let Some((target_id, _)) = positions.get_key_value(target.as_str()) else {
                    return Err(BarError::UnknownConnection {
                        bar_id: bars[position].id.clone(),
                        target: target.clone(),
                    });
                };
                targets.insert(target_id.clone());
            }
            bars[position].connected_to = targets;
        }

        Ok(Self { bars, positions })
    }

    /// Re-locates every bar's columns on a new axis, keeping its underlying values.
    pub fn reindexed(&self, axis: &Axis) -> Result<Self, BarError> {
        let mut next = self.clone();
        for bar in &mut next.bars {
            let (start_index, end_index) = locate(&bar.id, &bar.span, axis)?;
            bar.start_index = start_index;
            bar.end_index = end_index;
        }
        Ok(next)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Bar> {
        self.position(id).map(|position| &self.bars[position])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Bar> {
        let position = self.position(id)?;
        self.bars.get_mut(position)
    }

    pub(crate) fn bars_mut(&mut self) -> &mut [Bar] {
        &mut self.bars
    }
}

impl<'a> IntoIterator for &'a BarSet {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

fn resolve_span(
    id: &BarId,
    record: &BarRecord,
    axis: &Axis,
    calendar: &dyn Calendar,
) -> Result<BarSpan, BarError> {
    if axis.is_index_mode() {
        let (Some(start), Some(end)) = (record.start_index, record.end_index) else {
            return Err(BarError::InvalidIndexBar {
                id: id.clone(),
                reason: "start_index and end_index are required",
            });
        };
        if end < start {
            return Err(BarError::InvalidIndexBar {
                id: id.clone(),
                reason: "end_index precedes start_index",
            });
        }
        return Ok(BarSpan::Index { start, end });
    }

    let (Some(start), Some(end)) = (record.start.as_deref(), record.end.as_deref()) else {
        return Err(BarError::MissingCalendarValue { id: id.clone() });
    };
    let parse = |value: &str| {
        calendar
            .parse(value, calendar.timezone())
            .map_err(|source| BarError::Calendar {
                id: id.clone(),
                source,
            })
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if end < start {
        return Err(BarError::ReversedDates { id: id.clone() });
    }
    Ok(BarSpan::Calendar { start, end })
}

fn locate(id: &BarId, span: &BarSpan, axis: &Axis) -> Result<(usize, usize), BarError> {
    let column = |value: AxisValue| {
        axis.column_of(value).ok_or_else(|| BarError::UnknownAxisKey {
            id: id.clone(),
            value: value.to_string(),
        })
    };
    Ok((column(span.start_value())?, column(span.end_value())?))
}

#[cfg(test)]
mod tests {
    use super::{BarError, BarRecord, BarSet};
    use crate::calendar::{Calendar, CalendarStep, ChronoCalendar};
    use crate::layout::axis::{Axis, AxisRange, AxisStep};
    use crate::model::BarId;

    fn bid(value: &str) -> BarId {
        BarId::new(value).expect("bar id")
    }

    fn index_axis() -> Axis {
        Axis::build_index(2, 10, 1).expect("axis")
    }

    #[test]
    fn resolves_index_values_to_columns() {
        let cal = ChronoCalendar::default();
        let records = vec![BarRecord::index("a", 2, 4), BarRecord::index("b", 5, 5)];
        let bars = BarSet::resolve(&records, &index_axis(), &cal).expect("bars");

        let a = bars.get("a").expect("a");
        assert_eq!((a.start_index(), a.end_index()), (0, 2));
        let b = bars.get("b").expect("b");
        assert_eq!((b.start_index(), b.end_index()), (3, 3));
    }

    #[test]
    fn index_bars_without_indices_are_rejected() {
        let cal = ChronoCalendar::default();
        let records = vec![BarRecord::dated("a", "2024-03-01", "2024-03-02")];
        assert_eq!(
            BarSet::resolve(&records, &index_axis(), &cal),
            Err(BarError::InvalidIndexBar {
                id: bid("a"),
                reason: "start_index and end_index are required"
            })
        );
    }

    #[test]
    fn values_outside_the_axis_are_surfaced_not_clamped() {
        let cal = ChronoCalendar::default();
        let records = vec![BarRecord::index("late", 9, 12)];
        assert_eq!(
            BarSet::resolve(&records, &index_axis(), &cal),
            Err(BarError::UnknownAxisKey {
                id: bid("late"),
                value: "12".to_owned()
            })
        );

        let start = cal.parse("2024-03-01", cal.timezone()).expect("start");
        let end = cal.parse("2024-03-31", cal.timezone()).expect("end");
        let axis = Axis::build(
            AxisRange::Calendar { start, end },
            AxisStep::Calendar(CalendarStep::days(1)),
            &cal,
        )
        .expect("axis");
        let records = vec![BarRecord::dated("april", "2024-03-30", "2024-04-02")];
        let err = BarSet::resolve(&records, &axis, &cal).unwrap_err();
        assert!(matches!(err, BarError::UnknownAxisKey { .. }), "{err:?}");
    }

    #[test]
    fn end_between_last_boundary_and_next_step_is_outside() {
        let cal = ChronoCalendar::default();
        let axis = Axis::build_index(0, 10, 3).expect("axis");
        let records = vec![BarRecord::index("a", 9, 11)];
        assert_eq!(
            BarSet::resolve(&records, &axis, &cal),
            Err(BarError::UnknownAxisKey {
                id: bid("a"),
                value: "11".to_owned()
            })
        );
    }

    #[test]
    fn connections_must_reference_known_bars() {
        let cal = ChronoCalendar::default();
        let records = vec![BarRecord::index("a", 2, 4).connect("ghost")];
        assert_eq!(
            BarSet::resolve(&records, &index_axis(), &cal),
            Err(BarError::UnknownConnection {
                bar_id: bid("a"),
                target: "ghost".to_owned()
            })
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let cal = ChronoCalendar::default();
        let records = vec![BarRecord::index("a", 2, 4), BarRecord::index("a", 3, 3)];
        assert_eq!(
            BarSet::resolve(&records, &index_axis(), &cal),
            Err(BarError::DuplicateBar { id: bid("a") })
        );
    }

    #[test]
    fn records_accept_camel_case_fields() {
        let record: BarRecord = serde_json::from_str(
            r#"{"id":"3123","startIndex":2,"endIndex":4,"connectedTo":["3124"]}"#,
        )
        .expect("record");
        assert_eq!(record, BarRecord::index("3123", 2, 4).connect("3124"));
    }

    #[test]
    fn reindexing_keeps_values_and_moves_columns() {
        let cal = ChronoCalendar::default();
        let records = vec![BarRecord::index("a", 4, 6)];
        let bars = BarSet::resolve(&records, &index_axis(), &cal).expect("bars");
        let wider = Axis::build_index(0, 10, 2).expect("axis");
        let moved = bars.reindexed(&wider).expect("reindex");
        let a = moved.get("a").expect("a");
        assert_eq!((a.start_index(), a.end_index()), (2, 3));
        assert_eq!(a.span(), bars.get("a").expect("a").span());
    }
}
