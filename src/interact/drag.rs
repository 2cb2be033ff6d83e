// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, CalendarError};
use crate::layout::axis::{Axis, AxisRange, AxisStep};
use crate::model::{BarId, BarSet, BarSnapshot, BarSpan};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixels per column and per row, used to turn pointer travel into column/row deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DragMetrics {
    #[serde(alias = "columnWidth")]
    pub column_width: f64,
    #[serde(alias = "rowHeight")]
    pub row_height: f64,
}

impl Default for DragMetrics {
    fn default() -> Self {
        Self { column_width: 32.0, row_height: 24.0 }
    }
}

impl DragMetrics {
    pub fn is_valid(&self) -> bool {
        self.column_width.is_finite()
            && self.column_width > 0.0
            && self.row_height.is_finite()
            && self.row_height > 0.0
    }

    fn steps(distance: f64, size: f64) -> i64 {
        if !(size.is_finite() && size > 0.0) {
            return 0;
        }
        let steps = (distance / size).round();
        if steps.is_finite() {
            steps as i64
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Idle,
    Active,
    Committed,
    Cancelled,
}

/// Restores a dragged bar to where it was before the gesture started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevertHandle {
    generation: u64,
    snapshot: BarSnapshot,
}

impl RevertHandle {
    pub fn bar_id(&self) -> &BarId {
        &self.snapshot.id
    }

    pub fn snapshot(&self) -> &BarSnapshot {
        &self.snapshot
    }
}

/// One applied move: the bar before this step, the bar after it, and a way back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarMove {
    pub bar_id: BarId,
    pub from: BarSnapshot,
    pub to: BarSnapshot,
    /// Row the pointer hovers over; rows are not changed by horizontal moves.
    pub candidate_row: usize,
    pub revert: RevertHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Committed(BarSnapshot),
    Cancelled(BarSnapshot),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    AlreadyActive { bar_id: BarId },
    NotActive,
    UnknownBar { id: String },
    StaleRevert { bar_id: BarId },
    Calendar(CalendarError),
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive { bar_id } => write!(f, "bar {bar_id} is already being dragged"),
            Self::NotActive => f.write_str("no drag in progress"),
            Self::UnknownBar { id } => write!(f, "unknown bar {id:?}"),
            Self::StaleRevert { bar_id } => {
                write!(f, "revert handle for bar {bar_id} belongs to an older drag")
            }
            Self::Calendar(err) => write!(f, "cannot move bar: {err}"),
        }
    }
}

impl std::error::Error for DragError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Calendar(err) => Some(err),
            _ => None,
        }
    }
}

/// Layout facts a drag update is validated against.
#[derive(Clone, Copy)]
pub struct DragContext<'a> {
    pub axis: &'a Axis,
    pub calendar: &'a dyn Calendar,
    pub metrics: DragMetrics,
    pub row_count: usize,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    pointer_origin: PointerPosition,
    origin: BarSnapshot,
    reverted: bool,
}

/// State machine for one pointer-driven bar move at a time.
///
/// Updates are applied to the bar immediately. A [`RevertHandle`] from any [`BarMove`] of the
/// current gesture (or of the last committed one) puts the bar back where it started.
#[derive(Debug, Clone)]
pub struct DragSession {
    phase: DragPhase,
    generation: u64,
    active: Option<ActiveDrag>,
    last_origin: Option<BarSnapshot>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self { phase: DragPhase::Idle, generation: 0, active: None, last_origin: None }
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Active
    }

    pub fn active_bar(&self) -> Option<&BarId> {
        self.active.as_ref().map(|drag| &drag.origin.id)
    }

    pub fn start(
        &mut self,
        bars: &BarSet,
        bar_id: &str,
        pointer: PointerPosition,
    ) -> Result<BarSnapshot, DragError> {
        if let Some(active) = &self.active {
            return Err(DragError::AlreadyActive { bar_id: active.origin.id.clone() });
        }
        let bar = bars
            .get(bar_id)
            .ok_or_else(|| DragError::UnknownBar { id: bar_id.to_owned() })?;

        let origin = bar.snapshot();
        self.generation += 1;
        self.phase = DragPhase::Active;
        self.last_origin = None;
        self.active = Some(ActiveDrag {
            pointer_origin: pointer,
            origin: origin.clone(),
            reverted: false,
        });
        log::debug!("drag {} started on bar {}", self.generation, origin.id);
        Ok(origin)
    }

    /// Moves the dragged bar to follow `pointer`.
    ///
    /// Returns `None` when the bar stays in its current column.
    pub fn update(
        &mut self,
        bars: &mut BarSet,
        ctx: DragContext<'_>,
        pointer: PointerPosition,
    ) -> Result<Option<BarMove>, DragError> {
        let generation = self.generation;
        let active = self.active.as_ref().ok_or(DragError::NotActive)?;
        if active.reverted {
            return Ok(None);
        }
        let origin = &active.origin;

        let width = origin.end_index - origin.start_index;
        let last_start = ctx.axis.columns_number().saturating_sub(width + 1) as i64;
        let column_delta =
            DragMetrics::steps(pointer.x - active.pointer_origin.x, ctx.metrics.column_width);
        let new_start = (origin.start_index as i64)
            .saturating_add(column_delta)
            .clamp(0, last_start);
        let applied = new_start - origin.start_index as i64;

        let row_delta =
            DragMetrics::steps(pointer.y - active.pointer_origin.y, ctx.metrics.row_height);
        let candidate_row = (origin.row_index as i64)
            .saturating_add(row_delta)
            .clamp(0, ctx.row_count.saturating_sub(1) as i64) as usize;

        let bar = bars
            .get_mut(origin.id.as_str())
            .ok_or_else(|| DragError::UnknownBar { id: origin.id.to_string() })?;
        let new_start = new_start as usize;
        if new_start == bar.start_index() {
            return Ok(None);
        }

        let span = shift_span(&origin.span, applied, ctx.axis, ctx.calendar)
            .map_err(DragError::Calendar)?;
        let from = bar.snapshot();
        bar.place(new_start, new_start + width, span);
        let to = bar.snapshot();
        log::debug!(
            "drag {generation}: bar {} columns {}..={} -> {}..={}",
            to.id,
            from.start_index,
            from.end_index,
            to.start_index,
            to.end_index
        );

        Ok(Some(BarMove {
            bar_id: to.id.clone(),
            from,
            to,
            candidate_row,
            revert: RevertHandle { generation, snapshot: origin.clone() },
        }))
    }

    /// Restores the bar to its pre-drag snapshot.
    ///
    /// Valid while the gesture is active or right after it was committed.
    pub fn revert(
        &mut self,
        bars: &mut BarSet,
        handle: &RevertHandle,
    ) -> Result<BarSnapshot, DragError> {
        let stale = || DragError::StaleRevert { bar_id: handle.bar_id().clone() };
        if handle.generation != self.generation {
            return Err(stale());
        }
        match self.phase {
            DragPhase::Active => {}
            DragPhase::Committed if self.last_origin.as_ref() == Some(&handle.snapshot) => {}
            _ => return Err(stale()),
        }

        let bar = bars
            .get_mut(handle.bar_id().as_str())
            .ok_or_else(|| DragError::UnknownBar { id: handle.bar_id().to_string() })?;
        bar.restore(&handle.snapshot);

        match &mut self.active {
            Some(active) => active.reverted = true,
            None => {
                self.phase = DragPhase::Cancelled;
                self.last_origin = None;
            }
        }
        log::debug!("drag {} reverted bar {}", self.generation, handle.bar_id());
        Ok(handle.snapshot.clone())
    }

    /// Ends the gesture, keeping the last applied position unless it was reverted.
    pub fn end(&mut self, bars: &BarSet) -> Result<DragOutcome, DragError> {
        let active = self.active.take().ok_or(DragError::NotActive)?;
        if active.reverted {
            self.phase = DragPhase::Cancelled;
            return Ok(DragOutcome::Cancelled(active.origin));
        }

        let current = bars
            .get(active.origin.id.as_str())
            .map(|bar| bar.snapshot())
            .ok_or_else(|| DragError::UnknownBar { id: active.origin.id.to_string() })?;
        self.phase = DragPhase::Committed;
        self.last_origin = Some(active.origin);
        Ok(DragOutcome::Committed(current))
    }

    /// Drops any gesture without touching the bars; used when the bar set is replaced.
    pub fn reset(&mut self) {
        self.active = None;
        self.last_origin = None;
        self.phase = DragPhase::Idle;
    }
}

/// Moves both ends of `span` by `columns` axis steps.
pub(crate) fn shift_span(
    span: &BarSpan,
    columns: i64,
    axis: &Axis,
    calendar: &dyn Calendar,
) -> Result<BarSpan, CalendarError> {
    match (*span, axis.step()) {
        (BarSpan::Index { start, end }, AxisStep::Index(increment)) => {
            let shift = columns.saturating_mul(increment);
            // Values inside the last column may not pass the range end.
            let (low, high) = match axis.range() {
                AxisRange::Index { start, end } => (start, end),
                AxisRange::Calendar { .. } => (i64::MIN, i64::MAX),
            };
            Ok(BarSpan::Index {
                start: start.saturating_add(shift).clamp(low, high),
                end: end.saturating_add(shift).clamp(low, high),
            })
        }
        (BarSpan::Calendar { start, end }, AxisStep::Calendar(step)) => Ok(BarSpan::Calendar {
            start: calendar.advance(&start, step, columns)?,
            end: calendar.advance(&end, step, columns)?,
        }),
        (other, _) => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{
        DragContext, DragError, DragMetrics, DragOutcome, DragPhase, DragSession, PointerPosition,
    };
    use crate::calendar::{Calendar, ChronoCalendar};
    use crate::layout::axis::Axis;
    use crate::layout::rows::RowPacker;
    use crate::model::fixtures::{march_axis, march_bars};
    use crate::model::{BarRecord, BarSet, BarSpan};

    struct Env {
        calendar: ChronoCalendar,
        axis: Axis,
        rows: usize,
    }

    impl Env {
        fn ctx(&self) -> DragContext<'_> {
            DragContext {
                axis: &self.axis,
                calendar: &self.calendar,
                metrics: DragMetrics::default(),
                row_count: self.rows,
            }
        }
    }

    struct Board {
        env: Env,
        bars: BarSet,
    }

    fn packed(calendar: ChronoCalendar, axis: Axis, mut bars: BarSet) -> Board {
        let mut packer = RowPacker::new();
        packer.pack(&mut bars);
        Board { env: Env { calendar, axis, rows: packer.row_count() }, bars }
    }

    #[fixture]
    fn march() -> Board {
        let calendar = ChronoCalendar::default();
        let axis = march_axis(&calendar);
        let bars = march_bars(&calendar);
        packed(calendar, axis, bars)
    }

    /// `a` covers values 4..=8 (columns 2..=4) on a ten-column axis; `b` shares its start.
    #[fixture]
    fn index() -> Board {
        let calendar = ChronoCalendar::default();
        let axis = Axis::build_index(0, 18, 2).expect("axis");
        let records = vec![BarRecord::index("a", 4, 8), BarRecord::index("b", 4, 4)];
        let bars = BarSet::resolve(&records, &axis, &calendar).expect("bars");
        packed(calendar, axis, bars)
    }

    fn at(x: f64) -> PointerPosition {
        PointerPosition::new(x, 0.0)
    }

    #[test]
    fn index_shift_into_the_last_column_stays_inside_the_range() {
        let calendar = ChronoCalendar::default();
        let axis = Axis::build_index(0, 10, 3).expect("axis");
        let span = BarSpan::Index { start: 1, end: 2 };

        let shifted = super::shift_span(&span, 3, &axis, &calendar).expect("shift");
        assert_eq!(shifted, BarSpan::Index { start: 10, end: 10 });
        assert_eq!(axis.column_of(shifted.start_value()), Some(3));
        assert_eq!(axis.column_of(shifted.end_value()), Some(3));
    }

    #[rstest]
    fn calendar_move_shifts_dates_and_revert_restores_them(mut march: Board) {
        let before = march.bars.get("3125").expect("bar").snapshot();
        let mut session = DragSession::new();
        session.start(&march.bars, "3125", at(100.0)).expect("start");

        let ctx = march.env.ctx();
        let moved = session
            .update(&mut march.bars, ctx, at(164.0))
            .expect("update")
            .expect("moved");
        assert_eq!(moved.from, before);
        assert_eq!(moved.to.start_index, before.start_index + 2);
        assert_eq!(moved.to.end_index, before.end_index + 2);
        let BarSpan::Calendar { start, end } = moved.to.span else {
            panic!("calendar span expected")
        };
        assert_eq!(march.env.calendar.format(&start, "%Y-%m-%d"), "2024-03-09");
        assert_eq!(march.env.calendar.format(&end, "%Y-%m-%d"), "2024-03-10");

        session.revert(&mut march.bars, &moved.revert).expect("revert");
        assert_eq!(march.bars.get("3125").expect("bar").snapshot(), before);
        assert_eq!(session.end(&march.bars), Ok(DragOutcome::Cancelled(before)));
        assert_eq!(session.phase(), DragPhase::Cancelled);
    }

    #[rstest]
    #[case(10_000.0, 7)]
    #[case(-10_000.0, 0)]
    #[case(40.0, 3)]
    #[case(15.0, 2)]
    fn column_delta_is_rounded_and_clamped(
        mut index: Board,
        #[case] dx: f64,
        #[case] expected_start: usize,
    ) {
        let mut session = DragSession::new();
        session.start(&index.bars, "a", at(0.0)).expect("start");
        let ctx = index.env.ctx();
        let _ = session.update(&mut index.bars, ctx, at(dx)).expect("update");

        let bar = index.bars.get("a").expect("a");
        assert_eq!(bar.start_index(), expected_start);
        assert_eq!(bar.width(), 2);
        assert!(bar.end_index() < index.env.axis.columns_number());
        let BarSpan::Index { start, end } = *bar.span() else { panic!("index span") };
        assert_eq!(start, 2 * expected_start as i64);
        assert_eq!(end - start, 4);
    }

    #[rstest]
    fn staying_in_the_same_column_emits_nothing(mut index: Board) {
        let mut session = DragSession::new();
        session.start(&index.bars, "a", at(0.0)).expect("start");
        let ctx = index.env.ctx();
        assert_eq!(session.update(&mut index.bars, ctx, at(10.0)), Ok(None));
    }

    #[rstest]
    fn candidate_row_is_clamped_but_not_applied(mut index: Board) {
        let mut session = DragSession::new();
        session.start(&index.bars, "a", at(0.0)).expect("start");
        let ctx = index.env.ctx();
        let moved = session
            .update(&mut index.bars, ctx, PointerPosition::new(64.0, 500.0))
            .expect("update")
            .expect("moved");
        assert_eq!(moved.candidate_row, index.env.rows - 1);
        assert_eq!(moved.to.row_index, moved.from.row_index);
    }

    #[rstest]
    fn commit_keeps_position_and_allows_one_revert(mut index: Board) {
        let before = index.bars.get("a").expect("a").snapshot();
        let mut session = DragSession::new();
        session.start(&index.bars, "a", at(0.0)).expect("start");
        let ctx = index.env.ctx();
        let moved = session
            .update(&mut index.bars, ctx, at(32.0))
            .expect("update")
            .expect("moved");

        let outcome = session.end(&index.bars).expect("end");
        assert_eq!(outcome, DragOutcome::Committed(moved.to.clone()));
        assert_eq!(session.phase(), DragPhase::Committed);

        session.revert(&mut index.bars, &moved.revert).expect("revert after commit");
        assert_eq!(index.bars.get("a").expect("a").snapshot(), before);
        assert_eq!(session.phase(), DragPhase::Cancelled);
        assert!(matches!(
            session.revert(&mut index.bars, &moved.revert),
            Err(DragError::StaleRevert { .. })
        ));
    }

    #[rstest]
    fn handles_from_an_older_gesture_are_stale(mut index: Board) {
        let mut session = DragSession::new();
        session.start(&index.bars, "a", at(0.0)).expect("start");
        let ctx = index.env.ctx();
        let old = session
            .update(&mut index.bars, ctx, at(32.0))
            .expect("update")
            .expect("moved");
        session.end(&index.bars).expect("end");

        session.start(&index.bars, "b", at(0.0)).expect("second start");
        assert_eq!(
            session.revert(&mut index.bars, &old.revert),
            Err(DragError::StaleRevert { bar_id: old.bar_id.clone() })
        );
    }

    #[rstest]
    fn transitions_are_checked(mut index: Board) {
        let mut session = DragSession::new();
        assert_eq!(session.end(&index.bars), Err(DragError::NotActive));
        let ctx = index.env.ctx();
        assert_eq!(session.update(&mut index.bars, ctx, at(1.0)), Err(DragError::NotActive));
        assert!(matches!(
            session.start(&index.bars, "missing", at(0.0)),
            Err(DragError::UnknownBar { .. })
        ));

        session.start(&index.bars, "a", at(0.0)).expect("start");
        assert!(matches!(
            session.start(&index.bars, "b", at(0.0)),
            Err(DragError::AlreadyActive { .. })
        ));
        assert_eq!(session.active_bar().map(|id| id.as_str()), Some("a"));
    }

    #[rstest]
    fn updates_after_revert_are_ignored(mut index: Board) {
        let mut session = DragSession::new();
        session.start(&index.bars, "a", at(0.0)).expect("start");
        let ctx = index.env.ctx();
        let moved = session
            .update(&mut index.bars, ctx, at(32.0))
            .expect("update")
            .expect("moved");
        session.revert(&mut index.bars, &moved.revert).expect("revert");
        let ctx = index.env.ctx();
        assert_eq!(session.update(&mut index.bars, ctx, at(96.0)), Ok(None));
        assert_eq!(index.bars.get("a").expect("a").start_index(), 2);
    }

    #[test]
    fn metrics_reject_non_positive_sizes() {
        assert!(DragMetrics::default().is_valid());
        assert!(!DragMetrics { column_width: 0.0, row_height: 24.0 }.is_valid());
        assert_eq!(DragMetrics::steps(100.0, 0.0), 0);
        assert_eq!(DragMetrics::steps(-48.0, 32.0), -2);
    }
}
