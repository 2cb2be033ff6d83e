// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! A chart instance: configuration, bars, derived layout and interaction state.
//!
//! Every successful mutation recomputes the derived layout (rows, grid, connectors) before the
//! matching notification is sent. Failed mutations leave the previous state untouched.

pub mod events;
pub mod registry;

use std::fmt;

use serde::Serialize;

pub use events::{ChartEvent, EventHub, RenderSummary};
pub use registry::ChartRegistry;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::calendar::ChronoCalendar;
use crate::config::{ChartConfig, ChartDocument, ConfigError, RangeConfig, StepConfig};
use crate::interact::drag::shift_span;
use crate::interact::{
    BarMove, DragContext, DragError, DragOutcome, DragPhase, DragSession, PointerPosition,
    RevertHandle,
};
use crate::layout::{
    AnchorSide, Axis, AxisError, ConnectorGeometry, GridPoint, RouteError, TimelineLayout,
};
use crate::model::{BarError, BarId, BarRecord, BarSet, BarSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    Config(ConfigError),
    Axis(AxisError),
    Bar(BarError),
    Drag(DragError),
    UnknownBar { id: String },
    BarLocked { id: BarId },
    ColumnOutOfRange { id: BarId, column: usize, columns: usize },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Axis(err) => write!(f, "axis: {err}"),
            Self::Bar(err) => write!(f, "bars: {err}"),
            Self::Drag(err) => write!(f, "drag: {err}"),
            Self::UnknownBar { id } => write!(f, "unknown bar {id:?}"),
            Self::BarLocked { id } => write!(f, "bar {id} is being dragged"),
            Self::ColumnOutOfRange { id, column, columns } => {
                write!(f, "bar {id} does not fit at column {column} of {columns}")
            }
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Axis(err) => Some(err),
            Self::Bar(err) => Some(err),
            Self::Drag(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for ChartError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<AxisError> for ChartError {
    fn from(err: AxisError) -> Self {
        Self::Axis(err)
    }
}

impl From<BarError> for ChartError {
    fn from(err: BarError) -> Self {
        Self::Bar(err)
    }
}

impl From<DragError> for ChartError {
    fn from(err: DragError) -> Self {
        Self::Drag(err)
    }
}

/// Serializable view of a chart's current layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub headers: Vec<String>,
    pub row_count: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub bars: Vec<BarSnapshot>,
    pub connectors: Vec<ConnectorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorSnapshot {
    pub from: BarId,
    pub to: BarId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<GridPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_side: Option<AnchorSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<ConnectorGeometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Axis plus the calendar and config it was built from; replaced as one unit.
fn build_axis(config: &ChartConfig) -> Result<(ChronoCalendar, Axis), ChartError> {
    config.validate()?;
    let calendar = config.calendar()?;
    let range = config.axis_range(&calendar)?;
    let step = config.axis_step()?;
    let axis = Axis::build(range, step, &calendar)?;
    Ok((calendar, axis))
}

#[derive(Debug)]
pub struct Chart {
    config: ChartConfig,
    calendar: ChronoCalendar,
    axis: Axis,
    bars: BarSet,
    layout: TimelineLayout,
    drag: DragSession,
    events: EventHub,
}

impl Chart {
    /// Builds an empty chart. No event is sent; nobody can be subscribed yet.
    pub fn new(config: ChartConfig) -> Result<Self, ChartError> {
        let (calendar, axis) = build_axis(&config)?;
        let mut bars = BarSet::default();
        let layout = TimelineLayout::compute(&axis, &mut bars);
        Ok(Self {
            config,
            calendar,
            axis,
            bars,
            layout,
            drag: DragSession::new(),
            events: EventHub::default(),
        })
    }

    pub fn from_document(document: &ChartDocument) -> Result<Self, ChartError> {
        let mut chart = Self::new(document.config.clone())?;
        chart.bars = BarSet::resolve(&document.bars, &chart.axis, &chart.calendar)?;
        chart.layout = TimelineLayout::compute(&chart.axis, &mut chart.bars);
        Ok(chart)
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<ChartEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn calendar(&self) -> &ChronoCalendar {
        &self.calendar
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    pub fn bars(&self) -> &BarSet {
        &self.bars
    }

    pub fn layout(&self) -> &TimelineLayout {
        &self.layout
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn summary(&self) -> RenderSummary {
        RenderSummary {
            columns: self.axis.columns_number(),
            rows: self.layout.row_count(),
            bars: self.bars.len(),
            connectors: self.layout.connectors().len(),
            unroutable: self.layout.unroutable(),
        }
    }

    /// Re-runs packing, grid build and routing, then sends [`ChartEvent::Rendered`].
    pub fn render(&mut self) -> RenderSummary {
        self.layout = TimelineLayout::compute(&self.axis, &mut self.bars);
        let summary = self.summary();
        log::debug!(
            "rendered {} bars on {} columns x {} rows ({} connectors, {} unroutable)",
            summary.bars,
            summary.columns,
            summary.rows,
            summary.connectors,
            summary.unroutable
        );
        self.events.emit(ChartEvent::Rendered(summary));
        summary
    }

    /// Rebuilds grid and connectors without re-packing rows.
    fn reroute(&mut self) {
        self.layout = TimelineLayout::with_rows(&self.axis, &self.bars, self.layout.row_count());
    }

    /// Replaces all bars.
    pub fn set_bars(&mut self, records: &[BarRecord]) -> Result<RenderSummary, ChartError> {
        let bars = BarSet::resolve(records, &self.axis, &self.calendar)?;
        self.bars = bars;
        self.drag.reset();
        Ok(self.render())
    }

    pub fn set_range(&mut self, range: RangeConfig) -> Result<RenderSummary, ChartError> {
        let mut config = self.config.clone();
        config.range = range;
        self.reconfigure(config)
    }

    pub fn set_step(&mut self, step: StepConfig) -> Result<RenderSummary, ChartError> {
        let mut config = self.config.clone();
        config.step = Some(step);
        self.reconfigure(config)
    }

    /// Applies a whole new config, re-locating the current bars on the new axis.
    pub fn reconfigure(&mut self, config: ChartConfig) -> Result<RenderSummary, ChartError> {
        let (calendar, axis) = build_axis(&config)?;
        let bars = self.bars.reindexed(&axis)?;
        self.config = config;
        self.calendar = calendar;
        self.axis = axis;
        self.bars = bars;
        self.drag.reset();
        Ok(self.render())
    }

    pub fn header_labels(&self) -> Vec<String> {
        self.axis
            .header_labels(&self.calendar, self.config.header_pattern.as_deref())
    }

    fn snapshot_of(&self, id: &str) -> Result<BarSnapshot, ChartError> {
        self.bars
            .get(id)
            .map(|bar| bar.snapshot())
            .ok_or_else(|| ChartError::UnknownBar { id: id.to_owned() })
    }

    pub fn click_bar(&mut self, id: &str) -> Result<BarSnapshot, ChartError> {
        let snapshot = self.snapshot_of(id)?;
        self.events.emit(ChartEvent::BarClicked(snapshot.clone()));
        Ok(snapshot)
    }

    pub fn hover_bar(&mut self, id: &str) -> Result<BarSnapshot, ChartError> {
        let snapshot = self.snapshot_of(id)?;
        self.events.emit(ChartEvent::BarHovered(snapshot.clone()));
        Ok(snapshot)
    }

    pub fn begin_drag(
        &mut self,
        id: &str,
        pointer: PointerPosition,
    ) -> Result<BarSnapshot, ChartError> {
        Ok(self.drag.start(&self.bars, id, pointer)?)
    }

    /// Follows the pointer; a column change is applied at once and announced as
    /// [`ChartEvent::BarMoved`]. Rows stay as packed until the drag ends.
    pub fn drag_to(&mut self, pointer: PointerPosition) -> Result<Option<BarMove>, ChartError> {
        let ctx = DragContext {
            axis: &self.axis,
            calendar: &self.calendar,
            metrics: self.config.drag,
            row_count: self.layout.row_count(),
        };
        let Some(moved) = self.drag.update(&mut self.bars, ctx, pointer)? else {
            return Ok(None);
        };
        self.reroute();
        self.events.emit(ChartEvent::BarMoved(moved.clone()));
        Ok(Some(moved))
    }

    pub fn end_drag(&mut self) -> Result<DragOutcome, ChartError> {
        let outcome = self.drag.end(&self.bars)?;
        self.render();
        Ok(outcome)
    }

    /// Undoes a drag through the handle carried by a [`BarMove`].
    pub fn revert(&mut self, handle: &RevertHandle) -> Result<BarSnapshot, ChartError> {
        let restored = self.drag.revert(&mut self.bars, handle)?;
        if self.drag.is_active() {
            self.reroute();
            self.events.emit(ChartEvent::Rendered(self.summary()));
        } else {
            self.render();
        }
        Ok(restored)
    }

    /// Moves a bar so it starts at `column`, keeping its width.
    pub fn move_bar(&mut self, id: &str, column: usize) -> Result<BarSnapshot, ChartError> {
        if let Some(active) = self.drag.active_bar() {
            if active.as_str() == id {
                return Err(ChartError::BarLocked { id: active.clone() });
            }
        }
        let bar = self
            .bars
            .get(id)
            .ok_or_else(|| ChartError::UnknownBar { id: id.to_owned() })?;
        let columns = self.axis.columns_number();
        let width = bar.width();
        let end = column
            .checked_add(width)
            .filter(|end| *end < columns)
            .ok_or_else(|| ChartError::ColumnOutOfRange { id: bar.id().clone(), column, columns })?;

        let shift = column as i64 - bar.start_index() as i64;
        let span = shift_span(bar.span(), shift, &self.axis, &self.calendar)
            .map_err(|err| ChartError::Drag(DragError::Calendar(err)))?;
        if let Some(bar) = self.bars.get_mut(id) {
            bar.place(column, end, span);
        }
        self.render();
        self.snapshot_of(id)
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        let connectors = self
            .layout
            .connectors()
            .iter()
            .map(|connector| match &connector.route {
                Ok(route) => ConnectorSnapshot {
                    from: connector.from.clone(),
                    to: connector.to.clone(),
                    path: Some(route.path().to_vec()),
                    exit_side: Some(route.exit_side()),
                    geometry: Some(route.geometry()),
                    error: None,
                },
                Err(err) => ConnectorSnapshot {
                    from: connector.from.clone(),
                    to: connector.to.clone(),
                    path: None,
                    exit_side: None,
                    geometry: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();

        LayoutSnapshot {
            headers: self.header_labels(),
            row_count: self.layout.row_count(),
            grid_width: self.layout.grid().width(),
            grid_height: self.layout.grid().height(),
            bars: self.bars.iter().map(|bar| bar.snapshot()).collect(),
            connectors,
        }
    }

    /// Connector failures of the current layout.
    pub fn route_errors(&self) -> impl Iterator<Item = &RouteError> + '_ {
        self.layout
            .connectors()
            .iter()
            .filter_map(|connector| connector.route.as_ref().err())
    }
}
