// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout engine for timelines.
//!
//! Stages run in a fixed order: the [`axis::Axis`] maps values to columns, the [`rows::RowPacker`]
//! stacks bars into rows, the [`grid::OccupancyGrid`] is built from the packed bars and
//! [`route::route_connectors`] finds connector paths through it.

pub mod axis;
pub mod grid;
pub mod route;
pub mod rows;

pub use axis::{Axis, AxisError, AxisKey, AxisRange, AxisStep, AxisValue, Column};
pub use grid::{AnchorSide, BarAnchors, GridPoint, OccupancyGrid};
pub use route::{
    route, route_connectors, ConnectorGeometry, ConnectorResult, Route, RouteError, ARROW_OFFSET,
};
pub use rows::RowPacker;

use crate::model::BarSet;

/// Derived state of one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    row_count: usize,
    grid: OccupancyGrid,
    connectors: Vec<ConnectorResult>,
}

impl TimelineLayout {
    /// Packs `bars` in place, then builds the grid and routes every connector.
    pub fn compute(axis: &Axis, bars: &mut BarSet) -> Self {
        let mut packer = RowPacker::new();
        packer.pack(bars);
        Self::with_rows(axis, bars, packer.row_count())
    }

    /// Rebuilds grid and connectors for bars whose rows are already assigned.
    pub fn with_rows(axis: &Axis, bars: &BarSet, row_count: usize) -> Self {
        let grid = OccupancyGrid::build(bars, axis.columns_number(), row_count);
        let connectors = route_connectors(&grid, bars);
        Self { row_count, grid, connectors }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn connectors(&self) -> &[ConnectorResult] {
        &self.connectors
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> + '_ {
        self.connectors.iter().filter_map(|c| c.route.as_ref().ok())
    }

    pub fn unroutable(&self) -> usize {
        self.connectors.iter().filter(|c| c.route.is_err()).count()
    }
}
