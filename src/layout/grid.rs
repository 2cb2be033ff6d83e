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

use crate::model::Bar;

/// A cell of the occupancy grid. Odd coordinates are column/row centres, even ones corridors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub(crate) fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn manhattan(&self, other: GridPoint) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which edge of a bar an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl fmt::Display for AnchorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}

/// Anchor points of one bar, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarAnchors {
    pub center: GridPoint,
    pub top: GridPoint,
    pub right: GridPoint,
    pub bottom: GridPoint,
    pub left: GridPoint,
}

impl BarAnchors {
    pub fn of(bar: &Bar) -> Self {
        let start = bar.start_index() as i32;
        let end = bar.end_index() as i32;
        let row = bar.row_index() as i32;
        let mid_x = start + end + 1;
        let mid_y = 2 * row + 1;
        Self {
            center: GridPoint::new(mid_x, mid_y),
            top: GridPoint::new(mid_x, mid_y - 1),
            right: GridPoint::new(2 * end + 2, mid_y),
            bottom: GridPoint::new(mid_x, mid_y + 1),
            left: GridPoint::new(2 * start, mid_y),
        }
    }

    pub fn side(&self, side: AnchorSide) -> GridPoint {
        match side {
            AnchorSide::Top => self.top,
            AnchorSide::Right => self.right,
            AnchorSide::Bottom => self.bottom,
            AnchorSide::Left => self.left,
        }
    }
}

/// Free/occupied matrix at twice the column and row resolution.
///
/// Bars occupy their row's odd line; every even line is a corridor. Clones are independent, so a
/// search can mark cells in its own copy without touching the layout's grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    pub fn empty(columns_number: usize, row_count: usize) -> Self {
        let width = 2 * columns_number + 1;
        let height = 2 * row_count.max(1) + 1;
        Self { width, height, cells: vec![0u8; width * height] }
    }

    pub fn build<'a>(
        bars: impl IntoIterator<Item = &'a Bar>,
        columns_number: usize,
        row_count: usize,
    ) -> Self {
        let mut grid = Self::empty(columns_number, row_count);
        let mut marked = 0usize;
        for bar in bars {
            let y = 2 * bar.row_index() as i32 + 1;
            let from = 2 * bar.start_index() as i32 + 1;
            let to = 2 * bar.end_index() as i32 + 1;
            for x in from..=to {
                if grid.occupy(GridPoint::new(x, y)) {
                    marked += 1;
                }
            }
        }
        log::debug!(
            "occupancy grid {}x{} with {marked} occupied cells",
            grid.width,
            grid.height
        );
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        self.idx_of(point).is_some()
    }

    /// Out-of-bounds points count as occupied.
    pub fn is_occupied(&self, point: GridPoint) -> bool {
        self.idx_of(point).map_or(true, |idx| self.cells[idx] != 0)
    }

    /// Marks `point` occupied; returns `false` if it is outside the grid.
    pub fn occupy(&mut self, point: GridPoint) -> bool {
        match self.idx_of(point) {
            Some(idx) => {
                self.cells[idx] = 1;
                true
            }
            None => false,
        }
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != 0)
            .map(|(idx, _)| self.point_of(idx))
    }

    pub(crate) fn idx_of(&self, point: GridPoint) -> Option<usize> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as usize, point.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub(crate) fn point_of(&self, idx: usize) -> GridPoint {
        let x = (idx % self.width) as i32;
        let y = (idx / self.width) as i32;
        GridPoint::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{AnchorSide, BarAnchors, GridPoint, OccupancyGrid};
    use crate::model::fixtures::staircase_bars;
    use crate::model::BarSet;

    #[fixture]
    fn staircase() -> BarSet {
        staircase_bars()
    }

    #[rstest]
    fn dimensions_double_columns_and_rows(staircase: BarSet) {
        let grid = OccupancyGrid::build(&staircase, 6, 2);
        assert_eq!(grid.width(), 13);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.len(), 65);
    }

    #[rstest]
    fn bars_occupy_their_odd_row_and_nothing_else(staircase: BarSet) {
        let grid = OccupancyGrid::build(&staircase, 6, 2);
        let occupied = grid.occupied_cells().collect::<Vec<_>>();
        let expected = [(1, 1), (2, 1), (3, 1), (7, 3), (8, 3), (9, 3)]
            .into_iter()
            .map(|(x, y)| GridPoint::new(x, y))
            .collect::<Vec<_>>();
        assert_eq!(occupied, expected);

        for y in [0, 2, 4] {
            for x in 0..13 {
                assert!(!grid.is_occupied(GridPoint::new(x, y)), "corridor ({x}, {y})");
            }
        }
    }

    #[rstest]
    fn out_of_bounds_is_occupied() {
        let grid = OccupancyGrid::empty(2, 1);
        assert!(grid.is_occupied(GridPoint::new(-1, 0)));
        assert!(grid.is_occupied(GridPoint::new(5, 0)));
        assert!(grid.is_occupied(GridPoint::new(0, 3)));
        assert!(!grid.is_occupied(GridPoint::new(4, 2)));
    }

    #[rstest]
    fn clones_do_not_share_marks(staircase: BarSet) {
        let base = OccupancyGrid::build(&staircase, 6, 2);
        let mut scratch = base.clone();
        assert!(scratch.occupy(GridPoint::new(0, 0)));
        assert!(scratch.is_occupied(GridPoint::new(0, 0)));
        assert!(!base.is_occupied(GridPoint::new(0, 0)));
    }

    #[rstest]
    fn rebuilding_is_deterministic(staircase: BarSet) {
        let first = OccupancyGrid::build(&staircase, 6, 2);
        let second = OccupancyGrid::build(&staircase, 6, 2);
        assert_eq!(first, second);
    }

    #[rstest]
    fn anchors_sit_on_bar_edges(staircase: BarSet) {
        let a = BarAnchors::of(staircase.get("a").expect("a"));
        assert_eq!(a.center, GridPoint::new(2, 1));
        assert_eq!(a.top, GridPoint::new(2, 0));
        assert_eq!(a.bottom, GridPoint::new(2, 2));
        assert_eq!(a.left, GridPoint::new(0, 1));
        assert_eq!(a.right, GridPoint::new(4, 1));

        let b = BarAnchors::of(staircase.get("b").expect("b"));
        assert_eq!(b.side(AnchorSide::Left), GridPoint::new(6, 3));
        assert_eq!(b.side(AnchorSide::Top), GridPoint::new(8, 2));
        assert_eq!(b.side(AnchorSide::Bottom), GridPoint::new(8, 4));
    }

    #[test]
    fn idx_and_point_are_inverse() {
        let grid = OccupancyGrid::empty(3, 2);
        for idx in 0..grid.len() {
            assert_eq!(grid.idx_of(grid.point_of(idx)), Some(idx));
        }
    }
}
