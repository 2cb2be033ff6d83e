// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use smallvec::SmallVec;

use super::grid::{AnchorSide, BarAnchors, GridPoint, OccupancyGrid};
use crate::model::{Bar, BarId, BarSet};

/// How far the arrow tip stops short of the target anchor, in grid units.
pub const ARROW_OFFSET: f64 = 0.25;

/// Anchor pairs tried for every connector, in preference order.
pub const CANDIDATES: [(AnchorSide, AnchorSide); 4] = [
    (AnchorSide::Right, AnchorSide::Left),
    (AnchorSide::Right, AnchorSide::Top),
    (AnchorSide::Bottom, AnchorSide::Left),
    (AnchorSide::Bottom, AnchorSide::Top),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    NoPathFound { from: BarId, to: BarId },
    UnknownBar { id: BarId },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPathFound { from, to } => {
                write!(f, "no connector route from bar {from} to bar {to}")
            }
            Self::UnknownBar { id } => write!(f, "connector references unknown bar {id}"),
        }
    }
}

impl std::error::Error for RouteError {}

/// The shortest connector found between two bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    from: BarId,
    to: BarId,
    source_side: AnchorSide,
    exit_side: AnchorSide,
    approach: AnchorSide,
    path: Vec<GridPoint>,
}

impl Route {
    pub fn from(&self) -> &BarId {
        &self.from
    }

    pub fn to(&self) -> &BarId {
        &self.to
    }

    pub fn source_side(&self) -> AnchorSide {
        self.source_side
    }

    /// Leading edge of the target the connector ends on: `Left` when the final segment is
    /// horizontal, `Top` when it is vertical.
    pub fn exit_side(&self) -> AnchorSide {
        self.exit_side
    }

    /// Side the last step actually arrives from; orients the arrowhead.
    pub fn approach(&self) -> AnchorSide {
        self.approach
    }

    pub fn path(&self) -> &[GridPoint] {
        &self.path
    }

    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn geometry(&self) -> ConnectorGeometry {
        ConnectorGeometry::of(self)
    }
}

/// Drawable form of a route: corner points plus where the arrowhead goes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorGeometry {
    pub points: Vec<GridPoint>,
    pub arrow_tip: (f64, f64),
    pub arrow_side: AnchorSide,
    pub exit_side: AnchorSide,
}

impl ConnectorGeometry {
    pub fn of(route: &Route) -> Self {
        let points = compress_to_polyline(route.path());
        let side = route.approach();
        let (tip_x, tip_y) = route
            .path()
            .last()
            .map(|p| (f64::from(p.x()), f64::from(p.y())))
            .unwrap_or_default();
        let arrow_tip = match side {
            AnchorSide::Left => (tip_x - ARROW_OFFSET, tip_y),
            AnchorSide::Right => (tip_x + ARROW_OFFSET, tip_y),
            AnchorSide::Top => (tip_x, tip_y - ARROW_OFFSET),
            AnchorSide::Bottom => (tip_x, tip_y + ARROW_OFFSET),
        };
        Self { points, arrow_tip, arrow_side: side, exit_side: route.exit_side() }
    }
}

/// Outcome of routing one `connected_to` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorResult {
    pub from: BarId,
    pub to: BarId,
    pub route: Result<Route, RouteError>,
}

/// Routes a connector from `from` to `to`, trying every anchor candidate on its own grid clone.
pub fn route(grid: &OccupancyGrid, from: &Bar, to: &Bar) -> Result<Route, RouteError> {
    let source = BarAnchors::of(from);
    let target = BarAnchors::of(to);

    let mut best: Option<(AnchorSide, AnchorSide, Vec<GridPoint>)> = None;
    for (source_side, target_side) in CANDIDATES {
        let start = source.side(source_side);
        let goal = target.side(target_side);
        let Some(path) = shortest_path_4dir(grid, start, goal, target_side) else {
            continue;
        };
        let better = best
            .as_ref()
            .map_or(true, |(_, _, current)| path.len() < current.len());
        if better {
            best = Some((source_side, target_side, path));
        }
    }

    let Some((source_side, target_side, path)) = best else {
        return Err(RouteError::NoPathFound { from: from.id().clone(), to: to.id().clone() });
    };
    let approach = approach_side(&path).unwrap_or(target_side);
    Ok(Route {
        from: from.id().clone(),
        to: to.id().clone(),
        source_side,
        exit_side: leading_edge(approach),
        approach,
        path,
    })
}

/// Routes every connector of `bars`. Each search runs as its own task; results come back in bar
/// order, then target id order.
pub fn route_connectors(grid: &OccupancyGrid, bars: &BarSet) -> Vec<ConnectorResult> {
    let edges = bars
        .iter()
        .flat_map(|bar| bar.connected_to().iter().map(move |target| (bar, target)))
        .collect::<Vec<_>>();

    let results = edges
        .par_iter()
        .map(|(from, target)| {
            let route = match bars.get(target.as_str()) {
                Some(to) => route(grid, from, to),
                None => Err(RouteError::UnknownBar { id: (*target).clone() }),
            };
            ConnectorResult { from: from.id().clone(), to: (*target).clone(), route }
        })
        .collect::<Vec<_>>();

    for result in &results {
        if let Err(err) = &result.route {
            log::warn!("skipping connector {} -> {}: {err}", result.from, result.to);
        }
    }
    log::debug!("routed {} connectors", results.len());
    results
}

/// Side of the target that the last step of `path` enters through.
fn approach_side(path: &[GridPoint]) -> Option<AnchorSide> {
    let [.., prev, last] = path else {
        return None;
    };
    match (last.x() - prev.x(), last.y() - prev.y()) {
        (1, 0) => Some(AnchorSide::Left),
        (-1, 0) => Some(AnchorSide::Right),
        (0, 1) => Some(AnchorSide::Top),
        (0, -1) => Some(AnchorSide::Bottom),
        _ => None,
    }
}

fn leading_edge(approach: AnchorSide) -> AnchorSide {
    match approach {
        AnchorSide::Left | AnchorSide::Right => AnchorSide::Left,
        AnchorSide::Top | AnchorSide::Bottom => AnchorSide::Top,
    }
}

/// Step from a target anchor back towards where a path naturally arrives from.
fn approach_delta(side: AnchorSide) -> (i32, i32) {
    match side {
        AnchorSide::Left => (-1, 0),
        AnchorSide::Right => (1, 0),
        AnchorSide::Top => (0, -1),
        AnchorSide::Bottom => (0, 1),
    }
}

const FALLBACK_DELTAS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

fn neighbor_deltas_towards(current: GridPoint, goal: GridPoint) -> [(i32, i32); 4] {
    let dx = goal.x() - current.x();
    let dy = goal.y() - current.y();

    let primary_x = match dx.signum() {
        1 => Some((1, 0)),
        -1 => Some((-1, 0)),
        _ => None,
    };
    let primary_y = match dy.signum() {
        1 => Some((0, 1)),
        -1 => Some((0, -1)),
        _ => None,
    };

    let mut out = [(0, 0); 4];
    let mut idx = 0usize;
    for delta in primary_x.into_iter().chain(primary_y) {
        out[idx] = delta;
        idx += 1;
    }
    for delta in FALLBACK_DELTAS {
        if primary_x == Some(delta) || primary_y == Some(delta) {
            continue;
        }
        out[idx] = delta;
        idx += 1;
    }

    debug_assert_eq!(idx, 4);
    out
}

/// Breadth-first search on a private clone of `grid`.
///
/// Visited cells are marked occupied in the clone. `start` and `goal` are enterable even when the
/// layout occupies them. Among equally short paths the one arriving from `target_side` with the
/// fewest bends is returned.
pub fn shortest_path_4dir(
    grid: &OccupancyGrid,
    start: GridPoint,
    goal: GridPoint,
    target_side: AnchorSide,
) -> Option<Vec<GridPoint>> {
    let start_idx = grid.idx_of(start)?;
    let goal_idx = grid.idx_of(goal)?;
    if start == goal {
        return Some(vec![start]);
    }

    let mut scratch = grid.clone();
    let mut dist = vec![u32::MAX; grid.len()];
    let mut queue = Vec::<GridPoint>::with_capacity(grid.len().min(4096));
    let mut queue_head = 0usize;

    dist[start_idx] = 0;
    scratch.occupy(start);
    queue.push(start);

    let mut reached = false;
    while let Some(&current) = queue.get(queue_head) {
        queue_head += 1;
        if current == goal {
            reached = true;
            break;
        }
        let current_idx = scratch.idx_of(current)?;
        for (dx, dy) in neighbor_deltas_towards(current, goal) {
            let next = current.offset(dx, dy);
            let Some(next_idx) = scratch.idx_of(next) else {
                continue;
            };
            if next != goal && scratch.is_occupied(next) {
                continue;
            }
            if dist[next_idx] != u32::MAX {
                continue;
            }
            dist[next_idx] = dist[current_idx] + 1;
            scratch.occupy(next);
            queue.push(next);
        }
    }

    if !reached {
        return None;
    }
    reconstruct_path(&scratch, &dist, goal, goal_idx, target_side)
}

fn reconstruct_path(
    grid: &OccupancyGrid,
    dist: &[u32],
    goal: GridPoint,
    goal_idx: usize,
    target_side: AnchorSide,
) -> Option<Vec<GridPoint>> {
    let mut path = Vec::with_capacity(dist[goal_idx] as usize + 1);
    path.push(goal);

    let mut cursor = goal;
    let mut cursor_dist = dist[goal_idx];
    let mut preferred = approach_delta(target_side);
    while cursor_dist > 0 {
        let mut deltas = SmallVec::<[(i32, i32); 5]>::new();
        deltas.push(preferred);
        deltas.extend(FALLBACK_DELTAS.into_iter().filter(|delta| *delta != preferred));

        let (delta, prev) = deltas.into_iter().find_map(|(dx, dy)| {
            let prev = cursor.offset(dx, dy);
            let idx = grid.idx_of(prev)?;
            (dist[idx] == cursor_dist - 1).then_some(((dx, dy), prev))
        })?;

        path.push(prev);
        cursor = prev;
        cursor_dist -= 1;
        preferred = delta;
    }

    path.reverse();
    Some(path)
}

/// Drops the interior points of straight runs.
pub fn compress_to_polyline(path: &[GridPoint]) -> Vec<GridPoint> {
    match path.len() {
        0..=2 => path.to_vec(),
        _ => {
            let mut points = Vec::<GridPoint>::new();
            points.push(path[0]);

            let mut prev_dir = (path[1].x() - path[0].x(), path[1].y() - path[0].y());
            for idx in 1..path.len() - 1 {
                let dir = (path[idx + 1].x() - path[idx].x(), path[idx + 1].y() - path[idx].y());
                if dir != prev_dir {
                    points.push(path[idx]);
                    prev_dir = dir;
                }
            }

            if let Some(last) = path.last() {
                points.push(*last);
            }
            points
        }
    }
}
