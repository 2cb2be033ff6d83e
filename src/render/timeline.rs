// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::text::{canvas_to_string_trimmed, text_len, truncate_with_ellipsis};
use super::{Canvas, CanvasError, UNICODE_BAR};
use crate::chart::Chart;
use crate::layout::{AnchorSide, BarAnchors, GridPoint};

/// Characters per occupancy-grid cell horizontally; a column spans two cells.
const CELL_WIDTH: usize = 4;
const HEADER_LINES: usize = 1;

fn canvas_x(gx: i32) -> usize {
    gx.max(0) as usize * CELL_WIDTH + 1
}

fn canvas_y(gy: i32) -> usize {
    gy.max(0) as usize + HEADER_LINES
}

fn canvas_point(point: GridPoint) -> (usize, usize) {
    (canvas_x(point.x()), canvas_y(point.y()))
}

fn arrow_glyph(side: AnchorSide) -> char {
    match side {
        AnchorSide::Left => '▶',
        AnchorSide::Top => '▼',
        AnchorSide::Right => '◀',
        AnchorSide::Bottom => '▲',
    }
}

/// Renders the chart's current layout: a header line, then one text line per grid row.
///
/// Unroutable connectors are left out.
pub fn render_timeline_unicode(chart: &Chart) -> Result<String, CanvasError> {
    let layout = chart.layout();
    let grid = layout.grid();
    let mut canvas = Canvas::new(grid.width() * CELL_WIDTH, grid.height() + HEADER_LINES)?;

    let label_width = 2 * CELL_WIDTH - 1;
    for (column, label) in chart.header_labels().iter().enumerate() {
        let x = column * 2 * CELL_WIDTH + 1;
        canvas.write_str(x, 0, &truncate_with_ellipsis(label, label_width))?;
    }

    for route in layout.routes() {
        let geometry = route.geometry();
        for pair in geometry.points.windows(2) {
            canvas.draw_segment(canvas_point(pair[0]), canvas_point(pair[1]))?;
        }
    }

    // Bars fill the space between their left and right anchors.
    for bar in chart.bars() {
        let anchors = BarAnchors::of(bar);
        let y = canvas_y(anchors.center.y());
        let x0 = canvas_x(anchors.left.x()) + 1;
        let x1 = canvas_x(anchors.right.x()) - 1;
        for x in x0..=x1 {
            canvas.set(x, y, UNICODE_BAR)?;
        }
        let label = truncate_with_ellipsis(bar.id().as_str(), x1 - x0 + 1);
        debug_assert!(text_len(&label) <= x1 - x0 + 1);
        canvas.write_str(x0, y, &label)?;
    }

    for route in layout.routes() {
        if let Some(tip) = route.path().last() {
            let (x, y) = canvas_point(*tip);
            canvas.set(x, y, arrow_glyph(route.approach()))?;
        }
    }

    Ok(canvas_to_string_trimmed(&canvas))
}
