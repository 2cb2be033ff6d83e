// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text rendering of a chart layout.
//!
//! The layout engine only produces rows, columns and grid paths; this module is a reference
//! renderer that turns them into Unicode text for the CLI and for tests.

use std::fmt;

mod text;
pub mod timeline;

pub use timeline::render_timeline_unicode;

pub const UNICODE_BOX_HORIZONTAL: char = '─';
pub const UNICODE_BOX_VERTICAL: char = '│';
pub const UNICODE_BAR: char = '█';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct BoxEdges(u8);

impl BoxEdges {
    const LEFT: Self = Self(1 << 0);
    const RIGHT: Self = Self(1 << 1);
    const UP: Self = Self(1 << 2);
    const DOWN: Self = Self(1 << 3);

    fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    fn glyph(self) -> char {
        match self.0 {
            0 => ' ',
            1..=3 => UNICODE_BOX_HORIZONTAL,
            4 | 8 | 12 => UNICODE_BOX_VERTICAL,
            10 => '┌',
            9 => '┐',
            6 => '└',
            5 => '┘',
            14 => '├',
            13 => '┤',
            11 => '┬',
            7 => '┴',
            _ => '┼',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Glyph(char),
    Lines(BoxEdges),
}

impl Cell {
    fn render(self) -> char {
        match self {
            Self::Glyph(ch) => ch,
            Self::Lines(edges) => edges.glyph(),
        }
    }
}

/// Fixed-size character grid.
///
/// Glyphs overwrite whatever is below them; line segments merge with other line segments into
/// corners and junctions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        let len = width
            .checked_mul(height)
            .ok_or(CanvasError::AreaOverflow { width, height })?;
        Ok(Self { width, height, cells: vec![Cell::Glyph(' '); len] })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        Ok(self.cells[self.index_of(x, y)?].render())
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        self.cells[idx] = Cell::Glyph(ch);
        Ok(())
    }

    /// Writes `text` from `(x, y)` to the right, clipping at the right edge.
    pub fn write_str(&mut self, x: usize, y: usize, text: &str) -> Result<(), CanvasError> {
        self.index_of(0, y)?;
        for (offset, ch) in text.chars().enumerate() {
            let Some(cx) = x.checked_add(offset).filter(|cx| *cx < self.width) else {
                break;
            };
            self.set(cx, y, ch)?;
        }
        Ok(())
    }

    /// Draws an axis-aligned segment. Endpoints only get the half facing the segment, so
    /// consecutive segments of a polyline meet in proper corners.
    pub fn draw_segment(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<(), CanvasError> {
        let ((x0, y0), (x1, y1)) = (from, to);
        if y0 == y1 {
            let (lo, hi) = (x0.min(x1), x0.max(x1));
            for x in lo..=hi {
                let mut edges = BoxEdges::default();
                if x > lo {
                    edges = edges.union(BoxEdges::LEFT);
                }
                if x < hi {
                    edges = edges.union(BoxEdges::RIGHT);
                }
                self.add_edges(x, y0, edges)?;
            }
            Ok(())
        } else if x0 == x1 {
            let (lo, hi) = (y0.min(y1), y0.max(y1));
            for y in lo..=hi {
                let mut edges = BoxEdges::default();
                if y > lo {
                    edges = edges.union(BoxEdges::UP);
                }
                if y < hi {
                    edges = edges.union(BoxEdges::DOWN);
                }
                self.add_edges(x0, y, edges)?;
            }
            Ok(())
        } else {
            Err(CanvasError::DiagonalSegment { from, to })
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|cell| cell.render()).collect())
    }

    fn add_edges(&mut self, x: usize, y: usize, edges: BoxEdges) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        self.cells[idx] = match self.cells[idx] {
            Cell::Lines(existing) => Cell::Lines(existing.union(edges)),
            Cell::Glyph(_) => Cell::Lines(edges),
        };
        Ok(())
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if x >= self.width || y >= self.height {
            return Err(CanvasError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok(y * self.width + x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasError {
    AreaOverflow { width: usize, height: usize },
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
    DiagonalSegment { from: (usize, usize), to: (usize, usize) },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AreaOverflow { width, height } => {
                write!(f, "canvas area overflow: {width}x{height}")
            }
            Self::OutOfBounds { x, y, width, height } => {
                write!(f, "canvas out of bounds: ({x},{y}) not in {width}x{height}")
            }
            Self::DiagonalSegment { from, to } => {
                write!(f, "segment {from:?} -> {to:?} is not axis-aligned")
            }
        }
    }
}

impl std::error::Error for CanvasError {}
