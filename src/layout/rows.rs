// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::model::{Bar, BarSet};

/// Order of events that share a column.
///
/// Bars that end in a column free their row before bars starting in that column ask for one,
/// so bars touching at a boundary column can share a row. A zero-length bar closes only after
/// the opens of its own column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventPhase {
    CloseCarried,
    Open,
    CloseSameColumn,
}

#[derive(Debug, Clone, Copy)]
struct SweepEvent {
    column: usize,
    phase: EventPhase,
    start_ordinal: i64,
    bar: usize,
}

impl SweepEvent {
    fn cmp_sweep(&self, other: &Self) -> Ordering {
        self.column
            .cmp(&other.column)
            .then(self.phase.cmp(&other.phase))
            .then_with(|| match self.phase {
                // Same start: the later bar in caller order opens first.
                EventPhase::Open => self
                    .start_ordinal
                    .cmp(&other.start_ordinal)
                    .then(other.bar.cmp(&self.bar)),
                EventPhase::CloseCarried | EventPhase::CloseSameColumn => self.bar.cmp(&other.bar),
            })
    }
}

fn sweep_events(bars: &[Bar]) -> Vec<SweepEvent> {
    let mut events = Vec::with_capacity(bars.len() * 2);
    for (bar, item) in bars.iter().enumerate() {
        let start_ordinal = item.span().start_ordinal();
        events.push(SweepEvent {
            column: item.start_index(),
            phase: EventPhase::Open,
            start_ordinal,
            bar,
        });
        events.push(SweepEvent {
            column: item.end_index(),
            phase: if item.end_index() == item.start_index() {
                EventPhase::CloseSameColumn
            } else {
                EventPhase::CloseCarried
            },
            start_ordinal,
            bar,
        });
    }
    events.sort_by(SweepEvent::cmp_sweep);
    events
}

/// Assigns every bar a row so that conflicting bars never share one.
///
/// A single sweep over open/close events; each open takes the lowest row currently free. The
/// number of rows equals the deepest overlap, with one row reserved even for no bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPacker {
    row_count: usize,
}

impl Default for RowPacker {
    fn default() -> Self {
        Self { row_count: 1 }
    }
}

impl RowPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pack(&mut self, bars: &mut BarSet) {
        let events = sweep_events(bars.as_slice());

        let mut rows = vec![0usize; bars.len()];
        let mut free_rows = BinaryHeap::<Reverse<usize>>::new();
        let mut next_row = 0usize;

        for event in &events {
            match event.phase {
                EventPhase::Open => {
                    let row = match free_rows.pop() {
                        Some(Reverse(row)) => row,
                        None => {
                            next_row += 1;
                            next_row - 1
                        }
                    };
                    rows[event.bar] = row;
                }
                EventPhase::CloseCarried | EventPhase::CloseSameColumn => {
                    free_rows.push(Reverse(rows[event.bar]));
                }
            }
        }

        for (bar, row) in bars.bars_mut().iter_mut().zip(rows) {
            bar.set_row_index(row);
        }
        self.row_count = next_row.max(1);
        log::debug!("packed {} bars into {} rows", bars.len(), self.row_count);
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

/// Whether two bars may not share a row.
pub fn bars_conflict(a: &Bar, b: &Bar) -> bool {
    a.start_index() == b.start_index()
        || (a.start_index() < b.end_index() && b.start_index() < a.end_index())
}
