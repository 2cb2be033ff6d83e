// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic timeline fixtures (no RNG).

use ganttline::calendar::ChronoCalendar;
use ganttline::layout::{Axis, RowPacker};
use ganttline::model::{BarRecord, BarSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub bars: usize,
    pub columns: usize,
    pub max_len: usize,
    /// Every n-th bar links to the next bar that starts after it ends (0 = no connectors).
    pub connect_every: usize,
}

impl Params {
    pub const fn new(bars: usize, columns: usize, max_len: usize, connect_every: usize) -> Self {
        Self { bars, columns, max_len, connect_every }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumDense,
    LargeSparse,
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumDense => "medium_dense",
            Self::LargeSparse => "large_sparse",
        }
    }

    pub const fn params(self) -> Params {
        match self {
            Self::Small => Params::new(16, 30, 4, 3),
            Self::MediumDense => Params::new(200, 60, 12, 4),
            Self::LargeSparse => Params::new(1_000, 720, 20, 5),
        }
    }
}

fn mix(seed: u64) -> u64 {
    let mut x = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

pub fn records(params: Params) -> Vec<BarRecord> {
    let spans = (0..params.bars)
        .map(|idx| {
            let h = mix(idx as u64);
            let len = (h % params.max_len.max(1) as u64) as usize;
            let start = ((h >> 16) % (params.columns - len) as u64) as usize;
            (start as i64, (start + len) as i64)
        })
        .collect::<Vec<_>>();

    spans
        .iter()
        .enumerate()
        .map(|(idx, (start, end))| {
            let mut record = BarRecord::index(format!("bar-{idx}"), *start, *end);
            if params.connect_every > 0 && idx % params.connect_every == 0 {
                if let Some(target) = spans.iter().position(|(s, _)| *s > *end) {
                    record = record.connect(format!("bar-{target}"));
                }
            }
            record
        })
        .collect()
}

pub fn axis(params: Params) -> Axis {
    Axis::build_index(0, params.columns as i64 - 1, 1).expect("axis")
}

pub fn bars(params: Params) -> BarSet {
    BarSet::resolve(&records(params), &axis(params), &ChronoCalendar::default()).expect("bars")
}

pub fn packed(params: Params) -> (Axis, BarSet, usize) {
    let axis = axis(params);
    let mut bars = bars(params);
    let mut packer = RowPacker::new();
    packer.pack(&mut bars);
    (axis, bars, packer.row_count())
}
