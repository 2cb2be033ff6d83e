// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::bar::{BarRecord, BarSet};
use crate::calendar::{Calendar, CalendarStep, ChronoCalendar};
use crate::layout::axis::{Axis, AxisRange, AxisStep};

/// Four bars in March 2024 where three start on the same day.
pub(crate) fn march_records() -> Vec<BarRecord> {
    vec![
        BarRecord::dated("3123", "2024-03-06", "2024-03-07"),
        BarRecord::dated("3124", "2024-03-06", "2024-03-06"),
        BarRecord::dated("3125", "2024-03-07", "2024-03-08"),
        BarRecord::dated("3126", "2024-03-06", "2024-03-06"),
    ]
}

pub(crate) fn march_axis(calendar: &ChronoCalendar) -> Axis {
    let start = calendar.parse("2024-03-01", calendar.timezone()).expect("start");
    let end = calendar.parse("2024-03-31", calendar.timezone()).expect("end");
    Axis::build(
        AxisRange::Calendar { start, end },
        AxisStep::Calendar(CalendarStep::days(1)),
        calendar,
    )
    .expect("march axis")
}

pub(crate) fn march_bars(calendar: &ChronoCalendar) -> BarSet {
    BarSet::resolve(&march_records(), &march_axis(calendar), calendar).expect("march bars")
}

/// Index-mode bars over `[2, 10]` with a three-deep overlap around values 3..5.
pub(crate) fn overlap_records() -> Vec<BarRecord> {
    vec![
        BarRecord::index("3123", 2, 4),
        BarRecord::index("3127", 3, 3),
        BarRecord::index("3125", 4, 5),
        BarRecord::index("3126", 3, 5),
        BarRecord::index("3124", 5, 5),
    ]
}

pub(crate) fn overlap_axis() -> Axis {
    Axis::build_index(2, 10, 1).expect("overlap axis")
}

pub(crate) fn overlap_bars() -> BarSet {
    BarSet::resolve(&overlap_records(), &overlap_axis(), &ChronoCalendar::default())
        .expect("overlap bars")
}

/// Bars spread over two rows with a clear corridor between them.
pub(crate) fn staircase_bars() -> BarSet {
    let records = vec![
        BarRecord::index("a", 0, 1).connect("b"),
        BarRecord::index("b", 3, 4),
    ];
    let axis = Axis::build_index(0, 5, 1).expect("staircase axis");
    let mut bars =
        BarSet::resolve(&records, &axis, &ChronoCalendar::default()).expect("staircase bars");
    // Put `b` below `a` without relying on the packer.
    if let Some(b) = bars.get_mut("b") {
        b.set_row_index(1);
    }
    bars
}
