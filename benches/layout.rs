// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use ganttline::calendar::{Calendar, CalendarStep, ChronoCalendar, StepUnit};
use ganttline::layout::{Axis, AxisRange, AxisStep, AxisValue, RowPacker};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `timeline.axis`, `timeline.pack`
// - Case IDs after the `/` must stay stable so results remain comparable.
fn benches_layout(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("timeline.axis");
        let calendar = ChronoCalendar::default();
        let start = calendar.parse("2024-01-01", calendar.timezone()).expect("start");
        let end = calendar.parse("2024-12-31", calendar.timezone()).expect("end");

        for (case_id, unit) in [("year_of_days", StepUnit::Day), ("year_of_hours", StepUnit::Hour)] {
            let step = AxisStep::Calendar(CalendarStep::new(unit, 1));
            let range = AxisRange::Calendar { start, end };
            group.bench_function(case_id, |b| {
                b.iter(|| {
                    let axis = Axis::build(black_box(range), black_box(step), &calendar)
                        .expect("axis");
                    black_box(axis.columns_number())
                })
            });
        }

        let axis = Axis::build(
            AxisRange::Calendar { start, end },
            AxisStep::Calendar(CalendarStep::new(StepUnit::Hour, 1)),
            &calendar,
        )
        .expect("axis");
        group.bench_function("lookup_hours", |b| {
            b.iter(|| {
                let mut acc = 0usize;
                let mut instant = start;
                for _ in 0..256 {
                    instant = calendar
                        .advance(&instant, CalendarStep::new(StepUnit::Minute, 97), 1)
                        .expect("advance");
                    acc = acc.wrapping_add(
                        axis.column_of(AxisValue::Instant(black_box(instant))).unwrap_or(0),
                    );
                }
                black_box(acc)
            })
        });
        group.bench_function("header_labels_hours", |b| {
            b.iter(|| black_box(axis.header_labels(&calendar, None).len()))
        });

        group.finish();
    }

    {
        let mut group = c.benchmark_group("timeline.pack");

        for case in [
            fixtures::Case::Small,
            fixtures::Case::MediumDense,
            fixtures::Case::LargeSparse,
        ] {
            let bars = fixtures::bars(case.params());
            group.throughput(Throughput::Elements(bars.len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter_batched(
                    || bars.clone(),
                    |mut bars| {
                        let mut packer = RowPacker::new();
                        packer.pack(&mut bars);
                        black_box(packer.row_count())
                    },
                    criterion::BatchSize::SmallInput,
                )
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_layout
}
criterion_main!(benches);
