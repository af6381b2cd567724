// ABOUTME: Criterion benchmarks for trail matching and progress aggregation
// ABOUTME: Measures the per-import matcher scan and the per-evaluation statistics pass
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Criterion benchmarks for the pure algorithms in `kilele-intelligence`.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kilele_intelligence::{aggregate, SessionRecord, TrailLocation, TrailMatcher};
use kilele_server::models::{Coordinate, Difficulty, SessionStatus};
use uuid::Uuid;

const DIFFICULTIES: [Difficulty; 4] = [
    Difficulty::Easy,
    Difficulty::Moderate,
    Difficulty::Hard,
    Difficulty::Extreme,
];

/// Trailheads on a 0.1 degree grid around Nairobi
fn trail_grid(count: usize) -> Vec<TrailLocation> {
    (0..count)
        .map(|index| TrailLocation {
            trail_id: Uuid::new_v4(),
            trailhead: Coordinate {
                latitude: -1.0 - (index % 50) as f64 * 0.1,
                longitude: 36.0 + (index / 50) as f64 * 0.1,
            },
        })
        .collect()
}

fn session_history(count: usize) -> Vec<SessionRecord> {
    (0..count)
        .map(|index| SessionRecord {
            session_id: Uuid::new_v4(),
            trail_id: Some(Uuid::new_v4()),
            status: if index % 10 == 0 {
                SessionStatus::Active
            } else {
                SessionStatus::Completed
            },
            distance_km: 4.0 + (index % 7) as f64,
            elevation_gain_m: 150.0 + (index % 11) as f64 * 40.0,
            duration_hours: 1.5 + (index % 5) as f64 * 0.5,
            trail_difficulty: Some(DIFFICULTIES[index % DIFFICULTIES.len()]),
            trail_location: Some(format!("Location {}", index % 23)),
        })
        .collect()
}

fn bench_match_start(c: &mut Criterion) {
    let matcher = TrailMatcher::default();
    let start = Coordinate {
        latitude: -1.24,
        longitude: 36.035,
    };
    let mut group = c.benchmark_group("match_start");

    for size in [100_usize, 1_000, 10_000] {
        let trails = trail_grid(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &trails, |b, trails| {
            b.iter(|| matcher.match_start(black_box(Some(start)), black_box(trails)));
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [10_usize, 250, 5_000] {
        let records = session_history(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| aggregate(black_box(records)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_match_start, bench_aggregate);
criterion_main!(benches);
