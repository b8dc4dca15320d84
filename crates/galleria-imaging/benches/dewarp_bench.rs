// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the dewarp hot path: the live preview at display
// size, and the full-resolution export.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use galleria_imaging::correct::{Point, Quad, dewarp, export};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
    })
}

/// A tilted painting roughly filling the frame.
fn tilted(width: u32, height: u32) -> Quad {
    let (w, h) = (f64::from(width), f64::from(height));
    Quad::new([
        Point::new(w * 0.10, h * 0.12),
        Point::new(w * 0.88, h * 0.06),
        Point::new(w * 0.92, h * 0.90),
        Point::new(w * 0.07, h * 0.85),
    ])
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// One preview refresh at the editor's 900px display width.
fn bench_preview_dewarp(c: &mut Criterion) {
    let source = photo(900, 600);
    let quad = tilted(900, 600);

    c.bench_function("dewarp preview (900x600)", |b| {
        b.iter(|| black_box(dewarp(black_box(&source), black_box(&quad), 32)));
    });
}

/// Full-resolution dewarp plus JPEG encoding of a 12MP photo.
fn bench_full_export(c: &mut Criterion) {
    let source = photo(4000, 3000);
    let quad = tilted(4000, 3000);

    let mut group = c.benchmark_group("export");
    group.sample_size(10);
    group.bench_function("export (4000x3000)", |b| {
        b.iter(|| black_box(export(black_box(&source), black_box(&quad), 0.8, 32)));
    });
    group.finish();
}

criterion_group!(benches, bench_preview_dewarp, bench_full_export);
criterion_main!(benches);
