//! Benchmarks des projections et de la transformation de géométries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{Coord, Geometry, LineString, Polygon};
use std::path::Path;

use cartoproj::{parse_projection, read_prj, Direction, Ellipsoid, Projection, ProjectionParameters};

fn find_fixtures() -> Vec<std::path::PathBuf> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/*.prj");
    glob::glob(&pattern.to_string_lossy())
        .map(|paths| paths.filter_map(|p| p.ok()).collect())
        .unwrap_or_default()
}

/// Grille régulière de points en radians, de -80° à 80° de latitude
fn grid(n: usize) -> Vec<Coord> {
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            points.push(Coord {
                x: (-179.0 + 358.0 * i as f64 / n as f64).to_radians(),
                y: (-80.0 + 160.0 * j as f64 / n as f64).to_radians(),
            });
        }
    }
    points
}

fn bench_forward(c: &mut Criterion) {
    let points = grid(100);
    let mut group = c.benchmark_group("forward");
    group.throughput(Throughput::Elements(points.len() as u64));

    for name in Projection::names() {
        let projection = match Projection::from_parameters(
            name,
            Ellipsoid::WGS_84,
            &default_parameters(),
        ) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{}: {}", name, e);
                continue;
            }
        };
        group.bench_with_input(BenchmarkId::from_parameter(name), &projection, |b, p| {
            b.iter(|| {
                let projected = points
                    .iter()
                    .filter_map(|c| p.forward(black_box(*c)))
                    .count();
                black_box(projected)
            })
        });
    }

    group.finish();
}

fn default_parameters() -> ProjectionParameters {
    let mut params = ProjectionParameters::default();
    params.add_parameter("central_meridian", 10.0);
    params.add_parameter("latitude_of_origin", 45.0);
    params.add_parameter("standard_parallel_1", 40.0);
    params.add_parameter("standard_parallel_2", 50.0);
    params.add_parameter("scale_factor", 1.0);
    params.add_parameter("azimuth", 30.0);
    params
}

fn bench_transform_polygon(c: &mut Criterion) {
    let Some(path) = find_fixtures()
        .into_iter()
        .find(|p| p.ends_with("world_mercator.prj"))
    else {
        eprintln!("No fixtures found, skipping benchmark");
        return;
    };
    let Ok(mercator) = read_prj(&path) else {
        return;
    };
    // Anneau de 1000 sommets à cheval sur l'antiméridien
    let ring: Vec<Coord> = (0..=1000)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / 1000.0;
            Coord {
                x: std::f64::consts::PI + 0.3 * t.cos(),
                y: 0.3 * t.sin(),
            }
        })
        .collect();
    let polygon = Geometry::Polygon(Polygon::new(LineString::new(ring), vec![]));

    let mut group = c.benchmark_group("transform");
    group.bench_function("antimeridian_polygon", |b| {
        b.iter(|| black_box(mercator.transform(black_box(&polygon), Direction::Forward)))
    });
    group.finish();
}

fn bench_parse_parallel(c: &mut Criterion) {
    use rayon::prelude::*;

    let texts: Vec<String> = find_fixtures()
        .iter()
        .filter_map(|p| std::fs::read(p).ok())
        .map(|bytes| cartoproj::decode_prj(&bytes))
        .collect();
    if texts.is_empty() {
        eprintln!("No fixtures found, skipping benchmark");
        return;
    }
    let total_size: u64 = texts.iter().map(|t| t.len() as u64).sum();

    let mut group = c.benchmark_group("parse_wkt");
    group.throughput(Throughput::Bytes(total_size));

    group.bench_function("all_fixtures_parallel", |b| {
        b.iter(|| {
            let parsed = texts
                .par_iter()
                .filter_map(|text| parse_projection(black_box(text)).ok())
                .count();
            black_box(parsed)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_forward,
    bench_transform_polygon,
    bench_parse_parallel
);
criterion_main!(benches);
