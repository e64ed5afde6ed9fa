use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Point2;
use nanomask_calib::{
    calibrate, CalibrationMethod, CalibrationParams, MarkerSet, PerspectiveParams,
};

fn measured() -> (MarkerSet, Vec<Point2<f64>>) {
    let markers = MarkerSet::new(
        Point2::new(196.0, -952.0),
        Point2::new(1124.0, -974.0),
        Point2::new(219.0, -21.0),
        Point2::new(1148.0, -46.0),
    );
    let features = (0..64)
        .map(|i| Point2::new(200.0 + 14.0 * i as f64, -900.0 + 13.0 * i as f64))
        .collect();
    (markers, features)
}

fn bench_calibrate(c: &mut Criterion) {
    let (markers, features) = measured();

    let affine = CalibrationParams::default();
    c.bench_function("calibrate_affine_64", |b| {
        b.iter(|| calibrate(black_box(&markers), black_box(&features), &affine))
    });

    let perspective = CalibrationParams {
        method: CalibrationMethod::Perspective(PerspectiveParams::default()),
        ..CalibrationParams::default()
    };
    c.bench_function("calibrate_perspective_64", |b| {
        b.iter(|| calibrate(black_box(&markers), black_box(&features), &perspective))
    });
}

criterion_group!(benches, bench_calibrate);
criterion_main!(benches);
