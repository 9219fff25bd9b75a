use crate::geom::{Point3, sample_disc, spiral_sphere};

fn seeded(seed: u64) -> rand::prelude::StdRng {
    rand::SeedableRng::seed_from_u64(seed)
}

#[test]
fn uniform_disc_law_fills_area_proportionally() {
    let mut rng = seeded(101);
    let samples = sample_disc(1.0, 20_000, true, &mut rng);

    // Under the area-uniform law a quarter of the samples land inside
    // half the radius.
    let inner = samples
        .iter()
        .filter(|(x, y)| x.hypot(*y) < 0.5)
        .count();
    let fraction = inner as f64 / samples.len() as f64;
    assert!((fraction - 0.25).abs() < 0.02, "inner fraction {fraction}");
}

#[test]
fn linear_disc_law_concentrates_toward_center() {
    let mut rng = seeded(101);
    let samples = sample_disc(1.0, 20_000, false, &mut rng);

    // Radius drawn linearly: half the samples inside half the radius.
    let inner = samples
        .iter()
        .filter(|(x, y)| x.hypot(*y) < 0.5)
        .count();
    let fraction = inner as f64 / samples.len() as f64;
    assert!((fraction - 0.5).abs() < 0.02, "inner fraction {fraction}");

    for (x, y) in &samples {
        assert!(x.hypot(*y) <= 1.0 + 1e-12);
    }
}

#[test]
fn disc_angles_cover_every_quadrant() {
    let mut rng = seeded(7);
    let samples = sample_disc(1.0, 4_000, true, &mut rng);

    let mut quadrants = [0_usize; 4];
    for (x, y) in &samples {
        let q = match (*x >= 0.0, *y >= 0.0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        quadrants[q] += 1;
    }
    for (q, count) in quadrants.iter().enumerate() {
        assert!(*count > 500, "quadrant {q} starved: {count}");
    }
}

#[test]
fn spiral_sphere_spreads_points_evenly() {
    let center = Point3::new(2.0, -1.0, 4.0);
    let points = spiral_sphere(500, center, 1.0);
    assert_eq!(points.len(), 500);

    let mut min_gap = f64::INFINITY;
    for (i, a) in points.iter().enumerate() {
        assert!((a.distance_to(center) - 1.0).abs() < 1e-9);
        for b in &points[i + 1..] {
            min_gap = min_gap.min(a.distance_to(*b));
        }
    }
    // The ideal spacing for 500 points on a unit sphere is about 0.16; the
    // spiral stays within a modest factor of it.
    assert!(min_gap > 0.05, "closest pair {min_gap}");

    // Heights march monotonically from pole to pole.
    for pair in points.windows(2) {
        assert!(pair[1].z < pair[0].z);
    }
}

#[test]
fn spiral_sphere_small_counts() {
    assert!(spiral_sphere(0, Point3::ORIGIN, 1.0).is_empty());

    let single = spiral_sphere(1, Point3::ORIGIN, 2.0);
    assert_eq!(single.len(), 1);
    assert!((single[0].distance_to(Point3::ORIGIN) - 2.0).abs() < 1e-9);
    assert!(single[0].z.abs() < 1e-9);
}
