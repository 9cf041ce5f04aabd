use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::DVec3;
use quadsphere_lod::*;

fn refined_sphere(segments: u32, depth: u32) -> Sphere {
    let mut sphere = Sphere::new(SphereOptions {
        segments,
        max_level: depth,
        ..SphereOptions::default()
    })
    .unwrap();
    let target = DVec3::new(0.4, 0.3, 0.85).normalize();
    for _ in 0..depth {
        sphere.subdivide_at(target);
    }
    sphere
}

fn bench_leaf_indices(c: &mut Criterion) {
    c.bench_function("leaf_indices_s9_all_active", |bencher| {
        bencher.iter(|| black_box(triangulate::leaf_indices(black_box(9), Sides::ALL)))
    });
}

fn bench_subdivide_unify_cycle(c: &mut Criterion) {
    let mut sphere = refined_sphere(5, 5);
    let point = DVec3::new(-0.2, 0.9, 0.1).normalize();
    c.bench_function("sphere_subdivide_unify_cycle", |bencher| {
        bencher.iter(|| {
            sphere.subdivide_at(black_box(point));
            sphere.unify_at(black_box(point));
        })
    });
}

fn bench_raw_mesh(c: &mut Criterion) {
    let mut sphere = refined_sphere(9, 5);
    c.bench_function("sphere_raw_mesh_s9_depth5", |bencher| {
        bencher.iter(|| black_box(sphere.raw_mesh_data()))
    });
}

fn bench_weld(c: &mut Criterion) {
    let mut sphere = refined_sphere(9, 5);
    let raw = sphere.raw_mesh_data();
    c.bench_function("merge_vertices_s9_depth5", |bencher| {
        bencher.iter(|| black_box(merge_vertices(black_box(&raw), 1e-4)))
    });
}

fn bench_closest_quad(c: &mut Criterion) {
    let sphere = refined_sphere(5, 5);
    let point = DVec3::new(0.41, 0.29, 0.86);
    c.bench_function("sphere_closest_quad", |bencher| {
        bencher.iter(|| black_box(sphere.closest_quad(black_box(point))))
    });
}

fn bench_lod_update(c: &mut Criterion) {
    let mut sphere = refined_sphere(5, 6);
    let policy = LodPolicy::default();
    let near = DVec3::new(0.0, 0.0, 1.01);
    let far = DVec3::new(0.0, 0.0, 8.0);
    c.bench_function("sphere_lod_update", |bencher| {
        let mut flip = false;
        bencher.iter(|| {
            flip = !flip;
            let viewer = if flip { near } else { far };
            black_box(sphere.update(viewer, &policy))
        })
    });
}

criterion_group!(
    benches,
    bench_leaf_indices,
    bench_subdivide_unify_cycle,
    bench_raw_mesh,
    bench_weld,
    bench_closest_quad,
    bench_lod_update,
);
criterion_main!(benches);
