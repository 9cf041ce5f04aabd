//! Headless fly-by over an adaptive quadtree sphere.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p quadsphere-demo -- --max-level 8 --segments 9`.

mod flight;

use clap::Parser;
use glam::DVec3;
use quadsphere_config::{CliArgs, Config};
use quadsphere_lod::{LodPolicy, Sphere, SphereOptions, UvLayout};
use tracing::{error, info};

use crate::flight::Flight;

fn sphere_options(config: &Config) -> SphereOptions {
    SphereOptions {
        centre: DVec3::ZERO,
        radius: config.sphere.radius,
        segments: config.sphere.segments,
        max_level: config.sphere.max_level,
        uv_layout: if config.sphere.uv_atlas {
            UvLayout::Atlas
        } else {
            UvLayout::Split
        },
        neighbor_tolerance: config.mesh.neighbor_tolerance,
        weld_precision: config.mesh.weld_precision,
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut sphere = Sphere::new(sphere_options(config))?;
    let policy = LodPolicy::new(config.lod.split_factor, config.lod.unify_hysteresis)?;
    let flight = Flight {
        frames: config.demo.frames,
        start_altitude: config.demo.start_altitude,
        end_altitude: config.demo.end_altitude,
        direction: DVec3::new(0.35, 0.8, 0.5),
    };

    info!(
        radius = sphere.radius(),
        segments = config.sphere.segments,
        max_level = config.sphere.max_level,
        frames = flight.frames,
        "Starting fly-by"
    );

    let mut key = sphere.key();
    let mut uploads = 0u32;
    let mut peak_triangles = 0usize;
    for frame in 0..flight.frames {
        let viewer = flight.viewer(frame, sphere.centre(), sphere.radius());
        sphere.update(viewer, &policy);

        let next_key = sphere.key();
        if next_key == key {
            continue;
        }
        key = next_key;

        let mesh = sphere.mesh_data()?;
        uploads += 1;
        peak_triangles = peak_triangles.max(mesh.triangle_count());
        info!(
            frame,
            altitude = format_args!("{:.4}", flight.altitude(frame)),
            leaves = sphere.leaf_count(),
            nodes = sphere.node_count(),
            depth = sphere.max_depth(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            bytes = mesh.vertex_bytes().len() + mesh.index_bytes().len(),
            "Topology changed, re-uploading mesh"
        );
    }

    info!(
        uploads,
        peak_triangles,
        final_depth = sphere.max_depth(),
        "Fly-by finished"
    );
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("quadsphere")
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    quadsphere_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config) {
        error!("Fly-by failed: {e}");
        std::process::exit(1);
    }
}
