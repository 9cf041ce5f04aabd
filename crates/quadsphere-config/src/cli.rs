//! Command-line overrides.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "quadsphere", about = "Adaptive quadtree sphere fly-by")]
pub struct CliArgs {
    /// Sphere radius.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Grid samples per patch row (odd, >= 3).
    #[arg(long)]
    pub segments: Option<u32>,

    /// Deepest subdivision level.
    #[arg(long)]
    pub max_level: Option<u32>,

    /// Use a single cube-cross UV atlas.
    #[arg(long)]
    pub uv_atlas: Option<bool>,

    #[arg(long)]
    pub split_factor: Option<f64>,

    #[arg(long)]
    pub unify_hysteresis: Option<f64>,

    /// Vertex welding bucket size.
    #[arg(long)]
    pub weld_precision: Option<f64>,

    /// Number of simulated frames.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.radius {
            self.sphere.radius = radius;
        }
        if let Some(segments) = args.segments {
            self.sphere.segments = segments;
        }
        if let Some(level) = args.max_level {
            self.sphere.max_level = level;
        }
        if let Some(atlas) = args.uv_atlas {
            self.sphere.uv_atlas = atlas;
        }
        if let Some(factor) = args.split_factor {
            self.lod.split_factor = factor;
        }
        if let Some(hysteresis) = args.unify_hysteresis {
            self.lod.unify_hysteresis = hysteresis;
        }
        if let Some(precision) = args.weld_precision {
            self.mesh.weld_precision = precision;
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
