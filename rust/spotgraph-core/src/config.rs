use std::env;

use serde::{Deserialize, Serialize};

pub const FIT_TOLERANCE: f64 = 0.7;
pub const DEFAULT_MERGE_RADIUS: f64 = 5.0;
/// Map areas above this id may carry numbered secret pages.
pub const DEFAULT_SECRET_THRESHOLD: u32 = 6;
pub const DEFAULT_JOBS: usize = 2;
pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 720;
/// Offset between spot coordinates and the icon layer's origin.
pub const ICON_OFFSET: (i32, i32) = (340, 440);

/// Tunables for a build run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// A snap is flagged when the nearest node is not closer than `fit_tolerance` times
    /// any other node's distance.
    pub fit_tolerance: f64,
    /// Nodes closer than this (Euclidean, pixels) are merged. `0` merges exact duplicates only.
    pub merge_radius: f64,
    pub secret_threshold: u32,
    pub jobs: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub icon_offset: (i32, i32),
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            fit_tolerance: FIT_TOLERANCE,
            merge_radius: DEFAULT_MERGE_RADIUS,
            secret_threshold: DEFAULT_SECRET_THRESHOLD,
            jobs: DEFAULT_JOBS,
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            icon_offset: ICON_OFFSET,
        }
    }
}

impl BuildOptions {
    /// Load overrides from environment variables. Missing/invalid values fall back to defaults.
    ///
    /// Variables:
    /// - SPOTGRAPH_FIT_TOLERANCE: float in (0, 1]
    /// - SPOTGRAPH_MERGE_RADIUS: float >= 0
    /// - SPOTGRAPH_SECRET_THRESHOLD: integer map area id
    /// - SPOTGRAPH_JOBS: integer >= 1
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = get("SPOTGRAPH_FIT_TOLERANCE").and_then(|s| s.parse::<f64>().ok()) {
            if v > 0.0 && v <= 1.0 { cfg.fit_tolerance = v; }
        }
        if let Some(v) = get("SPOTGRAPH_MERGE_RADIUS").and_then(|s| s.parse::<f64>().ok()) {
            if v >= 0.0 && v.is_finite() { cfg.merge_radius = v; }
        }
        if let Some(v) = get("SPOTGRAPH_SECRET_THRESHOLD").and_then(|s| s.parse::<u32>().ok()) {
            cfg.secret_threshold = v;
        }
        if let Some(v) = get("SPOTGRAPH_JOBS").and_then(|s| s.parse::<usize>().ok()) {
            if v > 0 { cfg.jobs = v; }
        }
        cfg
    }
}
