//! Paths bouncing through a corridor of two parallel mirrors.
//!
//! Purpose
//! - Show the breadth-first trace on a scene whose paths are easy to check by
//!   hand: every path zig-zags between the walls, one more bounce per level.
//! - Print one line per found path with its bounce count and length.

use std::time::Instant;

use nalgebra::vector;
use specular::prelude::*;

fn main() {
    let walls = [
        Segment::new(vector![-2.0, 1.0], vector![12.0, 1.0]),
        Segment::new(vector![-2.0, -1.0], vector![12.0, -1.0]),
    ];
    let model = Model::new(vector![0.0, 0.0], vector![10.0, 0.0], walls).expect("valid corridor");
    let cfg = TraceCfg::from_depth(4).expect("valid depth");

    let start = Instant::now();
    let result = trace(model, &cfg, &NeverCancel).expect("corridor traces");
    let elapsed = start.elapsed().as_secs_f64() * 1e3;

    for ray in result.rays() {
        println!("bounces={} length={:.6}", ray.bounces(), ray.length());
    }
    println!(
        "groups={} expanded={} frontier={} ms={elapsed:.3}",
        result.tree().len(),
        result.expanded(),
        result.frontier().len()
    );
}
