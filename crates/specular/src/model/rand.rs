//! Random scenes for tests, benchmarks and experiments.
//!
//! Model
//! - Source and target uniform in the square `[-extent, extent]²`.
//! - Each mirror: uniform center in the same square, uniform direction,
//!   uniform length in `[min_len, max_len]`.
//! - Determinism: a single `StdRng` seeded from `seed`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Model, ModelError};
use crate::geom::{Point, Segment};

/// Random scene configuration.
#[derive(Clone, Copy, Debug)]
pub struct RandomSceneCfg {
    pub mirrors: usize,
    /// Half side length of the square everything is drawn from.
    pub extent: f64,
    pub min_len: f64,
    pub max_len: f64,
}

impl Default for RandomSceneCfg {
    fn default() -> Self {
        Self {
            mirrors: 12,
            extent: 10.0,
            min_len: 1.0,
            max_len: 4.0,
        }
    }
}

impl RandomSceneCfg {
    fn validate(&self) -> Result<(), ModelError> {
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ModelError::invalid("extent must be finite and positive"));
        }
        if !(self.min_len.is_finite() && self.min_len > 0.0) {
            return Err(ModelError::invalid("min_len must be finite and positive"));
        }
        if !(self.max_len.is_finite() && self.max_len >= self.min_len) {
            return Err(ModelError::invalid("min_len <= max_len required"));
        }
        Ok(())
    }
}

/// Draw a reproducible random model.
pub fn draw_model(cfg: &RandomSceneCfg, seed: u64) -> Result<Model, ModelError> {
    cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let e = cfg.extent;
    let point = |rng: &mut StdRng| Point::new(rng.gen_range(-e..=e), rng.gen_range(-e..=e));
    let source = point(&mut rng);
    let target = point(&mut rng);
    let mut mirrors = Vec::with_capacity(cfg.mirrors);
    for _ in 0..cfg.mirrors {
        let c = point(&mut rng);
        let theta = rng.gen::<f64>() * std::f64::consts::TAU;
        let half = 0.5 * rng.gen_range(cfg.min_len..=cfg.max_len);
        let d = Point::new(theta.cos(), theta.sin()) * half;
        mirrors.push(Segment::new(c - d, c + d));
    }
    Model::new(source, target, mirrors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_scene() {
        let cfg = RandomSceneCfg::default();
        let a = draw_model(&cfg, 7).unwrap();
        let b = draw_model(&cfg, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.mirrors().len(), cfg.mirrors);
        assert_ne!(a, draw_model(&cfg, 8).unwrap());
    }

    #[test]
    fn lengths_and_bounds_respected() {
        let cfg = RandomSceneCfg {
            mirrors: 40,
            extent: 5.0,
            min_len: 0.5,
            max_len: 2.0,
        };
        let m = draw_model(&cfg, 2025).unwrap();
        for s in m.mirrors() {
            assert!(s.length() >= 0.5 - 1e-9 && s.length() <= 2.0 + 1e-9);
            assert!(s.mid().x.abs() <= 5.0 + 1e-9 && s.mid().y.abs() <= 5.0 + 1e-9);
        }
    }

    #[test]
    fn invalid_params_rejected() {
        let cfg = RandomSceneCfg {
            min_len: 3.0,
            max_len: 1.0,
            ..RandomSceneCfg::default()
        };
        assert!(matches!(
            draw_model(&cfg, 1),
            Err(ModelError::InvalidParams { .. })
        ));
    }
}
