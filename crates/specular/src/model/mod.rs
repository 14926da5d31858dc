//! Input model: a point source, a target and a set of two-sided mirrors.
//!
//! The model is immutable once built. Mirrors are de-duplicated by value and
//! keep their first-insertion order; `MirrorId` indexes into that order and is
//! the identity every sweep and occluder decision refers to.
//!
//! Text format (whitespace separated, `#` starts a comment):
//! ```text
//! sx sy  tx ty
//! x1 y1 x2 y2   # one line per mirror
//! ```

pub mod rand;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Point, Segment};

/// Index of a mirror in `Model::mirrors()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MirrorId(pub usize);

/// Errors raised while building or parsing a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    Parse { token: usize, reason: String },
    Truncated { numbers: usize },
    DegenerateMirror { index: usize },
    NonFinite { what: String },
    InvalidParams { reason: String },
}

impl ModelError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { token, reason } => write!(f, "token #{token}: {reason}"),
            Self::Truncated { numbers } => write!(
                f,
                "expected 4 numbers for source and target plus 4 per mirror, found {numbers}"
            ),
            Self::DegenerateMirror { index } => write!(f, "mirror #{index} has zero length"),
            Self::NonFinite { what } => write!(f, "non-finite coordinate in {what}"),
            Self::InvalidParams { reason } => write!(f, "invalid scene params: {reason}"),
        }
    }
}

impl std::error::Error for ModelError {}

#[derive(Deserialize)]
struct RawModel {
    source: Point,
    target: Point,
    mirrors: Vec<Segment>,
}

impl TryFrom<RawModel> for Model {
    type Error = ModelError;

    fn try_from(raw: RawModel) -> Result<Self, Self::Error> {
        Model::new(raw.source, raw.target, raw.mirrors)
    }
}

/// Source, target and mirrors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModel")]
pub struct Model {
    source: Point,
    target: Point,
    mirrors: Vec<Segment>,
}

fn finite(p: &Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

impl Model {
    /// Build a model; duplicate mirrors collapse onto their first occurrence.
    pub fn new(
        source: Point,
        target: Point,
        mirrors: impl IntoIterator<Item = Segment>,
    ) -> Result<Self, ModelError> {
        if !finite(&source) {
            return Err(ModelError::NonFinite {
                what: "source".into(),
            });
        }
        if !finite(&target) {
            return Err(ModelError::NonFinite {
                what: "target".into(),
            });
        }
        let mut unique: Vec<Segment> = Vec::new();
        for (index, m) in mirrors.into_iter().enumerate() {
            if !finite(m.p1()) || !finite(m.p2()) {
                return Err(ModelError::NonFinite {
                    what: format!("mirror #{index}"),
                });
            }
            if m.is_degenerate() {
                return Err(ModelError::DegenerateMirror { index });
            }
            if !unique.contains(&m) {
                unique.push(m);
            }
        }
        Ok(Self {
            source,
            target,
            mirrors: unique,
        })
    }

    /// Parse the plain-text format.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let mut numbers = Vec::new();
        let tokens = text
            .lines()
            .map(|l| l.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace);
        for (token, raw) in tokens.enumerate() {
            let v: f64 = raw.parse().map_err(|e| ModelError::Parse {
                token,
                reason: format!("{raw:?}: {e}"),
            })?;
            numbers.push(v);
        }
        if numbers.len() < 4 || numbers.len() % 4 != 0 {
            return Err(ModelError::Truncated {
                numbers: numbers.len(),
            });
        }
        let source = Point::new(numbers[0], numbers[1]);
        let target = Point::new(numbers[2], numbers[3]);
        let mirrors = numbers[4..]
            .chunks_exact(4)
            .map(|c| Segment::new(Point::new(c[0], c[1]), Point::new(c[2], c[3])));
        Self::new(source, target, mirrors)
    }

    /// Write the plain-text format read by `parse`.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{} {} {} {}\n",
            self.source.x, self.source.y, self.target.x, self.target.y
        );
        for m in &self.mirrors {
            out.push_str(&format!("{} {} {} {}\n", m.p1().x, m.p1().y, m.p2().x, m.p2().y));
        }
        out
    }

    #[inline]
    pub fn source(&self) -> &Point {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &Point {
        &self.target
    }

    #[inline]
    pub fn mirrors(&self) -> &[Segment] {
        &self.mirrors
    }

    #[inline]
    pub fn mirror(&self, id: MirrorId) -> &Segment {
        &self.mirrors[id.0]
    }

    /// Mirrors paired with their ids.
    pub fn mirror_ids(&self) -> impl Iterator<Item = (MirrorId, &Segment)> + '_ {
        self.mirrors.iter().enumerate().map(|(i, m)| (MirrorId(i), m))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model[({},{})->({},{}) @ {} mirrors]",
            self.source.x,
            self.source.y,
            self.target.x,
            self.target.y,
            self.mirrors.len()
        )
    }
}
