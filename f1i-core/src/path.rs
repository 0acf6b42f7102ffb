//! SVG path rendering for track layouts

use crate::model::NormalizedPoint;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// SVG path data (`d` attribute): `M x y L x y L x y ...`
///
/// Coordinates are written with two decimal places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathDescriptor(String);

impl PathDescriptor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connect the points in input order: move to the first, line to the rest
pub fn render(points: &[NormalizedPoint]) -> PathDescriptor {
    let mut d = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        let command = if i == 0 { "M" } else { " L" };
        // Writing into a String cannot fail
        let _ = write!(d, "{} {:.2} {:.2}", command, p.x, p.y);
    }
    PathDescriptor(d)
}
