// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Point and quadrilateral primitives in source-image pixel coordinates.

use std::fmt;
use std::str::FromStr;

use galleria_core::error::GalleriaError;
use serde::{Deserialize, Serialize};

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiply both coordinates by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
pub(crate) fn triangle_area2(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Index of each corner within a [`Quad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

/// Four ordered corners: top-left, top-right, bottom-right, bottom-left.
///
/// A `Quad` is an immutable value. Moving a corner yields a new `Quad`, so a
/// snapshot taken before an edit never changes underneath its holder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quad([Point; 4]);

impl Quad {
    pub const fn new(corners: [Point; 4]) -> Self {
        Self(corners)
    }

    /// The axis-aligned rectangle `(0,0) (w,0) (w,h) (0,h)`.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self([
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
            Point::new(0.0, height),
        ])
    }

    /// A rectangle inset from each edge of a `width` x `height` image by
    /// `fraction` of that dimension.
    pub fn inset(width: u32, height: u32, fraction: f64) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let (mx, my) = (w * fraction, h * fraction);
        Self([
            Point::new(mx, my),
            Point::new(w - mx, my),
            Point::new(w - mx, h - my),
            Point::new(mx, h - my),
        ])
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.0
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.0[corner as usize]
    }

    /// Return a copy with the corner at `index` replaced by `point`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..4`.
    #[must_use]
    pub fn with_corner(self, index: usize, point: Point) -> Self {
        let mut corners = self.0;
        corners[index] = point;
        Self(corners)
    }

    /// Return a copy with every corner multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self(self.0.map(|p| p.scaled(factor)))
    }

    pub fn top_length(&self) -> f64 {
        self.0[0].distance(self.0[1])
    }

    pub fn right_length(&self) -> f64 {
        self.0[1].distance(self.0[2])
    }

    pub fn bottom_length(&self) -> f64 {
        self.0[2].distance(self.0[3])
    }

    pub fn left_length(&self) -> f64 {
        self.0[3].distance(self.0[0])
    }

    /// Unsigned area via the shoelace formula.
    pub fn area(&self) -> f64 {
        let [a, b, c, d] = self.0;
        (triangle_area2(a, b, c) + triangle_area2(a, c, d)).abs() / 2.0
    }
}

impl From<[Point; 4]> for Quad {
    fn from(corners: [Point; 4]) -> Self {
        Self(corners)
    }
}

impl fmt::Display for Quad {
    /// Formats as `x,y;x,y;x,y;x,y`, the same form [`FromStr`] accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        Ok(())
    }
}

impl FromStr for Quad {
    type Err = GalleriaError;

    /// Parse `x,y;x,y;x,y;x,y` in top-left, top-right, bottom-right,
    /// bottom-left order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(';').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GalleriaError::Config(format!(
                "expected 4 corners separated by ';', got {}",
                parts.len()
            )));
        }

        let mut corners = [Point::default(); 4];
        for (slot, part) in corners.iter_mut().zip(&parts) {
            let (x, y) = part.split_once(',').ok_or_else(|| {
                GalleriaError::Config(format!("corner '{part}' is not of the form x,y"))
            })?;
            let parse = |v: &str| {
                v.trim().parse::<f64>().map_err(|err| {
                    GalleriaError::Config(format!("invalid coordinate '{v}': {err}"))
                })
            };
            *slot = Point::new(parse(x)?, parse(y)?);
        }
        Ok(Self(corners))
    }
}
