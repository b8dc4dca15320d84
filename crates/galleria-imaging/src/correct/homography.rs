// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar homography between two quadrilaterals.
//
// Each quad is first expressed as a projective basis: the 3x3 matrix that
// sends the homogeneous unit points (1,0,0), (0,1,0), (0,0,1) and (1,1,1) to
// its four corners. Composing one basis with the adjugate (a scaled inverse)
// of the other gives the quad-to-quad mapping in closed form, with no
// general 8x8 solve.

use galleria_core::error::{GalleriaError, Result};
use tracing::trace;

use super::geometry::{Point, Quad, triangle_area2};

/// Row-major 3x3 matrix.
type Mat3 = [f64; 9];

/// Corner triangles whose areas must all be non-zero for a quad to span
/// the plane: any three of the four corners.
const CORNER_TRIANGLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];

/// Relative tolerance for the collinearity test, scaled by the squared
/// extent of the quad.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// A projective transform mapping a source quad onto a destination quad.
///
/// Built fresh for every rasterization; it is a pure function of the eight
/// input corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Homography {
    forward: Mat3,
    inverse: Mat3,
}

impl Homography {
    /// Compute the transform sending each corner of `src` onto the matching
    /// corner of `dst`.
    ///
    /// Fails with [`GalleriaError::DegenerateGeometry`] when either quad has
    /// non-finite or coincident corners, or three collinear corners.
    pub fn from_quads(src: &Quad, dst: &Quad) -> Result<Self> {
        check_spans_plane(src, "source")?;
        check_spans_plane(dst, "destination")?;

        let src_basis = basis_to_points(src);
        let dst_basis = basis_to_points(dst);

        let forward = normalize(mul(&dst_basis, &adjugate(&src_basis)));
        let inverse = normalize(mul(&src_basis, &adjugate(&dst_basis)));
        trace!(?forward, ?inverse, "homography built");

        Ok(Self { forward, inverse })
    }

    /// Map a source coordinate to the destination plane.
    pub fn map_forward(&self, x: f64, y: f64) -> (f64, f64) {
        project(&self.forward, x, y)
    }

    /// Map a destination coordinate back to the source plane.
    pub fn map_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        project(&self.inverse, x, y)
    }
}

/// Reject quads whose corners cannot carry a projective basis.
fn check_spans_plane(quad: &Quad, role: &str) -> Result<()> {
    let corners = quad.corners();
    if let Some(p) = corners.iter().find(|p| !p.is_finite()) {
        return Err(GalleriaError::DegenerateGeometry(format!(
            "{role} corner ({}, {}) is not finite",
            p.x, p.y
        )));
    }

    let extent = squared_extent(corners);
    if extent == 0.0 {
        return Err(GalleriaError::DegenerateGeometry(format!(
            "all {role} corners coincide"
        )));
    }

    let tolerance = extent * COLLINEAR_EPSILON;
    for (a, b, c) in CORNER_TRIANGLES {
        if triangle_area2(corners[a], corners[b], corners[c]).abs() <= tolerance {
            return Err(GalleriaError::DegenerateGeometry(format!(
                "{role} corners {a}, {b} and {c} are collinear or coincident"
            )));
        }
    }
    Ok(())
}

/// Squared diagonal of the axis-aligned bounding box.
fn squared_extent(corners: &[Point; 4]) -> f64 {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in corners {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).powi(2) + (max_y - min_y).powi(2)
}

/// Matrix sending the homogeneous unit points to the corners of `quad`.
fn basis_to_points(quad: &Quad) -> Mat3 {
    let [p0, p1, p2, p3] = *quad.corners();
    let m = [p0.x, p1.x, p2.x, p0.y, p1.y, p2.y, 1.0, 1.0, 1.0];
    // Barycentric weights of the fourth corner. Dividing by the determinant
    // (non-zero once `check_spans_plane` passed) keeps the entries at pixel
    // magnitude, so integer corners compose without rounding.
    let det = determinant(&m);
    let w = mul_vec(&adjugate(&m), [p3.x, p3.y, 1.0]).map(|v| v / det);
    mul(&m, &[w[0], 0.0, 0.0, 0.0, w[1], 0.0, 0.0, 0.0, w[2]])
}

fn determinant(m: &Mat3) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6])
}

fn adjugate(m: &Mat3) -> Mat3 {
    [
        m[4] * m[8] - m[5] * m[7],
        m[2] * m[7] - m[1] * m[8],
        m[1] * m[5] - m[2] * m[4],
        m[5] * m[6] - m[3] * m[8],
        m[0] * m[8] - m[2] * m[6],
        m[2] * m[3] - m[0] * m[5],
        m[3] * m[7] - m[4] * m[6],
        m[1] * m[6] - m[0] * m[7],
        m[0] * m[4] - m[1] * m[3],
    ]
}

fn mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [0.0; 9];
    for row in 0..3 {
        for col in 0..3 {
            out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
        }
    }
    out
}

fn mul_vec(m: &Mat3, v: [f64; 3]) -> [f64; 3] {
    [
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2],
        m[3] * v[0] + m[4] * v[1] + m[5] * v[2],
        m[6] * v[0] + m[7] * v[1] + m[8] * v[2],
    ]
}

fn normalize(m: Mat3) -> Mat3 {
    let scale = m[8];
    if scale.abs() < f64::EPSILON {
        return m;
    }
    m.map(|v| v / scale)
}

/// Apply `m` to `(x, y, 1)` and divide out the homogeneous coordinate.
///
/// Points on the line at infinity come back non-finite.
fn project(m: &Mat3, x: f64, y: f64) -> (f64, f64) {
    let [u, v, w] = mul_vec(m, [x, y, 1.0]);
    (u / w, v / w)
}
