// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/quality.rs - Per-cell grid quality indicators.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `quality` Module
 *
 * Angles are in degrees, flags are 0 or 1. Inactive cells are masked.
 */

use super::{map_cells, Corners, Point};
use crate::error::Result;
use crate::layout::CornerSource;
use crate::property::{GridProperty, PropertySet};

/// Property names, in the order [grid_quality] returns them.
pub const QUALITY_NAMES: [&str; 9] = [
    "minangle_topbase",
    "maxangle_topbase",
    "minangle_topbase_proj",
    "maxangle_topbase_proj",
    "minangle_sides",
    "maxangle_sides",
    "collapsed",
    "negative_thickness",
    "concave_proj",
];

/// Faces as cyclic corner sequences.
const TOP: [usize; 4] = [0, 1, 3, 2];
const BASE: [usize; 4] = [4, 5, 7, 6];
const SIDES: [[usize; 4]; 4] = [[0, 1, 5, 4], [1, 3, 7, 5], [3, 2, 6, 7], [2, 0, 4, 6]];

/// Pillar corners thinner than this count as collapsed.
const COLLAPSE_TOLERANCE: f64 = 1e-6;

fn angle_between(u: &Point, v: &Point) -> Option<f64> {
    let norms = u.norm() * v.norm();
    if norms == 0.0 {
        return None;
    }
    Some((u.dot(v) / norms).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Interior angles of a quadrilateral; degenerate vertices are skipped.
fn face_angles(points: [Point; 4]) -> impl Iterator<Item = f64> {
    (0..4).filter_map(move |n| {
        let p = points[n];
        angle_between(&(points[(n + 3) % 4] - p), &(points[(n + 1) % 4] - p))
    })
}

fn face(c: &Corners, order: [usize; 4], project: bool) -> [Point; 4] {
    order.map(|n| {
        let p = c[n];
        if project { Point::new(p.x, p.y, 0.0) } else { p }
    })
}

fn min_max(angles: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = angles.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| (lo.min(a), hi.max(a)));
    if lo > hi { (0.0, 0.0) } else { (lo, hi) }
}

/// A planar quadrilateral is convex when the turn at every vertex has the
/// same sign.
fn is_concave_xy(points: [Point; 4]) -> bool {
    let mut positive = false;
    let mut negative = false;
    for n in 0..4 {
        let a = points[(n + 3) % 4];
        let b = points[n];
        let c = points[(n + 1) % 4];
        let turn = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        positive |= turn > 0.0;
        negative |= turn < 0.0;
    }
    positive && negative
}

/// All quality indicators of one cell, in [QUALITY_NAMES] order.
pub fn cell_quality(c: &Corners) -> [f64; 9] {
    let topbase = |project| min_max(face_angles(face(c, TOP, project)).chain(face_angles(face(c, BASE, project))));
    let (min_tb, max_tb) = topbase(false);
    let (min_tbp, max_tbp) = topbase(true);
    let (min_sides, max_sides) = min_max(SIDES.iter().flat_map(|&s| face_angles(face(c, s, false))));

    let thickness = (0..4).map(|n| c[n + 4].z - c[n].z);
    let collapsed = thickness.clone().any(|t| t.abs() < COLLAPSE_TOLERANCE);
    // Depth grows downwards: the base must lie strictly below the top.
    let negative = thickness.clone().any(|t| t <= 0.0);
    let concave = is_concave_xy(face(c, TOP, true)) || is_concave_xy(face(c, BASE, true));

    [
        min_tb,
        max_tb,
        min_tbp,
        max_tbp,
        min_sides,
        max_sides,
        f64::from(u8::from(collapsed)),
        f64::from(u8::from(negative)),
        f64::from(u8::from(concave)),
    ]
}

pub fn grid_quality(src: &dyn CornerSource) -> Result<PropertySet> {
    let (values, mask) = map_cells(src, true, [0.0; 9], cell_quality)?;
    let d = src.dimensions();
    let props = QUALITY_NAMES
        .iter()
        .enumerate()
        .map(|(n, name)| {
            let column = values.iter().map(|v| v[n]).collect();
            GridProperty::new(*name, d, column, mask.clone())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PropertySet::new(props))
}
