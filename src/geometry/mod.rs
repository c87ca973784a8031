// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/mod.rs - Geometry engine for corner-point grids.
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
 * # `geometry` Module
 *
 * Everything here is a pure function of a [CornerSource]: the engine never
 * caches, and never cares which layout it is reading. Whole-grid queries
 * check the backing array sizes once and then evaluate every cell
 * independently in parallel.
 *
 * Cell corners are numbered so that bit 0 is east, bit 1 is north and bit 2
 * is the base of the cell:
 *
 * ```text
 *   top:  2 --- 3      base:  6 --- 7
 *         |     |             |     |
 *         0 --- 1             4 --- 5
 * ```
 */

pub mod column;
pub mod design;
pub mod geometrics;
pub mod metrics;
pub mod quality;
pub mod volume;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::error::{GridError, Result};
use crate::layout::{CornerSource, Dimensions};
use crate::property::GridProperty;

pub type Point = Vector3<f64>;

/// The eight corners of a cell, see the module documentation for the order.
pub type Corners = [Point; 8];

/// Pillars shorter than this (in depth units) cannot be interpolated along.
pub const NEAR_ZERO_HEIGHT: f64 = 1e-9;

/// The point at depth `z` on the line through a pillar's two endpoints.
fn point_on_pillar(pillar: &[f64; 6], z: f64) -> Option<Point> {
    let height = pillar[5] - pillar[2];
    if height.abs() < NEAR_ZERO_HEIGHT {
        return None;
    }
    let t = (z - pillar[2]) / height;
    Some(Point::new(
        pillar[0] + (pillar[3] - pillar[0]) * t,
        pillar[1] + (pillar[4] - pillar[1]) * t,
        z,
    ))
}

/// Corners of 0-based cell `(i, j, k)`. Sizes must already be checked.
pub fn cell_corners(src: &dyn CornerSource, i: usize, j: usize, k: usize) -> Result<Corners> {
    let z = src.cell_depths(i, j, k);
    let mut corners = [Point::zeros(); 8];
    for c in 0..4 {
        let pillar = src.pillar(i + (c & 1), j + (c >> 1));
        for slot in [c, c + 4] {
            corners[slot] = point_on_pillar(&pillar, z[slot]).ok_or(GridError::NearZeroHeight {
                i: i + 1,
                j: j + 1,
                k: k + 1,
            })?;
        }
    }
    Ok(corners)
}

/// Flattens corners into the `[x0, y0, z0, x1, ...]` form.
pub fn flatten_corners(corners: &Corners) -> [f64; 24] {
    let mut flat = [0.0; 24];
    for (n, p) in corners.iter().enumerate() {
        flat[3 * n..3 * n + 3].copy_from_slice(&[p.x, p.y, p.z]);
    }
    flat
}

/// Mean of the eight corners.
pub fn cell_center(corners: &Corners) -> Point {
    corners.iter().fold(Point::zeros(), |acc, p| acc + p) / 8.0
}

/// Corner sequence tracing the top face outline, closed.
pub(crate) const TOP_OUTLINE: [usize; 5] = [0, 1, 3, 2, 0];

/// Grid direction along which a cell is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
    K,
}

impl Axis {
    /// The four cell edges parallel to the axis, as corner pairs.
    pub const fn edges(&self) -> [(usize, usize); 4] {
        match self {
            Axis::I => [(0, 1), (2, 3), (4, 5), (6, 7)],
            Axis::J => [(0, 2), (1, 3), (4, 6), (5, 7)],
            Axis::K => [(0, 4), (1, 5), (2, 6), (3, 7)],
        }
    }
}

/// Evaluates `f` on the corners of every cell, in parallel.
///
/// With `asmasked`, inactive cells are masked and never evaluated, so broken
/// geometry in inactive cells does not fail the query.
pub(crate) fn map_cells<T, F>(
    src: &dyn CornerSource,
    asmasked: bool,
    fill: T,
    f: F,
) -> Result<(Vec<T>, Vec<bool>)>
where
    T: Copy + Send + Sync,
    F: Fn(&Corners) -> T + Sync + Send,
{
    src.check_sizes()?;
    let d = src.dimensions();
    let evaluated = (0..d.ntotal())
        .into_par_iter()
        .map(|n| {
            let (i, j, k) = d.cell_ijk(n);
            if asmasked && !src.is_active(i, j, k) {
                return Ok((fill, true));
            }
            let corners = cell_corners(src, i, j, k)?;
            Ok((f(&corners), false))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(evaluated.into_iter().unzip())
}

/// Like [map_cells], packaged as a named property.
pub(crate) fn cell_property<F>(
    src: &dyn CornerSource,
    name: &str,
    asmasked: bool,
    f: F,
) -> Result<GridProperty<f64>>
where
    F: Fn(&Corners) -> f64 + Sync + Send,
{
    let (values, mask) = map_cells(src, asmasked, 0.0, f)?;
    GridProperty::new(name, src.dimensions(), values, mask)
}

/// Validates a 1-based cell reference and returns it 0-based.
pub(crate) fn zero_based(dimensions: Dimensions, ijk: (usize, usize, usize)) -> Result<(usize, usize, usize)> {
    let (i, j, k) = ijk;
    if i == 0 || j == 0 || k == 0 || !dimensions.contains(i - 1, j - 1, k - 1) {
        return Err(GridError::invalid(format!(
            "cell ({i}, {j}, {k}) is outside a {}x{}x{} grid",
            dimensions.ncol, dimensions.nrow, dimensions.nlay
        )));
    }
    Ok((i - 1, j - 1, k - 1))
}

/// Corners of 1-based cell `ijk` (cell (1, 1, 1) when `None`) as 24 values.
pub fn xyz_cell_corners(
    src: &dyn CornerSource,
    ijk: Option<(usize, usize, usize)>,
    activeonly: bool,
) -> Result<[f64; 24]> {
    src.check_sizes()?;
    let (i, j, k) = zero_based(src.dimensions(), ijk.unwrap_or((1, 1, 1)))?;
    if activeonly && !src.is_active(i, j, k) {
        return Err(GridError::InactiveCell {
            i: i + 1,
            j: j + 1,
            k: k + 1,
        });
    }
    Ok(flatten_corners(&cell_corners(src, i, j, k)?))
}

/// Every corner coordinate of every cell, as 24 properties named after the
/// coordinate and corner number (`X_UTME_0` ... `Z_TVDSS_7`).
pub fn xyz_corners(src: &dyn CornerSource, asmasked: bool) -> Result<Vec<GridProperty<f64>>> {
    let (flat, mask) = map_cells(src, asmasked, [0.0; 24], flatten_corners)?;
    let d = src.dimensions();
    let axes = ["X_UTME", "Y_UTMN", "Z_TVDSS"];
    (0..24)
        .map(|n| {
            let values = flat.iter().map(|c| c[n]).collect();
            GridProperty::new(format!("{}_{}", axes[n % 3], n / 3), d, values, mask.clone())
        })
        .collect()
}
