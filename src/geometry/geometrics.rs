// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/geometrics.rs - Cell positions and whole-grid summaries.
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

use serde::{Deserialize, Serialize};

use super::metrics::{cell_size, Metric};
use super::{cell_center, cell_corners, map_cells, Axis, Corners, Point};
use crate::error::{GridError, Result};
use crate::layout::CornerSource;
use crate::property::{DiscreteProperty, GridProperty};

/// Cell centres as `X_UTME`, `Y_UTMN` and `Z_TVDSS`.
pub fn xyz(src: &dyn CornerSource, asmasked: bool) -> Result<[GridProperty<f64>; 3]> {
    let (centers, mask) = map_cells(src, asmasked, Point::zeros(), cell_center)?;
    let d = src.dimensions();
    let axis = |n: usize, name: &str| GridProperty::new(name, d, centers.iter().map(|p| p[n]).collect(), mask.clone());
    Ok([axis(0, "X_UTME")?, axis(1, "Y_UTMN")?, axis(2, "Z_TVDSS")?])
}

/// 1-based cell indices as `IX`, `JY` and `KZ`.
pub fn ijk(src: &dyn CornerSource, asmasked: bool) -> Result<[DiscreteProperty; 3]> {
    src.check_sizes()?;
    let d = src.dimensions();
    let cells = (0..d.ntotal()).map(|n| d.cell_ijk(n)).collect::<Vec<_>>();
    let mask = cells
        .iter()
        .map(|&(i, j, k)| asmasked && !src.is_active(i, j, k))
        .collect::<Vec<_>>();
    let field = |name: &str, pick: fn(&(usize, usize, usize)) -> usize| {
        let values = cells.iter().map(|c| (pick(c) + 1) as i32).collect();
        GridProperty::new(name, d, values, mask.clone())
    };
    Ok([
        field("IX", |c| c.0)?,
        field("JY", |c| c.1)?,
        field("KZ", |c| c.2)?,
    ])
}

/// Summary of a grid's placement and cell sizes, over active cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometrics {
    /// Centre (or top SW corner) of cell (1, 1, 1).
    pub xori: f64,
    pub yori: f64,
    pub zori: f64,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    /// Direction of the I axis in degrees, counter-clockwise from east.
    pub avg_rotation: f64,
    pub avg_dx: f64,
    pub avg_dy: f64,
    pub avg_dz: f64,
}

#[derive(Debug, Clone, Copy)]
struct CellSummary {
    lo: Point,
    hi: Point,
    east: Point,
    size: Point,
}

impl CellSummary {
    fn empty() -> Self {
        Self {
            lo: Point::zeros(),
            hi: Point::zeros(),
            east: Point::zeros(),
            size: Point::zeros(),
        }
    }

    fn of(c: &Corners, cellcenter: bool) -> Self {
        let (lo, hi) = if cellcenter {
            let center = cell_center(c);
            (center, center)
        } else {
            c.iter().fold(
                (Point::repeat(f64::INFINITY), Point::repeat(f64::NEG_INFINITY)),
                |(lo, hi), p| (lo.inf(p), hi.sup(p)),
            )
        };
        let east = (c[1] - c[0]) + (c[3] - c[2]);
        Self {
            lo,
            hi,
            east: Point::new(east.x, east.y, 0.0).try_normalize(0.0).unwrap_or_else(Point::zeros),
            size: Point::new(
                cell_size(c, Axis::I, Metric::Horizontal),
                cell_size(c, Axis::J, Metric::Horizontal),
                cell_size(c, Axis::K, Metric::ZProjection),
            ),
        }
    }
}

/// Placement and size summary. With `cellcenter`, extents and origin are
/// taken from cell centres, otherwise from cell corners.
pub fn geometrics(src: &dyn CornerSource, cellcenter: bool) -> Result<Geometrics> {
    let (cells, mask) = map_cells(src, true, CellSummary::empty(), |c| CellSummary::of(c, cellcenter))?;
    let active = cells
        .iter()
        .zip(&mask)
        .filter(|(_, masked)| !**masked)
        .map(|(c, _)| c)
        .collect::<Vec<_>>();
    if active.is_empty() {
        return Err(GridError::invalid("grid has no active cells"));
    }

    let first = cell_corners(src, 0, 0, 0)?;
    let origin = if cellcenter { cell_center(&first) } else { first[0] };
    let lo = active.iter().fold(Point::repeat(f64::INFINITY), |acc, c| acc.inf(&c.lo));
    let hi = active.iter().fold(Point::repeat(f64::NEG_INFINITY), |acc, c| acc.sup(&c.hi));
    let n = active.len() as f64;
    let east = active.iter().fold(Point::zeros(), |acc, c| acc + c.east);
    let size = active.iter().fold(Point::zeros(), |acc, c| acc + c.size) / n;

    Ok(Geometrics {
        xori: origin.x,
        yori: origin.y,
        zori: origin.z,
        xmin: lo.x,
        xmax: hi.x,
        ymin: lo.y,
        ymax: hi.y,
        zmin: lo.z,
        zmax: hi.z,
        avg_rotation: east.y.atan2(east.x).to_degrees().rem_euclid(360.0),
        avg_dx: size.x,
        avg_dy: size.y,
        avg_dz: size.z,
    })
}
