// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/column.rs - Per-column and per-layer lookups.
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
 * # `column` Module
 *
 * Lookups used when sampling surfaces from a grid: the depth of a named
 * horizon in a cell column, the layer a depth falls in, and the horizontal
 * footprint of cells and layers. Cell columns and layers are 1-based here,
 * like every other user-facing cell reference.
 */

use super::{cell_corners, zero_based, TOP_OUTLINE};
use crate::error::{GridError, Result};
use crate::layout::CornerSource;
use crate::subgrids::Subgrids;

/// A surface through the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Horizon<'a> {
    /// Top boundary of a 1-based layer.
    LayerTop(usize),
    /// Base boundary of a 1-based layer.
    LayerBase(usize),
    /// Top of the first layer of the named subgrid.
    SubgridTop(&'a str),
    /// Base of the last layer of the named subgrid.
    SubgridBase(&'a str),
}

/// Mean of the four corner depths of column `(i, j)` at boundary `k`,
/// all 0-based.
fn boundary_depth(src: &dyn CornerSource, i: usize, j: usize, k: usize) -> f64 {
    (0..4).map(|c| f64::from(src.corner_depth(i, j, k, c))).sum::<f64>() / 4.0
}

fn check_column(src: &dyn CornerSource, i: usize, j: usize) -> Result<(usize, usize)> {
    src.check_sizes()?;
    if src.dimensions().nlay == 0 {
        return Err(GridError::invalid("grid has no layers"));
    }
    let (i, j, _) = zero_based(src.dimensions(), (i, j, 1))?;
    Ok((i, j))
}

/// Depth of `horizon` at the centre of the 1-based cell column `(i, j)`.
pub fn horizon_depth(
    src: &dyn CornerSource,
    subgrids: Option<&Subgrids>,
    i: usize,
    j: usize,
    horizon: Horizon,
) -> Result<f64> {
    let (i, j) = check_column(src, i, j)?;
    let nlay = src.dimensions().nlay;
    let subgrid = |name: &str| {
        subgrids
            .and_then(|s| s.get(name))
            .ok_or_else(|| GridError::invalid(format!("no subgrid named {name:?}")))
    };
    let boundary = match horizon {
        Horizon::LayerTop(k) => k.checked_sub(1),
        Horizon::LayerBase(k) => (k >= 1).then_some(k),
        Horizon::SubgridTop(name) => Some(subgrid(name)?.first_layer() - 1),
        Horizon::SubgridBase(name) => Some(subgrid(name)?.last_layer()),
    }
    .filter(|&k| k <= nlay)
    .ok_or_else(|| GridError::invalid(format!("{horizon:?} is outside a grid of {nlay} layers")))?;
    Ok(boundary_depth(src, i, j, boundary))
}

/// The 1-based layer of column `(i, j)` containing `depth`, measured at the
/// column centre. A depth on a boundary belongs to the layer below it, except
/// at the base of the grid. With `activeonly`, inactive cells contain nothing.
pub fn locate_layer(src: &dyn CornerSource, i: usize, j: usize, depth: f64, activeonly: bool) -> Result<Option<usize>> {
    let (i, j) = check_column(src, i, j)?;
    let nlay = src.dimensions().nlay;
    let mut top = boundary_depth(src, i, j, 0);
    for k in 0..nlay {
        let base = boundary_depth(src, i, j, k + 1);
        let inside = depth >= top && (depth < base || (k + 1 == nlay && depth <= base));
        if inside && (!activeonly || src.is_active(i, j, k)) {
            return Ok(Some(k + 1));
        }
        top = base;
    }
    Ok(None)
}

/// Horizontal bounding box `(xmin, xmax, ymin, ymax)` of 1-based cell
/// `(i, j, k)`.
pub fn cell_horizontal_bounds(src: &dyn CornerSource, i: usize, j: usize, k: usize) -> Result<(f64, f64, f64, f64)> {
    src.check_sizes()?;
    let (i, j, k) = zero_based(src.dimensions(), (i, j, k))?;
    let corners = cell_corners(src, i, j, k)?;
    Ok(corners.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    ))
}

/// Closed outline of one cell face: SW, SE, NE, NW and SW again.
pub type Outline = [[f64; 2]; 5];

/// Outlines of the top (or base) faces of every cell in 1-based `layer`,
/// together with the 0-based cell indices they belong to, in cell order.
pub fn layer_slice(src: &dyn CornerSource, layer: usize, top: bool, activeonly: bool) -> Result<(Vec<Outline>, Vec<usize>)> {
    src.check_sizes()?;
    let d = src.dimensions();
    if layer == 0 || layer > d.nlay {
        return Err(GridError::invalid(format!(
            "layer {layer} is outside a grid of {} layers",
            d.nlay
        )));
    }
    let k = layer - 1;
    let offset = if top { 0 } else { 4 };
    let mut outlines = Vec::new();
    let mut indices = Vec::new();
    for i in 0..d.ncol {
        for j in 0..d.nrow {
            if activeonly && !src.is_active(i, j, k) {
                continue;
            }
            let corners = cell_corners(src, i, j, k)?;
            outlines.push(TOP_OUTLINE.map(|c| {
                let p = corners[c + offset];
                [p.x, p.y]
            }));
            indices.push(d.cell_index(i, j, k));
        }
    }
    Ok((outlines, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::faulted_legacy;

    #[test]
    fn test_horizons() {
        let l = faulted_legacy();
        // Column (1, 1) is unfaulted, corner depths 1010.0 .. 1010.75.
        assert_eq!(horizon_depth(&l, None, 1, 1, Horizon::LayerTop(1)).unwrap(), 1010.375);
        assert_eq!(horizon_depth(&l, None, 1, 1, Horizon::LayerBase(2)).unwrap(), 1030.375);
        assert!(horizon_depth(&l, None, 1, 1, Horizon::LayerBase(3)).is_err());
        assert!(horizon_depth(&l, None, 1, 1, Horizon::SubgridTop("upper")).is_err());

        let s = Subgrids::from_counts(&[("upper", 1), ("lower", 1)]).unwrap();
        assert_eq!(
            horizon_depth(&l, Some(&s), 2, 1, Horizon::SubgridBase("upper")).unwrap(),
            1027.875
        );
    }

    #[test]
    fn test_locate_layer() {
        let l = faulted_legacy();
        assert_eq!(locate_layer(&l, 1, 1, 1000.0, false).unwrap(), None);
        assert_eq!(locate_layer(&l, 1, 1, 1010.375, false).unwrap(), Some(1));
        assert_eq!(locate_layer(&l, 1, 1, 1025.0, false).unwrap(), Some(2));
        assert_eq!(locate_layer(&l, 1, 1, 1030.375, false).unwrap(), Some(2));
        assert_eq!(locate_layer(&l, 1, 1, 1031.0, false).unwrap(), None);
        // Cell (2, 2, 1) is inactive.
        assert_eq!(locate_layer(&l, 2, 2, 1020.0, false).unwrap(), Some(1));
        assert_eq!(locate_layer(&l, 2, 2, 1020.0, true).unwrap(), None);
    }

    #[test]
    fn test_layer_slice_outlines() {
        let l = faulted_legacy();
        let (outlines, indices) = layer_slice(&l, 1, true, true).unwrap();
        assert_eq!(outlines.len(), 5);
        assert_eq!(indices, vec![0, 2, 4, 8, 10]);
        for o in &outlines {
            assert_eq!(o[0], o[4]);
        }
        let (all, _) = layer_slice(&l, 2, false, false).unwrap();
        assert_eq!(all.len(), 6);
        assert!(layer_slice(&l, 3, true, false).is_err());
    }

    #[test]
    fn test_cell_bounds() {
        let l = faulted_legacy();
        let (x0, x1, y0, y1) = cell_horizontal_bounds(&l, 1, 1, 1).unwrap();
        assert!(x0 >= 0.0 && x1 <= 55.0 && x0 < x1);
        assert!(y0 >= -3.0 && y1 <= 40.0 && y0 < y1);
        assert!(cell_horizontal_bounds(&l, 4, 1, 1).is_err());
    }
}
