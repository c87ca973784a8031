// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/common/mod.rs - Shared grid fixtures for the integration tests.
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

#![allow(dead_code)]

use cpgrid::{BoxSpec, CornerSource, Dimensions, Grid, Layout, Subgrids};

/// Vertical throw of the eastern fault block.
pub const THROW: f32 = 7.5;

/// The default 4x3x5 box, rotated 30 degrees, with the columns east of
/// `i = 2` thrown down, cell (2, 2, 3) (1-based) inactive and two subgrids.
pub fn faulted_grid() -> Grid {
    let mut grid = Grid::from_box(&BoxSpec {
        rotation: 30.0,
        ..BoxSpec::default()
    })
    .unwrap();
    let Layout::Compact(layout) = grid.layout_mut() else {
        panic!("box grids are compact");
    };
    let d = layout.dimensions;
    for i in 2..d.ncol {
        for j in 0..d.nrow {
            for k in 0..=d.nlay {
                for corner in 0..4 {
                    let z = layout.corner_depth(i, j, k, corner);
                    layout.set_corner_depth(i, j, k, corner, z + THROW);
                }
            }
        }
    }
    layout.fill_outer_subcorners();
    let n = layout.actnum_index(1, 1, 2);
    layout.actnumsv[n] = 0;

    grid.set_subgrids(Some(Subgrids::from_counts(&[("upper", 2), ("lower", 3)]).unwrap()))
        .unwrap();
    grid
}

/// A box with origin (0, 0, 0) and unit increments.
pub fn unit_box(ncol: usize, nrow: usize, nlay: usize) -> Grid {
    Grid::from_box(&BoxSpec {
        dimension: Dimensions::new(ncol, nrow, nlay),
        origin: [0.0; 3],
        increment: [1.0; 3],
        ..BoxSpec::default()
    })
    .unwrap()
}
