// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/volume.rs - Hexahedral cell bulk volume.
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

use super::{cell_property, Corners, Point};
use crate::error::Result;
use crate::layout::CornerSource;
use crate::property::GridProperty;

/// Six tetrahedra filling a hexahedron around the body diagonal 0-7. XOR-ing
/// every corner with 1 mirrors the set onto the diagonal 1-6.
const DIAGONAL_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

fn tetrahedron_volume(a: &Point, b: &Point, c: &Point, d: &Point) -> f64 {
    (b - a).cross(&(c - a)).dot(&(d - a)).abs() / 6.0
}

/// Mean of the two six-tetrahedron decompositions of the cell.
///
/// A single decomposition depends on which diagonal is chosen when faces are
/// not planar; averaging both makes the result symmetric.
pub fn hexahedron_volume(c: &Corners) -> f64 {
    let (mut first, mut second) = (0.0, 0.0);
    for [p, q, r, s] in DIAGONAL_TETRAHEDRA {
        first += tetrahedron_volume(&c[p], &c[q], &c[r], &c[s]);
        second += tetrahedron_volume(&c[p ^ 1], &c[q ^ 1], &c[r ^ 1], &c[s ^ 1]);
    }
    0.5 * (first + second)
}

pub fn bulk_volume(src: &dyn CornerSource, asmasked: bool) -> Result<GridProperty<f64>> {
    cell_property(src, "bulkvol", asmasked, hexahedron_volume)
}
