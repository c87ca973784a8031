// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/layout.rs - In-memory layouts of a corner-point grid.
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
 * # `layout` Module
 *
 * A corner-point grid is stored in one of two layouts:
 *
 * * [CompactLayout]: one pillar per grid node and four corner depths per
 *   node and layer boundary, one for each of the (up to) four cells meeting
 *   at that node. Shared corners are stored once per cell that uses them,
 *   but the arrays are indexed by node, which makes whole-grid loops cheap.
 * * [LegacyLayout]: pillars in I-fastest order and, for every cell column
 *   and layer boundary, that column's own four corner depths. This is the
 *   order most exchange formats use.
 *
 * Both implement [CornerSource], the read interface the geometry engine is
 * written against, and both convert into each other without changing any
 * cell corner.
 */

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Corner of a cell column, as seen from above.
pub const SW: usize = 0;
pub const SE: usize = 1;
pub const NW: usize = 2;
pub const NE: usize = 3;

/// Number of columns, rows and layers of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub ncol: usize,
    pub nrow: usize,
    pub nlay: usize,
}

impl Dimensions {
    pub const fn new(ncol: usize, nrow: usize, nlay: usize) -> Self {
        Self { ncol, nrow, nlay }
    }

    /// Total number of cells.
    pub const fn ntotal(&self) -> usize {
        self.ncol * self.nrow * self.nlay
    }

    /// Number of pillars (grid nodes in plan view).
    pub const fn npillars(&self) -> usize {
        (self.ncol + 1) * (self.nrow + 1)
    }

    /// Lengths of the compact `coordsv`, `zcornsv` and `actnumsv` arrays, or
    /// `None` when one of them does not fit in a `usize`. Decoders check
    /// header dimensions with this before allocating anything.
    pub fn checked_lens(&self) -> Option<[usize; 3]> {
        let npillars = self.ncol.checked_add(1)?.checked_mul(self.nrow.checked_add(1)?)?;
        let nodes = npillars.checked_mul(self.nlay.checked_add(1)?)?;
        let ntotal = self.ncol.checked_mul(self.nrow)?.checked_mul(self.nlay)?;
        Some([npillars.checked_mul(6)?, nodes.checked_mul(4)?, ntotal])
    }

    /// C-order index of cell `(i, j, k)` (0-based), the order used by every
    /// per-cell array the library hands out.
    #[inline]
    pub const fn cell_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.nrow + j) * self.nlay + k
    }

    /// Inverse of [Dimensions::cell_index].
    #[inline]
    pub const fn cell_ijk(&self, index: usize) -> (usize, usize, usize) {
        let k = index % self.nlay;
        let j = (index / self.nlay) % self.nrow;
        let i = index / (self.nlay * self.nrow);
        (i, j, k)
    }

    pub const fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.ncol && j < self.nrow && k < self.nlay
    }

    pub const fn as_tuple(&self) -> (usize, usize, usize) {
        (self.ncol, self.nrow, self.nlay)
    }
}

impl From<(usize, usize, usize)> for Dimensions {
    fn from((ncol, nrow, nlay): (usize, usize, usize)) -> Self {
        Self::new(ncol, nrow, nlay)
    }
}

/// Read access to the raw corner-point arrays, independent of layout.
///
/// Index arguments are 0-based. Callers must run [CornerSource::check_sizes]
/// before indexing; the accessors assume the arrays match the dimensions.
pub trait CornerSource: Sync {
    fn dimensions(&self) -> Dimensions;

    /// Fails with [GridError::IncorrectSize] when a backing array no longer
    /// matches the dimensions.
    fn check_sizes(&self) -> Result<()>;

    /// Pillar at node `(i, j)` as `[xtop, ytop, ztop, xbot, ybot, zbot]`.
    fn pillar(&self, i: usize, j: usize) -> [f64; 6];

    /// Depth of `corner` (one of [SW], [SE], [NW], [NE]) of cell column
    /// `(i, j)` at layer boundary `k` (0 is the top of the grid).
    fn corner_depth(&self, i: usize, j: usize, k: usize, corner: usize) -> f32;

    fn is_active(&self, i: usize, j: usize, k: usize) -> bool;

    /// The eight corner depths of cell `(i, j, k)`: top SW, SE, NW, NE then
    /// base SW, SE, NW, NE.
    fn cell_depths(&self, i: usize, j: usize, k: usize) -> [f64; 8] {
        let mut z = [0.0; 8];
        for c in 0..4 {
            z[c] = f64::from(self.corner_depth(i, j, k, c));
            z[c + 4] = f64::from(self.corner_depth(i, j, k + 1, c));
        }
        z
    }

    fn nactive(&self) -> usize {
        let d = self.dimensions();
        let mut n = 0;
        for i in 0..d.ncol {
            for j in 0..d.nrow {
                for k in 0..d.nlay {
                    if self.is_active(i, j, k) {
                        n += 1;
                    }
                }
            }
        }
        n
    }
}

fn check_len(array: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(GridError::IncorrectSize {
            array,
            expected,
            found,
        })
    }
}

/// Node holding `corner` of cell column `(i, j)`, and the sub-corner slot the
/// value occupies at that node.
#[inline]
const fn corner_node(i: usize, j: usize, corner: usize) -> (usize, usize, usize) {
    (i + (corner & 1), j + (corner >> 1), 3 - corner)
}

/// The shared-pillar layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactLayout {
    pub dimensions: Dimensions,
    /// Shape `(ncol+1, nrow+1, 6)`.
    pub coordsv: Vec<f64>,
    /// Shape `(ncol+1, nrow+1, nlay+1, 4)`.
    pub zcornsv: Vec<f32>,
    /// Shape `(ncol, nrow, nlay)`.
    pub actnumsv: Vec<i32>,
}

impl CompactLayout {
    /// A layout of the given size with every value zeroed and every cell
    /// active.
    pub fn zeroed(dimensions: Dimensions) -> Self {
        let np = dimensions.npillars();
        Self {
            dimensions,
            coordsv: vec![0.0; np * 6],
            zcornsv: vec![0.0; np * (dimensions.nlay + 1) * 4],
            actnumsv: vec![1; dimensions.ntotal()],
        }
    }

    #[inline]
    pub const fn coord_index(&self, i: usize, j: usize) -> usize {
        (i * (self.dimensions.nrow + 1) + j) * 6
    }

    #[inline]
    pub const fn zcorn_index(&self, i: usize, j: usize, k: usize, sub: usize) -> usize {
        ((i * (self.dimensions.nrow + 1) + j) * (self.dimensions.nlay + 1) + k) * 4 + sub
    }

    #[inline]
    pub const fn actnum_index(&self, i: usize, j: usize, k: usize) -> usize {
        self.dimensions.cell_index(i, j, k)
    }

    pub fn set_pillar(&mut self, i: usize, j: usize, pillar: [f64; 6]) {
        let n = self.coord_index(i, j);
        self.coordsv[n..n + 6].copy_from_slice(&pillar);
    }

    pub fn set_corner_depth(&mut self, i: usize, j: usize, k: usize, corner: usize, z: f32) {
        let (ni, nj, sub) = corner_node(i, j, corner);
        let n = self.zcorn_index(ni, nj, k, sub);
        self.zcornsv[n] = z;
    }

    /// Whether sub-corner `sub` of node `(ni, nj)` belongs to a cell inside
    /// the grid.
    fn sub_corner_in_grid(&self, ni: usize, nj: usize, sub: usize) -> bool {
        let corner = 3 - sub;
        let (di, dj) = (corner & 1, corner >> 1);
        ni >= di
            && nj >= dj
            && ni - di < self.dimensions.ncol
            && nj - dj < self.dimensions.nrow
    }

    /// Gives every sub-corner that belongs to no cell the value of a sub-corner
    /// that does, trying the east/west neighbour first, then north/south,
    /// then the diagonal one.
    ///
    /// Layouts built by this crate are always filled this way, which keeps
    /// compact -> legacy -> compact an exact round trip.
    pub fn fill_outer_subcorners(&mut self) {
        let d = self.dimensions;
        for ni in 0..=d.ncol {
            for nj in 0..=d.nrow {
                let present: [bool; 4] =
                    std::array::from_fn(|sub| self.sub_corner_in_grid(ni, nj, sub));
                if present.iter().all(|&p| p) || !present.iter().any(|&p| p) {
                    continue;
                }
                for sub in 0..4 {
                    if present[sub] {
                        continue;
                    }
                    let Some(from) = [sub ^ 1, sub ^ 2, sub ^ 3]
                        .into_iter()
                        .find(|&s| present[s])
                    else {
                        continue;
                    };
                    for k in 0..=d.nlay {
                        let src = self.zcorn_index(ni, nj, k, from);
                        let dst = self.zcorn_index(ni, nj, k, sub);
                        self.zcornsv[dst] = self.zcornsv[src];
                    }
                }
            }
        }
    }

    /// The same grid in the per-cell layout.
    pub fn to_legacy(&self) -> LegacyLayout {
        let d = self.dimensions;
        let mut legacy = LegacyLayout::zeroed(d);

        for j in 0..=d.nrow {
            for i in 0..=d.ncol {
                let src = self.coord_index(i, j);
                let dst = legacy.coord_index(i, j);
                legacy.coordsv[dst..dst + 6].copy_from_slice(&self.coordsv[src..src + 6]);
            }
        }

        for k in 0..=d.nlay {
            for j in 0..d.nrow {
                for i in 0..d.ncol {
                    for corner in 0..4 {
                        let dst = legacy.zcorn_index(i, j, k, corner);
                        legacy.zcornsv[dst] = self.corner_depth(i, j, k, corner);
                    }
                }
            }
        }

        for k in 0..d.nlay {
            for j in 0..d.nrow {
                for i in 0..d.ncol {
                    let dst = legacy.actnum_index(i, j, k);
                    legacy.actnumsv[dst] = self.actnumsv[self.actnum_index(i, j, k)];
                }
            }
        }

        legacy
    }
}

impl CornerSource for CompactLayout {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn check_sizes(&self) -> Result<()> {
        let d = self.dimensions;
        check_len("coordsv", d.npillars() * 6, self.coordsv.len())?;
        check_len(
            "zcornsv",
            d.npillars() * (d.nlay + 1) * 4,
            self.zcornsv.len(),
        )?;
        check_len("actnumsv", d.ntotal(), self.actnumsv.len())
    }

    #[inline]
    fn pillar(&self, i: usize, j: usize) -> [f64; 6] {
        let n = self.coord_index(i, j);
        let mut p = [0.0; 6];
        p.copy_from_slice(&self.coordsv[n..n + 6]);
        p
    }

    #[inline]
    fn corner_depth(&self, i: usize, j: usize, k: usize, corner: usize) -> f32 {
        let (ni, nj, sub) = corner_node(i, j, corner);
        self.zcornsv[self.zcorn_index(ni, nj, k, sub)]
    }

    #[inline]
    fn is_active(&self, i: usize, j: usize, k: usize) -> bool {
        self.actnumsv[self.actnum_index(i, j, k)] != 0
    }

    fn nactive(&self) -> usize {
        self.actnumsv.iter().filter(|&&a| a != 0).count()
    }
}

/// The per-cell layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyLayout {
    pub dimensions: Dimensions,
    /// `(ncol+1) * (nrow+1)` pillars of 6 values, I fastest.
    pub coordsv: Vec<f64>,
    /// `(nlay+1) * nrow * ncol` cell columns of 4 depths, I fastest.
    pub zcornsv: Vec<f32>,
    /// `nlay * nrow * ncol` flags, I fastest.
    pub actnumsv: Vec<i32>,
}

impl LegacyLayout {
    pub fn zeroed(dimensions: Dimensions) -> Self {
        let d = dimensions;
        Self {
            dimensions,
            coordsv: vec![0.0; d.npillars() * 6],
            zcornsv: vec![0.0; d.ncol * d.nrow * (d.nlay + 1) * 4],
            actnumsv: vec![1; d.ntotal()],
        }
    }

    #[inline]
    pub const fn coord_index(&self, i: usize, j: usize) -> usize {
        (j * (self.dimensions.ncol + 1) + i) * 6
    }

    #[inline]
    pub const fn zcorn_index(&self, i: usize, j: usize, k: usize, corner: usize) -> usize {
        ((k * self.dimensions.nrow + j) * self.dimensions.ncol + i) * 4 + corner
    }

    #[inline]
    pub const fn actnum_index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.dimensions.nrow + j) * self.dimensions.ncol + i
    }

    /// The same grid in the shared-pillar layout.
    pub fn to_compact(&self) -> CompactLayout {
        let d = self.dimensions;
        let mut compact = CompactLayout::zeroed(d);

        for i in 0..=d.ncol {
            for j in 0..=d.nrow {
                compact.set_pillar(i, j, self.pillar(i, j));
            }
        }

        for i in 0..d.ncol {
            for j in 0..d.nrow {
                for k in 0..=d.nlay {
                    for corner in 0..4 {
                        compact.set_corner_depth(i, j, k, corner, self.corner_depth(i, j, k, corner));
                    }
                }
                for k in 0..d.nlay {
                    let n = compact.actnum_index(i, j, k);
                    compact.actnumsv[n] = self.actnumsv[self.actnum_index(i, j, k)];
                }
            }
        }

        compact.fill_outer_subcorners();
        compact
    }
}

impl CornerSource for LegacyLayout {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn check_sizes(&self) -> Result<()> {
        let d = self.dimensions;
        check_len("coordsv", d.npillars() * 6, self.coordsv.len())?;
        check_len(
            "zcornsv",
            d.ncol * d.nrow * (d.nlay + 1) * 4,
            self.zcornsv.len(),
        )?;
        check_len("actnumsv", d.ntotal(), self.actnumsv.len())
    }

    #[inline]
    fn pillar(&self, i: usize, j: usize) -> [f64; 6] {
        let n = self.coord_index(i, j);
        let mut p = [0.0; 6];
        p.copy_from_slice(&self.coordsv[n..n + 6]);
        p
    }

    #[inline]
    fn corner_depth(&self, i: usize, j: usize, k: usize, corner: usize) -> f32 {
        self.zcornsv[self.zcorn_index(i, j, k, corner)]
    }

    #[inline]
    fn is_active(&self, i: usize, j: usize, k: usize) -> bool {
        self.actnumsv[self.actnum_index(i, j, k)] != 0
    }

    fn nactive(&self) -> usize {
        self.actnumsv.iter().filter(|&&a| a != 0).count()
    }
}

/// Which of the two layouts is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    Legacy,
    Compact,
}

/// Exactly one active layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Legacy(LegacyLayout),
    Compact(CompactLayout),
}

impl Layout {
    pub fn kind(&self) -> LayoutKind {
        match self {
            Layout::Legacy(_) => LayoutKind::Legacy,
            Layout::Compact(_) => LayoutKind::Compact,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.source().dimensions()
    }

    /// The layout behind its read interface.
    pub fn source(&self) -> &dyn CornerSource {
        match self {
            Layout::Legacy(l) => l,
            Layout::Compact(c) => c,
        }
    }

    pub fn to_compact(&self) -> CompactLayout {
        match self {
            Layout::Legacy(l) => l.to_compact(),
            Layout::Compact(c) => c.clone(),
        }
    }

    pub fn to_legacy(&self) -> LegacyLayout {
        match self {
            Layout::Legacy(l) => l.clone(),
            Layout::Compact(c) => c.to_legacy(),
        }
    }

    pub(crate) fn set_active(&mut self, i: usize, j: usize, k: usize, active: bool) {
        let flag = i32::from(active);
        match self {
            Layout::Legacy(l) => {
                let n = l.actnum_index(i, j, k);
                l.actnumsv[n] = flag;
            }
            Layout::Compact(c) => {
                let n = c.actnum_index(i, j, k);
                c.actnumsv[n] = flag;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small grid with a vertical throw between columns 0 and 1 and
    /// slanted pillars, built through the legacy layout so every cell column
    /// owns its corners.
    pub(crate) fn faulted_legacy() -> LegacyLayout {
        let d = Dimensions::new(3, 2, 2);
        let mut l = LegacyLayout::zeroed(d);
        for j in 0..=d.nrow {
            for i in 0..=d.ncol {
                let x = i as f64 * 50.0;
                let y = j as f64 * 40.0;
                let n = l.coord_index(i, j);
                l.coordsv[n..n + 6].copy_from_slice(&[x, y, 1000.0, x + 5.0, y - 3.0, 1100.0]);
            }
        }
        for k in 0..=d.nlay {
            for j in 0..d.nrow {
                for i in 0..d.ncol {
                    let throw = if i == 0 { 0.0 } else { 7.5 };
                    for c in 0..4 {
                        let n = l.zcorn_index(i, j, k, c);
                        l.zcornsv[n] =
                            (1010.0 + 10.0 * k as f64 + throw + 0.25 * (c + j) as f64) as f32;
                    }
                }
            }
        }
        let n = l.actnum_index(1, 1, 0);
        l.actnumsv[n] = 0;
        l
    }

    #[test]
    fn test_cell_index_round_trip() {
        let d = Dimensions::new(4, 3, 5);
        for n in 0..d.ntotal() {
            let (i, j, k) = d.cell_ijk(n);
            assert!(d.contains(i, j, k));
            assert_eq!(d.cell_index(i, j, k), n);
        }
    }

    #[test]
    fn test_checked_lens() {
        let d = Dimensions::new(4, 3, 5);
        let compact = CompactLayout::zeroed(d);
        assert_eq!(
            d.checked_lens(),
            Some([compact.coordsv.len(), compact.zcornsv.len(), compact.actnumsv.len()])
        );
        assert_eq!(Dimensions::new(usize::MAX, 1, 1).checked_lens(), None);
        assert_eq!(Dimensions::new(1 << 31, 1 << 31, 1 << 31).checked_lens(), None);
    }

    #[test]
    fn test_legacy_compact_legacy_is_identity() {
        let legacy = faulted_legacy();
        let compact = legacy.to_compact();
        compact.check_sizes().unwrap();
        assert_eq!(compact.to_legacy(), legacy);
    }

    #[test]
    fn test_compact_legacy_compact_is_identity() {
        let compact = faulted_legacy().to_compact();
        let again = compact.to_legacy().to_compact();
        assert_eq!(again, compact);
    }

    #[test]
    fn test_conversion_preserves_cell_depths() {
        let legacy = faulted_legacy();
        let compact = legacy.to_compact();
        let d = legacy.dimensions;
        for i in 0..d.ncol {
            for j in 0..d.nrow {
                for k in 0..d.nlay {
                    assert_eq!(legacy.cell_depths(i, j, k), compact.cell_depths(i, j, k));
                    assert_eq!(legacy.is_active(i, j, k), compact.is_active(i, j, k));
                }
            }
        }
        for i in 0..=d.ncol {
            for j in 0..=d.nrow {
                assert_eq!(legacy.pillar(i, j), compact.pillar(i, j));
            }
        }
        assert_eq!(legacy.nactive(), 11);
        assert_eq!(compact.nactive(), 11);
    }

    #[test]
    fn test_outer_subcorners_copy_from_neighbours() {
        let compact = faulted_legacy().to_compact();
        // Node (0, 0) only touches cell (0, 0), whose SW corner sits in slot NE.
        for k in 0..=compact.dimensions.nlay {
            let ne = compact.zcornsv[compact.zcorn_index(0, 0, k, 3)];
            for sub in 0..3 {
                assert_eq!(compact.zcornsv[compact.zcorn_index(0, 0, k, sub)], ne);
            }
        }
    }

    #[test]
    fn test_check_sizes_names_the_array() {
        let mut compact = faulted_legacy().to_compact();
        compact.zcornsv.clear();
        match compact.check_sizes() {
            Err(GridError::IncorrectSize { array, .. }) => assert_eq!(array, "zcornsv"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
