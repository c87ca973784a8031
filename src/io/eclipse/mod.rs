// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/eclipse/mod.rs - Eclipse GRDECL, binary GRDECL and EGRID grids.
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
 * # `eclipse` Module
 *
 * All three variants describe a grid with the same keywords:
 *
 * | Keyword    | Contents                                            |
 * |------------|-----------------------------------------------------|
 * | `SPECGRID` | `nx ny nz` (GRDECL and binary GRDECL)               |
 * | `GRIDHEAD` | grid type then `nx ny nz` (EGRID)                   |
 * | `COORD`    | 6 values per pillar, top then bottom, I fastest     |
 * | `ZCORN`    | 8 depths per cell, on a `2nx * 2ny * 2nz` lattice   |
 * | `ACTNUM`   | one flag per cell, I fastest; absent means active   |
 *
 * Unlike the in-memory layouts, `ZCORN` stores the top and the base of each
 * cell separately. On reading, a layer boundary takes the top of the cell
 * below it, and the base of the last layer closes the column.
 */

mod grdecl;
mod records;

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::layout::{Dimensions, LegacyLayout};

pub use records::{read_records, write_records};

/// Values of one keyword, typed as in the binary files.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Int(Vec<i32>),
    Real(Vec<f32>),
    Double(Vec<f64>),
    Logical(Vec<bool>),
    Char(Vec<String>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Int(v) => v.len(),
            Values::Real(v) => v.len(),
            Values::Double(v) => v.len(),
            Values::Logical(v) => v.len(),
            Values::Char(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Values::Int(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Values::Real(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Values::Double(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn to_f32(&self) -> Option<Vec<f32>> {
        match self {
            Values::Real(v) => Some(v.clone()),
            Values::Double(v) => Some(v.iter().map(|&x| x as f32).collect()),
            Values::Int(v) => Some(v.iter().map(|&x| x as f32).collect()),
            _ => None,
        }
    }

    fn to_i32(&self) -> Option<Vec<i32>> {
        match self {
            Values::Int(v) => Some(v.clone()),
            Values::Logical(v) => Some(v.iter().map(|&b| i32::from(b)).collect()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub values: Values,
}

impl Keyword {
    pub fn new(name: impl Into<String>, values: Values) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

fn find<'a>(keywords: &'a [Keyword], name: &str) -> Option<&'a Keyword> {
    keywords.iter().find(|k| k.name == name)
}

fn require<'a>(format: &'static str, keywords: &'a [Keyword], name: &str) -> Result<&'a Keyword> {
    find(keywords, name).ok_or_else(|| GridError::format(format, format!("missing {name}")))
}

fn wrong_type(format: &'static str, name: &str) -> GridError {
    GridError::format(format, format!("unexpected value type for {name}"))
}

fn expect_len(format: &'static str, name: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(GridError::format(
            format,
            format!("{name} holds {found} values, expected {expected}"),
        ));
    }
    Ok(())
}

/// Reads `nx ny nz` from `values[offset..]`.
fn dimensions_at(format: &'static str, keyword: &Keyword, offset: usize) -> Result<Dimensions> {
    let ints = keyword.values.to_i32().ok_or_else(|| wrong_type(format, &keyword.name))?;
    let dims = ints
        .get(offset..offset + 3)
        .ok_or_else(|| GridError::format(format, format!("{} is too short", keyword.name)))?;
    let size = |n: i32| {
        usize::try_from(n).map_err(|_| GridError::format(format, format!("negative dimension {n} in {}", keyword.name)))
    };
    Ok(Dimensions::new(size(dims[0])?, size(dims[1])?, size(dims[2])?))
}

/// Index of corner `(ii, jj, kk)` of cell `(i, j, k)` in `ZCORN`.
#[inline]
const fn zcorn_index(d: Dimensions, i: usize, j: usize, k: usize, corner: usize) -> usize {
    let (ii, jj, kk) = (corner & 1, (corner >> 1) & 1, corner >> 2);
    ((2 * k + kk) * 2 * d.nrow + (2 * j + jj)) * 2 * d.ncol + (2 * i + ii)
}

/// Expected lengths of `COORD`, `ZCORN` and `ACTNUM` for `d`.
fn keyword_lens(format: &'static str, d: Dimensions) -> Result<[usize; 3]> {
    d.checked_lens()
        .and_then(|[coord, _, ntotal]| Some([coord, ntotal.checked_mul(8)?, ntotal]))
        .ok_or_else(|| GridError::format(format, format!("grid of {}x{}x{} is too large", d.ncol, d.nrow, d.nlay)))
}

fn grid_from_keywords(format: &'static str, d: Dimensions, keywords: &[Keyword]) -> Result<Grid> {
    debug!("{format} grid of {}x{}x{}", d.ncol, d.nrow, d.nlay);
    let [ncoord, nzcorn, ntotal] = keyword_lens(format, d)?;

    let coord = require(format, keywords, "COORD")?;
    expect_len(format, "COORD", ncoord, coord.values.len())?;
    let coordsv = coord.values.to_f64().ok_or_else(|| wrong_type(format, "COORD"))?;

    let zcorn = require(format, keywords, "ZCORN")?;
    expect_len(format, "ZCORN", nzcorn, zcorn.values.len())?;
    let depths = zcorn.values.to_f32().ok_or_else(|| wrong_type(format, "ZCORN"))?;

    // Both lengths match the file, so the layout is no larger than the input.
    let mut layout = LegacyLayout::zeroed(d);
    layout.coordsv = coordsv;
    for k in (0..=d.nlay).filter(|_| d.nlay > 0) {
        // Boundary k is the top of cell k, or the base of the last cell.
        let (cell_k, base) = if k < d.nlay { (k, 0) } else { (k - 1, 4) };
        for j in 0..d.nrow {
            for i in 0..d.ncol {
                for corner in 0..4 {
                    let n = layout.zcorn_index(i, j, k, corner);
                    layout.zcornsv[n] = depths[zcorn_index(d, i, j, cell_k, corner + base)];
                }
            }
        }
    }

    if let Some(actnum) = find(keywords, "ACTNUM") {
        let flags = actnum.values.to_i32().ok_or_else(|| wrong_type(format, "ACTNUM"))?;
        expect_len(format, "ACTNUM", ntotal, flags.len())?;
        layout.actnumsv = flags.into_iter().map(|a| i32::from(a != 0)).collect();
    }

    Grid::from_compact(layout.to_compact())
}

/// The grid's `COORD`, `ZCORN` and `ACTNUM` keywords. Binary files store
/// `COORD` in single precision unless `double_coord` is set.
fn grid_keywords(grid: &Grid, double_coord: bool) -> Result<Vec<Keyword>> {
    let src = grid.layout().source();
    src.check_sizes()?;
    let d = src.dimensions();

    let mut coord = Vec::with_capacity(d.npillars() * 6);
    for j in 0..=d.nrow {
        for i in 0..=d.ncol {
            coord.extend_from_slice(&src.pillar(i, j));
        }
    }

    let mut zcorn = vec![0.0f32; 8 * d.ntotal()];
    let mut actnum = vec![0; d.ntotal()];
    for k in 0..d.nlay {
        for j in 0..d.nrow {
            for i in 0..d.ncol {
                for corner in 0..4 {
                    zcorn[zcorn_index(d, i, j, k, corner)] = src.corner_depth(i, j, k, corner);
                    zcorn[zcorn_index(d, i, j, k, corner + 4)] = src.corner_depth(i, j, k + 1, corner);
                }
                actnum[(k * d.nrow + j) * d.ncol + i] = i32::from(src.is_active(i, j, k));
            }
        }
    }

    let coord = if double_coord {
        Values::Double(coord)
    } else {
        Values::Real(coord.iter().map(|&v| v as f32).collect())
    };
    Ok(vec![
        Keyword::new("COORD", coord),
        Keyword::new("ZCORN", Values::Real(zcorn)),
        Keyword::new("ACTNUM", Values::Int(actnum)),
    ])
}

fn dims_i32(d: Dimensions) -> Result<[i32; 3]> {
    let int = |n: usize| i32::try_from(n).map_err(|_| GridError::invalid(format!("dimension {n} is too large")));
    Ok([int(d.ncol)?, int(d.nrow)?, int(d.nlay)?])
}

/// Decodes GRDECL text.
pub fn read_grdecl(bytes: &[u8]) -> Result<Grid> {
    let keywords = grdecl::parse(bytes)?;
    let d = dimensions_at("grdecl", require("grdecl", &keywords, "SPECGRID")?, 0)?;
    grid_from_keywords("grdecl", d, &keywords)
}

pub fn write_grdecl(grid: &Grid) -> Result<Vec<u8>> {
    let [nx, ny, nz] = dims_i32(grid.dimensions())?;
    let keywords = grid_keywords(grid, true)?;
    Ok(grdecl::serialize([nx, ny, nz], &keywords))
}

/// Decodes binary GRDECL, a bare sequence of records.
pub fn read_bgrdecl(bytes: &[u8]) -> Result<Grid> {
    let keywords = read_records(bytes)?;
    let d = dimensions_at("bgrdecl", require("bgrdecl", &keywords, "SPECGRID")?, 0)?;
    grid_from_keywords("bgrdecl", d, &keywords)
}

pub fn write_bgrdecl(grid: &Grid) -> Result<Vec<u8>> {
    let [nx, ny, nz] = dims_i32(grid.dimensions())?;
    let mut keywords = vec![Keyword::new("SPECGRID", Values::Int(vec![nx, ny, nz, 1, 0]))];
    keywords.extend(grid_keywords(grid, false)?);
    Ok(write_records(&keywords))
}

/// Decodes the main grid of an EGRID file; local grids after the first
/// `ENDGRID` are ignored.
pub fn read_egrid(bytes: &[u8]) -> Result<Grid> {
    let mut keywords = read_records(bytes)?;
    if let Some(end) = keywords.iter().position(|k| k.name == "ENDGRID") {
        keywords.truncate(end);
    }
    let d = dimensions_at("egrid", require("egrid", &keywords, "GRIDHEAD")?, 1)?;
    grid_from_keywords("egrid", d, &keywords)
}

pub fn write_egrid(grid: &Grid) -> Result<Vec<u8>> {
    let [nx, ny, nz] = dims_i32(grid.dimensions())?;
    let mut filehead = vec![0; 100];
    filehead[0] = 3;
    filehead[1] = 2007;
    let mut gridhead = vec![0; 100];
    gridhead[..4].copy_from_slice(&[1, nx, ny, nz]);
    gridhead[24] = 1;

    let mut keywords = vec![
        Keyword::new("FILEHEAD", Values::Int(filehead)),
        Keyword::new("GRIDHEAD", Values::Int(gridhead)),
    ];
    keywords.extend(grid_keywords(grid, false)?);
    keywords.push(Keyword::new("ENDGRID", Values::Int(Vec::new())));
    Ok(write_records(&keywords))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::grid::unit_box;

    fn faulted() -> Grid {
        Grid::from_legacy(crate::layout::tests::faulted_legacy()).unwrap()
    }

    fn assert_same_geometry(a: &Grid, b: &Grid) {
        let (a, b) = (a.layout().to_compact(), b.layout().to_compact());
        assert_eq!(a.dimensions, b.dimensions);
        assert_eq!(a.zcornsv, b.zcornsv);
        assert_eq!(a.actnumsv, b.actnumsv);
        for (x, y) in a.coordsv.iter().zip(&b.coordsv) {
            assert_relative_eq!(*x, *y, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_zcorn_lattice() {
        let d = Dimensions::new(2, 3, 4);
        assert_eq!(zcorn_index(d, 0, 0, 0, 0), 0);
        assert_eq!(zcorn_index(d, 0, 0, 0, 1), 1);
        assert_eq!(zcorn_index(d, 0, 0, 0, 2), 4);
        assert_eq!(zcorn_index(d, 0, 0, 0, 4), 24);
        assert_eq!(zcorn_index(d, 1, 2, 3, 7), 8 * d.ntotal() - 1);
    }

    #[test]
    fn test_egrid_round_trip() {
        let grid = faulted();
        let back = read_egrid(&write_egrid(&grid).unwrap()).unwrap();
        assert_same_geometry(&grid, &back);
        assert_eq!(back.nactive(), 11);
    }

    #[test]
    fn test_bgrdecl_round_trip() {
        let grid = faulted();
        let back = read_bgrdecl(&write_bgrdecl(&grid).unwrap()).unwrap();
        assert_same_geometry(&grid, &back);
    }

    #[test]
    fn test_grdecl_round_trip() {
        let grid = faulted();
        let back = read_grdecl(&write_grdecl(&grid).unwrap()).unwrap();
        assert_same_geometry(&grid, &back);
        assert_eq!(grid.layout().to_compact().coordsv, back.layout().to_compact().coordsv);
    }

    #[test]
    fn test_egrid_ignores_local_grids() {
        let grid = unit_box(2, 2, 1);
        let mut bytes = write_egrid(&grid).unwrap();
        bytes.extend(write_records(&[Keyword::new("LGR", Values::Char(vec!["LGR1".into()]))]));
        assert_eq!(read_egrid(&bytes).unwrap().dimensions(), grid.dimensions());
    }

    #[test]
    fn test_truncated_egrid() {
        let bytes = write_egrid(&unit_box(3, 3, 3)).unwrap();
        match read_egrid(&bytes[..bytes.len() - 30]) {
            Err(GridError::UnexpectedEof { keyword }) => assert_eq!(keyword, "ACTNUM"),
            other => panic!("unexpected {other:?}"),
        }
        let err = read_bgrdecl(&[0, 0, 0, 16]).unwrap_err();
        assert!(err.to_string().starts_with("end-of-file while reading keyword"));
    }

    #[test]
    fn test_missing_zcorn() {
        let bytes = write_records(&[
            Keyword::new("SPECGRID", Values::Int(vec![1, 1, 1, 1, 0])),
            Keyword::new("COORD", Values::Real(vec![0.0; 24])),
        ]);
        assert!(matches!(
            read_bgrdecl(&bytes),
            Err(GridError::Format { format: "bgrdecl", .. })
        ));
    }

    #[test]
    fn test_huge_header_is_rejected_before_allocating() {
        let bytes = write_records(&[
            Keyword::new("SPECGRID", Values::Int(vec![200_000, 200_000, 200_000, 1, 0])),
            Keyword::new("COORD", Values::Real(vec![0.0; 24])),
            Keyword::new("ZCORN", Values::Real(vec![0.0; 8])),
        ]);
        match read_bgrdecl(&bytes) {
            Err(GridError::Format { format: "bgrdecl", message }) => assert!(message.starts_with("COORD holds 24")),
            other => panic!("unexpected {other:?}"),
        }

        let bytes = write_records(&[Keyword::new("SPECGRID", Values::Int(vec![i32::MAX, i32::MAX, i32::MAX, 1, 0]))]);
        match read_bgrdecl(&bytes) {
            Err(GridError::Format { format: "bgrdecl", message }) => assert!(message.ends_with("is too large")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
