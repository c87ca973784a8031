// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/formats.rs - Round trips through every grid file format.
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

mod common;

use approx::assert_abs_diff_eq;

use cpgrid::io::{self, GridFormat};
use cpgrid::{Grid, GridError, MetricOptions, WriteOptions};

fn assert_round_trip(format: GridFormat, keeps_subgrids: bool) {
    let grid = common::faulted_grid();
    let bytes = io::write(&grid, format).unwrap();
    let back = io::read(&bytes, format).unwrap();

    assert_eq!(back.dimensions(), grid.dimensions(), "{format}");
    assert_eq!(back.nactive(), grid.nactive(), "{format}");
    if keeps_subgrids {
        assert_eq!(back.subgrids(), grid.subgrids(), "{format}");
    } else {
        assert_eq!(back.subgrids(), None, "{format}");
    }

    let options = MetricOptions::default();
    let (a, b) = (grid.get_dz(&options).unwrap(), back.get_dz(&options).unwrap());
    assert_abs_diff_eq!(a.mean().unwrap(), b.mean().unwrap(), epsilon = 1e-3);
    assert_abs_diff_eq!(a.std().unwrap(), b.std().unwrap(), epsilon = 1e-3);

    let (a, b) = (grid.get_dx(&options).unwrap(), back.get_dx(&options).unwrap());
    assert_abs_diff_eq!(a.mean().unwrap(), b.mean().unwrap(), epsilon = 1e-3);
}

#[test]
fn roff_binary_round_trip() {
    assert_round_trip(GridFormat::RoffBinary, true);
}

#[test]
fn roff_ascii_round_trip() {
    assert_round_trip(GridFormat::RoffAscii, true);
}

#[test]
fn grdecl_round_trip() {
    assert_round_trip(GridFormat::Grdecl, false);
}

#[test]
fn bgrdecl_round_trip() {
    assert_round_trip(GridFormat::Bgrdecl, false);
}

#[test]
fn egrid_round_trip() {
    assert_round_trip(GridFormat::Egrid, false);
}

#[test]
fn xtgf_round_trip() {
    assert_round_trip(GridFormat::Xtgf, true);
}

#[test]
fn xtgf_keeps_arrays_bit_for_bit() {
    let mut grid = common::faulted_grid();
    grid.to_legacy();
    for compress in [false, true] {
        let bytes = io::write_with(&grid, GridFormat::Xtgf, &WriteOptions { compress }).unwrap();
        let back = io::read(&bytes, GridFormat::Xtgf).unwrap();
        assert_eq!(back.layout().to_compact(), grid.layout().to_compact());
        assert_eq!(back.generate_hash().unwrap(), grid.generate_hash().unwrap());
    }
}

#[test]
fn roff_keeps_corner_depths_exactly() {
    let grid = common::faulted_grid();
    let back = io::read(&io::write(&grid, GridFormat::RoffBinary).unwrap(), GridFormat::RoffBinary).unwrap();
    assert_eq!(back.layout().to_compact().zcornsv, grid.layout().to_compact().zcornsv);
}

#[test]
fn files_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let grid = common::faulted_grid();
    for (file, format) in [
        ("faulted.roff", GridFormat::RoffBinary),
        ("faulted.grdecl", GridFormat::Grdecl),
        ("faulted.egrid", GridFormat::Egrid),
        ("faulted.xtgf", GridFormat::Xtgf),
    ] {
        let path = dir.path().join(file);
        grid.to_file(&path, format).unwrap();
        let back = Grid::from_file(&path, None).unwrap();
        assert_eq!(back.name(), Some("faulted"));
        assert_eq!(back.nactive(), grid.nactive());
    }
}

#[test]
fn truncated_binary_files() {
    let grid = common::faulted_grid();
    for format in [GridFormat::Egrid, GridFormat::Bgrdecl] {
        let bytes = io::write(&grid, format).unwrap();
        let err = io::read(&bytes[..bytes.len() / 2], format).unwrap_err();
        assert!(matches!(err, GridError::UnexpectedEof { .. }), "{format}: {err}");
        assert!(err.to_string().starts_with("end-of-file while reading keyword"));
    }
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Grid::from_file(dir.path().join("none.egrid"), None).unwrap_err();
    assert!(matches!(err, GridError::Io(_)));
}
