// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/geometry.rs - Geometry queries through the public grid API.
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

use approx::{assert_abs_diff_eq, assert_relative_eq};

use cpgrid::{
    BoxSpec, CompactLayout, CornerSource, Design, Dimensions, Grid, GridError, Layout, LayoutKind, MetricOptions,
    SubgridSelector, Subgrids,
};

#[test]
fn corner_order_of_first_cell() {
    let grid = common::unit_box(10, 10, 10);
    let corners = grid.get_xyz_cell_corners(Some((1, 1, 1)), true).unwrap();
    let expected = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0,
    ];
    for (a, b) in corners.iter().zip(expected) {
        assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
    }
}

#[test]
fn layouts_answer_identically() {
    let compact = common::faulted_grid();
    let mut legacy = compact.clone();
    legacy.to_legacy();
    assert_eq!(legacy.layout_kind(), LayoutKind::Legacy);

    let d = compact.dimensions();
    let options = MetricOptions::default().asmasked(false);
    let props = |g: &Grid| {
        [
            g.get_dx(&options).unwrap(),
            g.get_dy(&options).unwrap(),
            g.get_dz(&options).unwrap(),
            g.get_bulk_volume(false).unwrap(),
        ]
    };
    for (a, b) in props(&compact).iter().zip(props(&legacy).iter()) {
        for (x, y) in a.values.iter().zip(&b.values) {
            assert_relative_eq!(*x, *y, max_relative = 1e-6);
        }
    }
    for n in 0..d.ntotal() {
        let (i, j, k) = d.cell_ijk(n);
        let ijk = Some((i + 1, j + 1, k + 1));
        let a = compact.get_xyz_cell_corners(ijk, false).unwrap();
        let b = legacy.get_xyz_cell_corners(ijk, false).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_relative_eq!(*x, *y, max_relative = 1e-6);
        }
    }

    let mut back = legacy.clone();
    back.to_compact();
    assert_eq!(back.layout(), compact.layout());
}

#[test]
fn masked_cells_are_missing() {
    let mut grid = Grid::default();
    let mut actnum = grid.get_actnum().unwrap();
    actnum.values[0] = 0;
    grid.set_actnum(&actnum).unwrap();

    let masked = grid.get_dx(&MetricOptions::default()).unwrap();
    assert_eq!(masked.get(0, 0, 0), None);
    assert!(masked.is_masked(0, 0, 0));
    assert_eq!(masked.get(1, 0, 0), Some(100.0));

    let unmasked = grid.get_dx(&MetricOptions::default().asmasked(false)).unwrap();
    assert_relative_eq!(unmasked.get(0, 0, 0).unwrap(), 100.0);
}

#[test]
fn empty_grid_has_empty_properties() {
    let grid = Grid::from_box(&BoxSpec {
        dimension: Dimensions::new(0, 0, 0),
        ..BoxSpec::default()
    })
    .unwrap();
    let options = MetricOptions::default();
    for prop in [
        grid.get_dx(&options).unwrap(),
        grid.get_dy(&options).unwrap(),
        grid.get_dz(&options).unwrap(),
    ] {
        assert_eq!(prop.shape(), (0, 0, 0));
        assert!(prop.is_empty());
    }
}

#[test]
fn bulk_volume_of_faulted_box() {
    let grid = common::faulted_grid();
    // The throw moves whole columns, so every cell keeps its box volume.
    let reference = 100.0 * 150.0 * 5.0 * (grid.ntotal() - 1) as f64;
    let total = grid.get_bulk_volume(true).unwrap().sum();
    assert!((total - reference).abs() / reference < 1e-3, "{total} vs {reference}");
}

#[test]
fn bulk_volume_of_sheared_grid() {
    // Pillars leaning east keep the volume of the upright cells.
    let mut layout = CompactLayout::zeroed(Dimensions::new(2, 2, 2));
    for i in 0..=2 {
        for j in 0..=2 {
            let (x, y) = (10.0 * i as f64, 10.0 * j as f64);
            layout.set_pillar(i, j, [x, y, 0.0, x + 20.0, y, 40.0]);
        }
    }
    for (n, z) in layout.zcornsv.iter_mut().enumerate() {
        *z = 10.0 * ((n / 4) % 3) as f32;
    }
    let grid = Grid::from_compact(layout).unwrap();
    let total = grid.get_bulk_volume(true).unwrap().sum();
    assert_relative_eq!(total, 20.0 * 20.0 * 20.0, max_relative = 1e-3);
}

#[test]
fn hash_tracks_content() {
    let a = common::faulted_grid();
    let b = common::faulted_grid();
    assert_eq!(a.generate_hash().unwrap(), b.generate_hash().unwrap());

    let mut inactive = b.clone();
    inactive.activate_all();
    assert_ne!(inactive.generate_hash().unwrap(), a.generate_hash().unwrap());

    let mut deeper = b.clone();
    if let Layout::Compact(c) = deeper.layout_mut() {
        c.zcornsv[0] += 1.0;
    }
    assert_ne!(deeper.generate_hash().unwrap(), a.generate_hash().unwrap());

    let mut resized = BoxSpec::default();
    resized.dimension.nlay += 1;
    let other = Grid::from_box(&resized).unwrap();
    assert_ne!(other.generate_hash().unwrap(), Grid::default().generate_hash().unwrap());
}

#[test]
fn broken_arrays_are_reported() {
    let mut grid = common::unit_box(2, 2, 2);
    if let Layout::Compact(c) = grid.layout_mut() {
        c.zcornsv.pop();
    }
    let err = grid.get_dx(&MetricOptions::default()).unwrap_err();
    assert!(matches!(err, GridError::IncorrectSize { array: "zcornsv", .. }));
    assert!(err.to_string().starts_with("incorrect size of zcornsv"));
}

#[test]
fn cleared_actnum_is_reported_by_every_query() {
    let mut grid = common::unit_box(3, 4, 5);
    if let Layout::Compact(c) = grid.layout_mut() {
        c.actnumsv.clear();
    }
    let expected = |err: GridError| {
        assert!(
            matches!(err, GridError::IncorrectSize { array: "actnumsv", expected: 60, found: 0 }),
            "unexpected {err:?}"
        );
    };
    expected(grid.get_ijk(true).unwrap_err());
    expected(grid.get_ijk(false).unwrap_err());
    expected(grid.get_xyz(true).unwrap_err());
    expected(grid.get_dx(&MetricOptions::default()).unwrap_err());
    expected(grid.get_actnum().unwrap_err());
}

#[test]
fn flat_pillar_is_reported() {
    let mut grid = common::unit_box(2, 2, 2);
    if let Layout::Compact(c) = grid.layout_mut() {
        let n = c.coord_index(0, 0);
        c.coordsv[n + 2] = 0.0;
        c.coordsv[n + 5] = 0.0;
    }
    match grid.get_dx(&MetricOptions::default()) {
        Err(GridError::NearZeroHeight { i: 1, j: 1, .. }) => (),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_metric_name() {
    assert!(matches!(
        MetricOptions::new().metric_name("stupid"),
        Err(GridError::UnknownMetric(_))
    ));
}

/// Two subgrids over a 3x2x6 grid: three 2 m layers on top, then three
/// layers per column whose thickness grows eastwards.
fn layered_grid() -> Grid {
    let d = Dimensions::new(3, 2, 6);
    let mut layout = CompactLayout::zeroed(d);
    for i in 0..=d.ncol {
        for j in 0..=d.nrow {
            let (x, y) = (10.0 * i as f64, 10.0 * j as f64);
            layout.set_pillar(i, j, [x, y, 0.0, x, y, 100.0]);
        }
    }
    for i in 0..d.ncol {
        for j in 0..d.nrow {
            for k in 0..=d.nlay {
                let z = if k <= 3 {
                    2.0 * k as f32
                } else {
                    6.0 + (k - 3) as f32 * (i + 1) as f32
                };
                for corner in 0..4 {
                    layout.set_corner_depth(i, j, k, corner, z);
                }
            }
        }
    }
    layout.fill_outer_subcorners();
    let mut grid = Grid::from_compact(layout).unwrap();
    grid.set_subgrids(Some(Subgrids::from_counts(&[("top", 3), ("base", 3)]).unwrap()))
        .unwrap();
    grid
}

#[test]
fn design_classification() {
    let grid = layered_grid();

    let top = grid.estimate_design(Some(SubgridSelector::from("top"))).unwrap().unwrap();
    assert_eq!(top.design, Design::TopConform);
    assert_eq!(top.dzsimbox, 2.0);

    let base = grid.estimate_design(Some(SubgridSelector::Index(2))).unwrap().unwrap();
    assert_eq!(base.design, Design::Proportional);
    assert_relative_eq!(base.dzsimbox, 2.0);

    assert!(grid.estimate_design(Some("nowhere".into())).is_err());
    assert_eq!(grid.estimate_flip().unwrap(), 1);
}

#[test]
fn design_needs_a_selector() {
    let grid = layered_grid();
    assert!(matches!(grid.estimate_design(None), Err(GridError::InvalidArgument(_))));

    // Every subgrid by name, as the summary demo does.
    let subgrids = grid.subgrids().unwrap();
    let designs = subgrids
        .iter()
        .map(|s| grid.estimate_design(Some(SubgridSelector::Name(&s.name))).unwrap().map(|e| e.design))
        .collect::<Vec<_>>();
    assert_eq!(designs, [Some(Design::TopConform), Some(Design::Proportional)]);

    // Without subgrids the whole column is subgrid 1.
    let plain = common::unit_box(2, 2, 3);
    let whole = plain.estimate_design(Some(SubgridSelector::Index(1))).unwrap().unwrap();
    assert_eq!(whole.design, Design::TopConform);
    assert_relative_eq!(whole.dzsimbox, 1.0);
}

#[test]
fn translation_moves_geometrics() {
    let mut grid = common::faulted_grid();
    let before = grid.get_geometrics(false).unwrap();
    grid.translate_coordinates([100.0, -50.0, 10.0], [1, 1, 1]).unwrap();
    let after = grid.get_geometrics(false).unwrap();
    assert_relative_eq!(after.xmin, before.xmin + 100.0, epsilon = 1e-6);
    assert_relative_eq!(after.ymax, before.ymax - 50.0, epsilon = 1e-6);
    assert_relative_eq!(after.zmin, before.zmin + 10.0, epsilon = 1e-3);
    assert_relative_eq!(after.avg_dx, before.avg_dx, epsilon = 1e-6);
    assert_relative_eq!(after.avg_rotation, before.avg_rotation, epsilon = 1e-6);
}

#[test]
fn column_queries() {
    let grid = layered_grid();
    assert_relative_eq!(grid.horizon_depth(1, 1, cpgrid::Horizon::SubgridBase("top")).unwrap(), 6.0);
    assert_eq!(grid.locate_layer(3, 1, 10.0, true).unwrap(), Some(5));
    assert_eq!(grid.locate_layer(3, 1, 1000.0, true).unwrap(), None);
    let (xmin, xmax, ymin, ymax) = grid.cell_horizontal_bounds(2, 1, 1).unwrap();
    assert_eq!((xmin, xmax, ymin, ymax), (10.0, 20.0, 0.0, 10.0));
    let (outlines, indices) = grid.get_layer_slice(1, true, true).unwrap();
    assert_eq!(outlines.len(), 6);
    assert_eq!(indices[1], grid.dimensions().cell_index(0, 1, 0));
}

#[test]
fn corner_source_reads_both_layouts() {
    let grid = common::faulted_grid();
    let compact = grid.layout().source();
    let legacy = grid.layout().to_legacy();
    assert_eq!(compact.nactive(), legacy.nactive());
    assert_eq!(compact.cell_depths(3, 2, 4), legacy.cell_depths(3, 2, 4));
}
