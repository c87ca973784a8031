// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/box_metrics.rs - Metric properties of box grids.
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

use proptest::prelude::*;

use cpgrid::{BoxSpec, Dimensions, Grid, GridProperty, Metric, MetricOptions};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * b.abs().max(1.0)
}

fn all_close(prop: &GridProperty<f64>, expected: f64) -> bool {
    prop.values.iter().all(|&v| close(v, expected))
}

fn size(grid: &Grid, axis: usize, metric: Metric) -> GridProperty<f64> {
    let options = MetricOptions::default().metric(metric);
    match axis {
        0 => grid.get_dx(&options),
        1 => grid.get_dy(&options),
        _ => grid.get_dz(&options),
    }
    .unwrap()
}

fn increment() -> impl Strategy<Value = f64> {
    // Halves keep the f32 corner depths exact.
    (1u32..2000).prop_map(|n| f64::from(n) / 2.0)
}

proptest! {
    #[test]
    fn box_sizes_follow_the_axes(
        ncol in 1usize..4,
        nrow in 1usize..4,
        nlay in 1usize..4,
        dx in increment(),
        dy in increment(),
        dz in increment(),
    ) {
        let grid = Grid::from_box(&BoxSpec {
            dimension: Dimensions::new(ncol, nrow, nlay),
            origin: [500.0, 1000.0, 1500.0],
            increment: [dx, dy, dz],
            ..BoxSpec::default()
        }).unwrap();

        for metric in [Metric::Euclid, Metric::Horizontal, Metric::XProjection, Metric::EastWestVertical] {
            prop_assert!(all_close(&size(&grid, 0, metric), dx), "dx {metric}");
        }
        for metric in [Metric::YProjection, Metric::NorthSouthVertical, Metric::ZProjection] {
            prop_assert!(all_close(&size(&grid, 0, metric), 0.0), "dx {metric}");
        }

        for metric in [Metric::Euclid, Metric::Horizontal, Metric::YProjection, Metric::NorthSouthVertical] {
            prop_assert!(all_close(&size(&grid, 1, metric), dy), "dy {metric}");
        }
        for metric in [Metric::XProjection, Metric::EastWestVertical, Metric::ZProjection] {
            prop_assert!(all_close(&size(&grid, 1, metric), 0.0), "dy {metric}");
        }

        for metric in [Metric::Euclid, Metric::ZProjection, Metric::EastWestVertical, Metric::NorthSouthVertical] {
            prop_assert!(all_close(&size(&grid, 2, metric), dz), "dz {metric}");
        }
        for metric in [Metric::Horizontal, Metric::XProjection, Metric::YProjection] {
            prop_assert!(all_close(&size(&grid, 2, metric), 0.0), "dz {metric}");
        }
    }

    #[test]
    fn dxdy_matches_dx_and_dy(rotation in 0.0f64..360.0, metric in 0usize..7) {
        let grid = Grid::from_box(&BoxSpec { rotation, ..BoxSpec::default() }).unwrap();
        let options = MetricOptions::default()
            .metric_name(["euclid", "horizontal", "east west vertical", "north south vertical",
                "x projection", "y projection", "z projection"][metric])
            .unwrap();
        let (dx, dy) = grid.get_dxdy(&options).unwrap();
        prop_assert_eq!(dx, grid.get_dx(&options).unwrap());
        prop_assert_eq!(dy, grid.get_dy(&options).unwrap());
    }

    #[test]
    fn rotation_keeps_horizontal_sizes(rotation in 0.0f64..360.0) {
        let grid = Grid::from_box(&BoxSpec { rotation, ..BoxSpec::default() }).unwrap();
        let options = MetricOptions::default();
        prop_assert!(all_close(&grid.get_dx(&options).unwrap(), 100.0));
        prop_assert!(all_close(&grid.get_dy(&options).unwrap(), 150.0));
        prop_assert!(all_close(&grid.get_bulk_volume(true).unwrap(), 100.0 * 150.0 * 5.0));
    }
}
