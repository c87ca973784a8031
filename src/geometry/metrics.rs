// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/metrics.rs - Cell size along the grid axes.
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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{cell_property, Axis, Corners, Point};
use crate::error::{GridError, Result};
use crate::layout::CornerSource;
use crate::property::GridProperty;

/// How an edge vector is reduced to a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "euclid")]
    Euclid,
    #[serde(rename = "horizontal")]
    Horizontal,
    #[serde(rename = "east west vertical")]
    EastWestVertical,
    #[serde(rename = "north south vertical")]
    NorthSouthVertical,
    #[serde(rename = "x projection")]
    XProjection,
    #[serde(rename = "y projection")]
    YProjection,
    #[serde(rename = "z projection")]
    ZProjection,
}

impl Metric {
    const NAMES: [(&'static str, Metric); 7] = [
        ("euclid", Metric::Euclid),
        ("horizontal", Metric::Horizontal),
        ("east west vertical", Metric::EastWestVertical),
        ("north south vertical", Metric::NorthSouthVertical),
        ("x projection", Metric::XProjection),
        ("y projection", Metric::YProjection),
        ("z projection", Metric::ZProjection),
    ];

    pub fn name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, m)| m == self)
            .map_or("", |(name, _)| *name)
    }

    /// Length of `edge` under this metric.
    pub fn apply(&self, edge: &Point) -> f64 {
        let (dx, dy, dz) = (edge.x, edge.y, edge.z);
        match self {
            Metric::Euclid => edge.norm(),
            Metric::Horizontal => dx.hypot(dy),
            Metric::EastWestVertical => dx.hypot(dz),
            Metric::NorthSouthVertical => dy.hypot(dz),
            Metric::XProjection => dx.abs(),
            Metric::YProjection => dy.abs(),
            Metric::ZProjection => dz.abs(),
        }
    }
}

impl FromStr for Metric {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, m)| *m)
            .ok_or_else(|| GridError::UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options shared by the cell size queries.
///
/// `metric: None` selects the axis default: `horizontal` for dx and dy,
/// `z projection` for dz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOptions {
    pub metric: Option<Metric>,
    /// Mask inactive cells instead of evaluating them.
    pub asmasked: bool,
    /// dz is positive downwards when set, negated otherwise.
    pub flip: bool,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            metric: None,
            asmasked: true,
            flip: true,
        }
    }
}

impl MetricOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Selects the metric by name, e.g. `"east west vertical"`.
    pub fn metric_name(self, name: &str) -> Result<Self> {
        Ok(self.metric(name.parse()?))
    }

    pub fn asmasked(mut self, asmasked: bool) -> Self {
        self.asmasked = asmasked;
        self
    }

    pub fn flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }
}

/// Mean length of the four cell edges parallel to `axis`.
pub fn cell_size(corners: &Corners, axis: Axis, metric: Metric) -> f64 {
    axis.edges()
        .iter()
        .map(|&(a, b)| metric.apply(&(corners[b] - corners[a])))
        .sum::<f64>()
        / 4.0
}

fn axis_property(
    src: &dyn CornerSource,
    name: &str,
    axis: Axis,
    default: Metric,
    options: &MetricOptions,
) -> Result<GridProperty<f64>> {
    let metric = options.metric.unwrap_or(default);
    let sign = if axis == Axis::K && !options.flip { -1.0 } else { 1.0 };
    cell_property(src, name, options.asmasked, |c| sign * cell_size(c, axis, metric))
}

pub fn dx(src: &dyn CornerSource, options: &MetricOptions) -> Result<GridProperty<f64>> {
    axis_property(src, "DX", Axis::I, Metric::Horizontal, options)
}

pub fn dy(src: &dyn CornerSource, options: &MetricOptions) -> Result<GridProperty<f64>> {
    axis_property(src, "DY", Axis::J, Metric::Horizontal, options)
}

pub fn dz(src: &dyn CornerSource, options: &MetricOptions) -> Result<GridProperty<f64>> {
    axis_property(src, "DZ", Axis::K, Metric::ZProjection, options)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::layout::tests::faulted_legacy;

    #[test]
    fn test_metric_names() {
        for (name, metric) in Metric::NAMES {
            assert_eq!(name.parse::<Metric>().unwrap(), metric);
            assert_eq!(metric.to_string(), name);
        }
        match "foo".parse::<Metric>() {
            Err(e) => assert!(e.to_string().contains("Unknown metric")),
            Ok(m) => panic!("parsed {m}"),
        }
    }

    #[test]
    fn test_reductions() {
        let e = Point::new(3.0, -4.0, 12.0);
        assert_eq!(Metric::Euclid.apply(&e), 13.0);
        assert_eq!(Metric::Horizontal.apply(&e), 5.0);
        assert_relative_eq!(Metric::EastWestVertical.apply(&e), 153f64.sqrt());
        assert_relative_eq!(Metric::NorthSouthVertical.apply(&e), 160f64.sqrt());
        assert_eq!(Metric::XProjection.apply(&e), 3.0);
        assert_eq!(Metric::YProjection.apply(&e), 4.0);
        assert_eq!(Metric::ZProjection.apply(&e), 12.0);
    }

    #[test]
    fn test_options_from_json() {
        let o: MetricOptions = serde_json::from_str(r#"{"metric": "euclid", "flip": false}"#).unwrap();
        assert_eq!(o, MetricOptions::new().metric(Metric::Euclid).flip(false));
        assert!(o.asmasked);
    }

    #[test]
    fn test_masking_and_flip() {
        let legacy = faulted_legacy();
        let masked = dz(&legacy, &MetricOptions::default()).unwrap();
        assert!(masked.is_masked(1, 1, 0));
        assert_eq!(masked.get(0, 0, 0), Some(10.0));

        let open = dz(&legacy, &MetricOptions::new().asmasked(false).flip(false)).unwrap();
        assert!(!open.is_masked(1, 1, 0));
        assert_eq!(open.get(1, 1, 0), Some(-10.0));
    }
}
