// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry/design.rs - Subgrid layering design and grid handedness.
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
 * # `design` Module
 *
 * A subgrid is built in one of three ways. Top conform (`T`) layers have a
 * constant thickness and are truncated from below, base conform (`B`) layers
 * are constant and truncated from above, and proportional (`P`) layers split
 * each column into equal parts whose thickness varies between columns.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{cell_corners, Point};
use crate::error::{GridError, Result};
use crate::layout::CornerSource;
use crate::subgrids::Subgrids;

/// Cells thinner than this are treated as pinched out.
const PINCH_TOLERANCE: f64 = 1e-4;

/// Relative tolerance for two thicknesses to count as equal.
const EQUAL_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Design {
    #[serde(rename = "T")]
    TopConform,
    #[serde(rename = "B")]
    BaseConform,
    #[serde(rename = "P")]
    Proportional,
}

impl Design {
    pub fn code(&self) -> char {
        match self {
            Design::TopConform => 'T',
            Design::BaseConform => 'B',
            Design::Proportional => 'P',
        }
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignEstimate {
    pub design: Design,
    /// Mean thickness of the thick active cells in the subgrid.
    pub dzsimbox: f64,
}

/// Selects a subgrid by 1-based position or by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubgridSelector<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for SubgridSelector<'_> {
    fn from(index: usize) -> Self {
        SubgridSelector::Index(index)
    }
}

impl<'a> From<&'a str> for SubgridSelector<'a> {
    fn from(name: &'a str) -> Self {
        SubgridSelector::Name(name)
    }
}

/// 0-based layers of the selected subgrid. Without subgrids the whole grid
/// is subgrid 1.
fn selected_layers(nlay: usize, subgrids: Option<&Subgrids>, selector: SubgridSelector) -> Result<Vec<usize>> {
    let entry = match (subgrids, selector) {
        (None, SubgridSelector::Index(1)) => return Ok((0..nlay).collect()),
        (None, _) => None,
        (Some(s), SubgridSelector::Index(n)) => n.checked_sub(1).and_then(|n| s.get_index(n)),
        (Some(s), SubgridSelector::Name(name)) => s.get(name),
    };
    let entry = entry.ok_or_else(|| GridError::invalid(format!("no subgrid {selector:?}")))?;
    Ok(entry.layers.iter().map(|l| l - 1).filter(|&l| l < nlay).collect())
}

fn equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EQUAL_TOLERANCE * a.abs().max(b.abs())
}

fn all_equal(values: &[f64]) -> bool {
    values.iter().all(|&v| equal(v, values[0]))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Layer {
    Thick(f64),
    Pinched,
}

/// Estimates how the layers of a subgrid were built.
///
/// Returns `Ok(None)` when the subgrid has no thick active cell or follows
/// none of the known patterns.
pub fn estimate_design(
    src: &dyn CornerSource,
    subgrids: Option<&Subgrids>,
    selector: Option<SubgridSelector>,
) -> Result<Option<DesignEstimate>> {
    let selector = selector.ok_or_else(|| GridError::invalid("a subgrid index or name is required"))?;
    src.check_sizes()?;
    let d = src.dimensions();
    let layers = selected_layers(d.nlay, subgrids, selector)?;

    let mut columns = Vec::with_capacity(d.ncol * d.nrow);
    for i in 0..d.ncol {
        for j in 0..d.nrow {
            let column = layers
                .iter()
                .filter(|&&k| src.is_active(i, j, k))
                .map(|&k| {
                    let z = src.cell_depths(i, j, k);
                    let dz = (0..4).map(|c| z[c + 4] - z[c]).sum::<f64>() / 4.0;
                    if dz > PINCH_TOLERANCE { Layer::Thick(dz) } else { Layer::Pinched }
                })
                .collect::<Vec<_>>();
            columns.push(column);
        }
    }

    let thick = |column: &[Layer]| {
        column
            .iter()
            .filter_map(|l| match l {
                Layer::Thick(dz) => Some(*dz),
                Layer::Pinched => None,
            })
            .collect::<Vec<_>>()
    };
    let all = columns.iter().flat_map(|c| thick(c)).collect::<Vec<_>>();
    if all.is_empty() {
        return Ok(None);
    }
    let dzsimbox = all.iter().sum::<f64>() / all.len() as f64;

    let design = if all_equal(&all) {
        // Base conform when every pinched layer sits above the thick ones.
        let pinched_above = columns.iter().all(|c| {
            let first_thick = c.iter().position(|l| *l != Layer::Pinched).unwrap_or(c.len());
            c[first_thick..].iter().all(|l| *l != Layer::Pinched)
        });
        let any_pinched = columns.iter().flatten().any(|l| *l == Layer::Pinched);
        if any_pinched && pinched_above {
            Design::BaseConform
        } else {
            Design::TopConform
        }
    } else if columns.iter().all(|c| {
        let t = thick(c);
        t.is_empty() || all_equal(&t)
    }) {
        Design::Proportional
    } else {
        return Ok(None);
    };

    tracing::debug!("subgrid {selector:?} looks like design {design} with dz {dzsimbox}");
    Ok(Some(DesignEstimate { design, dzsimbox }))
}

/// +1 when the grid is left handed (I east, J north, depth down, the usual
/// case), -1 when it is right handed. Judged from the first top layer cell
/// with a non-degenerate footprint; +1 when there is none.
pub fn estimate_flip(src: &dyn CornerSource) -> Result<i32> {
    src.check_sizes()?;
    let d = src.dimensions();
    if d.nlay == 0 {
        return Ok(1);
    }
    for j in 0..d.nrow {
        for i in 0..d.ncol {
            let c = cell_corners(src, i, j, 0)?;
            let east: Point = c[1] - c[0];
            let north: Point = c[2] - c[0];
            let turn = east.cross(&north).z;
            if turn.abs() > f64::EPSILON * east.norm() * north.norm() {
                return Ok(if turn > 0.0 { 1 } else { -1 });
            }
        }
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CompactLayout, Dimensions};

    /// Vertical pillars on a 10 m lattice, layer boundaries from `depth`.
    fn layered(d: Dimensions, depth: impl Fn(usize, usize, usize) -> f32) -> CompactLayout {
        let mut c = CompactLayout::zeroed(d);
        for i in 0..=d.ncol {
            for j in 0..=d.nrow {
                let (x, y) = (10.0 * i as f64, 10.0 * j as f64);
                c.set_pillar(i, j, [x, y, 0.0, x, y, 100.0]);
            }
        }
        for i in 0..d.ncol {
            for j in 0..d.nrow {
                for k in 0..=d.nlay {
                    for corner in 0..4 {
                        c.set_corner_depth(i, j, k, corner, depth(i, j, k));
                    }
                }
            }
        }
        c.fill_outer_subcorners();
        c
    }

    #[test]
    fn test_constant_layers_are_top_conform() {
        let c = layered(Dimensions::new(2, 2, 4), |_, _, k| 20.0 + 2.0 * k as f32);
        let est = estimate_design(&c, None, Some(1.into())).unwrap().unwrap();
        assert_eq!(est.design, Design::TopConform);
        assert_eq!(est.dzsimbox, 2.0);
    }

    #[test]
    fn test_top_pinchouts_are_base_conform() {
        // Column (0, 0) loses its top two layers.
        let c = layered(Dimensions::new(2, 1, 4), |i, _, k| {
            let k = if i == 0 { k.max(2) } else { k };
            20.0 + 2.0 * k as f32
        });
        let est = estimate_design(&c, None, Some(1.into())).unwrap().unwrap();
        assert_eq!(est.design, Design::BaseConform);
        assert_eq!(est.dzsimbox, 2.0);
    }

    #[test]
    fn test_varying_columns_are_proportional() {
        let c = layered(Dimensions::new(3, 1, 5), |i, _, k| 20.0 + (1.0 + i as f32) * k as f32);
        let est = estimate_design(&c, None, Some(1.into())).unwrap().unwrap();
        assert_eq!(est.design, Design::Proportional);
        assert_eq!(est.dzsimbox, 2.0);
    }

    #[test]
    fn test_irregular_layers_have_no_design() {
        let c = layered(Dimensions::new(1, 1, 3), |_, _, k| [0.0, 1.0, 5.0, 6.0][k]);
        assert_eq!(estimate_design(&c, None, Some(1.into())).unwrap(), None);
    }

    #[test]
    fn test_selector_is_required_and_checked() {
        let c = layered(Dimensions::new(1, 1, 2), |_, _, k| k as f32);
        assert!(matches!(
            estimate_design(&c, None, None),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(estimate_design(&c, None, Some(2.into())).is_err());

        let s = Subgrids::from_counts(&[("upper", 1), ("lower", 1)]).unwrap();
        assert!(estimate_design(&c, Some(&s), Some("lower".into())).unwrap().is_some());
        assert!(estimate_design(&c, Some(&s), Some("middle".into())).is_err());
        assert!(estimate_design(&c, Some(&s), Some(0.into())).is_err());
    }

    #[test]
    fn test_flip_follows_handedness() {
        let mut c = layered(Dimensions::new(2, 2, 1), |_, _, k| 10.0 * k as f32);
        assert_eq!(estimate_flip(&c).unwrap(), 1);
        for p in c.coordsv.chunks_mut(6) {
            p[1] = -p[1];
            p[4] = -p[4];
        }
        assert_eq!(estimate_flip(&c).unwrap(), -1);
        assert_eq!(estimate_flip(&CompactLayout::zeroed(Dimensions::new(0, 0, 0))).unwrap(), 1);
    }
}
