// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/grid.rs - The corner-point grid aggregate.
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
 * # `grid` Module
 *
 * A [Grid] owns exactly one layout plus the optional subgrid partition and
 * name. Derived quantities are never stored on it: every geometry query
 * recomputes from the arrays, so edits through [Grid::layout_mut] are seen
 * by the next query.
 */

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::array::{ArrayData, RawArray};
use crate::error::{GridError, Result};
use crate::geometry::column::{self, Horizon, Outline};
use crate::geometry::design::{self, DesignEstimate, SubgridSelector};
use crate::geometry::geometrics::{self, Geometrics};
use crate::geometry::metrics::{self, MetricOptions};
use crate::geometry::{quality, volume, xyz_cell_corners, xyz_corners};
use crate::layout::{CompactLayout, CornerSource, Dimensions, Layout, LayoutKind, LegacyLayout};
use crate::property::{ContinuousProperty, DiscreteProperty, GridProperty, PropertySet};
use crate::subgrids::Subgrids;

/// Parameters of a synthetic box grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxSpec {
    pub dimension: Dimensions,
    /// Position of the top SW corner of cell (1, 1, 1), or of its centre
    /// with `oricenter`.
    pub origin: [f64; 3],
    pub increment: [f64; 3],
    /// Degrees counter-clockwise about the origin.
    pub rotation: f64,
    /// 1 for the usual left handed grid, -1 to mirror the J axis.
    pub flip: i32,
    pub oricenter: bool,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            dimension: Dimensions::new(4, 3, 5),
            origin: [10.0, 20.0, 1000.0],
            increment: [100.0, 150.0, 5.0],
            rotation: 0.0,
            flip: 1,
            oricenter: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    layout: Layout,
    subgrids: Option<Subgrids>,
    name: Option<String>,
}

fn take_f64(array: &'static str, raw: RawArray) -> Result<(Vec<usize>, Vec<f64>)> {
    match raw.data {
        ArrayData::Float64(v) => Ok((raw.shape, v)),
        other => Err(GridError::DType {
            array,
            expected: "float64",
            found: other.dtype(),
        }),
    }
}

fn take_f32(array: &'static str, raw: RawArray) -> Result<(Vec<usize>, Vec<f32>)> {
    match raw.data {
        ArrayData::Float32(v) => Ok((raw.shape, v)),
        other => Err(GridError::DType {
            array,
            expected: "float32",
            found: other.dtype(),
        }),
    }
}

fn take_i32(array: &'static str, raw: RawArray) -> Result<(Vec<usize>, Vec<i32>)> {
    match raw.data {
        ArrayData::Int32(v) => Ok((raw.shape, v)),
        other => Err(GridError::DType {
            array,
            expected: "int32",
            found: other.dtype(),
        }),
    }
}

fn check_shape(array: &str, shape: &[usize], len: usize) -> Result<()> {
    if shape.iter().product::<usize>() != len {
        return Err(GridError::Shape(format!(
            "{len} values do not fill the shape of {array} {shape:?}"
        )));
    }
    Ok(())
}

impl Grid {
    fn with_layout(layout: Layout) -> Result<Self> {
        layout.source().check_sizes()?;
        Ok(Self {
            layout,
            subgrids: None,
            name: None,
        })
    }

    /// Wraps a compact layout after checking its array sizes.
    pub fn from_compact(layout: CompactLayout) -> Result<Self> {
        Self::with_layout(Layout::Compact(layout))
    }

    /// Wraps a legacy layout after checking its array sizes.
    pub fn from_legacy(layout: LegacyLayout) -> Result<Self> {
        Self::with_layout(Layout::Legacy(layout))
    }

    /// Builds a compact grid from raw C-order arrays.
    ///
    /// # Arguments
    ///
    /// * `coordsv` - `float64`, shape `(ncol+1, nrow+1, 6)`.
    /// * `zcornsv` - `float32`, shape `(ncol+1, nrow+1, nlay+1, 4)`.
    /// * `actnumsv` - `int32`, shape `(ncol, nrow, nlay)`.
    ///
    /// Element types are checked before any shape.
    pub fn from_arrays(coordsv: RawArray, zcornsv: RawArray, actnumsv: RawArray) -> Result<Self> {
        let (cshape, coordsv) = take_f64("coordsv", coordsv)?;
        let (zshape, zcornsv) = take_f32("zcornsv", zcornsv)?;
        let (ashape, actnumsv) = take_i32("actnumsv", actnumsv)?;

        if cshape.len() != 3 || cshape[2] != 6 {
            return Err(GridError::Shape(format!(
                "shape of coordsv must be (ncol+1, nrow+1, 6), got {cshape:?}"
            )));
        }
        if zshape.len() != 4 || zshape[3] != 4 {
            return Err(GridError::Shape(format!(
                "shape of zcornsv must be (ncol+1, nrow+1, nlay+1, 4), got {zshape:?}"
            )));
        }
        if zshape[..2] != cshape[..2] {
            return Err(GridError::Shape(format!(
                "Mismatch between zcornsv and coordsv: {zshape:?} vs {cshape:?}"
            )));
        }
        let cells = zshape[..3]
            .iter()
            .map(|n| n.checked_sub(1))
            .collect::<Option<Vec<_>>>();
        let Some(cells) = cells.filter(|c| *c == ashape) else {
            return Err(GridError::Shape(format!(
                "Mismatch between zcornsv and actnumsv: {zshape:?} vs {ashape:?}"
            )));
        };
        check_shape("coordsv", &cshape, coordsv.len())?;
        check_shape("zcornsv", &zshape, zcornsv.len())?;
        check_shape("actnumsv", &ashape, actnumsv.len())?;

        Self::from_compact(CompactLayout {
            dimensions: Dimensions::new(cells[0], cells[1], cells[2]),
            coordsv,
            zcornsv,
            actnumsv,
        })
    }

    /// Builds a legacy grid from flat arrays in the per-cell order. The
    /// active mask may be `int32` or 8-bit.
    pub fn from_legacy_arrays(
        dimensions: Dimensions,
        coordsv: Vec<f64>,
        zcornsv: Vec<f32>,
        actnumsv: ArrayData,
    ) -> Result<Self> {
        let actnumsv = match actnumsv {
            ArrayData::Int32(v) => v,
            ArrayData::UInt8(v) => v.into_iter().map(i32::from).collect(),
            other => {
                return Err(GridError::DType {
                    array: "actnumsv",
                    expected: "int32 or uint8",
                    found: other.dtype(),
                });
            }
        };
        Self::from_legacy(LegacyLayout {
            dimensions,
            coordsv,
            zcornsv,
            actnumsv,
        })
    }

    /// A regular box grid with vertical pillars.
    pub fn from_box(spec: &BoxSpec) -> Result<Self> {
        if spec.flip != 1 && spec.flip != -1 {
            return Err(GridError::invalid(format!("flip must be 1 or -1, got {}", spec.flip)));
        }
        let d = spec.dimension;
        debug!("creating {}x{}x{} box grid", d.ncol, d.nrow, d.nlay);
        Self::from_compact(box_layout(spec))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Direct access to the arrays. Size changes are only caught by the next
    /// query, which fails with [GridError::IncorrectSize].
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.layout.kind()
    }

    pub(crate) fn source(&self) -> &dyn CornerSource {
        self.layout.source()
    }

    /// Switches to the compact layout; a no-op when already compact.
    pub fn to_compact(&mut self) {
        if let Layout::Legacy(legacy) = &self.layout {
            info!("converting grid to the compact layout");
            self.layout = Layout::Compact(legacy.to_compact());
        }
    }

    /// Switches to the legacy layout; a no-op when already legacy.
    pub fn to_legacy(&mut self) {
        if let Layout::Compact(compact) = &self.layout {
            info!("converting grid to the legacy layout");
            self.layout = Layout::Legacy(compact.to_legacy());
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.layout.dimensions()
    }

    pub fn ncol(&self) -> usize {
        self.dimensions().ncol
    }

    pub fn nrow(&self) -> usize {
        self.dimensions().nrow
    }

    pub fn nlay(&self) -> usize {
        self.dimensions().nlay
    }

    pub fn ntotal(&self) -> usize {
        self.dimensions().ntotal()
    }

    /// Number of active cells, counted from the current mask.
    pub fn nactive(&self) -> usize {
        self.source().nactive()
    }

    pub fn get_actnum(&self) -> Result<DiscreteProperty> {
        let src = self.source();
        src.check_sizes()?;
        let d = src.dimensions();
        let values = (0..d.ntotal())
            .map(|n| {
                let (i, j, k) = d.cell_ijk(n);
                i32::from(src.is_active(i, j, k))
            })
            .collect();
        GridProperty::unmasked("ACTNUM", d, values)
    }

    /// Replaces the active mask: non-zero, unmasked values are active.
    pub fn set_actnum(&mut self, actnum: &DiscreteProperty) -> Result<()> {
        let d = self.dimensions();
        if actnum.dimensions != d || actnum.len() != d.ntotal() {
            return Err(GridError::invalid(format!(
                "actnum of shape {:?} does not fit grid of shape {:?}",
                actnum.shape(),
                d.as_tuple()
            )));
        }
        self.source().check_sizes()?;
        for n in 0..d.ntotal() {
            let (i, j, k) = d.cell_ijk(n);
            let active = !actnum.mask[n] && actnum.values[n] != 0;
            self.layout.set_active(i, j, k, active);
        }
        Ok(())
    }

    pub fn activate_all(&mut self) {
        match &mut self.layout {
            Layout::Legacy(l) => l.actnumsv.fill(1),
            Layout::Compact(c) => c.actnumsv.fill(1),
        }
    }

    pub fn subgrids(&self) -> Option<&Subgrids> {
        self.subgrids.as_ref()
    }

    pub fn get_subgrids(&self) -> Option<Subgrids> {
        self.subgrids.clone()
    }

    /// Sets or clears the subgrids. Every referenced layer must exist.
    pub fn set_subgrids(&mut self, subgrids: Option<Subgrids>) -> Result<()> {
        let deepest = subgrids.as_ref().map_or(0, Subgrids::max_layer);
        if deepest > self.nlay() {
            return Err(GridError::invalid(format!(
                "subgrids reach layer {deepest} of a grid with {} layers",
                self.nlay()
            )));
        }
        self.subgrids = subgrids;
        Ok(())
    }

    pub fn rename_subgrids<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        match &mut self.subgrids {
            Some(s) => s.rename(names),
            None => Err(GridError::invalid("grid has no subgrids to rename")),
        }
    }

    /// Derives subgrids from a zone property. Each layer takes the smallest
    /// zone value among its active cells, and every run of layers with the
    /// same value becomes one subgrid named `zone<value>`. Layers without
    /// active cells join the run above them.
    pub fn subgrids_from_zoneprop(&mut self, zone: &DiscreteProperty) -> Result<()> {
        let d = self.dimensions();
        if zone.dimensions != d || zone.len() != d.ntotal() {
            return Err(GridError::invalid("zone property does not fit the grid"));
        }
        let src = self.source();
        src.check_sizes()?;
        let mut layer_zone = vec![None; d.nlay];
        for n in 0..d.ntotal() {
            let (i, j, k) = d.cell_ijk(n);
            if zone.mask[n] || !src.is_active(i, j, k) {
                continue;
            }
            let v = zone.values[n];
            layer_zone[k] = Some(layer_zone[k].map_or(v, |z: i32| z.min(v)));
        }
        let Some(first) = layer_zone.iter().flatten().next().copied() else {
            return Err(GridError::invalid("zone property has no active values"));
        };

        let mut runs: Vec<(i32, Vec<usize>)> = Vec::new();
        let mut current = first;
        for (k, z) in layer_zone.iter().enumerate() {
            current = z.unwrap_or(current);
            match runs.last_mut() {
                Some((value, layers)) if *value == current => layers.push(k + 1),
                _ => runs.push((current, vec![k + 1])),
            }
        }

        let mut entries = Vec::with_capacity(runs.len());
        for (value, layers) in runs {
            let base = format!("zone{value}");
            let mut name = base.clone();
            let mut n = 1;
            while entries.iter().any(|(existing, _): &(String, Vec<usize>)| *existing == name) {
                n += 1;
                name = format!("{base}_{n}");
            }
            entries.push((name, layers));
        }
        self.subgrids = Some(Subgrids::new(entries)?);
        Ok(())
    }

    /// Marks with 1 the cells holding `val2` that share a face with a cell
    /// holding `val1`, 0 elsewhere. Masked values never match.
    pub fn get_adjacent_cells(
        &self,
        prop: &DiscreteProperty,
        val1: i32,
        val2: i32,
        activeonly: bool,
    ) -> Result<DiscreteProperty> {
        let d = self.dimensions();
        if prop.dimensions != d || prop.len() != d.ntotal() {
            return Err(GridError::invalid("property does not fit the grid"));
        }
        let src = self.source();
        src.check_sizes()?;
        let holds = |i: usize, j: usize, k: usize, value: i32| {
            let n = d.cell_index(i, j, k);
            !prop.mask[n] && prop.values[n] == value && (!activeonly || src.is_active(i, j, k))
        };
        let values = (0..d.ntotal())
            .map(|n| {
                let (i, j, k) = d.cell_ijk(n);
                if !holds(i, j, k, val2) {
                    return 0;
                }
                let neighbours = [
                    (i.wrapping_sub(1), j, k),
                    (i + 1, j, k),
                    (i, j.wrapping_sub(1), k),
                    (i, j + 1, k),
                    (i, j, k.wrapping_sub(1)),
                    (i, j, k + 1),
                ];
                let adjacent = neighbours
                    .iter()
                    .any(|&(a, b, c)| d.contains(a, b, c) && holds(a, b, c, val1));
                i32::from(adjacent)
            })
            .collect();
        GridProperty::unmasked("ADJ_CELLS", d, values)
    }

    /// SHA-256 over the grid content as lowercase hex. Equal grids hash
    /// equally regardless of which layout is active.
    pub fn generate_hash(&self) -> Result<String> {
        let src = self.source();
        src.check_sizes()?;
        let d = src.dimensions();
        let mut hasher = Sha256::new();
        for n in [d.ncol, d.nrow, d.nlay] {
            hasher.update((n as u64).to_le_bytes());
        }
        for n in 0..d.ntotal() {
            let (i, j, k) = d.cell_ijk(n);
            hasher.update([u8::from(src.is_active(i, j, k))]);
        }
        for i in 0..=d.ncol {
            for j in 0..=d.nrow {
                for v in src.pillar(i, j) {
                    hasher.update(v.to_le_bytes());
                }
            }
        }
        for i in 0..d.ncol {
            for j in 0..d.nrow {
                for k in 0..=d.nlay {
                    for c in 0..4 {
                        hasher.update(src.corner_depth(i, j, k, c).to_le_bytes());
                    }
                }
            }
        }
        match &self.subgrids {
            None => hasher.update([0u8]),
            Some(s) => {
                hasher.update([1u8]);
                for entry in s {
                    hasher.update(entry.name.as_bytes());
                    hasher.update([0u8]);
                    for &layer in &entry.layers {
                        hasher.update((layer as u64).to_le_bytes());
                    }
                }
            }
        }
        Ok(hex::encode(hasher.finalize()))
    }

    fn arrays_mut(&mut self) -> (&mut Vec<f64>, &mut Vec<f32>) {
        match &mut self.layout {
            Layout::Legacy(l) => (&mut l.coordsv, &mut l.zcornsv),
            Layout::Compact(c) => (&mut c.coordsv, &mut c.zcornsv),
        }
    }

    /// Mirrors each axis whose `flip` is -1, then shifts by `translate`.
    pub fn translate_coordinates(&mut self, translate: [f64; 3], flip: [i32; 3]) -> Result<()> {
        if flip.iter().any(|&f| f != 1 && f != -1) {
            return Err(GridError::invalid(format!("flip values must be 1 or -1, got {flip:?}")));
        }
        let f = flip.map(f64::from);
        let (coordsv, zcornsv) = self.arrays_mut();
        for (n, v) in coordsv.iter_mut().enumerate() {
            let axis = n % 3;
            *v = *v * f[axis] + translate[axis];
        }
        for z in zcornsv.iter_mut() {
            *z = (f64::from(*z) * f[2] + translate[2]) as f32;
        }
        Ok(())
    }

    /// Rotates every pillar `angle` degrees counter-clockwise about `pivot`.
    pub fn rotate_coordinates(&mut self, angle: f64, pivot: (f64, f64)) {
        let (sin, cos) = angle.to_radians().sin_cos();
        let (coordsv, _) = self.arrays_mut();
        for point in coordsv.chunks_exact_mut(3) {
            let (x, y) = (point[0] - pivot.0, point[1] - pivot.1);
            point[0] = pivot.0 + x * cos - y * sin;
            point[1] = pivot.1 + x * sin + y * cos;
        }
    }

    /// A short human readable summary.
    pub fn describe(&self) -> String {
        let d = self.dimensions();
        let mut out = String::new();
        let _ = writeln!(out, "Grid {}", self.name().unwrap_or("(unnamed)"));
        let _ = writeln!(out, "  dimensions:  {} x {} x {}", d.ncol, d.nrow, d.nlay);
        let _ = writeln!(out, "  layout:      {:?}", self.layout_kind());
        let _ = writeln!(out, "  active:      {} of {}", self.nactive(), d.ntotal());
        match &self.subgrids {
            Some(s) => {
                let _ = writeln!(out, "  subgrids:    {s}");
            }
            None => {
                let _ = writeln!(out, "  subgrids:    none");
            }
        }
        if let Ok(g) = self.get_geometrics(false) {
            let _ = writeln!(out, "  x range:     {:.2} .. {:.2}", g.xmin, g.xmax);
            let _ = writeln!(out, "  y range:     {:.2} .. {:.2}", g.ymin, g.ymax);
            let _ = writeln!(out, "  z range:     {:.2} .. {:.2}", g.zmin, g.zmax);
            let _ = writeln!(out, "  rotation:    {:.3}", g.avg_rotation);
        }
        out
    }

    pub fn get_xyz_cell_corners(&self, ijk: Option<(usize, usize, usize)>, activeonly: bool) -> Result<[f64; 24]> {
        xyz_cell_corners(self.source(), ijk, activeonly)
    }

    pub fn get_xyz_corners(&self) -> Result<Vec<ContinuousProperty>> {
        xyz_corners(self.source(), true)
    }

    pub fn get_xyz(&self, asmasked: bool) -> Result<[ContinuousProperty; 3]> {
        geometrics::xyz(self.source(), asmasked)
    }

    pub fn get_ijk(&self, asmasked: bool) -> Result<[DiscreteProperty; 3]> {
        geometrics::ijk(self.source(), asmasked)
    }

    pub fn get_dx(&self, options: &MetricOptions) -> Result<ContinuousProperty> {
        metrics::dx(self.source(), options)
    }

    pub fn get_dy(&self, options: &MetricOptions) -> Result<ContinuousProperty> {
        metrics::dy(self.source(), options)
    }

    pub fn get_dz(&self, options: &MetricOptions) -> Result<ContinuousProperty> {
        metrics::dz(self.source(), options)
    }

    pub fn get_dxdy(&self, options: &MetricOptions) -> Result<(ContinuousProperty, ContinuousProperty)> {
        Ok((self.get_dx(options)?, self.get_dy(options)?))
    }

    pub fn get_bulk_volume(&self, asmasked: bool) -> Result<ContinuousProperty> {
        volume::bulk_volume(self.source(), asmasked)
    }

    pub fn get_gridquality_properties(&self) -> Result<PropertySet> {
        quality::grid_quality(self.source())
    }

    pub fn estimate_design(&self, selector: Option<SubgridSelector>) -> Result<Option<DesignEstimate>> {
        design::estimate_design(self.source(), self.subgrids.as_ref(), selector)
    }

    pub fn estimate_flip(&self) -> Result<i32> {
        design::estimate_flip(self.source())
    }

    pub fn get_geometrics(&self, cellcenter: bool) -> Result<Geometrics> {
        geometrics::geometrics(self.source(), cellcenter)
    }

    pub fn get_layer_slice(&self, layer: usize, top: bool, activeonly: bool) -> Result<(Vec<Outline>, Vec<usize>)> {
        column::layer_slice(self.source(), layer, top, activeonly)
    }

    pub fn horizon_depth(&self, i: usize, j: usize, horizon: Horizon) -> Result<f64> {
        column::horizon_depth(self.source(), self.subgrids.as_ref(), i, j, horizon)
    }

    pub fn locate_layer(&self, i: usize, j: usize, depth: f64, activeonly: bool) -> Result<Option<usize>> {
        column::locate_layer(self.source(), i, j, depth, activeonly)
    }

    pub fn cell_horizontal_bounds(&self, i: usize, j: usize, k: usize) -> Result<(f64, f64, f64, f64)> {
        column::cell_horizontal_bounds(self.source(), i, j, k)
    }
}

fn box_layout(spec: &BoxSpec) -> CompactLayout {
    let d = spec.dimension;
    let [x0, y0, z0] = spec.origin;
    let [dx, dy, dz] = spec.increment;
    let flip = f64::from(spec.flip);
    let (ox, oy, oz) = if spec.oricenter {
        (-0.5 * dx, -0.5 * dy * flip, -0.5 * dz)
    } else {
        (0.0, 0.0, 0.0)
    };
    let (sin, cos) = spec.rotation.to_radians().sin_cos();
    let top = z0 + oz;
    let bottom = top + dz * d.nlay.max(1) as f64;

    let mut layout = CompactLayout::zeroed(d);
    for i in 0..=d.ncol {
        for j in 0..=d.nrow {
            let lx = ox + dx * i as f64;
            let ly = oy + dy * j as f64 * flip;
            let x = x0 + lx * cos - ly * sin;
            let y = y0 + lx * sin + ly * cos;
            layout.set_pillar(i, j, [x, y, top, x, y, bottom]);
        }
    }
    for (n, z) in layout.zcornsv.iter_mut().enumerate() {
        let k = (n / 4) % (d.nlay + 1);
        *z = (top + dz * k as f64) as f32;
    }
    layout
}

impl Default for Grid {
    /// The box grid of [BoxSpec::default].
    fn default() -> Self {
        Self {
            layout: Layout::Compact(box_layout(&BoxSpec::default())),
            subgrids: None,
            name: None,
        }
    }
}

/// Construction helpers shared by the unit tests of this crate.
#[cfg(test)]
pub(crate) fn unit_box(ncol: usize, nrow: usize, nlay: usize) -> Grid {
    Grid::from_box(&BoxSpec {
        dimension: Dimensions::new(ncol, nrow, nlay),
        origin: [0.0; 3],
        increment: [1.0; 3],
        ..BoxSpec::default()
    })
    .unwrap()
}
