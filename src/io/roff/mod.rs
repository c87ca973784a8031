// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/roff/mod.rs - ROFF tagged container and its grid mapping.
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
 * # `roff` Module
 *
 * A ROFF file is a header line followed by a sequence of tags, each holding
 * named, typed fields:
 *
 * ```text
 * roff-asc
 * #ROFF file#
 * tag dimensions
 * int nX 4
 * int nY 3
 * int nZ 5
 * endtag
 * ...
 * tag eof
 * endtag
 * ```
 *
 * The binary variant carries the same words NUL-terminated with numbers in
 * machine order; the reader detects the byte order from the
 * `filedata.byteswaptest` field, which is always 1.
 *
 * In a grid file the layer index runs upwards and z values are elevations,
 * both of which are reversed on the way in and out.
 */

mod ascii;
mod binary;

use tracing::{debug, warn};

use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::layout::{CompactLayout, CornerSource, Dimensions};
use crate::subgrids::Subgrids;

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Char(String),
    Bool(bool),
    Byte(u8),
    Int(i32),
    Float(f32),
    Double(f64),
    CharArray(Vec<String>),
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
}

impl Value {
    /// The element type keyword.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Char(_) | Value::CharArray(_) => "char",
            Value::Bool(_) | Value::BoolArray(_) => "bool",
            Value::Byte(_) | Value::ByteArray(_) => "byte",
            Value::Int(_) | Value::IntArray(_) => "int",
            Value::Float(_) | Value::FloatArray(_) => "float",
            Value::Double(_) | Value::DoubleArray(_) => "double",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Value::CharArray(_)
                | Value::BoolArray(_)
                | Value::ByteArray(_)
                | Value::IntArray(_)
                | Value::FloatArray(_)
                | Value::DoubleArray(_)
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Value::CharArray(v) => v.len(),
            Value::BoolArray(v) => v.len(),
            Value::ByteArray(v) => v.len(),
            Value::IntArray(v) => v.len(),
            Value::FloatArray(v) => v.len(),
            Value::DoubleArray(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// A parsed ROFF container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoffFile {
    pub tags: Vec<Tag>,
}

impl RoffFile {
    /// Parses either variant, as announced by the first word.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let tags = if bytes.starts_with(b"roff-bin") {
            binary::parse(bytes)?
        } else if bytes.starts_with(b"roff-asc") {
            ascii::parse(bytes)?
        } else {
            return Err(GridError::format("roff", "missing roff-bin or roff-asc header"));
        };
        Ok(Self { tags })
    }

    pub fn to_bytes(&self, binary: bool) -> Vec<u8> {
        if binary {
            binary::serialize(&self.tags)
        } else {
            ascii::serialize(&self.tags)
        }
    }

    /// The first tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    fn value(&self, tag: &str, field: &str) -> Option<&Value> {
        self.tag(tag).and_then(|t| t.get(field))
    }

    fn require(&self, tag: &str, field: &str) -> Result<&Value> {
        self.value(tag, field)
            .ok_or_else(|| GridError::format("roff", format!("missing {tag}.{field}")))
    }

    fn int(&self, tag: &str, field: &str) -> Result<i32> {
        match self.require(tag, field)? {
            Value::Int(v) => Ok(*v),
            other => Err(wrong_type(tag, field, other)),
        }
    }

    /// An optional float scalar, `default` when the field is absent.
    fn float_or(&self, tag: &str, field: &str, default: f64) -> Result<f64> {
        match self.value(tag, field) {
            None => Ok(default),
            Some(Value::Float(v)) => Ok(f64::from(*v)),
            Some(Value::Double(v)) => Ok(*v),
            Some(other) => Err(wrong_type(tag, field, other)),
        }
    }
}

fn wrong_type(tag: &str, field: &str, value: &Value) -> GridError {
    GridError::format(
        "roff",
        format!(
            "unexpected {}{} in {tag}.{field}",
            if value.is_array() { "array of " } else { "" },
            value.type_name()
        ),
    )
}

fn expect_len(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(GridError::format(
            "roff",
            format!("{what} holds {found} values, expected {expected}"),
        ));
    }
    Ok(())
}

fn dimension(file: &RoffFile, field: &str) -> Result<usize> {
    let n = file.int("dimensions", field)?;
    usize::try_from(n).map_err(|_| GridError::format("roff", format!("negative dimension {field} = {n}")))
}

/// Decodes a ROFF grid of either variant.
pub fn read_grid(bytes: &[u8]) -> Result<Grid> {
    let file = RoffFile::parse(bytes)?;
    match file.value("filedata", "filetype") {
        Some(Value::Char(kind)) if kind != "grid" => {
            return Err(GridError::format("roff", format!("file type is {kind:?}, not grid")));
        }
        _ => (),
    }
    let d = Dimensions::new(
        dimension(&file, "nX")?,
        dimension(&file, "nY")?,
        dimension(&file, "nZ")?,
    );
    debug!("roff grid of {}x{}x{}", d.ncol, d.nrow, d.nlay);
    let offset = [
        file.float_or("translate", "xoffset", 0.0)?,
        file.float_or("translate", "yoffset", 0.0)?,
        file.float_or("translate", "zoffset", 0.0)?,
    ];
    let scale = [
        file.float_or("scale", "xscale", 1.0)?,
        file.float_or("scale", "yscale", 1.0)?,
        file.float_or("scale", "zscale", 1.0)?,
    ];
    let physical = |raw: f32, axis: usize| {
        let v = (f64::from(raw) + offset[axis]) * scale[axis];
        if axis == 2 { -v } else { v }
    };

    let [ncoord, nzcorn, _] = d
        .checked_lens()
        .ok_or_else(|| GridError::format("roff", format!("grid of {}x{}x{} is too large", d.ncol, d.nrow, d.nlay)))?;

    let lines = match file.require("cornerLines", "data")? {
        Value::FloatArray(v) => v,
        other => return Err(wrong_type("cornerLines", "data", other)),
    };
    expect_len("cornerLines.data", ncoord, lines.len())?;
    let split = match file.require("zvalues", "splitEnz")? {
        Value::ByteArray(v) => v,
        other => return Err(wrong_type("zvalues", "splitEnz", other)),
    };
    let zdata = match file.require("zvalues", "data")? {
        Value::FloatArray(v) => v,
        other => return Err(wrong_type("zvalues", "data", other)),
    };
    expect_len("zvalues.splitEnz", nzcorn / 4, split.len())?;

    let mut layout = CompactLayout::zeroed(d);
    for (n, line) in lines.chunks_exact(6).enumerate() {
        let (i, j) = (n / (d.nrow + 1), n % (d.nrow + 1));
        let p: [f64; 6] = std::array::from_fn(|m| physical(line[m], m % 3));
        // Stored bottom first.
        layout.set_pillar(i, j, [p[3], p[4], p[5], p[0], p[1], p[2]]);
    }

    let mut values = zdata.iter();
    let mut nodes = split.iter();
    for i in 0..=d.ncol {
        for j in 0..=d.nrow {
            for kr in 0..=d.nlay {
                let k = d.nlay - kr;
                let s = nodes.next().copied().unwrap_or(0);
                let mut next = || {
                    values
                        .next()
                        .map(|&v| physical(v, 2) as f32)
                        .ok_or_else(|| GridError::format("roff", "zvalues.data is too short"))
                };
                let depths = match s {
                    1 => [next()?; 4],
                    4 => [next()?, next()?, next()?, next()?],
                    _ => {
                        return Err(GridError::format(
                            "roff",
                            format!("unsupported split {s} at node ({i}, {j}, {k})"),
                        ));
                    }
                };
                for (sub, z) in depths.into_iter().enumerate() {
                    let n = layout.zcorn_index(i, j, k, sub);
                    layout.zcornsv[n] = z;
                }
            }
        }
    }
    if values.next().is_some() {
        return Err(GridError::format("roff", "zvalues.data is too long"));
    }
    layout.fill_outer_subcorners();

    match file.value("active", "data") {
        None => (),
        Some(Value::BoolArray(active)) => {
            expect_len("active.data", d.ntotal(), active.len())?;
            for (n, &a) in active.iter().enumerate() {
                let (i, j, kr) = d.cell_ijk(n);
                let idx = layout.actnum_index(i, j, d.nlay - 1 - kr);
                layout.actnumsv[idx] = i32::from(a);
            }
        }
        Some(other) => return Err(wrong_type("active", "data", other)),
    }

    let subgrids = match file.value("subgrids", "nLayers") {
        None => None,
        Some(Value::IntArray(counts)) => {
            let names = match file.value("subgrids", "names") {
                Some(Value::CharArray(names)) if names.len() == counts.len() => names.clone(),
                _ => (0..counts.len()).map(|n| format!("subgrid_{n}")).collect(),
            };
            let counts = counts
                .iter()
                .map(|&c| usize::try_from(c))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| GridError::format("roff", "negative subgrid layer count"))?;
            let pairs = names.into_iter().zip(counts).collect::<Vec<_>>();
            Some(Subgrids::from_counts(&pairs)?)
        }
        Some(other) => return Err(wrong_type("subgrids", "nLayers", other)),
    };

    let mut grid = Grid::from_compact(layout)?;
    grid.set_subgrids(subgrids)?;
    Ok(grid)
}

/// Midpoint of `values`, rounded so that re-adding it is exact.
fn midpoint(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi { 0.0 } else { (0.5 * (lo + hi)).round() }
}

/// Encodes a grid as ROFF, binary or ASCII.
pub fn write_grid(grid: &Grid, binary: bool) -> Result<Vec<u8>> {
    let layout = grid.layout().to_compact();
    layout.check_sizes()?;
    let d = layout.dimensions;

    let coord = |axis: usize| layout.coordsv.chunks_exact(3).map(move |p| p[axis]);
    let offset = [midpoint(coord(0)), midpoint(coord(1)), midpoint(coord(2))];
    let raw = |v: f64, axis: usize| (v - offset[axis]) as f32;

    let mut lines = Vec::with_capacity(d.npillars() * 6);
    for i in 0..=d.ncol {
        for j in 0..=d.nrow {
            let p = layout.pillar(i, j);
            for m in [3, 4, 5, 0, 1, 2] {
                lines.push(raw(p[m], m % 3));
            }
        }
    }

    let mut split = Vec::with_capacity(d.npillars() * (d.nlay + 1));
    let mut zdata = Vec::new();
    for i in 0..=d.ncol {
        for j in 0..=d.nrow {
            for kr in 0..=d.nlay {
                let k = d.nlay - kr;
                let n = layout.zcorn_index(i, j, k, 0);
                let depths = &layout.zcornsv[n..n + 4];
                if depths.iter().all(|&z| z == depths[0]) {
                    split.push(1);
                    zdata.push(raw(f64::from(depths[0]), 2));
                } else {
                    split.push(4);
                    zdata.extend(depths.iter().map(|&z| raw(f64::from(z), 2)));
                }
            }
        }
    }

    let active = (0..d.ntotal())
        .map(|n| {
            let (i, j, kr) = d.cell_ijk(n);
            layout.is_active(i, j, d.nlay - 1 - kr)
        })
        .collect();

    let created = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();
    let mut tags = vec![
        Tag::new("filedata")
            .with("byteswaptest", Value::Int(1))
            .with("filetype", Value::Char("grid".to_string()))
            .with("creationDate", Value::Char(created)),
        Tag::new("version")
            .with("major", Value::Int(2))
            .with("minor", Value::Int(0)),
        Tag::new("dimensions")
            .with("nX", Value::Int(to_int(d.ncol)?))
            .with("nY", Value::Int(to_int(d.nrow)?))
            .with("nZ", Value::Int(to_int(d.nlay)?)),
        Tag::new("translate")
            .with("xoffset", Value::Float(offset[0] as f32))
            .with("yoffset", Value::Float(offset[1] as f32))
            .with("zoffset", Value::Float(offset[2] as f32)),
        Tag::new("scale")
            .with("xscale", Value::Float(1.0))
            .with("yscale", Value::Float(1.0))
            .with("zscale", Value::Float(-1.0)),
    ];
    if let Some(s) = grid.subgrids() {
        match s.counts(d.nlay) {
            Some(counts) => {
                let counts = counts.into_iter().map(to_int).collect::<Result<Vec<_>>>()?;
                tags.push(
                    Tag::new("subgrids")
                        .with("nLayers", Value::IntArray(counts))
                        .with(
                            "names",
                            Value::CharArray(s.names().into_iter().map(str::to_string).collect()),
                        ),
                );
            }
            None => warn!("subgrids do not stack contiguously over all layers; not stored in ROFF"),
        }
    }
    tags.push(Tag::new("cornerLines").with("data", Value::FloatArray(lines)));
    tags.push(
        Tag::new("zvalues")
            .with("splitEnz", Value::ByteArray(split))
            .with("data", Value::FloatArray(zdata)),
    );
    tags.push(Tag::new("active").with("data", Value::BoolArray(active)));
    tags.push(Tag::new("eof"));

    Ok(RoffFile { tags }.to_bytes(binary))
}

fn to_int(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| GridError::invalid(format!("{n} does not fit a ROFF int")))
}
