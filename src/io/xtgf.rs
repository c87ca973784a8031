// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/xtgf.rs - Native binary grid dump.
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
 * # `xtgf` Module
 *
 * A dump of the compact arrays, little-endian:
 *
 * | Offset | Type   | Contents                                  |
 * |--------|--------|-------------------------------------------|
 * | 0      | i32    | magic, 1301                               |
 * | 4      | i32    | flags; bit 0 set when the payload is zlib |
 * | 8      | u64 x3 | `ncol`, `nrow`, `nlay`                    |
 * | 32     | u64    | stored payload length                     |
 * | 40     | bytes  | `coordsv` f64, `zcornsv` f32, `actnumsv` i32 |
 *
 * After the payload comes `\nXTGMETA.v2\n` and a JSON object with the grid
 * name and subgrids.
 */

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::io::ByteReader;
use crate::layout::{CompactLayout, Dimensions};
use crate::subgrids::Subgrids;

const MAGIC: i32 = 1301;
const FLAG_ZLIB: i32 = 1;
const META_MARKER: &[u8] = b"\nXTGMETA.v2\n";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Metadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    subgrids: Option<Subgrids>,
}

fn payload_len(d: Dimensions) -> Result<usize> {
    d.checked_lens()
        .and_then(|[coords, zcorn, actnum]| {
            coords.checked_mul(8)?.checked_add(zcorn.checked_mul(4)?)?.checked_add(actnum.checked_mul(4)?)
        })
        .ok_or_else(|| GridError::format("xtgf", format!("grid of {}x{}x{} is too large", d.ncol, d.nrow, d.nlay)))
}

/// Inflates exactly `expected` bytes; the stream is cut off one byte past it.
fn decompress(expected: usize, data: &[u8]) -> Result<Vec<u8>> {
    let limit = u64::try_from(expected).map_or(u64::MAX, |n| n.saturating_add(1));
    let mut decoder = ZlibDecoder::new(data).take(limit);
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;
    if buffer.len() != expected {
        return Err(GridError::format("xtgf", "decompressed size mismatch"));
    }
    Ok(buffer)
}

pub fn read(bytes: &[u8]) -> Result<Grid> {
    let mut r = ByteReader::new(bytes);
    let magic = r.i32("header")?;
    if magic != MAGIC {
        return Err(GridError::format("xtgf", format!("bad magic {magic}")));
    }
    let flags = r.i32("header")?;
    let mut dim = || {
        r.u64("header")
            .and_then(|n| usize::try_from(n).map_err(|_| GridError::format("xtgf", "dimension too large")))
    };
    let d = Dimensions::new(dim()?, dim()?, dim()?);
    let stored = usize::try_from(r.u64("header")?).map_err(|_| GridError::format("xtgf", "payload too large"))?;
    let expected = payload_len(d)?;
    debug!("xtgf grid of {}x{}x{}, flags {flags:#x}", d.ncol, d.nrow, d.nlay);

    let raw = r.take(stored, "payload")?;
    let payload = if flags & FLAG_ZLIB != 0 {
        decompress(expected, raw)?
    } else if stored == expected {
        raw.to_vec()
    } else {
        return Err(GridError::format("xtgf", format!("payload holds {stored} bytes, expected {expected}")));
    };

    let mut layout = CompactLayout::zeroed(d);
    let mut p = ByteReader::new(&payload);
    for v in layout.coordsv.iter_mut() {
        *v = p.f64("coordsv")?;
    }
    for v in layout.zcornsv.iter_mut() {
        *v = p.f32("zcornsv")?;
    }
    for v in layout.actnumsv.iter_mut() {
        *v = p.i32("actnumsv")?;
    }

    let rest = r.remaining();
    let metadata = match rest.strip_prefix(META_MARKER) {
        Some(json) => serde_json::from_slice::<Metadata>(json)?,
        None if rest.is_empty() => Metadata::default(),
        None => return Err(GridError::format("xtgf", "missing metadata marker")),
    };

    let mut grid = Grid::from_compact(layout)?;
    grid.set_subgrids(metadata.subgrids)?;
    grid.set_name(metadata.name);
    Ok(grid)
}

pub fn write(grid: &Grid, compress: bool) -> Result<Vec<u8>> {
    let layout = grid.layout().to_compact();
    let d = layout.dimensions;

    let expected = payload_len(d)?;
    let mut payload = Vec::with_capacity(expected);
    for v in &layout.coordsv {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for v in &layout.zcornsv {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for v in &layout.actnumsv {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    if payload.len() != expected {
        return Err(GridError::format("xtgf", "layout arrays do not match the dimensions"));
    }
    let (flags, payload) = if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload)?;
        (FLAG_ZLIB, encoder.finish()?)
    } else {
        (0, payload)
    };

    let mut out = Vec::with_capacity(40 + payload.len());
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    for n in [d.ncol, d.nrow, d.nlay, payload.len()] {
        out.extend_from_slice(&(n as u64).to_le_bytes());
    }
    out.extend_from_slice(&payload);
    out.extend_from_slice(META_MARKER);
    let metadata = Metadata {
        name: grid.name().map(str::to_string),
        subgrids: grid.get_subgrids(),
    };
    serde_json::to_writer(&mut out, &metadata)?;
    Ok(out)
}
