// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/eclipse/records.rs - Big-endian Fortran keyword records.
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

//! Every keyword is a 16 byte header record (8 character name, i32 count,
//! 4 character type) followed by data records of at most 1000 values, or 105
//! strings for `CHAR`. Each record is framed by its byte length as a
//! big-endian i32 on both sides.

use tracing::debug;

use super::{Keyword, Values};
use crate::error::{GridError, Result};
use crate::io::ByteReader;

const HEADER_LEN: i32 = 16;
const BLOCK_VALUES: usize = 1000;
const BLOCK_STRINGS: usize = 105;
const LOGICAL_TRUE: i32 = -1;

/// Byte size of one element and values per data record.
fn element_layout(kind: &[u8; 4]) -> Option<(usize, usize)> {
    match kind {
        b"INTE" | b"REAL" | b"LOGI" => Some((4, BLOCK_VALUES)),
        b"DOUB" => Some((8, BLOCK_VALUES)),
        b"CHAR" => Some((8, BLOCK_STRINGS)),
        _ => None,
    }
}

fn marker(r: &mut ByteReader, keyword: &str, expected: Option<i32>) -> Result<i32> {
    let n = r.i32(keyword)?;
    match expected {
        Some(e) if e != n => Err(GridError::format(
            "eclipse",
            format!("record marker {n} does not match {e} in {keyword:?}"),
        )),
        _ => Ok(n),
    }
}

fn read_keyword(r: &mut ByteReader) -> Result<Keyword> {
    marker(r, "header", Some(HEADER_LEN))?;
    let name = String::from_utf8_lossy(r.take(8, "header")?).trim_end().to_string();
    let count = r.i32(&name)?;
    let kind: [u8; 4] = r.array(&name)?;
    marker(r, &name, Some(HEADER_LEN))?;

    let count = usize::try_from(count)
        .map_err(|_| GridError::format("eclipse", format!("negative count {count} for {name:?}")))?;
    let (size, _) = element_layout(&kind).ok_or_else(|| {
        GridError::format(
            "eclipse",
            format!("unknown type {:?} for {name:?}", String::from_utf8_lossy(&kind)),
        )
    })?;
    debug!("{name} {} x {count}", String::from_utf8_lossy(&kind));

    let mut data = Vec::with_capacity(count.saturating_mul(size).min(r.remaining().len()));
    while data.len() < count * size {
        let len = marker(r, &name, None)?;
        let len = usize::try_from(len)
            .ok()
            .filter(|len| len % size == 0 && data.len() + len <= count * size)
            .ok_or_else(|| GridError::format("eclipse", format!("bad record length {len} in {name:?}")))?;
        data.extend_from_slice(r.take(len, &name)?);
        marker(r, &name, Some(len as i32))?;
    }

    let mut items = ByteReader::big_endian(&data);
    let values = match &kind {
        b"INTE" => Values::Int((0..count).map(|_| items.i32(&name)).collect::<Result<_>>()?),
        b"REAL" => Values::Real((0..count).map(|_| items.f32(&name)).collect::<Result<_>>()?),
        b"DOUB" => Values::Double((0..count).map(|_| items.f64(&name)).collect::<Result<_>>()?),
        b"LOGI" => Values::Logical((0..count).map(|_| items.i32(&name).map(|v| v != 0)).collect::<Result<_>>()?),
        _ => Values::Char(
            data.chunks_exact(8)
                .map(|s| String::from_utf8_lossy(s).trim_end().to_string())
                .collect(),
        ),
    };
    Ok(Keyword { name, values })
}

/// Reads keywords until the input ends.
pub fn read_records(bytes: &[u8]) -> Result<Vec<Keyword>> {
    let mut r = ByteReader::big_endian(bytes);
    let mut keywords = Vec::new();
    while !r.is_empty() {
        keywords.push(read_keyword(&mut r)?);
    }
    Ok(keywords)
}

fn padded(text: &str) -> [u8; 8] {
    let mut out = [b' '; 8];
    for (o, b) in out.iter_mut().zip(text.bytes()) {
        *o = b;
    }
    out
}

fn encode(values: &Values) -> (&'static [u8; 4], Vec<[u8; 8]>, usize) {
    // Elements are collected as 8 byte slots and cut to size on output.
    match values {
        Values::Int(v) => (b"INTE", v.iter().map(|x| widen(x.to_be_bytes())).collect(), 4),
        Values::Real(v) => (b"REAL", v.iter().map(|x| widen(x.to_be_bytes())).collect(), 4),
        Values::Double(v) => (b"DOUB", v.iter().map(|x| x.to_be_bytes()).collect(), 8),
        Values::Logical(v) => (
            b"LOGI",
            v.iter()
                .map(|&b| widen(if b { LOGICAL_TRUE } else { 0 }.to_be_bytes()))
                .collect(),
            4,
        ),
        Values::Char(v) => (b"CHAR", v.iter().map(|s| padded(s)).collect(), 8),
    }
}

fn widen(bytes: [u8; 4]) -> [u8; 8] {
    let mut out = [0; 8];
    out[..4].copy_from_slice(&bytes);
    out
}

pub fn write_records(keywords: &[Keyword]) -> Vec<u8> {
    let mut out = Vec::new();
    for keyword in keywords {
        let (kind, items, size) = encode(&keyword.values);
        out.extend_from_slice(&HEADER_LEN.to_be_bytes());
        out.extend_from_slice(&padded(&keyword.name));
        out.extend_from_slice(&(items.len() as i32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(&HEADER_LEN.to_be_bytes());

        let per_block = if kind == b"CHAR" { BLOCK_STRINGS } else { BLOCK_VALUES };
        for block in items.chunks(per_block) {
            let len = ((block.len() * size) as i32).to_be_bytes();
            out.extend_from_slice(&len);
            for item in block {
                out.extend_from_slice(&item[..size]);
            }
            out.extend_from_slice(&len);
        }
    }
    out
}
