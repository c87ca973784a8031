// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/roff/binary.rs - ROFF binary variant.
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

use tracing::debug;

use super::{Field, Tag, Value};
use crate::error::{GridError, Result};
use crate::io::ByteReader;

fn read_count(r: &mut ByteReader, name: &str) -> Result<usize> {
    let n = r.i32(name)?;
    usize::try_from(n).map_err(|_| GridError::format("roff", format!("negative length {n} for {name:?}")))
}

fn read_array(r: &mut ByteReader, kind: &str, name: &str) -> Result<Value> {
    let n = read_count(r, name)?;
    Ok(match kind {
        "char" => Value::CharArray((0..n).map(|_| r.cstr(name).map(str::to_string)).collect::<Result<_>>()?),
        "bool" => Value::BoolArray(r.take(n, name)?.iter().map(|&b| b != 0).collect()),
        "byte" => Value::ByteArray(r.take(n, name)?.to_vec()),
        "int" => Value::IntArray((0..n).map(|_| r.i32(name)).collect::<Result<_>>()?),
        "float" => Value::FloatArray((0..n).map(|_| r.f32(name)).collect::<Result<_>>()?),
        "double" => Value::DoubleArray((0..n).map(|_| r.f64(name)).collect::<Result<_>>()?),
        _ => return Err(GridError::format("roff", format!("unknown type {kind:?} for {name:?}"))),
    })
}

fn read_scalar(r: &mut ByteReader, kind: &str, name: &str) -> Result<Value> {
    Ok(match kind {
        "char" => Value::Char(r.cstr(name)?.to_string()),
        "bool" => Value::Bool(r.u8(name)? != 0),
        "byte" => Value::Byte(r.u8(name)?),
        "int" => Value::Int(r.i32(name)?),
        "float" => Value::Float(r.f32(name)?),
        "double" => Value::Double(r.f64(name)?),
        _ => return Err(GridError::format("roff", format!("unknown type {kind:?} for {name:?}"))),
    })
}

/// Parses everything after the `roff-bin` magic up to the `eof` tag.
pub(super) fn parse(data: &[u8]) -> Result<Vec<Tag>> {
    let mut r = ByteReader::new(data);
    r.cstr("roff-bin")?;

    let mut tags = Vec::new();
    while !r.is_empty() {
        let word = r.cstr("tag")?;
        if word.starts_with('#') {
            continue;
        }
        if word != "tag" {
            return Err(GridError::format("roff", format!("expected tag, found {word:?}")));
        }
        let mut tag = Tag::new(r.cstr("tag")?);
        loop {
            let kind = r.cstr(&tag.name)?;
            if kind == "endtag" {
                break;
            }
            let (name, value) = if kind == "array" {
                let kind = r.cstr(&tag.name)?;
                let name = r.cstr(&tag.name)?;
                (name, read_array(&mut r, kind, name)?)
            } else {
                let name = r.cstr(&tag.name)?;
                if tag.name == "filedata" && name == "byteswaptest" {
                    let probe = r.clone().i32(name)?;
                    if probe != 1 && probe.swap_bytes() == 1 {
                        r.big_endian = !r.big_endian;
                        debug!("roff byteswaptest is swapped; reading big-endian={}", r.big_endian);
                    }
                }
                (name, read_scalar(&mut r, kind, name)?)
            };
            tag.fields.push(Field {
                name: name.to_string(),
                value,
            });
        }
        let done = tag.name == "eof";
        tags.push(tag);
        if done {
            break;
        }
    }
    Ok(tags)
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

fn put_count(out: &mut Vec<u8>, n: usize) {
    out.extend_from_slice(&(n as i32).to_le_bytes());
}

/// Little-endian output.
pub(super) fn serialize(tags: &[Tag]) -> Vec<u8> {
    let mut out = Vec::new();
    put_str(&mut out, "roff-bin");
    put_str(&mut out, "#ROFF file#");
    put_str(&mut out, "#Creator: cpgrid#");
    for tag in tags {
        put_str(&mut out, "tag");
        put_str(&mut out, &tag.name);
        for field in &tag.fields {
            let value = &field.value;
            if value.is_array() {
                put_str(&mut out, "array");
            }
            put_str(&mut out, value.type_name());
            put_str(&mut out, &field.name);
            if value.is_array() {
                put_count(&mut out, value.len());
            }
            match value {
                Value::Char(s) => put_str(&mut out, s),
                Value::Bool(b) => out.push(u8::from(*b)),
                Value::Byte(b) => out.push(*b),
                Value::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
                Value::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
                Value::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
                Value::CharArray(v) => v.iter().for_each(|s| put_str(&mut out, s)),
                Value::BoolArray(v) => out.extend(v.iter().map(|&b| u8::from(b))),
                Value::ByteArray(v) => out.extend_from_slice(v),
                Value::IntArray(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
                Value::FloatArray(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
                Value::DoubleArray(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            }
        }
        put_str(&mut out, "endtag");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big_endian_file() -> Vec<u8> {
        let mut out = Vec::new();
        for word in ["roff-bin", "#comment#", "tag", "filedata", "int", "byteswaptest"] {
            put_str(&mut out, word);
        }
        out.extend_from_slice(&1i32.to_be_bytes());
        for word in ["endtag", "tag", "dimensions", "int", "nX"] {
            put_str(&mut out, word);
        }
        out.extend_from_slice(&4i32.to_be_bytes());
        for word in ["array", "float", "data"] {
            put_str(&mut out, word);
        }
        out.extend_from_slice(&2i32.to_be_bytes());
        out.extend_from_slice(&1.5f32.to_be_bytes());
        out.extend_from_slice(&(-2.0f32).to_be_bytes());
        for word in ["endtag", "tag", "eof", "endtag"] {
            put_str(&mut out, word);
        }
        out
    }

    #[test]
    fn test_byteswap_detection() {
        let tags = parse(&big_endian_file()).unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].get("byteswaptest"), Some(&Value::Int(1)));
        assert_eq!(tags[1].get("nX"), Some(&Value::Int(4)));
        assert_eq!(tags[1].get("data"), Some(&Value::FloatArray(vec![1.5, -2.0])));
        assert_eq!(tags[2].name, "eof");
    }

    #[test]
    fn test_serialize_parse() {
        let tags = vec![
            Tag::new("t")
                .with("c", Value::CharArray(vec!["a b".into(), String::new()]))
                .with("b", Value::Bool(true))
                .with("d", Value::DoubleArray(vec![0.1, 1e300])),
            Tag::new("eof"),
        ];
        assert_eq!(parse(&serialize(&tags)).unwrap(), tags);
    }

    #[test]
    fn test_truncated() {
        let mut data = big_endian_file();
        data.truncate(57);
        assert!(matches!(parse(&data), Err(GridError::UnexpectedEof { .. })));
    }
}
