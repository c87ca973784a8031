// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/roff/ascii.rs - ROFF text variant.
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

use std::fmt::{Display, Write};
use std::str::FromStr;

use super::{Field, Tag, Value};
use crate::error::{GridError, Result};

/// Whitespace separated words. `"..."` is one word with the quotes removed
/// and `#...#` is a comment.
struct Tokens<'a> {
    text: &'a str,
}

impl<'a> Tokens<'a> {
    fn next_word(&mut self, context: &str) -> Result<&'a str> {
        loop {
            self.text = self.text.trim_start();
            let mut chars = self.text.chars();
            let delimiter = match chars.next() {
                None => return Err(GridError::eof(context)),
                Some(c @ ('#' | '"')) => c,
                Some(_) => {
                    let end = self.text.find(char::is_whitespace).unwrap_or(self.text.len());
                    let (word, rest) = self.text.split_at(end);
                    self.text = rest;
                    return Ok(word);
                }
            };
            let body = &self.text[1..];
            let end = body.find(delimiter).ok_or_else(|| GridError::eof(context))?;
            self.text = &body[end + 1..];
            if delimiter == '"' {
                return Ok(&body[..end]);
            }
        }
    }

    fn at_end(&self) -> bool {
        // Skip trailing comments.
        Tokens { text: self.text }.next_word("").is_err()
    }

    fn parse<T: FromStr>(&mut self, name: &str) -> Result<T> {
        let word = self.next_word(name)?;
        word.parse()
            .map_err(|_| GridError::format("roff", format!("bad value {word:?} for {name:?}")))
    }

    fn parse_bool(&mut self, name: &str) -> Result<bool> {
        Ok(self.parse::<u8>(name)? != 0)
    }

    fn many<T>(&mut self, n: usize, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        (0..n).map(|_| f(self)).collect()
    }
}

fn read_value(t: &mut Tokens, kind: &str, name: &str, count: Option<usize>) -> Result<Value> {
    Ok(match (kind, count) {
        ("char", None) => Value::Char(t.next_word(name)?.to_string()),
        ("bool", None) => Value::Bool(t.parse_bool(name)?),
        ("byte", None) => Value::Byte(t.parse(name)?),
        ("int", None) => Value::Int(t.parse(name)?),
        ("float", None) => Value::Float(t.parse(name)?),
        ("double", None) => Value::Double(t.parse(name)?),
        ("char", Some(n)) => Value::CharArray(t.many(n, |t| t.next_word(name).map(str::to_string))?),
        ("bool", Some(n)) => Value::BoolArray(t.many(n, |t| t.parse_bool(name))?),
        ("byte", Some(n)) => Value::ByteArray(t.many(n, |t| t.parse(name))?),
        ("int", Some(n)) => Value::IntArray(t.many(n, |t| t.parse(name))?),
        ("float", Some(n)) => Value::FloatArray(t.many(n, |t| t.parse(name))?),
        ("double", Some(n)) => Value::DoubleArray(t.many(n, |t| t.parse(name))?),
        _ => return Err(GridError::format("roff", format!("unknown type {kind:?} for {name:?}"))),
    })
}

pub(super) fn parse(data: &[u8]) -> Result<Vec<Tag>> {
    let text = std::str::from_utf8(data).map_err(|_| GridError::format("roff", "ASCII file is not valid UTF-8"))?;
    let mut t = Tokens { text };
    let magic = t.next_word("roff-asc")?;
    if magic != "roff-asc" {
        return Err(GridError::format("roff", format!("bad magic {magic:?}")));
    }

    let mut tags = Vec::new();
    while !t.at_end() {
        let word = t.next_word("tag")?;
        if word != "tag" {
            return Err(GridError::format("roff", format!("expected tag, found {word:?}")));
        }
        let mut tag = Tag::new(t.next_word("tag")?);
        loop {
            let kind = t.next_word(&tag.name)?;
            if kind == "endtag" {
                break;
            }
            let (kind, name, count) = if kind == "array" {
                let kind = t.next_word(&tag.name)?;
                let name = t.next_word(&tag.name)?;
                let count = t.parse::<i64>(name)?;
                let count = usize::try_from(count)
                    .map_err(|_| GridError::format("roff", format!("negative length {count} for {name:?}")))?;
                (kind, name, Some(count))
            } else {
                (kind, t.next_word(&tag.name)?, None)
            };
            let value = read_value(&mut t, kind, name, count)?;
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

fn put_values<T: Display>(out: &mut String, values: &[T], per_line: usize) {
    for line in values.chunks(per_line) {
        for v in line {
            let _ = write!(out, " {v}");
        }
        out.push('\n');
    }
}

pub(super) fn serialize(tags: &[Tag]) -> Vec<u8> {
    let mut out = String::from("roff-asc\n#ROFF file#\n#Creator: cpgrid#\n");
    for tag in tags {
        let _ = writeln!(out, "tag {}", tag.name);
        for field in &tag.fields {
            let value = &field.value;
            let kind = value.type_name();
            let name = &field.name;
            if value.is_array() {
                let _ = writeln!(out, "array {kind} {name} {}", value.len());
            } else {
                let _ = write!(out, "{kind} {name} ");
            }
            match value {
                Value::Char(s) => {
                    let _ = writeln!(out, "\"{s}\"");
                }
                Value::Bool(b) => {
                    let _ = writeln!(out, "{}", u8::from(*b));
                }
                Value::Byte(v) => {
                    let _ = writeln!(out, "{v}");
                }
                Value::Int(v) => {
                    let _ = writeln!(out, "{v}");
                }
                Value::Float(v) => {
                    let _ = writeln!(out, "{v}");
                }
                Value::Double(v) => {
                    let _ = writeln!(out, "{v}");
                }
                Value::CharArray(v) => {
                    for s in v {
                        let _ = writeln!(out, "\"{s}\"");
                    }
                }
                Value::BoolArray(v) => {
                    let bits = v.iter().map(|&b| u8::from(b)).collect::<Vec<_>>();
                    put_values(&mut out, &bits, 12);
                }
                Value::ByteArray(v) => put_values(&mut out, v, 12),
                Value::IntArray(v) => put_values(&mut out, v, 6),
                Value::FloatArray(v) => put_values(&mut out, v, 6),
                Value::DoubleArray(v) => put_values(&mut out, v, 4),
            }
        }
        out.push_str("endtag\n");
    }
    out.into_bytes()
}
