// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/eclipse/grdecl.rs - GRDECL keyword text.
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

use tracing::debug;

use super::{Keyword, Values};
use crate::error::{GridError, Result};

/// Keywords that take no data and no terminating slash.
const FLAG_KEYWORDS: [&str; 6] = ["GRID", "ECHO", "NOECHO", "EDIT", "PROPS", "END"];

#[derive(Debug, PartialEq)]
enum ParserState {
    Keyword,
    Data(String, Vec<String>),
}

/// Splits the text into keywords with their raw (unexpanded) tokens.
fn tokenize(bytes: &[u8]) -> Result<Vec<(String, Vec<String>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .quote(b'\'')
        .flexible(true)
        .has_headers(false)
        .from_reader(bytes);

    let mut keywords = Vec::new();
    let mut state = ParserState::Keyword;

    for result in reader.byte_records() {
        let record = result.map_err(|e| GridError::format("grdecl", e.to_string()))?;
        let fields = record
            .iter()
            .flat_map(|f| f.split(|&b| b == b'\t'))
            .filter(|f| !f.is_empty());
        for field in fields {
            if field.starts_with(b"--") {
                break;
            }
            let field = String::from_utf8_lossy(field);
            state = match state {
                ParserState::Keyword => {
                    let name = field.to_uppercase();
                    if FLAG_KEYWORDS.contains(&name.as_str()) {
                        ParserState::Keyword
                    } else {
                        ParserState::Data(name, Vec::new())
                    }
                }
                ParserState::Data(name, mut tokens) => match field.strip_suffix('/') {
                    Some(last) => {
                        if !last.is_empty() {
                            tokens.push(last.to_string());
                        }
                        keywords.push((name, tokens));
                        ParserState::Keyword
                    }
                    None => {
                        tokens.push(field.into_owned());
                        ParserState::Data(name, tokens)
                    }
                },
            };
        }
    }

    match state {
        ParserState::Keyword => Ok(keywords),
        ParserState::Data(name, _) => Err(GridError::eof(name)),
    }
}

/// Expands `n*value` repeats and parses every value, failing once more than
/// `limit` values come out.
fn expand<T: FromStr + Clone>(name: &str, tokens: &[String], limit: usize) -> Result<Vec<T>> {
    let bad = |token: &str| GridError::format("grdecl", format!("bad value {token:?} in {name}"));
    let too_many = || GridError::format("grdecl", format!("{name} holds more than {limit} values"));
    let mut values = Vec::with_capacity(tokens.len().min(limit));
    for token in tokens {
        let (count, value) = match token.split_once('*') {
            Some((count, value)) => (count.parse::<usize>().map_err(|_| bad(token.as_str()))?, value),
            None => (1, token.as_str()),
        };
        if count > limit - values.len() {
            return Err(too_many());
        }
        let value = value.parse::<T>().map_err(|_| bad(token.as_str()))?;
        values.extend(std::iter::repeat_n(value, count));
    }
    Ok(values)
}

/// Parses the grid keywords; everything else is skipped. No keyword may
/// expand past the size `SPECGRID` gives it.
pub(super) fn parse(bytes: &[u8]) -> Result<Vec<Keyword>> {
    let raw = tokenize(bytes)?;
    let specgrid = match raw.iter().find(|(name, _)| name == "SPECGRID") {
        Some((name, tokens)) => Keyword::new(name.as_str(), Values::Int(expand(name, tokens.get(..3).unwrap_or(tokens), 3)?)),
        None => return Err(GridError::format("grdecl", "missing SPECGRID")),
    };
    let [ncoord, nzcorn, ntotal] = super::keyword_lens("grdecl", super::dimensions_at("grdecl", &specgrid, 0)?)?;

    let mut keywords = Vec::new();
    for (name, tokens) in raw {
        let values = match name.as_str() {
            "SPECGRID" => Values::Int(expand(&name, tokens.get(..3).unwrap_or(&tokens), 3)?),
            "COORD" => Values::Double(expand(&name, &tokens, ncoord)?),
            "ZCORN" => Values::Real(expand(&name, &tokens, nzcorn)?),
            "ACTNUM" => Values::Int(expand(&name, &tokens, ntotal)?),
            _ => {
                debug!("skipping GRDECL keyword {name}");
                continue;
            }
        };
        debug!("{name} with {} values", values.len());
        keywords.push(Keyword::new(name, values));
    }
    Ok(keywords)
}

fn put_values<T: Display>(out: &mut String, values: &[T], per_line: usize) {
    for line in values.chunks(per_line) {
        for v in line {
            let _ = write!(out, " {v}");
        }
        out.push('\n');
    }
}

pub(super) fn serialize(dims: [i32; 3], keywords: &[Keyword]) -> Vec<u8> {
    let [nx, ny, nz] = dims;
    let mut out = String::new();
    let _ = writeln!(out, "SPECGRID\n {nx} {ny} {nz} 1 F /\n");
    for keyword in keywords {
        let _ = writeln!(out, "{}", keyword.name);
        match &keyword.values {
            Values::Int(v) => put_values(&mut out, v, 12),
            Values::Real(v) => put_values(&mut out, v, 8),
            Values::Double(v) => put_values(&mut out, v, 6),
            Values::Logical(v) => {
                let flags = v.iter().map(|&b| if b { 'T' } else { 'F' }).collect::<Vec<_>>();
                put_values(&mut out, &flags, 12);
            }
            Values::Char(v) => {
                let quoted = v.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>();
                put_values(&mut out, &quoted, 4);
            }
        }
        out.push_str("/\n\n");
    }
    out.into_bytes()
}
