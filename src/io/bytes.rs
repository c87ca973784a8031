// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/bytes.rs - Bounds-checked cursor over binary file contents.
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

use crate::error::{GridError, Result};

/// Reads fixed-size values from a byte slice. Running out of bytes is
/// reported as [GridError::UnexpectedEof] naming the keyword being read.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    pub big_endian: bool,
}

macro_rules! read_number {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self, keyword: &str) -> Result<$ty> {
            let bytes = self.array(keyword)?;
            Ok(if self.big_endian {
                <$ty>::from_be_bytes(bytes)
            } else {
                <$ty>::from_le_bytes(bytes)
            })
        }
    };
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            big_endian: false,
        }
    }

    pub fn big_endian(data: &'a [u8]) -> Self {
        Self {
            big_endian: true,
            ..Self::new(data)
        }
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn take(&mut self, n: usize, keyword: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| GridError::eof(keyword))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn array<const N: usize>(&mut self, keyword: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, keyword)?);
        Ok(out)
    }

    pub fn u8(&mut self, keyword: &str) -> Result<u8> {
        Ok(self.take(1, keyword)?[0])
    }

    read_number!(i32, i32);
    read_number!(u64, u64);
    read_number!(f32, f32);
    read_number!(f64, f64);

    /// A NUL-terminated string; the terminator is consumed.
    pub fn cstr(&mut self, keyword: &str) -> Result<&'a str> {
        let rest = self.remaining();
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| GridError::eof(keyword))?;
        let text = std::str::from_utf8(&rest[..len])
            .map_err(|_| GridError::format("binary", format!("non UTF-8 text in {keyword:?}")))?;
        self.pos += len + 1;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endianness() {
        let data = [0, 0, 0, 16];
        assert_eq!(ByteReader::big_endian(&data).i32("x").unwrap(), 16);
        assert_eq!(ByteReader::new(&data).i32("x").unwrap(), 16 << 24);
    }

    #[test]
    fn test_eof_names_keyword() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        match r.f64("ZCORN") {
            Err(GridError::UnexpectedEof { keyword }) => assert_eq!(keyword, "ZCORN"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(r.remaining(), [1, 2, 3]);
    }

    #[test]
    fn test_cstr() {
        let mut r = ByteReader::new(b"tag\0dimensions\0x");
        assert_eq!(r.cstr("tag").unwrap(), "tag");
        assert_eq!(r.cstr("tag").unwrap(), "dimensions");
        assert!(r.cstr("tag").is_err());
        assert_eq!(r.remaining(), b"x");
    }
}
