// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/array.rs - Typed raw arrays for the grid construction boundary.
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
 * # `array` Module
 *
 * Callers that build a grid from raw buffers (for instance when bridging
 * from another numeric library) hand over a [RawArray]: a flat buffer tagged
 * with its element type and a logical C-order shape. The grid constructors
 * check both before touching the data, so a buffer of the wrong precision is
 * rejected instead of being silently reinterpreted.
 */

use std::fmt;

/// Element type of a [RawArray].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Float64,
    Float32,
    Int32,
    UInt8,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Int32 => "int32",
            DType::UInt8 => "uint8",
        };
        f.write_str(name)
    }
}

/// The typed payload of a [RawArray].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    UInt8(Vec<u8>),
}

impl ArrayData {
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Float64(_) => DType::Float64,
            ArrayData::Float32(_) => DType::Float32,
            ArrayData::Int32(_) => DType::Int32,
            ArrayData::UInt8(_) => DType::UInt8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float64(v) => v.len(),
            ArrayData::Float32(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::UInt8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A flat buffer plus its logical C-order shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    pub shape: Vec<usize>,
    pub data: ArrayData,
}

impl RawArray {
    pub fn new(shape: &[usize], data: ArrayData) -> Self {
        Self {
            shape: shape.to_vec(),
            data,
        }
    }

    /// A zero-filled array of the given element type and shape.
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let n = shape.iter().product();
        let data = match dtype {
            DType::Float64 => ArrayData::Float64(vec![0.0; n]),
            DType::Float32 => ArrayData::Float32(vec![0.0; n]),
            DType::Int32 => ArrayData::Int32(vec![0; n]),
            DType::UInt8 => ArrayData::UInt8(vec![0; n]),
        };
        Self::new(shape, data)
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Whether the buffer length agrees with the product of the shape.
    pub fn is_consistent(&self) -> bool {
        self.shape.iter().product::<usize>() == self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_matches_shape() {
        let a = RawArray::zeros(&[2, 3, 6], DType::Float64);
        assert_eq!(a.dtype(), DType::Float64);
        assert_eq!(a.data.len(), 36);
        assert!(a.is_consistent());

        let b = RawArray::new(&[2, 2], ArrayData::Int32(vec![1, 2, 3]));
        assert!(!b.is_consistent());
    }

    #[test]
    fn test_dtype_names() {
        assert_eq!(DType::Float32.to_string(), "float32");
        assert_eq!(DType::UInt8.to_string(), "uint8");
    }
}
