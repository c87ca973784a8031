// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error type for the corner-point grid library.
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

use thiserror::Error;

use crate::array::DType;

/// Every failure the library reports.
///
/// Variants are kept distinct so callers can branch on the kind of failure
/// rather than on message text:
///
/// * [GridError::DType] and [GridError::Shape] are construction errors.
/// * [GridError::IncorrectSize] and [GridError::NearZeroHeight] are geometry
///   errors found while answering a query.
/// * [GridError::Format] and [GridError::UnexpectedEof] are decode errors.
/// * [GridError::UnknownMetric], [GridError::UnknownFormat] and
///   [GridError::InvalidArgument] are usage errors.
#[derive(Debug, Error)]
pub enum GridError {
    /// A raw array handed to a constructor has the wrong element type.
    #[error("The dtype of the {array} must be {expected}, got {found}")]
    DType {
        array: &'static str,
        expected: &'static str,
        found: DType,
    },

    /// A raw array handed to a constructor has an inconsistent shape.
    #[error("{0}")]
    Shape(String),

    /// A backing array no longer matches the grid dimensions.
    #[error("incorrect size of {array}: expected {expected} elements, found {found}")]
    IncorrectSize {
        array: &'static str,
        expected: usize,
        found: usize,
    },

    /// A pillar used by the cell has (nearly) the same depth at both ends.
    #[error("cell ({i}, {j}, {k}) has near zero height")]
    NearZeroHeight { i: usize, j: usize, k: usize },

    /// Geometry was requested for an inactive cell with `activeonly` set.
    #[error("cell ({i}, {j}, {k}) is inactive")]
    InactiveCell { i: usize, j: usize, k: usize },

    #[error("Unknown metric: {0:?}")]
    UnknownMetric(String),

    #[error("Unknown grid format: {0:?}")]
    UnknownFormat(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed input for the named file format.
    #[error("invalid {format} data: {message}")]
    Format {
        format: &'static str,
        message: String,
    },

    /// The input ended in the middle of a keyword or record.
    #[error("end-of-file while reading keyword {keyword:?}")]
    UnexpectedEof { keyword: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;

impl GridError {
    pub(crate) fn format(format: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn eof(keyword: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            keyword: keyword.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
