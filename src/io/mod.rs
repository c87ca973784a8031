// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io/mod.rs - Grid file formats.
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
 * # `io` Module
 *
 * Every codec turns bytes into a [Grid] and back. Format selection is
 * explicit; [GridFormat::from_extension] is only a convenience guess.
 *
 * ## Usage Example
 *
 * ```no_run
 * use cpgrid::io::GridFormat;
 * use cpgrid::Grid;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let grid = Grid::from_file("reek.egrid", Some(GridFormat::Egrid))?;
 *     grid.to_file("reek.roff", GridFormat::RoffBinary)?;
 *     Ok(())
 * }
 * ```
 */

mod bytes;
pub mod eclipse;
pub mod roff;
pub mod xtgf;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GridError, Result};
use crate::grid::Grid;

pub(crate) use bytes::ByteReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridFormat {
    RoffAscii,
    RoffBinary,
    Grdecl,
    Bgrdecl,
    Egrid,
    Xtgf,
}

impl GridFormat {
    pub const ALL: [GridFormat; 6] = [
        GridFormat::RoffAscii,
        GridFormat::RoffBinary,
        GridFormat::Grdecl,
        GridFormat::Bgrdecl,
        GridFormat::Egrid,
        GridFormat::Xtgf,
    ];

    /// Guesses the format from a file extension.
    pub fn from_extension(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "roff" | "roffbin" => Ok(GridFormat::RoffBinary),
            "roffasc" => Ok(GridFormat::RoffAscii),
            "grdecl" => Ok(GridFormat::Grdecl),
            "bgrdecl" => Ok(GridFormat::Bgrdecl),
            "egrid" => Ok(GridFormat::Egrid),
            "xtgf" | "xtgcpgeom" => Ok(GridFormat::Xtgf),
            _ => Err(GridError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GridFormat::RoffAscii => "roff_asc",
            GridFormat::RoffBinary => "roff_bin",
            GridFormat::Grdecl => "grdecl",
            GridFormat::Bgrdecl => "bgrdecl",
            GridFormat::Egrid => "egrid",
            GridFormat::Xtgf => "xtgf",
        }
    }
}

impl FromStr for GridFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "roff_asc" | "roff_ascii" => Ok(GridFormat::RoffAscii),
            "roff_bin" | "roff_binary" | "roff" => Ok(GridFormat::RoffBinary),
            "grdecl" => Ok(GridFormat::Grdecl),
            "bgrdecl" => Ok(GridFormat::Bgrdecl),
            "egrid" => Ok(GridFormat::Egrid),
            "xtgf" | "xtgcpgeom" => Ok(GridFormat::Xtgf),
            _ => Err(GridError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for GridFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Writer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Compress the numeric payload of the native dump.
    pub compress: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Decodes a grid. ROFF input is accepted as either variant, whichever the
/// header announces.
pub fn read(bytes: &[u8], format: GridFormat) -> Result<Grid> {
    match format {
        GridFormat::RoffAscii | GridFormat::RoffBinary => roff::read_grid(bytes),
        GridFormat::Grdecl => eclipse::read_grdecl(bytes),
        GridFormat::Bgrdecl => eclipse::read_bgrdecl(bytes),
        GridFormat::Egrid => eclipse::read_egrid(bytes),
        GridFormat::Xtgf => xtgf::read(bytes),
    }
}

pub fn write(grid: &Grid, format: GridFormat) -> Result<Vec<u8>> {
    write_with(grid, format, &WriteOptions::default())
}

pub fn write_with(grid: &Grid, format: GridFormat, options: &WriteOptions) -> Result<Vec<u8>> {
    match format {
        GridFormat::RoffAscii => roff::write_grid(grid, false),
        GridFormat::RoffBinary => roff::write_grid(grid, true),
        GridFormat::Grdecl => eclipse::write_grdecl(grid),
        GridFormat::Bgrdecl => eclipse::write_bgrdecl(grid),
        GridFormat::Egrid => eclipse::write_egrid(grid),
        GridFormat::Xtgf => xtgf::write(grid, options.compress),
    }
}

impl Grid {
    /// Reads a grid file, guessing the format from the extension when
    /// `format` is `None`. The file stem becomes the grid name.
    pub fn from_file(path: impl AsRef<Path>, format: Option<GridFormat>) -> Result<Self> {
        let path = path.as_ref();
        let format = match format {
            Some(f) => f,
            None => GridFormat::from_extension(path)?,
        };
        info!("reading {format} grid from {}", path.display());
        let bytes = fs::read(path)?;
        let mut grid = read(&bytes, format)?;
        if grid.name().is_none() {
            grid.set_name(path.file_stem().map(|s| s.to_string_lossy().into_owned()));
        }
        Ok(grid)
    }

    pub fn to_file(&self, path: impl AsRef<Path>, format: GridFormat) -> Result<()> {
        self.to_file_with(path, format, &WriteOptions::default())
    }

    pub fn to_file_with(&self, path: impl AsRef<Path>, format: GridFormat, options: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        info!("writing {format} grid to {}", path.display());
        fs::write(path, write_with(self, format, options)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        for (name, format) in [
            ("roff_asc", GridFormat::RoffAscii),
            ("roff_ascii", GridFormat::RoffAscii),
            ("roff_bin", GridFormat::RoffBinary),
            ("roff_binary", GridFormat::RoffBinary),
            ("roff", GridFormat::RoffBinary),
            ("grdecl", GridFormat::Grdecl),
            ("bgrdecl", GridFormat::Bgrdecl),
            ("egrid", GridFormat::Egrid),
            ("xtgf", GridFormat::Xtgf),
            ("xtgcpgeom", GridFormat::Xtgf),
        ] {
            assert_eq!(name.parse::<GridFormat>().unwrap(), format);
        }
        for format in GridFormat::ALL {
            assert_eq!(format.name().parse::<GridFormat>().unwrap(), format);
        }
        assert!(matches!(
            "stupid".parse::<GridFormat>(),
            Err(GridError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_extension_guess() {
        assert_eq!(GridFormat::from_extension("a/b.EGRID").unwrap(), GridFormat::Egrid);
        assert_eq!(GridFormat::from_extension("b.roff").unwrap(), GridFormat::RoffBinary);
        assert!(GridFormat::from_extension("b.txt").is_err());
        assert!(GridFormat::from_extension("noext").is_err());
    }
}
