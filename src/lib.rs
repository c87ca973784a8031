// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Corner-point grid geometry and file formats.
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
 * # `cpgrid` Crate
 *
 * A library for 3D corner-point reservoir grids: hexahedral cells hung on
 * straight pillars, with per-corner depths so that faults can offset
 * neighbouring columns.
 *
 * The crate is organized in layers:
 *
 * 1. [layout]: The two storage layouts of the same geometry and the
 *    [CornerSource] interface every computation reads through.
 * 2. [geometry]: Cell corners, sizes, volumes, quality measures, layering
 *    design and whole-grid summaries.
 * 3. [grid]: The [Grid] aggregate with its subgrids and bookkeeping.
 * 4. [io]: ROFF, Eclipse (GRDECL, binary GRDECL, EGRID) and a native dump.
 *
 * ## Usage Example
 *
 * ```no_run
 * use cpgrid::{Grid, GridFormat, MetricOptions};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Read an Eclipse grid
 *     let grid = Grid::from_file("reek.egrid", Some(GridFormat::Egrid))?;
 *     println!("{} of {} cells active", grid.nactive(), grid.ntotal());
 *
 *     // Cell heights along the pillars
 *     let dz = grid.get_dz(&MetricOptions::default())?;
 *     println!("mean dz: {:?}", dz.mean());
 *
 *     // Convert to ROFF
 *     grid.to_file("reek.roff", GridFormat::RoffBinary)?;
 *
 *     Ok(())
 * }
 * ```
 */

pub mod array;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod layout;
pub mod property;
pub mod subgrids;

pub use array::{ArrayData, DType, RawArray};
pub use error::{GridError, Result};
pub use geometry::column::Horizon;
pub use geometry::design::{Design, DesignEstimate, SubgridSelector};
pub use geometry::geometrics::Geometrics;
pub use geometry::metrics::{Metric, MetricOptions};
pub use grid::{BoxSpec, Grid};
pub use io::{GridFormat, WriteOptions};
pub use layout::{CompactLayout, CornerSource, Dimensions, Layout, LayoutKind, LegacyLayout};
pub use property::{ContinuousProperty, DiscreteProperty, GridProperty, PropertySet};
pub use subgrids::{Subgrid, Subgrids};
