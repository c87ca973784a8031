// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  gridinfo.rs - Summary demo for corner-point grid files.
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

use clap::Parser;

use cpgrid::{Grid, GridFormat, MetricOptions, SubgridSelector};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The grid file to read.
    file: String,

    /// File format, guessed from the extension when omitted.
    #[arg(short, long)]
    format: Option<GridFormat>,

    /// Print the geometry summary as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let grid = match Grid::from_file(&args.file, args.format) {
        Ok(grid) => grid,
        Err(error) => {
            eprintln!("Error reading file {:?}: {}", &args.file, error);
            return;
        }
    };

    if args.json {
        match grid.get_geometrics(false).map(|g| serde_json::to_string_pretty(&g)) {
            Ok(Ok(json)) => println!("{json}"),
            Ok(Err(error)) => eprintln!("Error serializing summary: {error}"),
            Err(error) => eprintln!("Error summarizing grid: {error}"),
        }
        return;
    }

    print!("{}", grid.describe());

    match grid.get_dz(&MetricOptions::default()) {
        Ok(dz) => println!(
            "  dz:          mean {:.3}, min {:.3}, max {:.3}",
            dz.mean().unwrap_or(f64::NAN),
            dz.min().unwrap_or(f64::NAN),
            dz.max().unwrap_or(f64::NAN)
        ),
        Err(error) => eprintln!("Error computing dz: {error}"),
    }
    match grid.get_bulk_volume(true) {
        Ok(vol) => println!("  bulk volume: {:.1}", vol.sum()),
        Err(error) => eprintln!("Error computing bulk volume: {error}"),
    }
    let selectors: Vec<SubgridSelector> = match grid.subgrids() {
        Some(subgrids) => subgrids.iter().map(|s| SubgridSelector::Name(&s.name)).collect(),
        None => vec![SubgridSelector::Index(1)],
    };
    for selector in selectors {
        let label = match selector {
            SubgridSelector::Name(name) => name.to_string(),
            SubgridSelector::Index(_) => "all layers".to_string(),
        };
        match grid.estimate_design(Some(selector)) {
            Ok(Some(design)) => println!("  design:      {label}: {} (dz {:.3})", design.design, design.dzsimbox),
            Ok(None) => println!("  design:      {label}: irregular"),
            Err(error) => eprintln!("Error estimating design of {label}: {error}"),
        }
    }
    match grid.generate_hash() {
        Ok(hash) => println!("  sha256:      {hash}"),
        Err(error) => eprintln!("Error hashing grid: {error}"),
    }
}
