// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  gridconvert.rs - Format conversion demo for corner-point grid files.
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

use cpgrid::{Grid, GridFormat, WriteOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The grid file to read.
    input: String,

    /// The grid file to write.
    output: String,

    /// Input format, guessed from the extension when omitted.
    #[arg(long)]
    from: Option<GridFormat>,

    /// Output format, guessed from the extension when omitted.
    #[arg(long)]
    to: Option<GridFormat>,

    /// Store the native dump payload uncompressed.
    #[arg(long)]
    no_compress: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let to = match args.to.map_or_else(|| GridFormat::from_extension(&args.output), Ok) {
        Ok(format) => format,
        Err(error) => {
            eprintln!("Error choosing output format: {}", error);
            return;
        }
    };

    let grid = match Grid::from_file(&args.input, args.from) {
        Ok(grid) => grid,
        Err(error) => {
            eprintln!("Error reading file {:?}: {}", &args.input, error);
            return;
        }
    };

    let options = WriteOptions {
        compress: !args.no_compress,
    };
    if let Err(error) = grid.to_file_with(&args.output, to, &options) {
        eprintln!("Error writing file {:?}: {}", &args.output, error);
    }
}
