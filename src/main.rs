///
/// ovl2gpx main module
///
/// Copyright (C) 2025 Ralf Horstmann <ralf@ackstorm.de>
///
/// This program is free software; you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation; either version 2 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program; if not, write to the Free Software
/// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301, USA.
///
use std::env;
use std::fs;
use std::io;
use std::io::Read;
use std::io::Write;

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};

mod bytestream;
mod error;
mod format;
mod geodata;
mod ggv_bin;
mod ggv_bin_v2;
mod ggv_bin_v34;
mod ggv_ovl;
mod ggv_xml;
mod gpx;

use crate::format::{Format, FormatRegistry};
use crate::gpx::GpxFormat;

/// Settings from the command line and the environment.
#[derive(Debug, Default)]
struct Options {
    debug: u8,
    intype: Option<String>,
    infile: Option<String>,
    outfile: Option<String>,
    creator: String,
    testmode: bool,
}

impl Options {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            debug: matches.get_one::<u8>("debug").copied().unwrap_or(0),
            intype: matches.get_one::<String>("intype").cloned(),
            infile: matches
                .get_one::<String>("infile")
                .or(matches.get_one::<String>("infile_p"))
                .cloned(),
            outfile: matches
                .get_one::<String>("outfile")
                .or(matches.get_one::<String>("outfile_p"))
                .cloned(),
            creator: env::var("OVL2GPX_CREATOR").unwrap_or_else(|_| String::from("ovl2gpx")),
            testmode: env::var_os("OVL2GPX_TESTMODE").is_some(),
        }
    }
}

fn command(readers: Vec<&'static str>, writers: Vec<&'static str>) -> Command {
    Command::new("ovl2gpx")
        .version("1.0")
        .about(
            "Geogrid-Viewer OVL to GPX Converter. The input and output file \
             options accept '-' for stdin or stdout. If no output file is \
             given, the GPX output code will not run (useful for debugging).",
        )
        .arg(
            Arg::new("infile_p")
                .value_name("infile")
                .required(false)
                .help("input file (alternative to -f)"),
        )
        .arg(
            Arg::new("outfile_p")
                .value_name("outfile")
                .required(false)
                .help("output file (alternative to -F)"),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .value_name("level")
                .value_parser(clap::value_parser!(u8).range(0..=9))
                .help("debug <level> (0..9)"),
        )
        .arg(
            Arg::new("intype")
                .value_name("type")
                .short('i')
                .value_parser(readers)
                .help("input <type>"),
        )
        .arg(
            Arg::new("infile")
                .value_name("file")
                .short('f')
                .help("input <file>"),
        )
        .arg(
            Arg::new("otype")
                .value_name("type")
                .short('o')
                .value_parser(writers)
                .help("output <type>"),
        )
        .arg(
            Arg::new("outfile")
                .value_name("file")
                .short('F')
                .help("output <file>"),
        )
}

fn read_input(infile: Option<&str>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match infile {
        None | Some("-") => {
            io::stdin()
                .read_to_end(&mut buffer)
                .context("couldn't read stdin")?;
        }
        Some(path) => {
            buffer = fs::read(path)
                .with_context(|| format!("couldn't read file: {}", path))?;
        }
    }
    Ok(buffer)
}

fn write_output(data: &str, outfile: &str) -> Result<()> {
    if outfile == "-" {
        io::stdout()
            .write_all(data.as_bytes())
            .context("couldn't write stdout")?;
    } else {
        fs::write(outfile, data)
            .with_context(|| format!("couldn't write file: {}", outfile))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let registry = FormatRegistry::new();
    let matches = command(registry.reader_names(), registry.writer_names()).get_matches();
    let options = Options::from_matches(&matches);
    let registry = registry.with_debug(options.debug);

    let indata = read_input(options.infile.as_deref())?;

    let format = match &options.intype {
        Some(intype) => registry.by_name(intype),
        None => registry.detect(&indata),
    }
    .ok_or_else(|| anyhow!("input format not given or detected."))?;
    if options.debug >= 1 {
        eprintln!("main: using input format: {}", format.name());
    }

    // decoding runs even without an outfile, which exercises the
    // input code only
    let geodata = format.read(&indata)?;
    drop(indata);

    let Some(outfile) = options.outfile.as_deref() else {
        return Ok(());
    };

    let mut gpx = GpxFormat::new()
        .with_creator(&options.creator)
        .with_testmode(options.testmode);
    gpx.set_debug(options.debug);
    let result = gpx.write(&geodata)?;
    write_output(&result, outfile)
}
