///
///  Handle Geogrid-Viewer binary overlay file format (.ovl)
///
///  Copyright (C) 2025 Ralf Horstmann <ralf@ackstorm.de>
///
///  This program is free software; you can redistribute it and/or modify
///  it under the terms of the GNU General Public License as published by
///  the Free Software Foundation; either version 2 of the License, or
///  (at your option) any later version.
///
///  This program is distributed in the hope that it will be useful,
///  but WITHOUT ANY WARRANTY; without even the implied warranty of
///  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
///  GNU General Public License for more details.
///
///  You should have received a copy of the GNU General Public License
///  along with this program; if not, write to the Free Software
///  Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301, USA.
///
use std::fmt;

use anyhow::{Context, Result};
use encoding_rs::mem::decode_latin1;

use crate::bytestream::ByteStream;
use crate::error::BinError;
use crate::format::Format;
use crate::geodata::Geodata;
use crate::ggv_bin_v2::ggv_bin_read_v2;
use crate::ggv_bin_v34::ggv_bin_read_v34;

/// Size of the magic block at the start of every binary overlay and
/// of the separator between V3/V4 blocks.
pub const MAGIC_LEN: usize = 0x17;

const MAGIC_V2: &[u8] = b"DOMGVCRD Ovlfile V2.0";
const MAGIC_V3: &[u8] = b"DOMGVCRD Ovlfile V3.0";
const MAGIC_V4: &[u8] = b"DOMGVCRD Ovlfile V4.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvlVersion {
    V2,
    V3,
    V4,
}

impl OvlVersion {
    fn from_magic(magic: &[u8]) -> Option<Self> {
        if magic.starts_with(MAGIC_V2) {
            Some(OvlVersion::V2)
        } else if magic.starts_with(MAGIC_V3) {
            Some(OvlVersion::V3)
        } else if magic.starts_with(MAGIC_V4) {
            Some(OvlVersion::V4)
        } else {
            None
        }
    }
}

impl fmt::Display for OvlVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OvlVersion::V2 => write!(f, "2.0"),
            OvlVersion::V3 => write!(f, "3.0"),
            OvlVersion::V4 => write!(f, "4.0"),
        }
    }
}

/// Turns a raw latin1 text field into a printable name: cut at the
/// first NUL, drop control characters, collapse whitespace runs.
pub fn ggv_bin_simplify(raw: &[u8]) -> String {
    let text = match raw.iter().position(|&c| c == b'\0') {
        Some(end) => &raw[..end],
        None => raw,
    };
    decode_latin1(text)
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn ggv_bin_read_text16(
    stream: &mut ByteStream,
    descr: &'static str,
) -> Result<String, BinError> {
    let text = ggv_bin_simplify(stream.read_text16(descr)?);
    if stream.debug() >= 2 {
        eprintln!("bin: {} = {:?}", descr, text);
    }
    Ok(text)
}

pub(crate) fn ggv_bin_read_text32(
    stream: &mut ByteStream,
    descr: &'static str,
) -> Result<String, BinError> {
    let text = ggv_bin_simplify(stream.read_text32(descr)?);
    if stream.debug() >= 2 {
        eprintln!("bin: {} = {:?}", descr, text);
    }
    Ok(text)
}

/// Optional embedded map name. The first four bytes of the block are
/// an unknown sub-header.
pub(crate) fn ggv_bin_read_map_name(
    stream: &mut ByteStream,
    header_len: u16,
) -> Result<(), BinError> {
    let block = stream.read_bytes(header_len.into(), "map name")?;
    if stream.debug() >= 2 {
        let name = block.get(4..).unwrap_or_default();
        eprintln!("bin: name = {:?}", ggv_bin_simplify(name));
    }
    Ok(())
}

fn ggv_bin_read_magic(stream: &mut ByteStream) -> Result<Option<OvlVersion>, BinError> {
    let magic = stream.read_bytes(MAGIC_LEN as i64, "magic")?;
    if stream.debug() >= 2 {
        eprintln!("bin: header = {}", ggv_bin_simplify(magic));
    }
    Ok(OvlVersion::from_magic(magic))
}

/// Checks the magic block. Never fails; anything unknown or too short
/// is answered with false.
pub fn ggv_bin_probe(buf: &[u8]) -> bool {
    let mut stream = ByteStream::new(buf);
    matches!(ggv_bin_read_magic(&mut stream), Ok(Some(_)))
}

/// Decodes a complete binary overlay into a fresh sink.
pub fn ggv_bin_decode(buf: &[u8], debug: u8) -> Result<Geodata, BinError> {
    let mut stream = ByteStream::new(buf).with_debug(debug);
    let mut geodata = Geodata::new().with_debug(debug);
    let version = ggv_bin_read_magic(&mut stream)?.ok_or(BinError::UnsupportedFormat)?;
    if debug >= 1 {
        eprintln!("bin: version {}", version);
    }
    match version {
        OvlVersion::V2 => ggv_bin_read_v2(&mut stream, &mut geodata)?,
        OvlVersion::V3 | OvlVersion::V4 => ggv_bin_read_v34(&mut stream, &mut geodata)?,
    }
    if debug >= 2 {
        eprintln!(
            "bin: fpos: 0x{:x}, size: 0x{:x}, remaining: {}",
            stream.position(),
            buf.len(),
            stream.remaining()
        );
    }
    Ok(geodata)
}

//////////////////////////////////////////////////////////////////////
//            entry points called by ovl2gpx main process
//////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub struct GgvBinFormat {
    debug: u8,
}

impl GgvBinFormat {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn decode(&self, buf: &[u8]) -> Result<Geodata, BinError> {
        ggv_bin_decode(buf, self.debug)
    }
}

impl Format for GgvBinFormat {
    fn probe(&self, buf: &[u8]) -> bool {
        ggv_bin_probe(buf)
    }
    fn read(&self, buf: &[u8]) -> Result<Geodata> {
        let version = ggv_bin_read_magic(&mut ByteStream::new(buf))
            .ok()
            .flatten()
            .map_or(String::from("unknown"), |v| v.to_string());
        self.decode(buf)
            .with_context(|| format!("reading ggv_bin failed (version: {})", version))
    }
    fn name(&self) -> &'static str {
        "ggv_bin"
    }
    fn can_read(&self) -> bool {
        true
    }
    fn set_debug(&mut self, debug: u8) {
        self.debug = debug;
    }
}

#[cfg(test)]
#[path = "ggv_bin_tests.rs"]
mod tests;
