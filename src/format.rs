///
///  Format trait and registry of the supported formats
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
use anyhow::{Result, anyhow};

use crate::geodata::Geodata;
use crate::ggv_bin::GgvBinFormat;
use crate::ggv_ovl::GgvOvlFormat;
use crate::ggv_xml::GgvXmlFormat;
use crate::gpx::GpxFormat;

pub trait Format {
    fn name(&self) -> &'static str;
    /// Must not depend on or change any state used by `read`.
    fn probe(&self, _buf: &[u8]) -> bool {
        false
    }
    fn read(&self, _buf: &[u8]) -> Result<Geodata> {
        Err(anyhow!("{} does not support reading", self.name()))
    }
    fn write(&self, _geodata: &Geodata) -> Result<String> {
        Err(anyhow!("{} does not support writing", self.name()))
    }
    fn can_read(&self) -> bool {
        false
    }
    fn can_write(&self) -> bool {
        false
    }
    fn set_debug(&mut self, debug: u8);
}

/// Closed set of formats known to the converter.
#[derive(Debug)]
pub enum FormatKind {
    GgvBin(GgvBinFormat),
    GgvOvl(GgvOvlFormat),
    GgvXml(GgvXmlFormat),
    Gpx(GpxFormat),
}

impl FormatKind {
    /// All formats, in probing order.
    pub fn all() -> Vec<FormatKind> {
        vec![
            FormatKind::GgvBin(GgvBinFormat::new()),
            FormatKind::GgvOvl(GgvOvlFormat::new()),
            FormatKind::GgvXml(GgvXmlFormat::new()),
            FormatKind::Gpx(GpxFormat::new()),
        ]
    }
}

impl Format for FormatKind {
    fn name(&self) -> &'static str {
        match self {
            FormatKind::GgvBin(f) => f.name(),
            FormatKind::GgvOvl(f) => f.name(),
            FormatKind::GgvXml(f) => f.name(),
            FormatKind::Gpx(f) => f.name(),
        }
    }
    fn probe(&self, buf: &[u8]) -> bool {
        match self {
            FormatKind::GgvBin(f) => f.probe(buf),
            FormatKind::GgvOvl(f) => f.probe(buf),
            FormatKind::GgvXml(f) => f.probe(buf),
            FormatKind::Gpx(f) => f.probe(buf),
        }
    }
    fn read(&self, buf: &[u8]) -> Result<Geodata> {
        match self {
            FormatKind::GgvBin(f) => f.read(buf),
            FormatKind::GgvOvl(f) => f.read(buf),
            FormatKind::GgvXml(f) => f.read(buf),
            FormatKind::Gpx(f) => f.read(buf),
        }
    }
    fn write(&self, geodata: &Geodata) -> Result<String> {
        match self {
            FormatKind::GgvBin(f) => f.write(geodata),
            FormatKind::GgvOvl(f) => f.write(geodata),
            FormatKind::GgvXml(f) => f.write(geodata),
            FormatKind::Gpx(f) => f.write(geodata),
        }
    }
    fn can_read(&self) -> bool {
        match self {
            FormatKind::GgvBin(f) => f.can_read(),
            FormatKind::GgvOvl(f) => f.can_read(),
            FormatKind::GgvXml(f) => f.can_read(),
            FormatKind::Gpx(f) => f.can_read(),
        }
    }
    fn can_write(&self) -> bool {
        match self {
            FormatKind::GgvBin(f) => f.can_write(),
            FormatKind::GgvOvl(f) => f.can_write(),
            FormatKind::GgvXml(f) => f.can_write(),
            FormatKind::Gpx(f) => f.can_write(),
        }
    }
    fn set_debug(&mut self, debug: u8) {
        match self {
            FormatKind::GgvBin(f) => f.set_debug(debug),
            FormatKind::GgvOvl(f) => f.set_debug(debug),
            FormatKind::GgvXml(f) => f.set_debug(debug),
            FormatKind::Gpx(f) => f.set_debug(debug),
        }
    }
}

/// Maps a format name or the probe result on an input buffer to a
/// format.
#[derive(Debug)]
pub struct FormatRegistry {
    formats: Vec<FormatKind>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            formats: FormatKind::all(),
        }
    }
    pub fn with_debug(mut self, debug: u8) -> Self {
        self.formats.iter_mut().for_each(|f| f.set_debug(debug));
        self
    }
    pub fn reader_names(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .filter(|f| f.can_read())
            .map(|f| f.name())
            .collect()
    }
    pub fn writer_names(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .filter(|f| f.can_write())
            .map(|f| f.name())
            .collect()
    }
    pub fn by_name(&self, name: &str) -> Option<&FormatKind> {
        self.formats.iter().find(|f| f.name() == name)
    }
    /// First readable format whose probe accepts the buffer.
    pub fn detect(&self, buf: &[u8]) -> Option<&FormatKind> {
        self.formats
            .iter()
            .filter(|f| f.can_read())
            .find(|f| f.probe(buf))
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
