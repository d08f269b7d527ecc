///
///  Support for "GeoGrid Viewer ascii overlay files".
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
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use encoding_rs::mem::decode_latin1;
use nom::{
    IResult, Parser, branch::alt, bytes::complete::tag, bytes::complete::take_while,
    bytes::complete::take_while1, character::complete::multispace0, character::complete::space0,
    combinator::map, combinator::opt, error::context, multi::many0, sequence::delimited,
    sequence::pair, sequence::preceded, sequence::terminated,
};

use crate::error::OvlParseError;
use crate::format::Format;
use crate::geodata::Geodata;
use crate::geodata::Waypoint;
use crate::geodata::WaypointList;

/* some hints:
   "col":   color
   "group": 1 means NO GROUP
   "size":  size in pixels PLUS 100
   "zoom":
   "art":   line-style
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolType {
    Bitmap,
    Text,
    Line,
    Polygon,
    Rectangle,
    Circle,
    Triangle,
}

impl TryFrom<i32> for SymbolType {
    type Error = i32;
    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(SymbolType::Bitmap),
            2 => Ok(SymbolType::Text),
            3 => Ok(SymbolType::Line),
            4 => Ok(SymbolType::Polygon),
            5 => Ok(SymbolType::Rectangle),
            6 => Ok(SymbolType::Circle),
            7 => Ok(SymbolType::Triangle),
            other => Err(other),
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Parsed ini file: section name to key/value pairs.
#[derive(Debug, Default)]
pub struct OvlDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl OvlDocument {
    pub fn len(&self) -> usize {
        self.sections.len()
    }
    /// Non-empty value of `key` in `section`.
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
    /// Parsed value of `key`, `default` if it is missing.
    pub fn number<T: FromStr>(&self, section: &str, key: &str, default: T) -> Result<T> {
        match self.value(section, key) {
            Some(v) => v
                .parse()
                .map_err(|_| anyhow!("{}/{}: invalid number {:?}", section, key, v)),
            None => Ok(default),
        }
    }
}

fn latin1_trimmed(raw: &[u8]) -> String {
    decode_latin1(raw).trim().to_string()
}

fn ggv_ovl_parse_section(i: &[u8]) -> IResult<&[u8], String, OvlParseError> {
    map(
        context(
            "section",
            delimited(
                tag("["),
                take_while(|c: u8| c != b']' && c != b'\n'),
                tag("]"),
            ),
        ),
        latin1_trimmed,
    )
    .parse(i)
}

fn ggv_ovl_parse_comment(i: &[u8]) -> IResult<&[u8], Option<(String, String)>, OvlParseError> {
    map(pair(tag(";"), take_while(|c: u8| c != b'\n')), |_| None).parse(i)
}

fn ggv_ovl_parse_key_value(i: &[u8]) -> IResult<&[u8], Option<(String, String)>, OvlParseError> {
    map(
        (
            context(
                "key",
                take_while1(|c: u8| c != b'=' && c != b'[' && c != b';' && c != b'\n'),
            ),
            context("equals", (space0, tag("="), space0)),
            take_while(|c: u8| c != b'\n' && c != b';'),
            opt(pair(tag(";"), take_while(|c: u8| c != b'\n'))),
        ),
        |(key, _, val, _)| Some((latin1_trimmed(key), latin1_trimmed(val))),
    )
    .parse(i)
}

fn ggv_ovl_parse_entries(i: &[u8]) -> IResult<&[u8], HashMap<String, String>, OvlParseError> {
    map(
        many0(terminated(
            alt((ggv_ovl_parse_comment, ggv_ovl_parse_key_value)),
            multispace0,
        )),
        |entries: Vec<_>| entries.into_iter().flatten().collect(),
    )
    .parse(i)
}

fn ggv_ovl_parse(i: &[u8]) -> IResult<&[u8], OvlDocument, OvlParseError> {
    map(
        preceded(
            multispace0,
            many0(pair(
                terminated(ggv_ovl_parse_section, multispace0),
                ggv_ovl_parse_entries,
            )),
        ),
        |sections: Vec<_>| OvlDocument {
            sections: sections.into_iter().collect(),
        },
    )
    .parse(i)
}

/// Running numbers for generated names, shared over all symbols.
#[derive(Debug, Default)]
struct OvlCounters {
    route: u32,
    track: u32,
    waypoint: u32,
}

struct OvlReader<'a> {
    doc: &'a OvlDocument,
    debug: u8,
    counters: OvlCounters,
    geodata: Geodata,
}

impl<'a> OvlReader<'a> {
    fn new(doc: &'a OvlDocument, debug: u8) -> Self {
        Self {
            doc,
            debug,
            counters: OvlCounters::default(),
            geodata: Geodata::new().with_debug(debug),
        }
    }

    fn coordinate(&self, section: &str, suffix: &str) -> Result<Option<(f64, f64)>> {
        let lat_key = format!("YKoord{}", suffix);
        let lon_key = format!("XKoord{}", suffix);
        let (Some(lat), Some(lon)) = (
            self.doc.value(section, &lat_key),
            self.doc.value(section, &lon_key),
        ) else {
            return Ok(None);
        };
        let lat: f64 = lat
            .parse()
            .with_context(|| format!("{}, {} f64", section, lat_key))?;
        let lon: f64 = lon
            .parse()
            .with_context(|| format!("{}, {} f64", section, lon_key))?;
        if self.debug >= 3 {
            eprintln!("ovl: YKoord/Lat: {:09.5}, XKoord/Lon: {:08.5}", lat, lon);
        }
        Ok(Some((lat, lon)))
    }

    fn read_line(&mut self, section: &str) -> Result<()> {
        let group: i32 = self.doc.number(section, "Group", -1)?;
        let points: i32 = self.doc.number(section, "Punkte", -1)?;
        if self.debug >= 2 {
            eprintln!("ovl: Group: {}, Punkte: {}", group, points);
        }
        if points <= 0 {
            return Ok(());
        }
        let is_route = group > 1;
        let mut list = WaypointList::new();
        for j in 0..points {
            let Some((lat, lon)) = self.coordinate(section, &j.to_string())? else {
                continue;
            };
            let mut waypoint = Waypoint::new().with_lat(lat).with_lon(lon);
            if is_route {
                self.counters.waypoint += 1;
                waypoint = waypoint.with_name(&format!("RPT{:03}", self.counters.waypoint));
            }
            list.add_waypoint(waypoint);
        }
        match self.doc.value(section, "Text") {
            Some(text) => list.set_name(text),
            None if is_route => {
                self.counters.route += 1;
                list.set_name(&format!("Route {}", self.counters.route));
            }
            None => {
                self.counters.track += 1;
                list.set_name(&format!("Track {}", self.counters.track));
            }
        }
        if is_route {
            self.geodata.add_route(list);
        } else {
            self.geodata.add_track(list);
        }
        Ok(())
    }

    fn read_point(&mut self, section: &str) -> Result<()> {
        let Some((lat, lon)) = self.coordinate(section, "")? else {
            return Ok(());
        };
        let name = self.doc.value(section, "Text").unwrap_or(section);
        self.geodata
            .add_waypoint(Waypoint::new().with_lat(lat).with_lon(lon).with_name(name));
        Ok(())
    }

    fn process(mut self) -> Result<Geodata> {
        let symbols: i32 = self.doc.number("Overlay", "Symbols", 0)?;
        if self.debug >= 2 {
            eprintln!("ovl: Symbols: {}", symbols);
        }
        for i in 1..=symbols {
            let section = format!("Symbol {}", i);
            let typ: i32 = self.doc.number(&section, "Typ", 0)?;
            let typ = match SymbolType::try_from(typ) {
                Ok(typ) => typ,
                Err(other) => {
                    if self.debug >= 2 {
                        eprintln!("ovl: === {} === unknown type {}", section, other);
                    }
                    continue;
                }
            };
            if self.debug >= 2 {
                eprintln!("ovl: === {} === type: {}", section, typ);
            }
            match typ {
                SymbolType::Line | SymbolType::Polygon => self.read_line(&section)?,
                SymbolType::Text
                | SymbolType::Rectangle
                | SymbolType::Circle
                | SymbolType::Triangle => self.read_point(&section)?,
                SymbolType::Bitmap => {}
            }
        }
        Ok(self.geodata)
    }
}

//////////////////////////////////////////////////////////////////////
//            entry points called by ovl2gpx main process
//////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub struct GgvOvlFormat {
    debug: u8,
}

impl GgvOvlFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Format for GgvOvlFormat {
    fn probe(&self, buf: &[u8]) -> bool {
        buf.starts_with(b"[Symbol") || buf.starts_with(b"[Overlay]")
    }
    fn read(&self, buf: &[u8]) -> Result<Geodata> {
        if self.debug >= 3 {
            eprintln!("ovl: input size: {}", buf.len());
        }
        let (rest, doc) = match ggv_ovl_parse(buf) {
            Ok(res) => res,
            Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
                return Err(anyhow!(
                    "reading ggv_ovl failed (function: parse, context: \"{}\")",
                    err.message()
                ));
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(anyhow!("reading ggv_ovl failed (function: parse, incomplete)"));
            }
        };
        if self.debug >= 2 {
            eprintln!("ovl: sections: {}, unparsed: {}", doc.len(), rest.len());
        }
        OvlReader::new(&doc, self.debug)
            .process()
            .context("reading ggv_ovl failed (function: process)")
    }
    fn name(&self) -> &'static str {
        "ggv_ovl"
    }
    fn can_read(&self) -> bool {
        true
    }
    fn set_debug(&mut self, debug: u8) {
        self.debug = debug;
    }
}

#[cfg(test)]
#[path = "ggv_ovl_tests.rs"]
mod tests;
