///
/// Support for GPX writing
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
use std::io;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::writer::Writer;

use crate::format::Format;
use crate::geodata::Geodata;
use crate::geodata::Waypoint;
use crate::geodata::WaypointList;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/0";

fn coord(value: f64) -> String {
    format!("{:.9}", value)
}

fn gpx_write_waypoint<W: io::Write>(
    writer: &mut Writer<W>,
    waypoint: &Waypoint,
    element: &str,
    cmt_desc: bool,
) -> io::Result<()> {
    let start = writer
        .create_element(element)
        .with_attribute(("lat", coord(waypoint.latitude()).as_str()))
        .with_attribute(("lon", coord(waypoint.longitude()).as_str()));
    if waypoint.name().is_empty() && waypoint.elevation().is_none() {
        start.write_empty()?;
        return Ok(());
    }
    start.write_inner_content(|writer| {
        if let Some(ele) = waypoint.elevation() {
            writer
                .create_element("ele")
                .write_text_content(BytesText::new(&coord(ele)))?;
        }
        let name = waypoint.name();
        if !name.is_empty() {
            writer
                .create_element("name")
                .write_text_content(BytesText::new(name))?;
            if cmt_desc {
                writer
                    .create_element("cmt")
                    .write_text_content(BytesText::new(name))?;
                writer
                    .create_element("desc")
                    .write_text_content(BytesText::new(name))?;
            }
        }
        Ok(())
    })?;
    Ok(())
}

fn gpx_write_name<W: io::Write>(writer: &mut Writer<W>, list: &WaypointList) -> io::Result<()> {
    if !list.name().is_empty() {
        writer
            .create_element("name")
            .write_text_content(BytesText::new(list.name()))?;
    }
    Ok(())
}

fn gpx_write_bounds<W: io::Write>(writer: &mut Writer<W>, geodata: &Geodata) -> io::Result<()> {
    let (min, max) = geodata.bounds();
    writer
        .create_element("bounds")
        .with_attribute(("minlat", coord(min.latitude()).as_str()))
        .with_attribute(("minlon", coord(min.longitude()).as_str()))
        .with_attribute(("maxlat", coord(max.latitude()).as_str()))
        .with_attribute(("maxlon", coord(max.longitude()).as_str()))
        .write_empty()?;
    Ok(())
}

//////////////////////////////////////////////////////////////////////
//            entry points called by ovl2gpx main process
//////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub struct GpxFormat {
    creator: String,
    testmode: bool,
    debug: u8,
}

impl Default for GpxFormat {
    fn default() -> Self {
        Self {
            creator: String::from("ovl2gpx"),
            testmode: false,
            debug: 0,
        }
    }
}

impl GpxFormat {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_creator(mut self, creator: &str) -> Self {
        self.creator = creator.to_owned();
        self
    }
    /// In test mode the document time is the Unix epoch, so output is
    /// reproducible.
    pub fn with_testmode(mut self, testmode: bool) -> Self {
        self.testmode = testmode;
        self
    }
    fn timestamp(&self) -> String {
        let time = if self.testmode {
            DateTime::<Utc>::default()
        } else {
            Utc::now()
        };
        time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl Format for GpxFormat {
    fn write(&self, geodata: &Geodata) -> Result<String> {
        if self.debug >= 2 {
            eprintln!(
                "gpx: writing {} waypoints, {} routes, {} tracks",
                geodata.waypoints().len(),
                geodata.routes().len(),
                geodata.tracks().len()
            );
        }
        let mut buffer = Vec::new();
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .context("writing xml declaration")?;
        writer
            .create_element("gpx")
            .with_attribute(("version", "1.0"))
            .with_attribute(("creator", self.creator.as_str()))
            .with_attribute(("xmlns", GPX_NAMESPACE))
            .write_inner_content(|writer| {
                writer
                    .create_element("time")
                    .write_text_content(BytesText::new(&self.timestamp()))?;
                if !geodata.is_empty() {
                    gpx_write_bounds(writer, geodata)?;
                }
                for waypoint in geodata.waypoints() {
                    gpx_write_waypoint(writer, waypoint, "wpt", true)?;
                }
                for route in geodata.routes() {
                    writer.create_element("rte").write_inner_content(|writer| {
                        gpx_write_name(writer, route)?;
                        for waypoint in route.waypoints() {
                            gpx_write_waypoint(writer, waypoint, "rtept", false)?;
                        }
                        Ok(())
                    })?;
                }
                for track in geodata.tracks() {
                    writer.create_element("trk").write_inner_content(|writer| {
                        gpx_write_name(writer, track)?;
                        writer
                            .create_element("trkseg")
                            .write_inner_content(|writer| {
                                for waypoint in track.waypoints() {
                                    gpx_write_waypoint(writer, waypoint, "trkpt", false)?;
                                }
                                Ok(())
                            })?;
                        Ok(())
                    })?;
                }
                Ok(())
            })
            .context("writing gpx")?;
        let output = String::from_utf8(buffer).context("gpx output is not utf-8")?;
        Ok(output + "\n")
    }
    fn name(&self) -> &'static str {
        "gpx"
    }
    fn can_write(&self) -> bool {
        true
    }
    fn set_debug(&mut self, debug: u8) {
        self.debug = debug;
    }
}

#[cfg(test)]
#[path = "gpx_tests.rs"]
mod tests;
