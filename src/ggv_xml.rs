///
///  Support for "GeoGrid Viewer XML overlay files".
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
use std::io::Cursor;
use std::io::Read;

use anyhow::{Context, Result, anyhow, ensure};
use encoding_rs::mem::decode_latin1;
use encoding_rs::mem::encode_latin1_lossy;
use roxmltree::{Document, Node, ParsingOptions};

use crate::format::Format;
use crate::geodata::Geodata;
use crate::geodata::Waypoint;
use crate::geodata::WaypointList;

const XML_MEMBER: &str = "geogrid50.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectClass {
    Line,
    Circle,
    Text,
}

impl ObjectClass {
    fn from_cls_name(cls_name: &str) -> Option<Self> {
        match cls_name {
            "CLSID_GraphicLine" => Some(ObjectClass::Line),
            "CLSID_GraphicCircle" => Some(ObjectClass::Circle),
            "CLSID_GraphicText" => Some(ObjectClass::Text),
            _ => None,
        }
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

/// Single coordinate: x is longitude, y latitude, z an optional
/// elevation. A coord without x or y is skipped; unparseable values
/// read as 0.0.
fn ggv_xml_parse_coord(coord: &Node) -> Option<Waypoint> {
    let lon = coord.attribute("x")?.trim().parse::<f64>().unwrap_or(0.0);
    let lat = coord.attribute("y")?.trim().parse::<f64>().unwrap_or(0.0);
    let waypoint = Waypoint::new().with_lat(lat).with_lon(lon);
    match coord.attribute("z") {
        Some(z) => Some(waypoint.with_elevation(z.trim().parse::<f64>().unwrap_or(0.0))),
        None => Some(waypoint),
    }
}

/// Name from <base><name>...</name></base>
fn ggv_xml_read_name(object: &Node) -> Option<String> {
    let text = child(&child(object, "base")?, "name")?.text()?;
    // The xml is supposed to be encoded in latin1. Sometimes it still
    // has UTF-8 encoded names. Account for that by trying to convert
    // names back to bytes and attempt UTF-8 conversion.
    match String::from_utf8(encode_latin1_lossy(text).into_owned()) {
        Ok(utf8) => Some(utf8),
        Err(_) => Some(text.to_string()),
    }
}

struct XmlReader {
    debug: u8,
    track_count: u32,
    waypoint_count: u32,
    text_count: u32,
    geodata: Geodata,
}

impl XmlReader {
    fn new(debug: u8) -> Self {
        Self {
            debug,
            track_count: 0,
            waypoint_count: 0,
            text_count: 0,
            geodata: Geodata::new().with_debug(debug),
        }
    }

    /// Collects text and coordinates from an attributeList.
    fn read_attributes(&self, attribute_list: &Node) -> (String, WaypointList) {
        let mut text = String::new();
        let mut coords = WaypointList::new();
        for attribute in attribute_list
            .children()
            .filter(|c| c.has_tag_name("attribute"))
        {
            let iid_name = attribute.attribute("iidName").unwrap_or("");
            if self.debug >= 2 {
                eprintln!("xml:         iidName: {}", iid_name);
            }
            match iid_name {
                "IID_IGraphicTextAttributes" => {
                    if let Some(t) = child(&attribute, "text").and_then(|t| t.text()) {
                        text = t.to_string();
                        if self.debug >= 2 {
                            eprintln!("xml:             text: {}", text);
                        }
                    }
                }
                "IID_IGraphic" => {
                    let Some(coord_list) = child(&attribute, "coordList") else {
                        continue;
                    };
                    for coord in coord_list.children().filter(|c| c.has_tag_name("coord")) {
                        let Some(waypoint) = ggv_xml_parse_coord(&coord) else {
                            continue;
                        };
                        if self.debug >= 3 {
                            eprintln!(
                                "xml:             coord: {:09.5} {:08.5} {:?}",
                                waypoint.latitude(),
                                waypoint.longitude(),
                                waypoint.elevation()
                            );
                        }
                        coords.add_waypoint(waypoint);
                    }
                }
                _ => {}
            }
        }
        if self.debug >= 2 {
            eprintln!("xml:             coord count: {}", coords.len());
        }
        (text, coords)
    }

    fn read_object(&mut self, object: &Node) {
        let cls_name = object.attribute("clsName").unwrap_or("");
        if self.debug >= 2 {
            eprintln!("xml: === clsName: {:?} ===", cls_name);
            eprintln!("xml:     uid: {:?}", object.attribute("uid").unwrap_or(""));
        }
        let Some(class) = ObjectClass::from_cls_name(cls_name) else {
            return;
        };
        let name = ggv_xml_read_name(object).unwrap_or_default();
        if self.debug >= 2 {
            eprintln!("xml:     name: {}", name);
        }
        let Some(attribute_list) = child(object, "attributeList") else {
            return;
        };
        let (text, mut coords) = self.read_attributes(&attribute_list);
        if coords.is_empty() {
            return;
        }

        match class {
            ObjectClass::Line => {
                if name.is_empty() || name == "Teilstrecke" || name == "Line" {
                    self.track_count += 1;
                    coords.set_name(&format!("Track {:03}", self.track_count));
                } else {
                    coords.set_name(&name);
                }
                self.geodata.add_track(coords);
            }
            ObjectClass::Circle => {
                let Some(waypoint) = coords.into_first() else {
                    return;
                };
                let waypoint = if name.is_empty() || name == "Circle" {
                    self.waypoint_count += 1;
                    waypoint.with_name(&format!("RPT{:03}", self.waypoint_count))
                } else {
                    waypoint.with_name(&name)
                };
                self.geodata.add_waypoint(waypoint);
            }
            ObjectClass::Text => {
                let Some(waypoint) = coords.into_first() else {
                    return;
                };
                let waypoint = if text.is_empty() || text == "Text" {
                    self.text_count += 1;
                    waypoint.with_name(&format!("Text {}", self.text_count))
                } else {
                    waypoint.with_name(&text)
                };
                self.geodata.add_waypoint(waypoint);
            }
        }
    }

    fn process(mut self, xml: &str) -> Result<Geodata> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options).context("parse xml")?;
        let root = doc.root_element();
        ensure!(root.has_tag_name("geogridOvl"), "geogridOvl tag");
        if let Some(object_list) = child(&root, "objectList") {
            for object in object_list.children().filter(|c| c.has_tag_name("object")) {
                self.read_object(&object);
            }
        }
        Ok(self.geodata)
    }
}

/// Extract geogrid50.xml from the zip container
fn ggv_xml_extract_zip(buf: &[u8], debug: u8) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(buf)).context("open zip")?;
    let member = archive
        .file_names()
        .find(|n| n.rsplit('/').next() == Some(XML_MEMBER))
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("finding {} in zip", XML_MEMBER))?;
    let mut file = archive
        .by_name(&member)
        .with_context(|| format!("opening {} in zip", member))?;
    if debug >= 2 {
        eprintln!("xml: found {} ({} bytes)", member, file.size());
    }
    // Use a rather conservative limit here although the format supports more
    ensure!(
        file.size() <= i32::MAX as u64,
        "file size exceeds limit ({} > {})",
        file.size(),
        i32::MAX
    );
    let mut xml_buf = Vec::new();
    file.read_to_end(&mut xml_buf)
        .with_context(|| format!("reading {} from zip", member))?;
    Ok(decode_latin1(&xml_buf).into_owned())
}

//////////////////////////////////////////////////////////////////////
//            entry points called by ovl2gpx main process
//////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub struct GgvXmlFormat {
    debug: u8,
}

impl GgvXmlFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Format for GgvXmlFormat {
    fn probe(&self, buf: &[u8]) -> bool {
        buf.starts_with(b"PK\x03\x04")
    }
    fn read(&self, buf: &[u8]) -> Result<Geodata> {
        if self.debug >= 3 {
            eprintln!("xml: input size: {}", buf.len());
        }
        let xml = ggv_xml_extract_zip(buf, self.debug)
            .context("reading ggv_xml failed (function: extract zip)")?;
        XmlReader::new(self.debug)
            .process(&xml)
            .context("reading ggv_xml failed (function: process)")
    }
    fn name(&self) -> &'static str {
        "ggv_xml"
    }
    fn can_read(&self) -> bool {
        true
    }
    fn set_debug(&mut self, debug: u8) {
        self.debug = debug;
    }
}

#[cfg(test)]
#[path = "ggv_xml_tests.rs"]
mod tests;
