///
///  Geogrid-Viewer binary overlay, version 2.0 records
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
use crate::bytestream::ByteStream;
use crate::error::BinError;
use crate::geodata::Geodata;
use crate::geodata::Waypoint;
use crate::geodata::WaypointList;
use crate::ggv_bin::{ggv_bin_read_map_name, ggv_bin_read_text16, ggv_bin_read_text32};

fn ggv_bin_read_v2_text(stream: &mut ByteStream, geodata: &mut Geodata) -> Result<(), BinError> {
    stream.read_u16("text color")?;
    stream.read_u16("text size")?;
    stream.read_u16("text trans")?;
    stream.read_u16("text font")?;
    stream.read_u16("text angle")?;
    let lon = stream.read_f64("text lon")?;
    let lat = stream.read_f64("text lat")?;
    let label = ggv_bin_read_text16(stream, "text label")?;
    geodata.add_waypoint(
        Waypoint::new()
            .with_lat(lat)
            .with_lon(lon)
            .with_name(&label),
    );
    Ok(())
}

fn ggv_bin_read_v2_line(
    stream: &mut ByteStream,
    track_name: &str,
    geodata: &mut Geodata,
) -> Result<(), BinError> {
    stream.read_u16("line color")?;
    stream.read_u16("line width")?;
    stream.read_u16("line type")?;
    let line_points = stream.read_u16("line points")?;

    let mut track = WaypointList::new();
    if !track_name.is_empty() {
        track.set_name(track_name);
    }
    for _ in 0..line_points {
        let lon = stream.read_f64("line lon")?;
        let lat = stream.read_f64("line lat")?;
        track.add_waypoint(Waypoint::new().with_lat(lat).with_lon(lon));
    }
    geodata.add_track(track);
    Ok(())
}

fn ggv_bin_read_v2_geom(stream: &mut ByteStream) -> Result<(), BinError> {
    stream.read_u16("geom color")?;
    stream.read_u16("geom prop1")?;
    stream.read_u16("geom prop2")?;
    stream.read_u16("geom angle")?;
    stream.read_u16("geom stroke")?;
    stream.read_u16("geom area")?;
    stream.read_f64("geom lon")?;
    stream.read_f64("geom lat")?;
    Ok(())
}

fn ggv_bin_read_v2_bitmap(stream: &mut ByteStream) -> Result<(), BinError> {
    stream.read_u16("bmp color")?;
    stream.read_u16("bmp prop1")?;
    stream.read_u16("bmp prop2")?;
    stream.read_u16("bmp prop3")?;
    stream.read_f64("bmp lon")?;
    stream.read_f64("bmp lat")?;
    stream.read_text32("bmp data")?;
    Ok(())
}

/// Decodes the flat record stream following the V2 magic.
pub fn ggv_bin_read_v2(stream: &mut ByteStream, geodata: &mut Geodata) -> Result<(), BinError> {
    // header length is usually either 0x90 or 0x00
    let header_len = stream.read_u16("map name len")?;
    if header_len > 0 {
        ggv_bin_read_map_name(stream, header_len)?;
    }

    while !stream.at_end() {
        let entry_pos = stream.position();
        if stream.debug() >= 2 {
            eprintln!("------------------------------------ 0x{:x}", entry_pos);
        }
        let entry_type = stream.read_u16("entry type")?;
        stream.read_u16("entry group")?;
        stream.read_u16("entry zoom")?;
        let entry_subtype = stream.read_u16("entry subtype")?;

        let track_name = if entry_subtype != 1 {
            ggv_bin_read_text32(stream, "text len")?
        } else {
            String::new()
        };

        match entry_type {
            0x02 => ggv_bin_read_v2_text(stream, geodata)?,
            // line | area
            0x03 | 0x04 => ggv_bin_read_v2_line(stream, &track_name, geodata)?,
            // rectangle | circle | triangle
            0x05 | 0x06 | 0x07 => ggv_bin_read_v2_geom(stream)?,
            0x09 => ggv_bin_read_v2_bitmap(stream)?,
            _ => {
                return Err(BinError::UnknownRecordType {
                    record_type: entry_type,
                    offset: entry_pos,
                });
            }
        }
    }
    Ok(())
}
