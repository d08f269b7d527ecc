///
///  Geogrid-Viewer binary overlay, version 3.0 and 4.0 blocks
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
use encoding_rs::mem::decode_latin1;

use crate::bytestream::ByteStream;
use crate::error::BinError;
use crate::geodata::Geodata;
use crate::geodata::Waypoint;
use crate::geodata::WaypointList;
use crate::ggv_bin::{MAGIC_LEN, ggv_bin_read_map_name, ggv_bin_read_text16, ggv_bin_read_text32};

/// Label and record counts from a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    label_count: u32,
    record_count: u32,
}

fn ggv_bin_read_header_v34(stream: &mut ByteStream) -> Result<BlockHeader, BinError> {
    stream.skip(8, "unknown")?;
    let label_count = stream.read_u32("num labels")?;
    let record_count = stream.read_u32("num records")?;
    ggv_bin_read_text16(stream, "text label")?;
    stream.read_u16("unknown")?;
    stream.read_u16("unknown")?;
    // 8 bytes ending with 1E 00, contains len of header block
    stream.read_u16("unknown")?;
    let header_len = stream.read_u16("header len")?;
    stream.read_u16("unknown")?;
    stream.read_u16("unknown")?;
    if header_len > 0 {
        ggv_bin_read_map_name(stream, header_len)?;
    }
    Ok(BlockHeader {
        label_count,
        record_count,
    })
}

fn ggv_bin_read_label_v34(stream: &mut ByteStream) -> Result<(), BinError> {
    if stream.debug() >= 2 {
        eprintln!("------------------------------------ 0x{:x}", stream.position());
    }
    stream.skip(0x08, "label header")?;
    stream.skip(0x14, "label number")?;
    ggv_bin_read_text16(stream, "label text")?;
    stream.read_u16("label flag1")?;
    stream.read_u16("label flag2")?;
    Ok(())
}

/// Fields shared by every record. Returns the record text, which
/// names lines and areas.
fn ggv_bin_read_common_v34(stream: &mut ByteStream) -> Result<String, BinError> {
    stream.read_u16("entry group")?;
    stream.read_u16("entry prop2")?;
    stream.read_u16("entry prop3")?;
    stream.read_u16("entry prop4")?;
    stream.read_u16("entry prop5")?;
    stream.read_u16("entry prop6")?;
    stream.read_u16("entry prop7")?;
    stream.read_u16("entry prop8")?;
    stream.read_u16("entry zoom")?;
    stream.read_u16("entry prop10")?;
    let entry_text = ggv_bin_read_text16(stream, "entry txt")?;
    let entry_type1 = stream.read_u16("entry type1")?;
    if entry_type1 != 1 {
        ggv_bin_read_text32(stream, "entry object")?;
    }
    let entry_type2 = stream.read_u16("entry type2")?;
    if entry_type2 != 1 {
        ggv_bin_read_text32(stream, "entry object")?;
    }
    Ok(entry_text)
}

fn ggv_bin_read_text_v34(stream: &mut ByteStream, geodata: &mut Geodata) -> Result<(), BinError> {
    stream.read_u16("text prop1")?;
    stream.read_u32("text prop2")?;
    stream.read_u16("text prop3")?;
    stream.read_u32("text prop4")?;
    stream.read_u16("text ltype")?;
    stream.read_u16("text angle")?;
    stream.read_u16("text size")?;
    stream.read_u16("text area")?;
    let lon = stream.read_f64("text lon")?;
    let lat = stream.read_f64("text lat")?;
    stream.read_f64("text unk")?;
    let txt = ggv_bin_read_text16(stream, "text label")?;
    geodata.add_waypoint(Waypoint::new().with_lat(lat).with_lon(lon).with_name(&txt));
    Ok(())
}

fn ggv_bin_read_line_v34(
    stream: &mut ByteStream,
    entry_type: u16,
    label: &str,
    geodata: &mut Geodata,
) -> Result<(), BinError> {
    stream.read_u16("line prop1")?;
    stream.read_u32("line prop2")?;
    stream.read_u16("line prop3")?;
    stream.read_u32("line color")?;
    stream.read_u16("line size")?;
    stream.read_u16("line stroke")?;
    let line_points = stream.read_u16("line points")?;
    if entry_type == 0x04 {
        // found in example.ovl generated by Geogrid-Viewer 1.0
        stream.read_u16("line pad")?;
    }

    let mut track = WaypointList::new();
    if !label.is_empty() {
        track.set_name(label);
    }
    for _ in 0..line_points {
        let lon = stream.read_f64("line lon")?;
        let lat = stream.read_f64("line lat")?;
        stream.read_f64("line unk")?;
        track.add_waypoint(Waypoint::new().with_lat(lat).with_lon(lon));
    }
    geodata.add_track(track);
    Ok(())
}

fn ggv_bin_read_circle_v34(stream: &mut ByteStream) -> Result<(), BinError> {
    stream.read_u16("circle prop1")?;
    stream.read_u32("circle prop2")?;
    stream.read_u16("circle prop3")?;
    stream.read_u32("circle color")?;
    stream.read_u32("circle prop5")?;
    stream.read_u32("circle prop6")?;
    stream.read_u16("circle ltype")?;
    stream.read_u16("circle angle")?;
    stream.read_u16("circle size")?;
    stream.read_u16("circle area")?;
    stream.read_f64("circle lon")?;
    stream.read_f64("circle lat")?;
    stream.read_f64("circle unk")?;
    Ok(())
}

fn ggv_bin_read_bitmap_v34(stream: &mut ByteStream) -> Result<(), BinError> {
    stream.read_u16("bmp prop1")?;
    stream.read_u32("bmp prop2")?;
    stream.read_u16("bmp prop3")?;
    stream.read_u32("bmp prop4")?;
    stream.read_u32("bmp prop5")?;
    stream.read_u32("bmp prop6")?;
    stream.read_f64("bmp lon")?;
    stream.read_f64("bmp lat")?;
    stream.read_f64("bmp unk")?;
    // length comes before an extra field, so no read_text32 here
    let bmp_len = stream.read_len32("bmp len")?;
    stream.read_u16("bmp prop")?;
    stream.read_bytes(bmp_len.into(), "bmp data")?;
    Ok(())
}

fn ggv_bin_read_record_v34(stream: &mut ByteStream, geodata: &mut Geodata) -> Result<(), BinError> {
    let entry_pos = stream.position();
    if stream.debug() >= 2 {
        eprintln!("------------------------------------ 0x{:x}", entry_pos);
    }
    let entry_type = stream.read_u16("entry type")?;
    let label = ggv_bin_read_common_v34(stream)?;

    match entry_type {
        0x02 => ggv_bin_read_text_v34(stream, geodata),
        // line | area | line
        0x03 | 0x04 | 0x17 => ggv_bin_read_line_v34(stream, entry_type, &label, geodata),
        // circle | rectangle | triangle
        0x05 | 0x06 | 0x07 => ggv_bin_read_circle_v34(stream),
        0x09 => ggv_bin_read_bitmap_v34(stream),
        _ => Err(BinError::UnsupportedRecordType {
            entry_type,
            offset: entry_pos,
        }),
    }
}

/// Decodes the sequence of blocks following the V3/V4 magic. Both
/// versions share one layout.
pub fn ggv_bin_read_v34(stream: &mut ByteStream, geodata: &mut Geodata) -> Result<(), BinError> {
    while !stream.at_end() {
        let header = ggv_bin_read_header_v34(stream)?;

        if header.label_count > 0 && !stream.at_end() {
            if stream.debug() >= 2 {
                eprintln!("-----labels------------------------- 0x{:x}", stream.position());
            }
            for _ in 0..header.label_count {
                ggv_bin_read_label_v34(stream)?;
            }
        }

        if header.record_count > 0 && !stream.at_end() {
            if stream.debug() >= 2 {
                eprintln!("-----records------------------------ 0x{:x}", stream.position());
            }
            for _ in 0..header.record_count {
                ggv_bin_read_record_v34(stream, geodata)?;
            }
        }

        if !stream.at_end() {
            if stream.debug() >= 2 {
                eprintln!("------------------------------------ 0x{:x}", stream.position());
            }
            // the separator repeats the magic bytes, GGV does not check
            // them either
            let magic = stream.read_bytes(MAGIC_LEN as i64, "magicbytes")?;
            if stream.debug() >= 2 {
                eprintln!("bin: header = {}", decode_latin1(magic));
            }
        }
    }
    Ok(())
}
