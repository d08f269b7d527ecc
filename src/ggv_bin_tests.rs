///
///  ggv_bin test cases
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
use super::*;
use crate::geodata::{Waypoint, WaypointList};

/// Little-endian fixture writer. `mark` records offsets at which a
/// cut leaves a well-formed stream.
#[derive(Default)]
struct OvlBuilder {
    data: Vec<u8>,
    marks: Vec<usize>,
}

impl OvlBuilder {
    fn new(version: &str) -> Self {
        let mut b = Self::default();
        b.magic(version);
        b
    }
    fn magic(&mut self, version: &str) -> &mut Self {
        let magic = format!("DOMGVCRD Ovlfile V{}:\0", version);
        assert_eq!(magic.len(), MAGIC_LEN);
        self.bytes(magic.as_bytes())
    }
    fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }
    fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }
    fn f64(&mut self, v: f64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }
    fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.data.extend_from_slice(v);
        self
    }
    fn zeros(&mut self, n: usize) -> &mut Self {
        self.data.resize(self.data.len() + n, 0);
        self
    }
    fn text16(&mut self, s: &str) -> &mut Self {
        self.u16(s.len() as u16).bytes(s.as_bytes())
    }
    fn text32(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32).bytes(s.as_bytes())
    }
    fn mark(&mut self) -> &mut Self {
        self.marks.push(self.data.len());
        self
    }
    fn len(&self) -> usize {
        self.data.len()
    }
}

//////////////////////////////////////////////////////////////////////
//            version 2.0 fixtures
//////////////////////////////////////////////////////////////////////

fn v2_entry(b: &mut OvlBuilder, typ: u16, label: Option<&str>) {
    b.u16(typ).u16(1).u16(0);
    match label {
        Some(label) => b.u16(0).text32(label),
        None => b.u16(1),
    };
}

fn v2_text(b: &mut OvlBuilder, lon: f64, lat: f64, label: &str) {
    v2_entry(b, 0x02, None);
    b.u16(0).u16(0).u16(0).u16(0).u16(0);
    b.f64(lon).f64(lat).text16(label);
}

fn v2_line(b: &mut OvlBuilder, typ: u16, name: Option<&str>, points: &[(f64, f64)]) {
    v2_entry(b, typ, name);
    b.u16(1).u16(2).u16(3).u16(points.len() as u16);
    for &(lon, lat) in points {
        b.f64(lon).f64(lat);
    }
}

fn v2_geom(b: &mut OvlBuilder, typ: u16) {
    v2_entry(b, typ, Some("shape"));
    b.u16(0).u16(0).u16(0).u16(0).u16(0).u16(0);
    b.f64(7.0).f64(50.0);
}

fn v2_bitmap(b: &mut OvlBuilder, blob: &[u8]) {
    v2_entry(b, 0x09, None);
    b.u16(0).u16(0).u16(0).u16(0);
    b.f64(7.0).f64(50.0);
    b.u32(blob.len() as u32).bytes(blob);
}

fn v2_fixture() -> OvlBuilder {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0).mark();
    v2_text(&mut b, 7.5, 52.0, "Berlin");
    b.mark();
    v2_line(&mut b, 0x03, Some("Weg"), &[(7.0, 50.0), (7.1, 50.1)]);
    b.mark();
    v2_geom(&mut b, 0x06);
    b.mark();
    v2_bitmap(&mut b, &[0x42; 12]);
    b.mark();
    v2_line(&mut b, 0x04, None, &[(8.0, 51.0)]);
    b.mark();
    b
}

//////////////////////////////////////////////////////////////////////
//            version 3.0 / 4.0 fixtures
//////////////////////////////////////////////////////////////////////

fn v34_header(b: &mut OvlBuilder, labels: u32, records: u32, map_name: &[u8]) {
    b.zeros(8).u32(labels).u32(records).text16("Layer");
    b.u16(0).u16(0);
    b.u16(0).u16(map_name.len() as u16).u16(0).u16(0x1e);
    b.bytes(map_name);
}

fn v34_label(b: &mut OvlBuilder, text: &str) {
    b.zeros(0x08).zeros(0x14).text16(text).u16(0).u16(0);
}

fn v34_common(b: &mut OvlBuilder, typ: u16, name: &str, object: Option<&str>) {
    b.u16(typ);
    for _ in 0..10 {
        b.u16(0);
    }
    b.text16(name);
    match object {
        Some(object) => b.u16(0).text32(object),
        None => b.u16(1),
    };
    b.u16(1);
}

fn v34_text(b: &mut OvlBuilder, lon: f64, lat: f64, label: &str) {
    v34_common(b, 0x02, "Point", None);
    b.u16(0).u32(0).u16(0).u32(0).u16(0).u16(0).u16(0).u16(0);
    b.f64(lon).f64(lat).f64(0.0).text16(label);
}

fn v34_line(b: &mut OvlBuilder, typ: u16, name: &str, points: &[(f64, f64)]) {
    v34_common(b, typ, name, None);
    b.u16(0).u32(0).u16(0).u32(0xff0000).u16(0).u16(0);
    b.u16(points.len() as u16);
    if typ == 0x04 {
        b.u16(0);
    }
    for &(lon, lat) in points {
        b.f64(lon).f64(lat).f64(-32768.0);
    }
}

fn v34_circle(b: &mut OvlBuilder, typ: u16) {
    v34_common(b, typ, "Circle", Some("object"));
    b.u16(0).u32(0).u16(0).u32(0).u32(0).u32(0);
    b.u16(0).u16(0).u16(0).u16(0);
    b.f64(7.0).f64(50.0).f64(0.0);
}

fn v34_bitmap(b: &mut OvlBuilder, blob: &[u8]) {
    v34_common(b, 0x09, "Bitmap", None);
    b.u16(0).u32(0).u16(0).u32(0).u32(0).u32(0);
    b.f64(7.0).f64(50.0).f64(0.0);
    b.u32(blob.len() as u32).u16(0).bytes(blob);
}

fn v34_fixture(version: &str) -> OvlBuilder {
    let mut b = OvlBuilder::new(version);
    b.mark();
    v34_header(&mut b, 2, 3, b"\x01\x02\x03\x04Topo\0\0");
    b.mark();
    v34_label(&mut b, "Label 1");
    v34_label(&mut b, "Label 2");
    b.mark();
    v34_text(&mut b, 7.5, 52.0, "Berlin");
    v34_line(&mut b, 0x03, "Way", &[(7.0, 50.0), (7.1, 50.1), (7.2, 50.2)]);
    v34_circle(&mut b, 0x06);
    b.mark();
    b.magic(version).mark();
    v34_header(&mut b, 0, 3, b"");
    b.mark();
    v34_line(&mut b, 0x04, "", &[(8.0, 51.0), (8.5, 51.5)]);
    v34_line(&mut b, 0x17, "Area", &[(9.0, 52.0)]);
    v34_bitmap(&mut b, &[0x42; 10]);
    b.mark();
    b
}

fn coords(list: &WaypointList) -> Vec<(f64, f64)> {
    list.waypoints()
        .iter()
        .map(|w| (w.latitude(), w.longitude()))
        .collect()
}

//////////////////////////////////////////////////////////////////////
//            probe / dispatch
//////////////////////////////////////////////////////////////////////

#[test]
fn test_probe() {
    for version in ["2.0", "3.0", "4.0"] {
        let b = OvlBuilder::new(version);
        assert!(ggv_bin_probe(&b.data), "version {}", version);
    }
    let tests: [&[u8]; 5] = [
        b"",
        b"DOMGVCRD Ovlfile V2.0",
        b"DOMGVCRD Ovlfile V2.0:",
        b"DOMGVCRD Ovlfile V5.0:\0",
        b"[Overlay]\nSymbols=1\n\n\n\n\n",
    ];
    for t in tests {
        println!("test = {:?}", t);
        assert!(!ggv_bin_probe(t));
    }
}

#[test]
fn test_probe_does_not_disturb_decode() {
    let b = v2_fixture();
    let format = GgvBinFormat::new();
    assert!(format.probe(&b.data));
    assert!(format.probe(&b.data));
    let geodata = format.decode(&b.data).unwrap();
    assert_eq!(geodata.waypoints().len(), 1);
}

#[test]
fn test_decode_unsupported_format() {
    let data = b"DOMGVCRD Ovlfile V9.0:\0\0\0";
    assert_eq!(ggv_bin_decode(data, 0).unwrap_err(), BinError::UnsupportedFormat);
    assert!(matches!(
        ggv_bin_decode(b"DOMGVCRD", 0),
        Err(BinError::TruncatedStream { descr: "magic", .. })
    ));
}

#[test]
fn test_read_wraps_error() {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0);
    v2_entry(&mut b, 0xff, None);
    let err = GgvBinFormat::new().read(&b.data).unwrap_err();
    println!("err = {:#}", err);
    assert!(format!("{:#}", err).contains("version: 2.0"));
    assert!(matches!(
        err.downcast_ref::<BinError>(),
        Some(BinError::UnknownRecordType { record_type: 0xff, .. })
    ));
}

#[test]
fn test_simplify() {
    let tests: [(&[u8], &str); 9] = [
        (b"Berlin", "Berlin"),
        (b"  Hello\r\n  World  ", "Hello World"),
        (b"Name\0garbage", "Name"),
        (b"\x01Tag\x02", "Tag"),
        (b"M\xfcnster", "Münster"),
        (b"Berlin \x01", "Berlin"),
        (b"\x01 Berlin", "Berlin"),
        (b"A \x07 B", "A B"),
        (b"Berlin\t\x1b", "Berlin"),
    ];
    for (raw, expected) in tests {
        println!("raw = {:?}", raw);
        assert_eq!(ggv_bin_simplify(raw), expected);
    }
}

#[test]
fn test_v2_label_with_control_bytes() {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0);
    v2_entry(&mut b, 0x02, None);
    b.u16(0).u16(0).u16(0).u16(0).u16(0);
    b.f64(7.5).f64(52.0);
    b.u16(8).bytes(b"Berlin \x01");
    let geodata = ggv_bin_decode(&b.data, 0).unwrap();
    assert_eq!(geodata.waypoints()[0].name(), "Berlin");
}

//////////////////////////////////////////////////////////////////////
//            version 2.0
//////////////////////////////////////////////////////////////////////

#[test]
fn test_v2_single_text_record() {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0x0000);
    v2_text(&mut b, 7.5, 52.0, "Berlin");
    let geodata = ggv_bin_decode(&b.data, 0).unwrap();
    assert_eq!(
        geodata.waypoints(),
        &[Waypoint::new().with_lat(52.0).with_lon(7.5).with_name("Berlin")]
    );
    assert!(geodata.tracks().is_empty());
    assert!(geodata.routes().is_empty());
}

#[test]
fn test_v2_line_keeps_point_order() {
    let points: Vec<(f64, f64)> = (0..25).map(|i| (7.0 + i as f64 * 0.01, 50.0 - i as f64)).collect();
    let mut b = OvlBuilder::new("2.0");
    b.u16(0);
    v2_line(&mut b, 0x03, None, &points);
    let geodata = ggv_bin_decode(&b.data, 0).unwrap();
    assert_eq!(geodata.tracks().len(), 1);
    let track = &geodata.tracks()[0];
    assert_eq!(track.name(), "");
    let expected: Vec<_> = points.iter().map(|&(lon, lat)| (lat, lon)).collect();
    assert_eq!(coords(track), expected);
}

#[test]
fn test_v2_fixture() {
    let b = v2_fixture();
    let geodata = ggv_bin_decode(&b.data, 0).unwrap();
    assert_eq!(geodata.waypoints().len(), 1);
    assert_eq!(geodata.waypoints()[0].name(), "Berlin");
    assert_eq!(geodata.tracks().len(), 2);
    assert_eq!(geodata.tracks()[0].name(), "Weg");
    assert_eq!(coords(&geodata.tracks()[0]), [(50.0, 7.0), (50.1, 7.1)]);
    assert_eq!(geodata.tracks()[1].name(), "");
    assert_eq!(coords(&geodata.tracks()[1]), [(51.0, 8.0)]);
}

#[test]
fn test_v2_map_name_header() {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0x10).bytes(b"\x00\x01\x02\x03Karte\0\0\0\0\0\0\0");
    v2_text(&mut b, 1.0, 2.0, "P");
    let geodata = ggv_bin_decode(&b.data, 0).unwrap();
    assert_eq!(geodata.waypoints().len(), 1);

    let mut b = OvlBuilder::new("2.0");
    b.u16(0x90).bytes(b"short");
    assert!(matches!(
        ggv_bin_decode(&b.data, 0),
        Err(BinError::TruncatedStream { descr: "map name", .. })
    ));
}

#[test]
fn test_v2_unknown_record_type() {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0);
    v2_text(&mut b, 7.5, 52.0, "Berlin");
    let offset = b.len();
    v2_entry(&mut b, 0xff, None);
    b.zeros(32);
    assert_eq!(
        ggv_bin_decode(&b.data, 0).unwrap_err(),
        BinError::UnknownRecordType {
            record_type: 0xff,
            offset
        }
    );
}

#[test]
fn test_v2_length_overflow() {
    let mut b = OvlBuilder::new("2.0");
    b.u16(0);
    b.u16(0x03).u16(1).u16(0).u16(0).u32(0xFFFFFFFF);
    assert_eq!(
        ggv_bin_decode(&b.data, 0).unwrap_err(),
        BinError::LengthOverflow {
            descr: "text len",
            len: 0xFFFFFFFF
        }
    );

    let mut b = OvlBuilder::new("2.0");
    b.u16(0);
    v2_entry(&mut b, 0x09, None);
    b.u16(0).u16(0).u16(0).u16(0).f64(0.0).f64(0.0).u32(0xFFFFFFFF);
    assert_eq!(
        ggv_bin_decode(&b.data, 0).unwrap_err(),
        BinError::LengthOverflow {
            descr: "bmp data",
            len: 0xFFFFFFFF
        }
    );
}

#[test]
fn test_v2_truncated_at_every_offset() {
    let b = v2_fixture();
    for cut in 0..b.len() {
        let res = ggv_bin_decode(&b.data[..cut], 0);
        if b.marks.contains(&cut) {
            assert!(res.is_ok(), "cut = {}", cut);
        } else {
            assert!(
                matches!(res, Err(BinError::TruncatedStream { .. })),
                "cut = {}, res = {:?}",
                cut,
                res.map(|g| g.tracks().len())
            );
        }
    }
}

//////////////////////////////////////////////////////////////////////
//            version 3.0 / 4.0
//////////////////////////////////////////////////////////////////////

#[test]
fn test_v34_fixture() {
    for version in ["3.0", "4.0"] {
        let b = v34_fixture(version);
        let geodata = ggv_bin_decode(&b.data, 0).unwrap();
        assert_eq!(
            geodata.waypoints(),
            &[Waypoint::new().with_lat(52.0).with_lon(7.5).with_name("Berlin")]
        );
        let tracks = geodata.tracks();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].name(), "Way");
        assert_eq!(coords(&tracks[0]), [(50.0, 7.0), (50.1, 7.1), (50.2, 7.2)]);
        assert_eq!(tracks[1].name(), "");
        assert_eq!(coords(&tracks[1]), [(51.0, 8.0), (51.5, 8.5)]);
        assert_eq!(tracks[2].name(), "Area");
        assert_eq!(coords(&tracks[2]), [(52.0, 9.0)]);
        assert!(tracks.iter().flat_map(|t| t.waypoints()).all(|w| w.elevation().is_none()));
        assert!(geodata.routes().is_empty());
    }
}

#[test]
fn test_v34_debug_output_does_not_change_result() {
    let b = v34_fixture("3.0");
    let quiet = ggv_bin_decode(&b.data, 0).unwrap();
    let verbose = ggv_bin_decode(&b.data, 9).unwrap();
    assert_eq!(quiet.waypoints(), verbose.waypoints());
    assert_eq!(quiet.tracks(), verbose.tracks());
}

#[test]
fn test_v34_area_padding_only_for_type_4() {
    // 0x03 written with the padding field of 0x04 desynchronizes
    let mut b = OvlBuilder::new("3.0");
    v34_header(&mut b, 0, 1, b"");
    v34_common(&mut b, 0x03, "", None);
    b.u16(0).u32(0).u16(0).u32(0).u16(0).u16(0);
    b.u16(1).u16(0);
    b.f64(7.0).f64(50.0).f64(0.0);
    assert!(matches!(
        ggv_bin_decode(&b.data, 0),
        Err(BinError::TruncatedStream { .. })
    ));
}

#[test]
fn test_v34_unsupported_record_type() {
    let mut b = OvlBuilder::new("4.0");
    v34_header(&mut b, 0, 2, b"");
    v34_text(&mut b, 1.0, 2.0, "ok");
    let offset = b.len();
    v34_common(&mut b, 0x08, "", None);
    b.zeros(64);
    assert_eq!(
        ggv_bin_decode(&b.data, 0).unwrap_err(),
        BinError::UnsupportedRecordType {
            entry_type: 0x08,
            offset
        }
    );
}

#[test]
fn test_v34_length_overflow() {
    let mut b = OvlBuilder::new("3.0");
    v34_header(&mut b, 0, 1, b"");
    v34_common(&mut b, 0x09, "", None);
    b.u16(0).u32(0).u16(0).u32(0).u32(0).u32(0);
    b.f64(0.0).f64(0.0).f64(0.0);
    b.u32(0xFFFFFFFF).u16(0);
    assert_eq!(
        ggv_bin_decode(&b.data, 0).unwrap_err(),
        BinError::LengthOverflow {
            descr: "bmp len",
            len: 0xFFFFFFFF
        }
    );

    let mut b = OvlBuilder::new("3.0");
    v34_header(&mut b, 0, 1, b"");
    b.u16(0x02);
    for _ in 0..10 {
        b.u16(0);
    }
    b.text16("").u16(0).u32(0xFFFFFFFF);
    assert_eq!(
        ggv_bin_decode(&b.data, 0).unwrap_err(),
        BinError::LengthOverflow {
            descr: "entry object",
            len: 0xFFFFFFFF
        }
    );
}

#[test]
fn test_v34_empty_after_magic() {
    let b = OvlBuilder::new("4.0");
    let geodata = ggv_bin_decode(&b.data, 0).unwrap();
    assert!(geodata.is_empty());
}

#[test]
fn test_v34_truncated_at_every_offset() {
    let b = v34_fixture("4.0");
    for cut in 0..b.len() {
        let res = ggv_bin_decode(&b.data[..cut], 0);
        if b.marks.contains(&cut) {
            assert!(res.is_ok(), "cut = {}", cut);
        } else {
            assert!(
                matches!(res, Err(BinError::TruncatedStream { .. })),
                "cut = {}, res = {:?}",
                cut,
                res.map(|g| g.tracks().len())
            );
        }
    }
}
