///
///  gpx test cases
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

fn geodata() -> Geodata {
    let mut geodata = Geodata::new();
    geodata.add_waypoint(
        Waypoint::new()
            .with_lat(52.0)
            .with_lon(7.5)
            .with_elevation(100.0)
            .with_name("A & B"),
    );
    let mut route = WaypointList::new();
    route.set_name("Route 1");
    route.add_waypoint(Waypoint::new().with_lat(51.0).with_lon(8.0).with_name("RPT001"));
    geodata.add_route(route);
    let mut track = WaypointList::new();
    track.add_waypoint(Waypoint::new().with_lat(50.0).with_lon(7.0));
    geodata.add_track(track);
    geodata
}

#[test]
fn test_write() {
    let gpx = GpxFormat::new()
        .with_creator("test")
        .with_testmode(true)
        .write(&geodata())
        .unwrap();
    println!("{}", gpx);
    assert!(gpx.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(gpx.ends_with("</gpx>\n"));
    let expected = [
        "<gpx version=\"1.0\" creator=\"test\" xmlns=\"http://www.topografix.com/GPX/1/0\">",
        "<time>1970-01-01T00:00:00Z</time>",
        "<bounds minlat=\"50.000000000\" minlon=\"7.000000000\" maxlat=\"52.000000000\" maxlon=\"8.000000000\"/>",
        "<wpt lat=\"52.000000000\" lon=\"7.500000000\">",
        "<ele>100.000000000</ele>",
        "<name>A &amp; B</name>",
        "<cmt>A &amp; B</cmt>",
        "<desc>A &amp; B</desc>",
        "<name>Route 1</name>",
        "<rtept lat=\"51.000000000\" lon=\"8.000000000\">",
        "<name>RPT001</name>",
        "<trkpt lat=\"50.000000000\" lon=\"7.000000000\"/>",
    ];
    for e in expected {
        assert!(gpx.contains(e), "missing {}", e);
    }
    assert!(!gpx.contains("<cmt>RPT001</cmt>"));
    let wpt = gpx.find("<wpt").unwrap();
    let rte = gpx.find("<rte>").unwrap();
    let trk = gpx.find("<trk>").unwrap();
    assert!(wpt < rte && rte < trk);
}

#[test]
fn test_write_empty() {
    let gpx = GpxFormat::new().with_testmode(true).write(&Geodata::new()).unwrap();
    assert!(gpx.contains("creator=\"ovl2gpx\""));
    assert!(gpx.contains("<time>1970-01-01T00:00:00Z</time>"));
    assert!(!gpx.contains("<bounds"));
    assert!(!gpx.contains("<wpt"));
}

#[test]
fn test_cannot_read() {
    let format = GpxFormat::new();
    assert!(format.can_write());
    assert!(!format.can_read());
    assert!(!format.probe(b"<gpx/>"));
}
