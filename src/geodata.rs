///
///  Geodata storage for Waypoints, Routes and Tracks
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

/// Elevation value used by Geogrid-Viewer for "no elevation".
pub const ELEVATION_SENTINEL: f64 = -32768.0;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Waypoint {
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    name: String,
}

impl Waypoint {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_lat(mut self, lat: f64) -> Self {
        self.latitude = lat;
        self
    }
    pub fn with_lon(mut self, lon: f64) -> Self {
        self.longitude = lon;
        self
    }
    /// Sets the elevation; the sentinel value leaves it unset.
    pub fn with_elevation(mut self, ele: f64) -> Self {
        self.elevation = if ele == ELEVATION_SENTINEL {
            None
        } else {
            Some(ele)
        };
        self
    }
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WaypointList {
    waypoints: Vec<Waypoint>,
    name: String,
}

impl WaypointList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_waypoint(&mut self, wp: Waypoint) {
        self.waypoints.push(wp)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned()
    }
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
    /// Consumes the list, handing out its first point.
    pub fn into_first(self) -> Option<Waypoint> {
        self.waypoints.into_iter().next()
    }
}

/// Output of one conversion run. Entities are appended in input order
/// and never touched again.
#[derive(Debug, Default)]
pub struct Geodata {
    debug: u8,
    waypoints: Vec<Waypoint>,
    routes: Vec<WaypointList>,
    tracks: Vec<WaypointList>,
}

impl Geodata {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_debug(mut self, value: u8) -> Self {
        self.debug = value;
        self
    }
    pub fn add_waypoint(&mut self, wp: Waypoint) {
        if self.debug >= 3 {
            eprintln!("geodata: add waypoint {:?}", wp.name());
        }
        self.waypoints.push(wp);
    }
    pub fn add_route(&mut self, route: WaypointList) {
        if self.debug >= 3 {
            eprintln!("geodata: add route ({} points)", route.len());
        }
        self.routes.push(route);
    }
    pub fn add_track(&mut self, track: WaypointList) {
        if self.debug >= 3 {
            eprintln!("geodata: add track ({} points)", track.len());
        }
        self.tracks.push(track);
    }
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }
    pub fn routes(&self) -> &[WaypointList] {
        &self.routes
    }
    pub fn tracks(&self) -> &[WaypointList] {
        &self.tracks
    }
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty() && self.routes.is_empty() && self.tracks.is_empty()
    }

    /// Returns the (min, max) corners over all waypoints, route points
    /// and track points. The accumulators start at the opposite
    /// corners, so an empty sink yields an inverted box; check
    /// `is_empty` first.
    pub fn bounds(&self) -> (Waypoint, Waypoint) {
        let mut min = Waypoint::new().with_lat(90.0).with_lon(180.0);
        let mut max = Waypoint::new().with_lat(-90.0).with_lon(-180.0);

        let lists = self.routes.iter().chain(self.tracks.iter());
        let points = self
            .waypoints
            .iter()
            .chain(lists.flat_map(|list| list.waypoints.iter()));
        for waypoint in points {
            min.latitude = min.latitude.min(waypoint.latitude);
            min.longitude = min.longitude.min(waypoint.longitude);
            max.latitude = max.latitude.max(waypoint.latitude);
            max.longitude = max.longitude.max(waypoint.longitude);
        }
        (min, max)
    }
}

#[cfg(test)]
#[path = "geodata_tests.rs"]
mod tests;
