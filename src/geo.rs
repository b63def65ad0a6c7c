/// A vertex position on the projected plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance. This is the edge weight model.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// WGS84 ellipsoid.
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Universal Transverse Mercator projection about a fixed central meridian.
/// Input lat/lon in degrees. Output easting/northing in meters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UtmProjection {
    central_meridian_deg: f64,
}

impl UtmProjection {
    pub fn with_central_meridian(central_meridian_deg: f64) -> Self {
        Self {
            central_meridian_deg,
        }
    }

    /// Zones are 1..=60, six degrees wide, zone 1 centred on 177W.
    pub fn from_zone(zone: u8) -> Self {
        Self::with_central_meridian(f64::from(zone) * 6.0 - 183.0)
    }

    /// The zone whose six-degree band contains `lon_deg`.
    pub fn zone_for_longitude(lon_deg: f64) -> u8 {
        let zone = ((lon_deg + 180.0) / 6.0).floor() as i64 + 1;
        zone.clamp(1, 60) as u8
    }

    pub fn for_longitude(lon_deg: f64) -> Self {
        Self::from_zone(Self::zone_for_longitude(lon_deg))
    }

    pub fn central_meridian(&self) -> f64 {
        self.central_meridian_deg
    }

    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> Point {
        let e2 = FLATTENING * (2.0 - FLATTENING);
        let ep2 = e2 / (1.0 - e2);
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let lon0 = self.central_meridian_deg.to_radians();

        let n = SEMI_MAJOR_AXIS / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let t = lat.tan().powi(2);
        let c = ep2 * lat.cos().powi(2);
        let a = (lon - lon0) * lat.cos();

        // Meridional arc, expanded to the e^6 term.
        let (e4, e6) = (e2 * e2, e2 * e2 * e2);
        let m = SEMI_MAJOR_AXIS
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat).sin());

        let x = SCALE_FACTOR
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + FALSE_EASTING;

        let mut y = SCALE_FACTOR
            * (m + n
                * lat.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

        if lat_deg < 0.0 {
            y += FALSE_NORTHING_SOUTH;
        }
        Point::new(x, y)
    }
}

/// Shift points so the smallest x and y land on zero, shrink them by `reducer`,
/// then flip vertically so the origin sits in the top-left corner.
pub fn normalize(points: &mut [Point], reducer: f64) {
    if points.is_empty() {
        return;
    }
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    for p in points.iter_mut() {
        p.x = (p.x - min_x) / reducer;
        p.y = (p.y - min_y) / reducer;
    }
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    for p in points.iter_mut() {
        p.y = max_y - p.y;
    }
}
