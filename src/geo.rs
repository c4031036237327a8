/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Great-circle distance to `other` in meters, by the haversine formula.
    pub fn haversine_meters(&self, other: &Coord) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let p = Coord { lat: 51.8985, lon: -8.4756 };
        assert_eq!(p.haversine_meters(&p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Coord { lat: 0.0, lon: 0.0 };
        let b = Coord { lat: 1.0, lon: 0.0 };
        let d = a.haversine_meters(&b);
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
        assert_eq!(d, b.haversine_meters(&a));
    }
}
