use num_traits::{Float, FromPrimitive, One};

/// Point on the surface of a celestial body, given by its latitude and longitude in degrees.
pub trait GeoPoint {
    /// Numeric type used to represent coordinates.
    type Num: Float + FromPrimitive;

    /// Latitude in degrees.
    fn lat(&self) -> Self::Num;
    /// Longitude in degrees.
    fn lon(&self) -> Self::Num;

    /// Latitude in radians.
    fn lat_rad(&self) -> Self::Num {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> Self::Num {
        self.lon().to_radians()
    }

    /// Returns true if the latitude is in `[-90, 90]` and the longitude is in `[-180, 180]`.
    fn is_valid_geo(&self) -> bool {
        let (Some(lat_max), Some(lon_max)) = (Self::Num::from_f64(90.0), Self::Num::from_f64(180.0))
        else {
            return false;
        };

        self.lat().abs() <= lat_max && self.lon().abs() <= lon_max
    }

    /// Great-circle distance to the `other` point on a sphere with the given `radius`, calculated with the
    /// haversine formula. The result is in the units of the `radius`.
    ///
    /// Coordinates are not checked for validity; see
    /// [`great_circle_distance`](crate::geo::sphere::great_circle_distance) for the checked version.
    fn haversine_distance(
        &self,
        other: &impl GeoPoint<Num = Self::Num>,
        radius: Self::Num,
    ) -> Self::Num {
        let two = Self::Num::one() + Self::Num::one();
        let d_lat = other.lat_rad() - self.lat_rad();
        let d_lon = other.lon_rad() - self.lon_rad();

        let a = (d_lat / two).sin().powi(2)
            + self.lat_rad().cos() * other.lat_rad().cos() * (d_lon / two).sin().powi(2);

        // Rounding can push `a` slightly above 1 for antipodal points.
        two * radius * a.sqrt().min(Self::Num::one()).asin()
    }
}

/// A [`GeoPoint`] that can be constructed from its coordinates.
pub trait NewGeoPoint<N = f64>: GeoPoint<Num = N> + Sized {
    /// Creates a new point from latitude and longitude in degrees.
    fn latlon(lat: N, lon: N) -> Self;

    /// Creates a new point from longitude and latitude in degrees.
    fn lonlat(lon: N, lat: N) -> Self {
        Self::latlon(lat, lon)
    }
}
