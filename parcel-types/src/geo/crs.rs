use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::ParcelTypesError;
use crate::geo::impls::projection::{IdentityProjection, WebMercator};
use crate::geo::traits::projection::Projection;
use crate::geo::units::LengthUnit;
use crate::geo::Datum;
use crate::Point2d;

/// Coordinate reference system descriptor.
///
/// The descriptor is an opaque string: either an authority code (`EPSG:4326`) or a proj-string
/// (`+proj=utm +zone=10 +datum=WGS84 +units=m +no_defs`). Two descriptors are considered the same CRS if their strings
/// are equal after trimming. The string is only interpreted when a projection for the CRS is requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Crs {
    definition: Cow<'static, str>,
}

/// Kind of projection a CRS descriptor describes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProjectionType {
    /// Geographic coordinates: `x` is longitude and `y` is latitude, in degrees.
    None,
    /// Spherical mercator (EPSG:3857).
    WebMercator,
    /// Universal transverse mercator on WGS84.
    Utm {
        /// Zone number, `1..=60`.
        zone: u8,
        /// Northern hemisphere zone.
        north: bool,
    },
    /// Any other projection, given as a geodesy operator definition.
    Other(String),
}

impl Crs {
    /// Geographic coordinates on WGS84 (EPSG:4326).
    pub const WGS84: Crs = Crs {
        definition: Cow::Borrowed("EPSG:4326"),
    };

    /// Spherical mercator (EPSG:3857).
    pub const EPSG3857: Crs = Crs {
        definition: Cow::Borrowed("EPSG:3857"),
    };

    /// Creates a new descriptor. Surrounding whitespace is ignored.
    pub fn new(definition: impl Into<String>) -> Self {
        let definition = definition.into();
        let trimmed = definition.trim();
        let definition = if trimmed.len() == definition.len() {
            definition
        } else {
            trimmed.to_string()
        };

        Self {
            definition: Cow::Owned(definition),
        }
    }

    /// Descriptor string.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Interprets the descriptor.
    ///
    /// Returns [`ParcelTypesError::UnsupportedCrs`] if the descriptor is empty, is an authority code that is not
    /// known, or is a malformed proj-string.
    pub fn projection_type(&self) -> Result<ProjectionType, ParcelTypesError> {
        let definition = self.definition();
        if definition.is_empty() {
            return Err(self.unsupported());
        }

        if let Some(code) = authority_code(definition) {
            return self.epsg_projection_type(code);
        }

        if definition.contains("+proj=") {
            return self.proj_string_projection_type();
        }

        Ok(ProjectionType::Other(definition.to_string()))
    }

    /// Returns true if the coordinates in this CRS are longitude and latitude.
    pub fn is_geographic(&self) -> bool {
        matches!(self.projection_type(), Ok(ProjectionType::None))
    }

    /// Unit of the projected coordinates. `None` for geographic and unsupported CRSs.
    pub fn linear_unit(&self) -> Option<LengthUnit> {
        match self.projection_type().ok()? {
            ProjectionType::None => None,
            ProjectionType::WebMercator | ProjectionType::Utm { .. } => Some(LengthUnit::Meter),
            ProjectionType::Other(_) => match proj_param(self.definition(), "units") {
                Some(Some(name)) => LengthUnit::from_proj_name(name),
                _ => Some(LengthUnit::Meter),
            },
        }
    }

    /// Projection from geographic coordinates (longitude/latitude in degrees) into the coordinates of this CRS.
    ///
    /// For geographic CRSs this is the identity projection.
    pub fn projection(
        &self,
    ) -> Result<Box<dyn Projection<InPoint = Point2d, OutPoint = Point2d>>, ParcelTypesError> {
        match self.projection_type()? {
            ProjectionType::None => Ok(Box::new(IdentityProjection::new())),
            ProjectionType::WebMercator => Ok(Box::new(WebMercator::new(Datum::WGS84))),
            ProjectionType::Utm { zone, north } => {
                let definition = if north {
                    format!("utm zone={zone}")
                } else {
                    format!("utm zone={zone} south")
                };
                self.geodesy_projection(&definition, LengthUnit::Meter)
            }
            ProjectionType::Other(definition) => {
                let unit = self.linear_unit().ok_or_else(|| self.unsupported())?;
                self.geodesy_projection(&definition, unit)
            }
        }
    }

    #[cfg(feature = "geodesy")]
    fn geodesy_projection(
        &self,
        definition: &str,
        unit: LengthUnit,
    ) -> Result<Box<dyn Projection<InPoint = Point2d, OutPoint = Point2d>>, ParcelTypesError> {
        use crate::geo::impls::projection::GeodesyProjection;

        match GeodesyProjection::with_unit(definition, unit.meters()) {
            Some(projection) => Ok(Box::new(projection)),
            None => Err(self.unsupported()),
        }
    }

    #[cfg(not(feature = "geodesy"))]
    fn geodesy_projection(
        &self,
        definition: &str,
        _unit: LengthUnit,
    ) -> Result<Box<dyn Projection<InPoint = Point2d, OutPoint = Point2d>>, ParcelTypesError> {
        log::debug!("Projection '{definition}' requires the `geodesy` feature");
        Err(self.unsupported())
    }

    fn epsg_projection_type(&self, code: u32) -> Result<ProjectionType, ParcelTypesError> {
        match code {
            4326 | 4269 | 4258 => Ok(ProjectionType::None),
            3857 | 3785 | 900913 => Ok(ProjectionType::WebMercator),
            32601..=32660 => Ok(ProjectionType::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(ProjectionType::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(self.unsupported()),
        }
    }

    fn proj_string_projection_type(&self) -> Result<ProjectionType, ParcelTypesError> {
        let definition = self.definition();
        let Some(Some(proj)) = proj_param(definition, "proj") else {
            return Err(self.unsupported());
        };

        match proj {
            "longlat" | "latlong" | "lonlat" | "latlon" => Ok(ProjectionType::None),
            "utm" => {
                let zone = proj_param(definition, "zone")
                    .flatten()
                    .and_then(|zone| zone.parse::<u8>().ok())
                    .filter(|zone| (1..=60).contains(zone))
                    .ok_or_else(|| self.unsupported())?;
                let north = proj_param(definition, "south").is_none();

                Ok(ProjectionType::Utm { zone, north })
            }
            _ => {
                if let Some(Some(units)) = proj_param(definition, "units") {
                    if LengthUnit::from_proj_name(units).is_none() {
                        return Err(self.unsupported());
                    }
                }

                Ok(ProjectionType::Other(to_geodesy_definition(definition)))
            }
        }
    }

    fn unsupported(&self) -> ParcelTypesError {
        ParcelTypesError::UnsupportedCrs(self.definition.to_string())
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.definition)
    }
}

impl From<String> for Crs {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Crs {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.definition.into_owned()
    }
}

fn authority_code(definition: &str) -> Option<u32> {
    let (authority, code) = definition.split_once(':')?;
    if !authority.trim().eq_ignore_ascii_case("epsg") {
        return None;
    }

    code.trim().parse().ok()
}

/// Looks up a `+key[=value]` parameter of a proj-string. The outer option tells if the key is present, the inner one
/// holds the value.
fn proj_param<'a>(definition: &'a str, key: &str) -> Option<Option<&'a str>> {
    definition.split_whitespace().find_map(|token| {
        let token = token.strip_prefix('+')?;
        match token.split_once('=') {
            Some((k, v)) if k == key => Some(Some(v)),
            None if token == key => Some(None),
            _ => None,
        }
    })
}

/// Converts a proj-string into the geodesy operator syntax. Parameters that only describe the datum or units are
/// dropped: units are applied on top of the geodesy projection, which always works in meters.
fn to_geodesy_definition(definition: &str) -> String {
    const IGNORED: [&str; 6] = ["no_defs", "type", "datum", "towgs84", "units", "wktext"];

    let mut operator = String::new();
    let mut params = vec![];
    for token in definition.split_whitespace() {
        let token = token.trim_start_matches('+');
        let (key, value) = token.split_once('=').unwrap_or((token, ""));
        if key == "proj" {
            operator = value.to_string();
        } else if !IGNORED.contains(&key) {
            params.push(token);
        }
    }

    std::iter::once(operator.as_str())
        .chain(params)
        .collect::<Vec<_>>()
        .join(" ")
}
