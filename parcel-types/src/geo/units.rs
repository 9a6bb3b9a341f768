//! Units of length and area, and conversions between them.

use serde::{Deserialize, Serialize};

/// Unit of length of projected coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    /// Meter.
    Meter,
    /// Kilometer.
    Kilometer,
    /// International foot.
    Foot,
    /// US survey foot, used by many US state plane coordinate systems.
    UsSurveyFoot,
    /// International mile.
    Mile,
}

impl LengthUnit {
    /// Length of the unit in meters.
    pub fn meters(&self) -> f64 {
        match self {
            LengthUnit::Meter => 1.0,
            LengthUnit::Kilometer => 1000.0,
            LengthUnit::Foot => 0.3048,
            LengthUnit::UsSurveyFoot => 1200.0 / 3937.0,
            LengthUnit::Mile => 1609.344,
        }
    }

    /// Parses the value of the `units` parameter of a proj-string.
    pub fn from_proj_name(name: &str) -> Option<Self> {
        match name {
            "m" => Some(LengthUnit::Meter),
            "km" => Some(LengthUnit::Kilometer),
            "ft" => Some(LengthUnit::Foot),
            "us-ft" => Some(LengthUnit::UsSurveyFoot),
            "mi" => Some(LengthUnit::Mile),
            _ => None,
        }
    }
}

/// Unit of area.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaUnit {
    /// Square meter.
    SquareMeter,
    /// Square kilometer.
    SquareKilometer,
    /// Hectare.
    Hectare,
    /// Square international foot.
    SquareFoot,
    /// Square US survey foot.
    SquareUsSurveyFoot,
    /// Square international mile.
    SquareMile,
    /// International acre.
    Acre,
}

impl AreaUnit {
    /// Area of the unit in square meters.
    pub fn square_meters(&self) -> f64 {
        match self {
            AreaUnit::SquareMeter => 1.0,
            AreaUnit::SquareKilometer => 1_000_000.0,
            AreaUnit::Hectare => 10_000.0,
            AreaUnit::SquareFoot => LengthUnit::Foot.meters().powi(2),
            AreaUnit::SquareUsSurveyFoot => LengthUnit::UsSurveyFoot.meters().powi(2),
            AreaUnit::SquareMile => LengthUnit::Mile.meters().powi(2),
            AreaUnit::Acre => 4_046.856_422_4,
        }
    }

    /// Converts an area measured in squares of `length_unit` into this unit.
    pub fn convert_from(&self, value: f64, length_unit: LengthUnit) -> f64 {
        value * length_unit.meters().powi(2) / self.square_meters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn convert_area() {
        assert_relative_eq!(
            AreaUnit::SquareKilometer.convert_from(2_000_000.0, LengthUnit::Meter),
            2.0
        );
        assert_relative_eq!(
            AreaUnit::SquareMile.convert_from(1.0, LengthUnit::Mile),
            1.0
        );
        assert_relative_eq!(
            AreaUnit::SquareMile.convert_from(5280.0 * 5280.0, LengthUnit::Foot),
            1.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            AreaUnit::Acre.convert_from(43_560.0, LengthUnit::Foot),
            1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn proj_names() {
        assert_eq!(LengthUnit::from_proj_name("us-ft"), Some(LengthUnit::UsSurveyFoot));
        assert_eq!(LengthUnit::from_proj_name("furlong"), None);
    }
}
