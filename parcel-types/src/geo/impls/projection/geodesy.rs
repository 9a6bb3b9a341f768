use crate::cartesian::NewCartesianPoint2d;
use crate::geo::traits::point::NewGeoPoint;
use crate::geo::traits::projection::Projection;
use geodesy::prelude::*;
use std::marker::PhantomData;

/// Projection backed by the [`geodesy`] crate.
///
/// The projection is created from a geodesy operator definition, e.g. `utm zone=32` or
/// `laea lon_0=10 lat_0=52 x_0=4321000 y_0=3210000`.
pub struct GeodesyProjection<In, Out> {
    context: Minimal,
    op: OpHandle,
    meters_per_unit: f64,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeodesyProjection<In, Out> {
    /// Creates a new projection with output in meters. Returns `None` if the definition is not valid.
    pub fn new(definition: &str) -> Option<Self> {
        Self::with_unit(definition, 1.0)
    }

    /// Creates a new projection with output in units of `meters_per_unit` meters each, e.g. `0.3048` for feet.
    pub fn with_unit(definition: &str, meters_per_unit: f64) -> Option<Self> {
        if !(meters_per_unit.is_finite() && meters_per_unit > 0.0) {
            return None;
        }

        let mut context = Minimal::new();
        let op = match context.op(definition) {
            Ok(op) => op,
            Err(err) => {
                log::debug!("Failed to create geodesy operator '{definition}': {err:?}");
                return None;
            }
        };

        Some(Self {
            context,
            op,
            meters_per_unit,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        })
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for GeodesyProjection<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        let [x, y] = data[0].0;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        Some(Out::new(x / self.meters_per_unit, y / self.meters_per_unit))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        let mut data = [Coor2D([
            input.x() * self.meters_per_unit,
            input.y() * self.meters_per_unit,
        ])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        let [lon, lat] = data[0].0;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }

        Some(In::latlon(lat.to_degrees(), lon.to_degrees()))
    }
}
