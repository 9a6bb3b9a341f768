use crate::cartesian::NewCartesianPoint2d;
use crate::geo::traits::projection::Projection;
use std::marker::PhantomData;

/// Projection that keeps the coordinates of the points unchanged, only converting the point type.
///
/// Used for geographic CRSs, where the "projected" coordinates are longitude and latitude themselves, and as a no-op
/// stand-in for real projections in tests.
#[derive(Debug, Clone, Copy)]
pub struct IdentityProjection<In, Out> {
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> IdentityProjection<In, Out> {
    /// Creates a new projection.
    pub fn new() -> Self {
        Self {
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In, Out> Default for IdentityProjection<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: NewCartesianPoint2d, Out: NewCartesianPoint2d> Projection for IdentityProjection<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        Some(Out::new(input.x(), input.y()))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        Some(In::new(input.x(), input.y()))
    }
}
