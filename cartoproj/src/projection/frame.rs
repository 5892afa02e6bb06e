//! État commun des projections planes : ellipsoïde, centre, unités, origine fictive

use geo::Coord;

use super::LineType;
use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::params::{ProjectionParameters, FALSE_EASTING, FALSE_NORTHING};
use crate::units::{AngularUnit, LinearUnit};

/// Paramètres communs d'une projection plane.
///
/// Le centre (λ0, φ0) est en radians. Les fausses coordonnées sont exprimées
/// dans l'unité linéaire de la projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    ellipsoid: Ellipsoid,
    center: Coord,
    units: LinearUnit,
    false_easting: f64,
    false_northing: f64,
    line_type: LineType,
}

impl Frame {
    pub fn new(
        ellipsoid: Ellipsoid,
        center: Coord,
        units: LinearUnit,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            ellipsoid,
            center,
            units,
            false_easting,
            false_northing,
            line_type: LineType::default(),
        }
    }

    /// Lit le centre (avec alias), l'unité linéaire et les fausses coordonnées d'un sac de paramètres
    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let center = Coord {
            x: params.center_longitude()?,
            y: params.center_latitude()?,
        };
        let units = params.linear_unit().clone();
        let false_easting = units.from_metres(params.linear_parameter_or_zero(FALSE_EASTING));
        let false_northing = units.from_metres(params.linear_parameter_or_zero(FALSE_NORTHING));
        Ok(Self::new(ellipsoid, center, units, false_easting, false_northing))
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_center(mut self, center: Coord) -> Self {
        self.center = center;
        self
    }

    pub fn with_ellipsoid(mut self, ellipsoid: Ellipsoid) -> Self {
        self.ellipsoid = ellipsoid;
        self
    }

    /// Change d'unité ; les fausses coordonnées gardent la même longueur physique
    pub fn with_units(mut self, units: LinearUnit) -> Self {
        self.false_easting = self.units.convert_to(self.false_easting, &units);
        self.false_northing = self.units.convert_to(self.false_northing, &units);
        self.units = units;
        self
    }

    pub fn with_false_origin(mut self, false_easting: f64, false_northing: f64) -> Self {
        self.false_easting = false_easting;
        self.false_northing = false_northing;
        self
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn center(&self) -> Coord {
        self.center
    }

    pub fn units(&self) -> &LinearUnit {
        &self.units
    }

    pub fn false_easting(&self) -> f64 {
        self.false_easting
    }

    pub fn false_northing(&self) -> f64 {
        self.false_northing
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub(crate) fn a(&self) -> f64 {
        self.ellipsoid.semi_major_axis()
    }

    pub(crate) fn e2(&self) -> f64 {
        self.ellipsoid.eccentricity_squared()
    }

    pub(crate) fn e(&self) -> f64 {
        self.ellipsoid.eccentricity()
    }

    /// Refuse un centre ou une origine fictive non finis
    pub(crate) fn check(&self, projection: &'static str) -> Result<()> {
        if !(self.center.x.is_finite() && self.center.y.is_finite()) {
            return Err(ProjectionError::degenerate(projection, "non-finite center"));
        }
        if self.center.y.abs() > std::f64::consts::FRAC_PI_2 + 1e-12 {
            return Err(ProjectionError::degenerate(
                projection,
                format!("center latitude {} out of range", self.center.y),
            ));
        }
        if !(self.false_easting.is_finite() && self.false_northing.is_finite()) {
            return Err(ProjectionError::degenerate(projection, "non-finite false origin"));
        }
        Ok(())
    }

    /// Mètres (relatifs au centre) vers l'unité de la projection, origine fictive ajoutée
    pub(crate) fn offset(&self, raw: Coord) -> Coord {
        Coord {
            x: self.units.from_metres(raw.x) + self.false_easting,
            y: self.units.from_metres(raw.y) + self.false_northing,
        }
    }

    /// Inverse de [`Frame::offset`]
    pub(crate) fn unoffset(&self, p: Coord) -> Coord {
        Coord {
            x: self.units.to_metres(p.x - self.false_easting),
            y: self.units.to_metres(p.y - self.false_northing),
        }
    }

    /// Sac de paramètres : origine fictive puis centre sous les noms propres à la variante
    pub(crate) fn parameters(&self, lon_name: &str, lat_name: &str) -> ProjectionParameters {
        let mut params = ProjectionParameters::new(AngularUnit::DEGREE, self.units.clone());
        params.add_linear_parameter(FALSE_EASTING, self.false_easting, &self.units);
        params.add_linear_parameter(FALSE_NORTHING, self.false_northing, &self.units);
        params.add_angular_parameter(lon_name, self.center.x, &AngularUnit::RADIAN);
        params.add_angular_parameter(lat_name, self.center.y, &AngularUnit::RADIAN);
        params
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(
            Ellipsoid::WGS_84,
            Coord { x: 0.0, y: 0.0 },
            LinearUnit::METRE,
            0.0,
            0.0,
        )
    }
}
