//! Projection géographique (équirectangulaire en unités angulaires)
//!
//! Les longitudes sont ramenées autour du méridien central et multipliées par
//! cos φ0 ; les latitudes sont recopiées. Le résultat est exprimé dans une
//! unité angulaire (degrés par défaut).

use geo::Coord;

use super::LineType;
use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geometry::spherical::wrap_longitude;
use crate::params::{ProjectionParameters, CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN};
use crate::units::{AngularUnit, LinearUnit};

#[derive(Debug, Clone, PartialEq)]
pub struct Geographic {
    ellipsoid: Ellipsoid,
    center: Coord,
    unit: AngularUnit,
    line_type: LineType,
    cos_phi0: f64,
}

impl Geographic {
    pub const NAME: &'static str = "Geographic";

    /// Centre en radians ; refuse un centre au pôle (cos φ0 nul)
    pub fn new(ellipsoid: Ellipsoid, center: Coord, unit: AngularUnit) -> Result<Self> {
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(ProjectionError::degenerate(Self::NAME, "non-finite center"));
        }
        let cos_phi0 = center.y.cos();
        if cos_phi0.abs() < 1e-12 || center.y.abs() > std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::degenerate(
                Self::NAME,
                format!("center latitude {} is at or beyond a pole", center.y),
            ));
        }
        Ok(Self {
            ellipsoid,
            center,
            unit,
            line_type: LineType::default(),
            cos_phi0,
        })
    }

    /// Lit le centre et l'unité de sortie (l'unité angulaire du sac)
    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let center = Coord {
            x: params.center_longitude()?,
            y: params.center_latitude()?,
        };
        Self::new(ellipsoid, center, params.angular_unit().clone())
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn center(&self) -> Coord {
        self.center
    }

    pub fn unit(&self) -> &AngularUnit {
        &self.unit
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn with_center(&self, center: Coord) -> Result<Self> {
        let mut g = Self::new(self.ellipsoid.clone(), center, self.unit.clone())?;
        g.line_type = self.line_type;
        Ok(g)
    }

    pub fn with_ellipsoid(&self, ellipsoid: Ellipsoid) -> Result<Self> {
        Ok(Self {
            ellipsoid,
            ..self.clone()
        })
    }

    pub fn with_unit(&self, unit: AngularUnit) -> Result<Self> {
        Ok(Self {
            unit,
            ..self.clone()
        })
    }

    pub fn with_line_type(&self, line_type: LineType) -> Self {
        Self {
            line_type,
            ..self.clone()
        }
    }

    pub fn forward(&self, p: Coord) -> Coord {
        Coord {
            x: self
                .unit
                .from_radians(wrap_longitude(p.x - self.center.x) * self.cos_phi0),
            y: self.unit.from_radians(p.y),
        }
    }

    pub fn inverse(&self, p: Coord) -> Coord {
        Coord {
            x: self.center.x + self.unit.to_radians(p.x) / self.cos_phi0,
            y: self.unit.to_radians(p.y),
        }
    }

    /// Centre exprimé dans l'unité de sortie
    pub fn parameters(&self) -> ProjectionParameters {
        let mut params = ProjectionParameters::new(self.unit.clone(), LinearUnit::METRE);
        params.add_angular_parameter(CENTRAL_MERIDIAN, self.center.x, &AngularUnit::RADIAN);
        params.add_angular_parameter(LATITUDE_OF_ORIGIN, self.center.y, &AngularUnit::RADIAN);
        params
    }
}

impl Default for Geographic {
    fn default() -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS_84,
            center: Coord { x: 0.0, y: 0.0 },
            unit: AngularUnit::DEGREE,
            line_type: LineType::default(),
            cos_phi0: 1.0,
        }
    }
}
