//! Projections cylindriques : équivalente de Lambert, Miller, Mercator, et la
//! pseudo-cylindrique de Robinson
//!
//! La latitude du centre sert de parallèle standard (facteur d'échelle) et non
//! d'origine des ordonnées : le centre se projette sur l'axe des x.

use geo::Coord;

use super::frame::Frame;
use super::latitude::{m, Authalic, Conformal};
use super::{Family, LineType, Planar};
use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geometry::spherical::wrap_longitude;
use crate::params::{
    ProjectionParameters, CENTRAL_MERIDIAN, LATITUDE_OF_CENTER, LATITUDE_OF_ORIGIN,
    LONGITUDE_OF_CENTER, SCALE_FACTOR, STANDARD_PARALLEL_1,
};

/// Ordonnées tabulées de Robinson tous les 5° (avec une entrée miroir sous l'équateur)
const ROBINSON_Y: [f64; 21] = [
    0.0, -0.062, 0.0, 0.062, 0.124, 0.186, 0.248, 0.31, 0.372, 0.434, 0.4958, 0.5571, 0.6176,
    0.6769, 0.7346, 0.7903, 0.8435, 0.8936, 0.9394, 0.9761, 1.0,
];

/// Longueurs relatives des parallèles, avant le facteur 0.9858
const ROBINSON_X: [f64; 21] = [
    0.0, 0.9986, 1.0, 0.9986, 0.9954, 0.99, 0.9822, 0.973, 0.96, 0.9427, 0.9216, 0.8962, 0.8679,
    0.835, 0.7986, 0.7597, 0.7186, 0.6732, 0.6213, 0.5722, 0.5322,
];

const ROBINSON_X_SCALE: f64 = 0.9858;

/// Marge sur l'indice de tabulation
const ROBINSON_EPSILON: f64 = 1e-6;

/// Tolérance de l'inverse sur l'ordonnée, en mètres
const ROBINSON_Y_TOLERANCE: f64 = 1e-5;

const ROBINSON_MAX_ITERATIONS: usize = 75;

/// Interpolation de Stirling autour de l'entrée `index + 2`, `p` dans [0, 1]
fn robinson_interpolate(table: &[f64; 21], index: i32, p: f64) -> f64 {
    let i = (index + 1) as usize;
    table[i + 1]
        + p * (table[i + 2] - table[i]) / 2.0
        + p * p * (table[i + 2] - 2.0 * table[i + 1] + table[i]) / 2.0
}

/// Projection cylindrique équivalente (Lambert), ellipsoïdale
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalEqualArea {
    frame: Frame,
    k0: f64,
    authalic: Authalic,
}

impl CylindricalEqualArea {
    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        let k0 = m(frame.e2(), frame.center().y);
        if k0.abs() < 1e-12 {
            return Err(ProjectionError::degenerate(
                Self::NAME,
                "standard parallel at a pole",
            ));
        }
        Ok(Self {
            authalic: Authalic::new(frame.e2()),
            k0,
            frame,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }
}

impl Planar for CylindricalEqualArea {
    const NAME: &'static str = "Cylindrical_Equal_Area";
    const FAMILY: Family = Family::Cylindrical;
    const LONGITUDE_PARAMETER: &'static str = CENTRAL_MERIDIAN;
    const LATITUDE_PARAMETER: &'static str = STANDARD_PARALLEL_1;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        Coord {
            x: a * self.k0 * wrap_longitude(lon - self.frame.center().x),
            y: a * self.authalic.q(lat) / (2.0 * self.k0),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        Coord {
            x: self.frame.center().x + x / (a * self.k0),
            y: self.authalic.geodetic_from_q(2.0 * y * self.k0 / a),
        }
    }
}

/// Projection cylindrique de Miller (sphérique, rayon = demi-grand axe)
#[derive(Debug, Clone, PartialEq)]
pub struct Miller {
    frame: Frame,
}

impl Miller {
    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        Ok(Self { frame })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }
}

impl Planar for Miller {
    const NAME: &'static str = "Miller_Cylindrical";
    const FAMILY: Family = Family::Cylindrical;
    const LONGITUDE_PARAMETER: &'static str = LONGITUDE_OF_CENTER;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_CENTER;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        Coord {
            x: a * wrap_longitude(lon - self.frame.center().x),
            y: a * (0.8 * lat).tan().asinh() / 0.8,
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        Coord {
            x: x / a + self.frame.center().x,
            y: (0.8 * y / a).sinh().atan() / 0.8,
        }
    }
}

/// Projection de Mercator ellipsoïdale, avec facteur d'échelle.
///
/// Les droites de la carte sont des loxodromies : aucune densification en
/// mode `Rhumb`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mercator {
    frame: Frame,
    k0: f64,
    /// Facteur du parallèle standard (1 à l'équateur)
    spq: f64,
    conformal: Conformal,
}

impl Mercator {
    pub fn new(frame: Frame, scale_factor: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(ProjectionError::degenerate(
                Self::NAME,
                format!("scale factor must be positive, got {}", scale_factor),
            ));
        }
        let phi0 = frame.center().y;
        let spq = if phi0 == 0.0 { 1.0 } else { m(frame.e2(), phi0) };
        if spq.abs() < 1e-12 {
            return Err(ProjectionError::degenerate(Self::NAME, "center latitude at a pole"));
        }
        Ok(Self {
            conformal: Conformal::new(frame.e2()),
            k0: scale_factor,
            spq,
            frame,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let scale_factor = params.dimensionless_parameter(SCALE_FACTOR)?;
        Self::new(Frame::from_parameters(ellipsoid, params)?, scale_factor)
    }

    pub fn scale_factor(&self) -> f64 {
        self.k0
    }
}

impl Planar for Mercator {
    const NAME: &'static str = "Mercator_1SP";
    const FAMILY: Family = Family::Cylindrical;
    const LONGITUDE_PARAMETER: &'static str = CENTRAL_MERIDIAN;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_ORIGIN;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame, self.k0)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        let e = self.frame.e();
        let sin_phi = lat.sin();
        let x = self.k0 * a * wrap_longitude(lon - self.frame.center().x) * self.spq;
        let y = if sin_phi.abs() >= 1.0 {
            f64::INFINITY.copysign(lat)
        } else {
            let es = e * sin_phi;
            let ratio = ((1.0 + sin_phi) / (1.0 - sin_phi)) * ((1.0 - es) / (1.0 + es)).powf(e);
            self.k0 * (a / 2.0) * ratio.ln() * self.spq
        };
        Coord { x, y }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let scale = self.k0 * self.frame.a();
        let t = (-(y / self.spq) / scale).exp();
        Coord {
            x: (x / self.spq) / scale + self.frame.center().x,
            y: self.conformal.geodetic_from_t(t),
        }
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        params.add_dimensionless_parameter(SCALE_FACTOR, self.k0);
    }

    fn densify_line_type(&self) -> LineType {
        match self.frame.line_type() {
            LineType::Rhumb => LineType::Straight,
            other => other,
        }
    }
}

/// Projection de Robinson : tables d'ordonnées et de longueurs de
/// parallèles interpolées tous les 5°, sur une sphère de rayon a.
///
/// Le centre est toujours sur l'équateur ; seule la longitude est un paramètre.
#[derive(Debug, Clone, PartialEq)]
pub struct Robinson {
    frame: Frame,
}

impl Robinson {
    pub fn new(frame: Frame) -> Result<Self> {
        let lon0 = frame.center().x;
        let frame = frame.with_center(Coord { x: lon0, y: 0.0 });
        frame.check(Self::NAME)?;
        Ok(Self { frame })
    }

    /// Seule la longitude du centre est lue ; la latitude vaut 0
    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let mut params = params.clone();
        params.add_parameter(LATITUDE_OF_CENTER, 0.0);
        Self::new(Frame::from_parameters(ellipsoid, &params)?)
    }

    /// Ordonnée en mètres à la position (`index`, `p`) de la table, du signe de `sign`
    fn ordinate(&self, sign: f64, index: i32, p: f64) -> f64 {
        sign.signum()
            * self.frame.a()
            * robinson_interpolate(&ROBINSON_Y, index, p)
            * std::f64::consts::FRAC_PI_2
    }

    fn parallel_length(index: i32, p: f64) -> f64 {
        ROBINSON_X_SCALE * robinson_interpolate(&ROBINSON_X, index, p)
    }

    /// Latitude en degrés (et position dans la table) d'une ordonnée ; `None` au-delà des pôles
    fn latitude(&self, y: f64) -> Option<(f64, i32, f64)> {
        let a = self.frame.a();
        let yy = 2.0 * y / std::f64::consts::PI / a;
        let mut index = ((yy * 90.0 / 5.0).abs() - ROBINSON_EPSILON) as i32;
        if index >= 18 {
            return None;
        }
        index = index.max(1);
        // Segment de la table qui encadre |yy|
        let mut phid = loop {
            let base = index as usize;
            let u = ROBINSON_Y[base + 3] - ROBINSON_Y[base + 1];
            let v = ROBINSON_Y[base + 3] - 2.0 * ROBINSON_Y[base + 2] + ROBINSON_Y[base + 1];
            let t = 2.0 * (yy.abs() - ROBINSON_Y[base + 2]) / u;
            let c = v / u;
            let p = t * (1.0 - c * t * (1.0 - 2.0 * c * t));
            if p >= 0.0 || index == 1 {
                break y.signum() * (p + index as f64) * 5.0;
            }
            index -= 1;
        };
        for _ in 0..ROBINSON_MAX_ITERATIONS {
            let mut p = (phid / 5.0).abs();
            let index = (p - ROBINSON_EPSILON) as i32;
            if index >= 18 {
                return None;
            }
            p -= index as f64;
            let y1 = self.ordinate(y, index, p);
            phid -= 180.0 * (y1 - y) / std::f64::consts::PI / a;
            if (y1 - y).abs() <= ROBINSON_Y_TOLERANCE {
                return Some((phid, index, p));
            }
        }
        None
    }
}

impl Planar for Robinson {
    const NAME: &'static str = "Robinson";
    const FAMILY: Family = Family::Cylindrical;
    const LONGITUDE_PARAMETER: &'static str = LONGITUDE_OF_CENTER;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_CENTER;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let dlon = wrap_longitude(lon - self.frame.center().x);
        let lat_deg = lat.to_degrees();
        let mut p = (lat_deg / 5.0).abs();
        let index = ((p - ROBINSON_EPSILON).floor() as i32).min(17);
        p -= index as f64;
        Coord {
            x: self.frame.a() * Self::parallel_length(index, p) * dlon,
            y: self.ordinate(lat_deg, index, p),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let Some((phid, index, p)) = self.latitude(y) else {
            return Coord {
                x: f64::NAN,
                y: f64::NAN,
            };
        };
        let dlon = x / (self.frame.a() * Self::parallel_length(index, p));
        let lon = if dlon.abs() > std::f64::consts::PI + 1e-12 {
            f64::NAN
        } else {
            wrap_longitude(self.frame.center().x + dlon)
        };
        Coord {
            x: lon,
            y: phid.to_radians(),
        }
    }

    /// Le centre s'écrit par sa seule longitude
    fn parameters(&self) -> ProjectionParameters {
        let mut params = self
            .frame
            .parameters(Self::LONGITUDE_PARAMETER, Self::LATITUDE_PARAMETER);
        params.remove(Self::LATITUDE_PARAMETER);
        params
    }
}
