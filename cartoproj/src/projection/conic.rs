//! Projections coniques : conforme de Lambert, équivalente d'Albers,
//! équidistante, et polyconique
//!
//! Le cône est défini par deux parallèles standard. Des parallèles opposés
//! (|φ1| = |φ2|, φ1 ≠ φ2) rendent les formules singulières : le second est
//! alors écarté de 1 %. Des parallèles confondus donnent le cas tangent.
//!
//! La polyconique n'a pas de parallèles standard : chaque parallèle est
//! l'arc d'un cône tangent, le méridien central est en vraie grandeur.

use geo::Coord;

use super::frame::Frame;
use super::latitude::{conformal_t, m, Authalic, Conformal, MeridianArc};
use super::{apex_cap, Family, Planar};
use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geometry::clip::Cap;
use crate::geometry::spherical::wrap_longitude;
use crate::params::{
    ProjectionParameters, CENTRAL_MERIDIAN, LATITUDE_OF_CENTER, LATITUDE_OF_ORIGIN,
    LONGITUDE_OF_CENTER, STANDARD_PARALLEL_1, STANDARD_PARALLEL_2,
};
use crate::units::AngularUnit;

/// Tolérance de convergence de l'inverse polyconique, en radians
const POLYCONIC_EPSILON: f64 = 1e-6;

const POLYCONIC_MAX_ITERATIONS: usize = 75;

/// Parallèles standard tels que fournis, et second parallèle effectif
#[derive(Debug, Clone, Copy, PartialEq)]
struct Parallels {
    phi1: f64,
    phi2: f64,
    effective_phi2: f64,
}

impl Parallels {
    fn new(projection: &'static str, phi1: f64, phi2: f64) -> Result<Self> {
        if !(phi1.is_finite() && phi2.is_finite()) {
            return Err(ProjectionError::degenerate(projection, "non-finite standard parallel"));
        }
        let effective_phi2 = if phi1.abs() == phi2.abs() && phi1 != phi2 {
            phi2 * 1.01
        } else {
            phi2
        };
        Ok(Self {
            phi1,
            phi2,
            effective_phi2,
        })
    }

    fn from_parameters(params: &ProjectionParameters) -> Result<(f64, f64)> {
        Ok((
            params.angular_parameter(STANDARD_PARALLEL_1)?,
            params.angular_parameter(STANDARD_PARALLEL_2)?,
        ))
    }

    fn tangent(&self) -> bool {
        self.phi1 == self.effective_phi2
    }

    fn write(&self, params: &mut ProjectionParameters) {
        params.add_angular_parameter(STANDARD_PARALLEL_1, self.phi1, &AngularUnit::RADIAN);
        params.add_angular_parameter(STANDARD_PARALLEL_2, self.phi2, &AngularUnit::RADIAN);
    }
}

fn check_cone(projection: &'static str, n: f64, constants: &[f64]) -> Result<()> {
    if !n.is_finite() || n.abs() < 1e-10 {
        return Err(ProjectionError::degenerate(
            projection,
            format!("cone constant n = {} (standard parallels symmetric about the equator?)", n),
        ));
    }
    if constants.iter().any(|c| !c.is_finite()) {
        return Err(ProjectionError::degenerate(projection, "cone constants are not finite"));
    }
    Ok(())
}

/// Angle polaire θ d'un point du plan, le signe suivant celui du cône
fn polar_angle(n: f64, x: f64, rho0_minus_y: f64) -> f64 {
    if n < 0.0 {
        (-x).atan2(-rho0_minus_y)
    } else {
        x.atan2(rho0_minus_y)
    }
}

/// Longitude depuis θ ; NaN si le point est dans l'ouverture du cône
fn longitude(lon0: f64, theta: f64, n: f64) -> f64 {
    let theta_over_n = theta / n;
    if theta_over_n.abs() > std::f64::consts::PI {
        f64::NAN
    } else {
        wrap_longitude(lon0 + theta_over_n)
    }
}

/// Projection conique conforme de Lambert à deux parallèles standard
#[derive(Debug, Clone, PartialEq)]
pub struct LambertConformalConic {
    frame: Frame,
    parallels: Parallels,
    n: f64,
    /// F multiplié par a
    af: f64,
    rho0: f64,
    conformal: Conformal,
}

impl LambertConformalConic {
    pub fn new(frame: Frame, phi1: f64, phi2: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        let parallels = Parallels::new(Self::NAME, phi1, phi2)?;
        let (e, e2) = (frame.e(), frame.e2());
        let phi2 = parallels.effective_phi2;
        let (m1, t1) = (m(e2, phi1), conformal_t(e, phi1));
        let n = if parallels.tangent() {
            phi1.sin()
        } else {
            (m1.ln() - m(e2, phi2).ln()) / (t1.ln() - conformal_t(e, phi2).ln())
        };
        let af = frame.a() * m1 / (n * t1.powf(n));
        let rho0 = af * conformal_t(e, frame.center().y).powf(n);
        check_cone(Self::NAME, n, &[af, rho0])?;
        Ok(Self {
            conformal: Conformal::new(e2),
            frame,
            parallels,
            n,
            af,
            rho0,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let (phi1, phi2) = Parallels::from_parameters(params)?;
        Self::new(Frame::from_parameters(ellipsoid, params)?, phi1, phi2)
    }

    /// Constante du cône
    pub fn n(&self) -> f64 {
        self.n
    }

    pub fn standard_parallels(&self) -> (f64, f64) {
        (self.parallels.phi1, self.parallels.phi2)
    }
}

impl Planar for LambertConformalConic {
    const NAME: &'static str = "Lambert_Conformal_Conic_2SP";
    const FAMILY: Family = Family::Conic;
    const LONGITUDE_PARAMETER: &'static str = CENTRAL_MERIDIAN;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_ORIGIN;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame, self.parallels.phi1, self.parallels.phi2)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let rho = self.af * conformal_t(self.frame.e(), lat).powf(self.n);
        let theta = self.n * wrap_longitude(lon - self.frame.center().x);
        Coord {
            x: rho * theta.sin(),
            y: self.rho0 - rho * theta.cos(),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let rho0_minus_y = self.rho0 - y;
        let rho = x.hypot(rho0_minus_y).copysign(self.n);
        let lon0 = self.frame.center().x;
        if rho == 0.0 {
            return Coord {
                x: lon0,
                y: std::f64::consts::FRAC_PI_2.copysign(self.n),
            };
        }
        let t = (rho / self.af).powf(1.0 / self.n);
        Coord {
            x: longitude(lon0, polar_angle(self.n, x, rho0_minus_y), self.n),
            y: self.conformal.geodetic_from_t(t),
        }
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        self.parallels.write(params);
    }

    fn cap(&self) -> Option<Cap> {
        Some(apex_cap(self.frame.center().x, self.n))
    }
}

/// Projection conique équivalente d'Albers
#[derive(Debug, Clone, PartialEq)]
pub struct AlbersEqualAreaConic {
    frame: Frame,
    parallels: Parallels,
    n: f64,
    c: f64,
    rho0: f64,
    authalic: Authalic,
}

impl AlbersEqualAreaConic {
    pub fn new(frame: Frame, phi1: f64, phi2: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        let parallels = Parallels::new(Self::NAME, phi1, phi2)?;
        let e2 = frame.e2();
        let authalic = Authalic::new(e2);
        let phi2 = parallels.effective_phi2;
        let (m1, q1) = (m(e2, phi1), authalic.q(phi1));
        let n = if parallels.tangent() {
            phi1.sin()
        } else {
            let m2 = m(e2, phi2);
            (m1 * m1 - m2 * m2) / (authalic.q(phi2) - q1)
        };
        let c = m1 * m1 + n * q1;
        let rho0 = frame.a() * (c - n * authalic.q(frame.center().y)).sqrt() / n;
        check_cone(Self::NAME, n, &[c, rho0])?;
        Ok(Self {
            frame,
            parallels,
            n,
            c,
            rho0,
            authalic,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let (phi1, phi2) = Parallels::from_parameters(params)?;
        Self::new(Frame::from_parameters(ellipsoid, params)?, phi1, phi2)
    }

    pub fn n(&self) -> f64 {
        self.n
    }

    pub fn standard_parallels(&self) -> (f64, f64) {
        (self.parallels.phi1, self.parallels.phi2)
    }
}

impl Planar for AlbersEqualAreaConic {
    const NAME: &'static str = "Albers_Conic_Equal_Area";
    const FAMILY: Family = Family::Conic;
    const LONGITUDE_PARAMETER: &'static str = LONGITUDE_OF_CENTER;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_CENTER;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame, self.parallels.phi1, self.parallels.phi2)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        let rho = a * (self.c - self.n * self.authalic.q(lat)).sqrt() / self.n;
        let theta = self.n * wrap_longitude(lon - self.frame.center().x);
        Coord {
            x: rho * theta.sin(),
            y: self.rho0 - rho * theta.cos(),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        let rho0_minus_y = self.rho0 - y;
        let rho = x.hypot(rho0_minus_y);
        let q = (self.c - (rho * rho) * (self.n * self.n) / (a * a)) / self.n;
        Coord {
            x: longitude(
                self.frame.center().x,
                polar_angle(self.n, x, rho0_minus_y),
                self.n,
            ),
            y: self.authalic.geodetic_from_q(q),
        }
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        self.parallels.write(params);
    }

    fn cap(&self) -> Option<Cap> {
        Some(apex_cap(self.frame.center().x, self.n))
    }
}

/// Projection conique équidistante : les méridiens sont en vraie grandeur
#[derive(Debug, Clone, PartialEq)]
pub struct EquidistantConic {
    frame: Frame,
    parallels: Parallels,
    n: f64,
    /// G multiplié par a
    ag: f64,
    rho0: f64,
    arc: MeridianArc,
}

impl EquidistantConic {
    pub fn new(frame: Frame, phi1: f64, phi2: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        let parallels = Parallels::new(Self::NAME, phi1, phi2)?;
        let (a, e2) = (frame.a(), frame.e2());
        let arc = MeridianArc::new(a, e2);
        let phi2 = parallels.effective_phi2;
        let (m1, big_m1) = (m(e2, phi1), arc.distance(phi1));
        let n = if parallels.tangent() {
            phi1.sin()
        } else {
            a * (m1 - m(e2, phi2)) / (arc.distance(phi2) - big_m1)
        };
        let ag = a * m1 / n + big_m1;
        let rho0 = ag - arc.distance(frame.center().y);
        check_cone(Self::NAME, n, &[ag, rho0])?;
        Ok(Self {
            frame,
            parallels,
            n,
            ag,
            rho0,
            arc,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let (phi1, phi2) = Parallels::from_parameters(params)?;
        Self::new(Frame::from_parameters(ellipsoid, params)?, phi1, phi2)
    }

    pub fn n(&self) -> f64 {
        self.n
    }

    pub fn standard_parallels(&self) -> (f64, f64) {
        (self.parallels.phi1, self.parallels.phi2)
    }
}

impl Planar for EquidistantConic {
    const NAME: &'static str = "Equidistant_Conic";
    const FAMILY: Family = Family::Conic;
    const LONGITUDE_PARAMETER: &'static str = LONGITUDE_OF_CENTER;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_CENTER;

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame, self.parallels.phi1, self.parallels.phi2)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let rho = self.ag - self.arc.distance(lat);
        let theta = self.n * wrap_longitude(lon - self.frame.center().x);
        Coord {
            x: rho * theta.sin(),
            y: self.rho0 - rho * theta.cos(),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let rho0_minus_y = self.rho0 - y;
        let rho = x.hypot(rho0_minus_y).copysign(self.n);
        Coord {
            x: longitude(
                self.frame.center().x,
                polar_angle(self.n, x, rho0_minus_y),
                self.n,
            ),
            y: self.arc.footpoint(self.ag - rho),
        }
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        self.parallels.write(params);
    }

    fn cap(&self) -> Option<Cap> {
        Some(apex_cap(self.frame.center().x, self.n))
    }
}

/// Projection polyconique (américaine)
#[derive(Debug, Clone, PartialEq)]
pub struct Polyconic {
    frame: Frame,
    arc: MeridianArc,
    /// Arc de méridien à la latitude d'origine
    m0: f64,
}

impl Polyconic {
    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        let arc = MeridianArc::new(frame.a(), frame.e2());
        Ok(Self {
            m0: arc.distance(frame.center().y),
            arc,
            frame,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }

    /// Latitude par itération de Newton sur A = (M0 + y) / a ; `None` sans convergence
    fn latitude(&self, big_a: f64, big_b: f64) -> Option<f64> {
        let e2 = self.frame.e2();
        let mut phi = big_a;
        for _ in 0..=POLYCONIC_MAX_ITERATIONS {
            let sin_phi = phi.sin();
            let c = (1.0 - e2 * sin_phi * sin_phi).sqrt() * phi.tan();
            let ma = self.arc.ratio(phi);
            let mn = self.arc.ratio_derivative(phi);
            let sin_2phi = (2.0 * phi).sin();
            let next = phi
                - (big_a * (c * ma + 1.0) - ma - 0.5 * (ma * ma + big_b) * c)
                    / (e2 * sin_2phi * (ma * ma + big_b - 2.0 * big_a * ma) / (4.0 * c)
                        + (big_a - ma) * (c * mn - 2.0 / sin_2phi)
                        - mn);
            if !next.is_finite() {
                return None;
            }
            if (next - phi).abs() <= POLYCONIC_EPSILON {
                return Some(next);
            }
            phi = next;
        }
        None
    }
}

impl Planar for Polyconic {
    const NAME: &'static str = "Polyconic";
    const FAMILY: Family = Family::Conic;
    const LONGITUDE_PARAMETER: &'static str = CENTRAL_MERIDIAN;
    const LATITUDE_PARAMETER: &'static str = LATITUDE_OF_ORIGIN;

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
        let dlon = wrap_longitude(lon - self.frame.center().x);
        if lat == 0.0 {
            return Coord {
                x: a * dlon,
                y: -self.m0,
            };
        }
        let sin_phi = lat.sin();
        let cot_phi = 1.0 / lat.tan();
        let e = dlon * sin_phi;
        let n = a / (1.0 - self.frame.e2() * sin_phi * sin_phi).sqrt();
        Coord {
            x: n * cot_phi * e.sin(),
            y: self.arc.distance(lat) - self.m0 + n * cot_phi * (1.0 - e.cos()),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        let lon0 = self.frame.center().x;
        let big_a = (self.m0 + y) / a;
        if big_a == 0.0 {
            return Coord {
                x: wrap_longitude(lon0 + x / a),
                y: 0.0,
            };
        }
        let big_b = (x * x) / (a * a) + big_a * big_a;
        let Some(phi) = self.latitude(big_a, big_b) else {
            return Coord {
                x: f64::NAN,
                y: f64::NAN,
            };
        };
        let sin_phi = phi.sin();
        let c = (1.0 - self.frame.e2() * sin_phi * sin_phi).sqrt() * phi.tan();
        Coord {
            x: wrap_longitude(lon0 + (x * c / a).asin() / sin_phi),
            y: phi,
        }
    }

    fn cap(&self) -> Option<Cap> {
        Some(Cap::new(
            Coord {
                x: self.frame.center().x,
                y: 0.0,
            },
            std::f64::consts::FRAC_PI_2,
        ))
    }

    fn wraps_antimeridian(&self) -> bool {
        false
    }
}
