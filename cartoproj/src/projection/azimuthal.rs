//! Projections azimutales
//!
//! Toutes partagent la même géométrie autour du centre : seule la fonction
//! radiale (échelle k' en fonction de la distance angulaire c) change d'une
//! variante à l'autre. Chacune n'est valide qu'à l'intérieur de sa calotte
//! de rayon maxC.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use geo::Coord;

use super::frame::Frame;
use super::latitude::{m, Authalic};
use super::{Family, LineType, Planar};
use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geometry::clip::Cap;
use crate::geometry::spherical::wrap_longitude;
use crate::params::{
    ProjectionParameters, CENTRAL_MERIDIAN, LATITUDE_OF_CENTER, LATITUDE_OF_ORIGIN,
    LONGITUDE_OF_CENTER, SCALE_FACTOR,
};

/// Sinus et cosinus de la latitude du centre
#[derive(Debug, Clone, Copy, PartialEq)]
struct Center {
    lon0: f64,
    phi0: f64,
    sin_phi0: f64,
    cos_phi0: f64,
}

impl Center {
    fn new(center: Coord) -> Self {
        let (sin_phi0, cos_phi0) = center.y.sin_cos();
        Self {
            lon0: center.x,
            phi0: center.y,
            sin_phi0,
            cos_phi0,
        }
    }

    /// `radial(cos c)` donne a·k'
    fn forward(&self, lon: f64, lat: f64, radial: impl Fn(f64) -> f64) -> Coord {
        let dl = wrap_longitude(lon - self.lon0);
        let (sin_phi, cos_phi) = lat.sin_cos();
        let (sin_dl, cos_dl) = dl.sin_cos();
        let cos_c = self.sin_phi0 * sin_phi + self.cos_phi0 * cos_phi * cos_dl;
        if cos_c >= 1.0 {
            return Coord { x: 0.0, y: 0.0 };
        }
        let k = radial(cos_c);
        Coord {
            x: k * cos_phi * sin_dl,
            y: k * (self.cos_phi0 * sin_phi - self.sin_phi0 * cos_phi * cos_dl),
        }
    }

    /// `angle(ρ)` donne la distance angulaire c d'un point du plan
    fn inverse(&self, x: f64, y: f64, angle: impl Fn(f64) -> f64) -> Coord {
        let rho = x.hypot(y);
        if rho == 0.0 {
            return Coord {
                x: self.lon0,
                y: self.phi0,
            };
        }
        let (sin_c, cos_c) = angle(rho).sin_cos();
        let lat = (cos_c * self.sin_phi0 + y * sin_c * self.cos_phi0 / rho).asin();
        let lon = if self.cos_phi0.abs() < 1e-12 {
            if self.phi0 > 0.0 {
                self.lon0 + x.atan2(-y)
            } else {
                self.lon0 + x.atan2(y)
            }
        } else {
            self.lon0
                + (x * sin_c).atan2(rho * self.cos_phi0 * cos_c - y * self.sin_phi0 * sin_c)
        };
        Coord {
            x: wrap_longitude(lon),
            y: lat,
        }
    }
}

/// Implémente le contrat `Planar` commun aux azimutales sphériques
macro_rules! azimuthal_planar {
    ($ty:ident, $name:expr, $lon:expr, $lat:expr) => {
        const NAME: &'static str = $name;
        const FAMILY: Family = Family::Azimuthal;
        const LONGITUDE_PARAMETER: &'static str = $lon;
        const LATITUDE_PARAMETER: &'static str = $lat;

        fn frame(&self) -> &Frame {
            &self.frame
        }

        fn frame_mut(&mut self) -> &mut Frame {
            &mut self.frame
        }

        fn cap(&self) -> Option<Cap> {
            Some(Cap::new(self.frame.center(), $ty::MAX_ANGLE))
        }
    };
}

/// Projection azimutale équidistante (sphérique)
#[derive(Debug, Clone, PartialEq)]
pub struct AzimuthalEquidistant {
    frame: Frame,
    center: Center,
}

impl AzimuthalEquidistant {
    pub const MAX_ANGLE: f64 = PI - FRAC_PI_4;

    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        Ok(Self {
            center: Center::new(frame.center()),
            frame,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }
}

impl Planar for AzimuthalEquidistant {
    azimuthal_planar!(
        AzimuthalEquidistant,
        "Azimuthal_Equidistant",
        LONGITUDE_OF_CENTER,
        LATITUDE_OF_CENTER
    );

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        self.center.forward(lon, lat, |cos_c| {
            let c = cos_c.max(-1.0).acos();
            a * c / c.sin()
        })
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        self.center.inverse(x, y, |rho| rho / a)
    }
}

/// Projection gnomonique : les grands cercles sont des droites
#[derive(Debug, Clone, PartialEq)]
pub struct Gnomonic {
    frame: Frame,
    center: Center,
}

impl Gnomonic {
    /// Environ 80° : au-delà, les coordonnées explosent
    pub const MAX_ANGLE: f64 = 1.396;

    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        Ok(Self {
            center: Center::new(frame.center()),
            frame,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }
}

impl Planar for Gnomonic {
    azimuthal_planar!(Gnomonic, "Gnomonic", CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN);

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        self.center.forward(lon, lat, |cos_c| a / cos_c)
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        self.center.inverse(x, y, |rho| (rho / a).atan())
    }

    fn densify_line_type(&self) -> LineType {
        match self.frame.line_type() {
            LineType::GreatCircle => LineType::Straight,
            other => other,
        }
    }
}

/// Projection orthographique : l'hémisphère vu de l'infini
#[derive(Debug, Clone, PartialEq)]
pub struct Orthographic {
    frame: Frame,
    center: Center,
}

impl Orthographic {
    pub const MAX_ANGLE: f64 = FRAC_PI_2;

    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        Ok(Self {
            center: Center::new(frame.center()),
            frame,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }
}

impl Planar for Orthographic {
    azimuthal_planar!(Orthographic, "Orthographic", CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN);

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let a = self.frame.a();
        self.center.forward(lon, lat, |_| a)
    }

    /// NaN au-delà du disque de rayon a
    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let a = self.frame.a();
        self.center.inverse(x, y, |rho| {
            let s = rho / a;
            // Points du bord, légèrement hors du disque par arrondi
            if s > 1.0 && s < 1.0 + 1e-12 {
                FRAC_PI_2
            } else {
                s.asin()
            }
        })
    }
}

/// Projection stéréographique (sphérique), avec facteur d'échelle au centre
#[derive(Debug, Clone, PartialEq)]
pub struct Stereographic {
    frame: Frame,
    center: Center,
    k0: f64,
}

impl Stereographic {
    pub const MAX_ANGLE: f64 = FRAC_PI_2;

    pub fn new(frame: Frame, scale_factor: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(ProjectionError::degenerate(
                Self::NAME,
                format!("scale factor must be positive, got {}", scale_factor),
            ));
        }
        Ok(Self {
            center: Center::new(frame.center()),
            k0: scale_factor,
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

impl Planar for Stereographic {
    azimuthal_planar!(Stereographic, "Stereographic", CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN);

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame, self.k0)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let scale = 2.0 * self.frame.a() * self.k0;
        self.center.forward(lon, lat, |cos_c| scale / (1.0 + cos_c))
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let scale = 2.0 * self.frame.a() * self.k0;
        self.center.inverse(x, y, |rho| 2.0 * (rho / scale).atan())
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        params.add_dimensionless_parameter(SCALE_FACTOR, self.k0);
    }
}

/// Projection azimutale équivalente de Lambert, ellipsoïdale (via la latitude authalique)
#[derive(Debug, Clone, PartialEq)]
pub struct AzimuthalEqualArea {
    frame: Frame,
    authalic: Authalic,
    /// Rayon de la sphère authalique
    rq: f64,
    d: f64,
    sin_beta1: f64,
    cos_beta1: f64,
}

impl AzimuthalEqualArea {
    pub const MAX_ANGLE: f64 = FRAC_PI_2;

    pub fn new(frame: Frame) -> Result<Self> {
        frame.check(Self::NAME)?;
        let a = frame.a();
        let phi1 = frame.center().y;
        let authalic = Authalic::new(frame.e2());
        let rq = a * (authalic.qp() / 2.0).sqrt();
        let (beta1, d) = if phi1.cos() < 1e-10 {
            (FRAC_PI_2.copysign(phi1), 1.0)
        } else {
            let beta1 = authalic.beta(phi1);
            (beta1, a * m(frame.e2(), phi1) / (rq * beta1.cos()))
        };
        let (sin_beta1, cos_beta1) = beta1.sin_cos();
        Ok(Self {
            frame,
            authalic,
            rq,
            d,
            sin_beta1,
            cos_beta1,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        Self::new(Frame::from_parameters(ellipsoid, params)?)
    }
}

impl Planar for AzimuthalEqualArea {
    azimuthal_planar!(
        AzimuthalEqualArea,
        "Lambert_Azimuthal_Equal_Area",
        LONGITUDE_OF_CENTER,
        LATITUDE_OF_CENTER
    );

    fn rebuild(&self, frame: Frame) -> Result<Self> {
        Self::new(frame)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let dl = wrap_longitude(lon - self.frame.center().x);
        let (sin_dl, cos_dl) = dl.sin_cos();
        let (sin_beta, cos_beta) = self.authalic.beta(lat).sin_cos();
        let denominator = 1.0 + self.sin_beta1 * sin_beta + self.cos_beta1 * cos_beta * cos_dl;
        let b = self.rq * (2.0 / denominator).sqrt();
        Coord {
            x: b * self.d * cos_beta * sin_dl,
            y: (b / self.d) * (self.cos_beta1 * sin_beta - self.sin_beta1 * cos_beta * cos_dl),
        }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let d = self.d;
        let rho = ((x / d) * (x / d) + (d * y) * (d * y)).sqrt();
        if rho == 0.0 {
            return self.frame.center();
        }
        let ce = 2.0 * (rho / (2.0 * self.rq)).asin();
        let (sin_ce, cos_ce) = ce.sin_cos();
        let beta = (cos_ce * self.sin_beta1 + d * y * sin_ce * self.cos_beta1 / rho).asin();
        let lon = self.frame.center().x
            + (x * sin_ce)
                .atan2(d * rho * self.cos_beta1 * cos_ce - d * d * y * self.sin_beta1 * sin_ce);
        Coord {
            x: wrap_longitude(lon),
            y: self.authalic.geodetic(beta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::LinearUnit;

    fn frame(ellipsoid: Ellipsoid, lon0: f64, lat0: f64) -> Frame {
        Frame::new(
            ellipsoid,
            Coord { x: lon0, y: lat0 },
            LinearUnit::METRE,
            0.0,
            0.0,
        )
    }

    fn unit_sphere() -> Ellipsoid {
        Ellipsoid::new("Unit", 1.0, 0.0).unwrap()
    }

    /// Aller-retour sur des points à moins de `max_angle` du centre
    fn assert_round_trip<P: Planar>(projection: &P, max_angle: f64) {
        let cap = Cap::new(projection.frame().center(), max_angle);
        for lon in (-170..=170).step_by(20) {
            for lat in (-80..=80).step_by(20) {
                let p = Coord {
                    x: f64::to_radians(lon as f64),
                    y: f64::to_radians(lat as f64),
                };
                if !cap.contains(p) {
                    continue;
                }
                let back = projection.inverse(projection.forward(p));
                assert!(
                    (back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9,
                    "{} ({}, {}): {:?}",
                    P::NAME,
                    lon,
                    lat,
                    back
                );
            }
        }
    }

    #[test]
    fn test_equidistant_unit_sphere() {
        let aeqd = AzimuthalEquidistant::new(frame(unit_sphere(), 0.0, 0.0)).unwrap();
        let p = aeqd.forward(Coord { x: FRAC_PI_2, y: 0.0 });
        assert!((p.x - FRAC_PI_2).abs() < 1e-12, "{:?}", p);
        assert!(p.y.abs() < 1e-12);
        // La distance au centre est conservée le long de tout azimut
        let q = aeqd.forward(Coord { x: 0.0, y: 1.0 });
        assert!((q.y - 1.0).abs() < 1e-12 && q.x.abs() < 1e-12);
    }

    #[test]
    fn test_center_maps_to_false_origin() {
        let frame = frame(Ellipsoid::WGS_84, 0.4, 0.7).with_false_origin(1000.0, -2000.0);
        let center = frame.center();
        let aeqd = AzimuthalEquidistant::new(frame.clone()).unwrap();
        let ortho = Orthographic::new(frame.clone()).unwrap();
        let laea = AzimuthalEqualArea::new(frame).unwrap();
        for p in [aeqd.forward(center), ortho.forward(center), laea.forward(center)] {
            assert!((p.x - 1000.0).abs() < 1e-6 && (p.y + 2000.0).abs() < 1e-6, "{:?}", p);
        }
    }

    #[test]
    fn test_orthographic_boundary() {
        let ortho = Orthographic::new(frame(Ellipsoid::SPHERE, 0.0, 0.0)).unwrap();
        let cap = ortho.cap().unwrap();
        assert!(cap.contains(Coord { x: FRAC_PI_2, y: 0.0 }));
        assert!(!cap.contains(Coord { x: FRAC_PI_2 + 1e-6, y: 0.0 }));
        let edge = ortho.forward(Coord { x: FRAC_PI_2, y: 0.0 });
        assert!((edge.x - Ellipsoid::SPHERE.semi_major_axis()).abs() < 1e-6);
        // Au-delà du disque, pas d'inverse
        let outside = ortho.inverse(Coord { x: 7.0e6, y: 0.0 });
        assert!(outside.y.is_nan());
    }

    #[test]
    fn test_round_trips() {
        let center = (0.3, 0.8);
        let f = frame(Ellipsoid::SPHERE, center.0, center.1).with_false_origin(500.0, 250.0);
        assert_round_trip(&AzimuthalEquidistant::new(f.clone()).unwrap(), 2.3);
        assert_round_trip(&Gnomonic::new(f.clone()).unwrap(), 1.3);
        assert_round_trip(&Orthographic::new(f.clone()).unwrap(), 1.5);
        assert_round_trip(&Stereographic::new(f.clone(), 0.9996).unwrap(), 1.5);
        let wgs = frame(Ellipsoid::WGS_84, center.0, center.1);
        assert_round_trip(&AzimuthalEqualArea::new(wgs).unwrap(), 1.5);
    }

    #[test]
    fn test_polar_aspects_round_trip() {
        for lat0 in [FRAC_PI_2, -FRAC_PI_2] {
            let f = frame(Ellipsoid::WGS_84, 0.2, lat0);
            assert_round_trip(&AzimuthalEqualArea::new(f.clone()).unwrap(), 1.5);
            assert_round_trip(&Stereographic::new(f.clone(), 1.0).unwrap(), 1.5);
            assert_round_trip(&AzimuthalEquidistant::new(f).unwrap(), 2.3);
        }
    }

    #[test]
    fn test_polar_stereographic_radius() {
        let a = Ellipsoid::SPHERE.semi_major_axis();
        let stereo = Stereographic::new(frame(Ellipsoid::SPHERE, 0.0, FRAC_PI_2), 0.994).unwrap();
        let phi = f64::to_radians(60.0);
        let p = stereo.forward(Coord { x: 0.0, y: phi });
        let rho = 2.0 * a * 0.994 * (FRAC_PI_4 - phi / 2.0).tan();
        assert!(p.x.abs() < 1e-6);
        assert!((p.y + rho).abs() < 1e-6, "{:?} vs {}", p, rho);
    }

    #[test]
    fn test_equal_area_sphere_radius() {
        let a = Ellipsoid::SPHERE.semi_major_axis();
        let laea = AzimuthalEqualArea::new(frame(Ellipsoid::SPHERE, 0.0, 0.0)).unwrap();
        let p = laea.forward(Coord { x: FRAC_PI_2, y: 0.0 });
        assert!((p.x - a * 2f64.sqrt()).abs() < 1e-6, "{:?}", p);
    }

    #[test]
    fn test_gnomonic_skips_great_circle_densification() {
        let f = frame(Ellipsoid::SPHERE, 0.0, 0.0).with_line_type(LineType::GreatCircle);
        assert_eq!(Gnomonic::new(f.clone()).unwrap().densify_line_type(), LineType::Straight);
        assert_eq!(
            Orthographic::new(f).unwrap().densify_line_type(),
            LineType::GreatCircle
        );
    }

    #[test]
    fn test_stereographic_requires_scale_factor() {
        let mut params = ProjectionParameters::new(
            crate::units::AngularUnit::DEGREE,
            LinearUnit::METRE,
        );
        params.add_parameter(CENTRAL_MERIDIAN, 0.0);
        params.add_parameter(LATITUDE_OF_ORIGIN, 90.0);
        let err = Stereographic::from_parameters(Ellipsoid::WGS_84, &params).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingParameter { .. }));
        params.add_parameter(SCALE_FACTOR, 0.97);
        let stereo = Stereographic::from_parameters(Ellipsoid::WGS_84, &params).unwrap();
        assert_eq!(stereo.scale_factor(), 0.97);
        assert_eq!(stereo.parameters().parameter(SCALE_FACTOR), Some(0.97));
    }
}
