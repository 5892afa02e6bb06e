//! Projections de Mercator transverse et oblique (Hotine)
//!
//! Les séries de la transverse sont celles de l'UTM, avec un méridien central,
//! une latitude d'origine et un facteur d'échelle quelconques. Elles divergent
//! loin du méridien central : les points à plus de 81° du point (λ0, 0) sont
//! écartés, pôles compris.
//!
//! L'oblique passe par la sphère conforme de Hotine ; l'origine des
//! coordonnées est l'origine naturelle de la ligne centrale.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::Coord;

use super::frame::Frame;
use super::latitude::{conformal_t, Conformal, MeridianArc};
use super::{Family, Planar};
use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geometry::clip::Cap;
use crate::geometry::spherical::wrap_longitude;
use crate::params::{
    ProjectionParameters, AZIMUTH, CENTRAL_MERIDIAN, LATITUDE_OF_CENTER, LATITUDE_OF_ORIGIN,
    LONGITUDE_OF_CENTER, SCALE_FACTOR,
};
use crate::units::AngularUnit;

/// Rayon de la calotte de la Mercator transverse (81°)
const TRANSVERSE_MAX_ANGLE: f64 = 1.4137167;

fn check_scale_factor(projection: &'static str, scale_factor: f64) -> Result<()> {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::degenerate(
            projection,
            format!("scale factor must be positive, got {}", scale_factor),
        ))
    }
}

/// Projection de Mercator transverse ellipsoïdale
#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    frame: Frame,
    k0: f64,
    /// e'² = e² / (1 - e²)
    ep2: f64,
    arc: MeridianArc,
    /// Arc de méridien à la latitude d'origine
    m0: f64,
}

impl TransverseMercator {
    pub fn new(frame: Frame, scale_factor: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        check_scale_factor(Self::NAME, scale_factor)?;
        let e2 = frame.e2();
        let arc = MeridianArc::new(frame.a(), e2);
        Ok(Self {
            k0: scale_factor,
            ep2: e2 / (1.0 - e2),
            m0: arc.distance(frame.center().y),
            arc,
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

impl Planar for TransverseMercator {
    const NAME: &'static str = "Transverse_Mercator";
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
        let k0 = self.k0;
        let m = self.arc.distance(lat);
        if FRAC_PI_2 - lat.abs() < 1e-10 {
            return Coord {
                x: 0.0,
                y: k0 * (m - self.m0),
            };
        }
        let (e2, ep2) = (self.frame.e2(), self.ep2);
        let (sin_phi, cos_phi) = lat.sin_cos();
        let tan_phi = sin_phi / cos_phi;
        let n = self.frame.a() / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = wrap_longitude(lon - self.frame.center().x) * cos_phi;

        let x = k0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let y = k0
            * (m - self.m0
                + n * tan_phi
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6)
                            / 720.0));
        Coord { x, y }
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let (a, e2, ep2, k0) = (self.frame.a(), self.frame.e2(), self.ep2, self.k0);
        let lon0 = self.frame.center().x;
        let phi1 = self.arc.footpoint(self.m0 + y / k0);
        if FRAC_PI_2 - phi1.abs() < 1e-10 {
            return Coord {
                x: lon0,
                y: FRAC_PI_2.copysign(phi1),
            };
        }

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = sin_phi1 / cos_phi1;
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = a / w.sqrt();
        let t1 = tan_phi1 * tan_phi1;
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let r1 = a * (1.0 - e2) / w.powf(1.5);
        let d = x / (n1 * k0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                        - 252.0 * ep2
                        - 3.0 * c1.powi(2))
                        * d.powi(6)
                        / 720.0);
        let dlon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos_phi1;
        Coord {
            x: wrap_longitude(lon0 + dlon),
            y: lat,
        }
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        params.add_dimensionless_parameter(SCALE_FACTOR, self.k0);
    }

    fn cap(&self) -> Option<Cap> {
        Some(Cap::new(
            Coord {
                x: self.frame.center().x,
                y: 0.0,
            },
            TRANSVERSE_MAX_ANGLE,
        ))
    }

    fn wraps_antimeridian(&self) -> bool {
        false
    }
}

/// Projection de Mercator oblique de Hotine, définie par l'azimut de sa ligne
/// centrale au centre de la projection
#[derive(Debug, Clone, PartialEq)]
pub struct ObliqueMercator {
    frame: Frame,
    k0: f64,
    /// Azimut de la ligne centrale, en radians
    alpha: f64,
    b: f64,
    /// A de Hotine, en mètres
    big_a: f64,
    big_e: f64,
    sin_gamma0: f64,
    cos_gamma0: f64,
    sin_alpha: f64,
    cos_alpha: f64,
    /// Longitude de l'origine naturelle
    lambda_z: f64,
    conformal: Conformal,
}

impl ObliqueMercator {
    pub fn new(frame: Frame, scale_factor: f64, azimuth: f64) -> Result<Self> {
        frame.check(Self::NAME)?;
        check_scale_factor(Self::NAME, scale_factor)?;
        if !azimuth.is_finite() {
            return Err(ProjectionError::degenerate(Self::NAME, "non-finite azimuth"));
        }
        let (a, e, e2) = (frame.a(), frame.e(), frame.e2());
        let Coord { x: lon0, y: phi0 } = frame.center();
        let (sin_phi0, cos_phi0) = phi0.sin_cos();
        if cos_phi0.abs() < 1e-10 {
            return Err(ProjectionError::degenerate(Self::NAME, "center latitude at a pole"));
        }

        let b = (1.0 + e2 * cos_phi0.powi(4) / (1.0 - e2)).sqrt();
        let w = 1.0 - e2 * sin_phi0 * sin_phi0;
        let big_a = a * b * scale_factor * (1.0 - e2).sqrt() / w;
        let t0 = conformal_t(e, phi0);
        let d = b * (1.0 - e2).sqrt() / (cos_phi0 * w.sqrt());
        let d2 = (d * d).max(1.0);
        let f = d + (d2 - 1.0).sqrt().copysign(phi0);
        let big_e = f * t0.powf(b);
        let g = (f - 1.0 / f) / 2.0;
        let (sin_alpha, cos_alpha) = azimuth.sin_cos();
        let gamma0 = (sin_alpha / d).clamp(-1.0, 1.0).asin();
        let lambda_z = wrap_longitude(lon0 - (g * gamma0.tan()).asin() / b);

        if [b, big_a, big_e, lambda_z].iter().any(|c| !c.is_finite()) {
            return Err(ProjectionError::degenerate(
                Self::NAME,
                "oblique constants are not finite",
            ));
        }
        let (sin_gamma0, cos_gamma0) = gamma0.sin_cos();
        Ok(Self {
            conformal: Conformal::new(e2),
            frame,
            k0: scale_factor,
            alpha: azimuth,
            b,
            big_a,
            big_e,
            sin_gamma0,
            cos_gamma0,
            sin_alpha,
            cos_alpha,
            lambda_z,
        })
    }

    pub fn from_parameters(ellipsoid: Ellipsoid, params: &ProjectionParameters) -> Result<Self> {
        let scale_factor = params.dimensionless_parameter(SCALE_FACTOR)?;
        let azimuth = params.angular_parameter(AZIMUTH)?;
        Self::new(Frame::from_parameters(ellipsoid, params)?, scale_factor, azimuth)
    }

    pub fn scale_factor(&self) -> f64 {
        self.k0
    }

    /// Azimut de la ligne centrale, en radians
    pub fn azimuth(&self) -> f64 {
        self.alpha
    }

    /// (u, v) dans le repère de la ligne centrale vers (x, y)
    fn rotate(&self, u: f64, v: f64) -> Coord {
        Coord {
            x: v * self.cos_alpha + u * self.sin_alpha,
            y: u * self.cos_alpha - v * self.sin_alpha,
        }
    }
}

impl Planar for ObliqueMercator {
    const NAME: &'static str = "Oblique_Mercator";
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
        Self::new(frame, self.k0, self.alpha)
    }

    fn raw_forward(&self, lon: f64, lat: f64) -> Coord {
        let (b, big_a) = (self.b, self.big_a);
        if FRAC_PI_2 - lat.abs() < 1e-12 {
            // Pôle : limite de U vers ± sin γ0
            let v = (big_a / b) * (FRAC_PI_4 - self.sin_gamma0.asin() * lat.signum() / 2.0)
                .tan()
                .ln();
            return self.rotate(big_a * lat / b, v);
        }
        let q = self.big_e / conformal_t(self.frame.e(), lat).powf(b);
        let s = (q - 1.0 / q) / 2.0;
        let t = (q + 1.0 / q) / 2.0;
        let bl = b * wrap_longitude(lon - self.lambda_z);
        let v_sin = bl.sin();
        let u_ratio = (-v_sin * self.cos_gamma0 + s * self.sin_gamma0) / t;
        let v = big_a * ((1.0 - u_ratio) / (1.0 + u_ratio)).ln() / (2.0 * b);
        let u = (big_a / b)
            * (s * self.cos_gamma0 + v_sin * self.sin_gamma0).atan2(bl.cos());
        self.rotate(u, v)
    }

    fn raw_inverse(&self, x: f64, y: f64) -> Coord {
        let (b, big_a) = (self.b, self.big_a);
        let vp = x * self.cos_alpha - y * self.sin_alpha;
        let up = y * self.cos_alpha + x * self.sin_alpha;
        let q = (-(b * vp) / big_a).exp();
        let s = (q - 1.0 / q) / 2.0;
        let t = (q + 1.0 / q) / 2.0;
        let bu = b * up / big_a;
        let v_sin = bu.sin();
        let u_ratio = (v_sin * self.cos_gamma0 + s * self.sin_gamma0) / t;
        let lat = if u_ratio.abs() >= 1.0 {
            FRAC_PI_2.copysign(u_ratio)
        } else {
            let t = (self.big_e / ((1.0 + u_ratio) / (1.0 - u_ratio)).sqrt()).powf(1.0 / b);
            self.conformal.geodetic_from_t(t)
        };
        let lon = self.lambda_z
            - (s * self.cos_gamma0 - v_sin * self.sin_gamma0).atan2(bu.cos()) / b;
        Coord {
            x: wrap_longitude(lon),
            y: lat,
        }
    }

    fn extra_parameters(&self, params: &mut ProjectionParameters) {
        params.add_dimensionless_parameter(SCALE_FACTOR, self.k0);
        params.add_angular_parameter(AZIMUTH, self.alpha, &AngularUnit::RADIAN);
    }

    fn cap(&self) -> Option<Cap> {
        Some(Cap::new(self.frame.center(), FRAC_PI_2))
    }

    fn wraps_antimeridian(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::LinearUnit;

    fn deg(d: f64) -> f64 {
        f64::to_radians(d)
    }

    fn frame(ellipsoid: Ellipsoid, lon0: f64, lat0: f64) -> Frame {
        Frame::new(
            ellipsoid,
            Coord { x: deg(lon0), y: deg(lat0) },
            LinearUnit::METRE,
            0.0,
            0.0,
        )
    }

    #[test]
    fn test_transverse_reference_point() {
        // Exemple de référence : Clarke 1866, méridien central 75°W, k0 = 0.9996
        let tm = TransverseMercator::new(frame(Ellipsoid::CLARKE_1866, -75.0, 0.0), 0.9996).unwrap();
        let p = tm.forward(Coord { x: deg(-73.5), y: deg(40.5) });
        assert!((p.x - 127106.5).abs() < 0.5, "{:?}", p);
        assert!((p.y - 4484124.4).abs() < 0.5, "{:?}", p);
    }

    #[test]
    fn test_transverse_matches_utm() {
        // Fort-de-France en UTM 20N : environ (708000, 1615000)
        let utm = TransverseMercator::new(
            frame(Ellipsoid::WGS_84, -63.0, 0.0).with_false_origin(500000.0, 0.0),
            0.9996,
        )
        .unwrap();
        let geo = utm.inverse(Coord { x: 708000.0, y: 1615000.0 });
        assert!((geo.x.to_degrees() + 61.07).abs() < 0.2, "{:?}", geo);
        assert!((geo.y.to_degrees() - 14.60).abs() < 0.2, "{:?}", geo);
    }

    #[test]
    fn test_transverse_round_trip() {
        let tm = TransverseMercator::new(frame(Ellipsoid::GRS_1980, 3.0, 46.5), 0.9996).unwrap();
        for dlon in [-3.0, -1.5, 0.0, 0.7, 3.0] {
            for lat in [-75.0, -30.0, 0.0, 12.5, 46.5, 80.0] {
                let p = Coord { x: deg(3.0 + dlon), y: deg(lat) };
                let back = tm.inverse(tm.forward(p));
                assert!(
                    (back.x - p.x).abs() < 1e-8 && (back.y - p.y).abs() < 1e-8,
                    "({}, {}): {:?}",
                    dlon,
                    lat,
                    back
                );
            }
        }
    }

    #[test]
    fn test_transverse_pole_and_cap() {
        let tm = TransverseMercator::new(frame(Ellipsoid::WGS_84, 10.0, 0.0), 1.0).unwrap();
        let pole = tm.raw_forward(deg(50.0), FRAC_PI_2);
        assert_eq!(pole.x, 0.0);
        let back = tm.raw_inverse(pole.x, pole.y);
        assert!((back.y - FRAC_PI_2).abs() < 1e-9 && (back.x - deg(10.0)).abs() < 1e-12);
        let cap = tm.cap().unwrap();
        assert_eq!(cap.center(), Coord { x: deg(10.0), y: 0.0 });
        assert!(!cap.contains(Coord { x: deg(100.0), y: 0.0 }));
        assert!(!tm.wraps_antimeridian());
    }

    #[test]
    fn test_transverse_requires_scale_factor() {
        let mut params = ProjectionParameters::default();
        params.add_parameter(CENTRAL_MERIDIAN, 3.0);
        params.add_parameter(LATITUDE_OF_ORIGIN, 0.0);
        let err = TransverseMercator::from_parameters(Ellipsoid::WGS_84, &params).unwrap_err();
        assert_eq!(err, ProjectionError::missing([SCALE_FACTOR]));
        let err = TransverseMercator::new(frame(Ellipsoid::WGS_84, 0.0, 0.0), 0.0).unwrap_err();
        assert!(matches!(err, ProjectionError::Degenerate { .. }));
    }

    #[test]
    fn test_oblique_equatorial_sphere_is_mercator() {
        let sphere = Ellipsoid::SPHERE;
        let a = sphere.semi_major_axis();
        let omerc = ObliqueMercator::new(frame(sphere, 20.0, 0.0), 0.5, deg(90.0)).unwrap();
        for (dlon, lat) in [(0.0, 0.0), (30.0, 10.0), (-60.0, -45.0), (80.0, 70.0)] {
            let p = omerc.raw_forward(deg(20.0 + dlon), deg(lat));
            let psi = deg(lat).tan().asinh();
            assert!((p.x - 0.5 * a * deg(dlon)).abs() < 1e-6, "{:?}", p);
            assert!((p.y - 0.5 * a * psi).abs() < 1e-6, "{:?}", p);
        }
    }

    #[test]
    fn test_oblique_round_trip() {
        let omerc =
            ObliqueMercator::new(frame(Ellipsoid::WGS_84, 10.0, 45.0), 0.9999, deg(30.0)).unwrap();
        for dlon in [-60.0, -20.0, 0.0, 5.0, 45.0] {
            for lat in [0.0, 20.0, 45.0, 60.0, 80.0] {
                let p = Coord { x: deg(10.0 + dlon), y: deg(lat) };
                let back = omerc.inverse(omerc.forward(p));
                assert!(
                    (back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9,
                    "({}, {}): {:?}",
                    dlon,
                    lat,
                    back
                );
            }
        }
        let pole = omerc.raw_forward(0.0, FRAC_PI_2);
        assert!(pole.x.is_finite() && pole.y.is_finite());
    }

    #[test]
    fn test_oblique_parameters() {
        let omerc =
            ObliqueMercator::new(frame(Ellipsoid::GRS_1980, -5.0, 40.0), 1.0, deg(-12.5)).unwrap();
        let params = omerc.parameters();
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "false_easting",
                "false_northing",
                "longitude_of_center",
                "latitude_of_center",
                "scale_factor",
                "azimuth"
            ]
        );
        assert!((params.parameter(AZIMUTH).unwrap() + 12.5).abs() < 1e-9);
        let back = ObliqueMercator::from_parameters(Ellipsoid::GRS_1980, &params).unwrap();
        let sample = Coord { x: deg(-3.0), y: deg(42.0) };
        let (a, b) = (omerc.forward(sample), back.forward(sample));
        assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    }

    #[test]
    fn test_oblique_polar_center_is_degenerate() {
        let err = ObliqueMercator::new(frame(Ellipsoid::WGS_84, 0.0, 90.0), 1.0, 0.0).unwrap_err();
        assert!(matches!(err, ProjectionError::Degenerate { .. }));
        let mut params = ProjectionParameters::default();
        params.add_parameter(LONGITUDE_OF_CENTER, 0.0);
        params.add_parameter(LATITUDE_OF_CENTER, 45.0);
        params.add_parameter(SCALE_FACTOR, 1.0);
        let err = ObliqueMercator::from_parameters(Ellipsoid::WGS_84, &params).unwrap_err();
        assert_eq!(err, ProjectionError::missing([AZIMUTH]));
    }
}
