//! Trigonométrie sphérique de base (angles en radians)

use std::f64::consts::{PI, TAU};

use geo::Coord;

/// Au-delà de cette amplitude, une longitude est considérée comme invalide
const MAX_WRAPPABLE: f64 = 20.0 * PI;

/// Ramène une longitude dans [-π, π]. Retourne NaN si |lon| > 20π.
pub fn wrap_longitude(lon: f64) -> f64 {
    if !lon.is_finite() || lon.abs() > MAX_WRAPPABLE {
        return f64::NAN;
    }
    let mut lon = lon;
    while lon > PI {
        lon -= TAU;
    }
    while lon < -PI {
        lon += TAU;
    }
    lon
}

/// Ramène une longitude dans [0, 2π). Retourne NaN si |lon| > 20π.
pub fn wrap_longitude_positive(lon: f64) -> f64 {
    if !lon.is_finite() || lon.abs() > MAX_WRAPPABLE {
        return f64::NAN;
    }
    let mut lon = lon;
    while lon >= TAU {
        lon -= TAU;
    }
    while lon < 0.0 {
        lon += TAU;
    }
    lon
}

/// Distance angulaire (formule de haversine) entre deux positions
pub fn great_circle_distance(from: Coord, to: Coord) -> f64 {
    let half_dlat = (to.y - from.y) / 2.0;
    let half_dlon = (to.x - from.x) / 2.0;
    let h = half_dlat.sin().powi(2) + from.y.cos() * to.y.cos() * half_dlon.sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Azimut initial de `from` vers `to`, compté depuis le nord dans le sens horaire
pub fn azimuth(from: Coord, to: Coord) -> f64 {
    let dlon = to.x - from.x;
    (to.y.cos() * dlon.sin())
        .atan2(from.y.cos() * to.y.sin() - from.y.sin() * to.y.cos() * dlon.cos())
}

/// Position atteinte depuis `from` après une distance angulaire `c` selon l'azimut `az`
pub fn destination(from: Coord, c: f64, az: f64) -> Coord {
    let (sin_c, cos_c) = c.sin_cos();
    let (sin_phi, cos_phi) = from.y.sin_cos();
    let lat = (sin_phi * cos_c + cos_phi * sin_c * az.cos()).clamp(-1.0, 1.0).asin();
    let lon = (sin_c * az.sin()).atan2(cos_phi * cos_c - sin_phi * sin_c * az.cos()) + from.x;
    Coord {
        x: wrap_longitude(lon),
        y: lat,
    }
}

/// Cosinus de la distance angulaire entre le centre (sin φ0, cos φ0, λ0) et un point
#[inline]
pub fn cos_distance(lon0: f64, sin_phi0: f64, cos_phi0: f64, p: Coord) -> f64 {
    let (sin_phi, cos_phi) = p.y.sin_cos();
    sin_phi0 * sin_phi + cos_phi0 * cos_phi * (p.x - lon0).cos()
}
