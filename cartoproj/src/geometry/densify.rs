//! Densification des segments en loxodromies ou en orthodromies
//!
//! Chaque segment droit (en longitude/latitude) est remplacé par une suite de
//! points intermédiaires suivant la ligne choisie. Le nombre de points dépend
//! de la longueur du segment : environ un point par degré, au plus 180.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::Coord;

use super::spherical::{wrap_longitude, wrap_longitude_positive};
use crate::projection::LineType;

/// Nombre maximal de points intermédiaires par segment
pub const MAX_SEGMENTS: usize = 180;

/// Pas de densification (un degré en radians, arrondi)
const STEP: f64 = 0.01745;

/// Densifie une suite de sommets selon `line_type`. Le dernier sommet est conservé tel quel.
pub fn densify(coords: &[Coord], line_type: LineType) -> Vec<Coord> {
    if line_type == LineType::Straight || coords.len() < 2 {
        return coords.to_vec();
    }
    let mut out = Vec::with_capacity(coords.len() * 3);
    for pair in coords.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let nsegs = segment_count(from, to);
        match line_type {
            LineType::GreatCircle => great_circle(from, to, nsegs, &mut out),
            LineType::Rhumb => rhumb_line(from, to, nsegs, &mut out),
            LineType::Straight => out.push(from),
        }
    }
    if let Some(last) = coords.last() {
        out.push(*last);
    }
    out
}

/// Nombre de points à insérer entre deux sommets
pub fn segment_count(from: Coord, to: Coord) -> usize {
    let dx = wrap_longitude(from.x - to.x);
    let dy = from.y - to.y;
    let length = (dx * dx + dy * dy).sqrt();
    if !length.is_finite() {
        return 0;
    }
    ((length / STEP) as usize).min(MAX_SEGMENTS)
}

/// Pousse `from` puis `nsegs` points intermédiaires le long de l'orthodromie vers `to`
pub fn great_circle(from: Coord, to: Coord, nsegs: usize, out: &mut Vec<Coord>) {
    out.push(from);
    if nsegs == 0 {
        return;
    }
    let (sin_phi1, cos_phi1) = from.y.sin_cos();
    let cos_phi = to.y.cos();
    let dlon = to.x - from.x;
    let p2 = ((to.y - from.y) / 2.0).sin();
    let l2 = (dlon / 2.0).sin();
    let c = 2.0 * (p2 * p2 + cos_phi1 * cos_phi * l2 * l2).sqrt().min(1.0).asin();
    let az = (cos_phi * dlon.sin()).atan2(cos_phi1 * to.y.sin() - sin_phi1 * cos_phi * dlon.cos());
    let (sin_az, cos_az) = az.sin_cos();

    let increment = c / (nsegs + 1) as f64;
    for i in 1..=nsegs {
        let (sin_c, cos_c) = (increment * i as f64).sin_cos();
        let lon = (sin_c * sin_az).atan2(cos_phi1 * cos_c - sin_phi1 * sin_c * cos_az) + from.x;
        let lat = (sin_phi1 * cos_c + cos_phi1 * sin_c * cos_az).clamp(-1.0, 1.0).asin();
        out.push(Coord {
            x: wrap_longitude(lon),
            y: lat,
        });
    }
}

/// Pousse `from` puis `nsegs` points intermédiaires le long de la loxodromie vers `to`
pub fn rhumb_line(from: Coord, to: Coord, nsegs: usize, out: &mut Vec<Coord>) {
    out.push(from);
    if nsegs == 0 {
        return;
    }
    let (mut lon1, phi1) = (from.x, from.y);
    let (mut lon2, phi2) = (to.x, to.y);
    // Segment traversant l'antiméridien : on passe par le chemin court
    if (lon1 < -FRAC_PI_2 && lon2 > FRAC_PI_2) || (lon1 > FRAC_PI_2 && lon2 < -FRAC_PI_2) {
        lon1 = wrap_longitude_positive(lon1);
        lon2 = wrap_longitude_positive(lon2);
    }
    let parts = (nsegs + 1) as f64;

    if phi1 == phi2 {
        let step = (lon2 - lon1) / parts;
        out.extend((1..=nsegs).map(|i| Coord {
            x: wrap_longitude(lon1 + step * i as f64),
            y: phi1,
        }));
    } else if lon1 == lon2 {
        let step = (phi2 - phi1) / parts;
        out.extend((1..=nsegs).map(|i| Coord {
            x: wrap_longitude(lon1),
            y: phi1 + step * i as f64,
        }));
    } else {
        let y1 = isometric_latitude(phi1);
        let y2 = isometric_latitude(phi2);
        let slope = (lon2 - lon1) / (y2 - y1);
        let step = (lon2 - lon1) / parts;
        out.extend((1..=nsegs).map(|i| {
            let lon = lon1 + step * i as f64;
            let y = y1 + (lon - lon1) / slope;
            Coord {
                x: wrap_longitude(lon),
                y: FRAC_PI_2 - 2.0 * (-y).exp().atan(),
            }
        }));
    }
}

/// Latitude isométrique sur la sphère : ln(tan(π/4 + φ/2))
fn isometric_latitude(phi: f64) -> f64 {
    (FRAC_PI_4 + phi / 2.0).tan().ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::spherical::great_circle_distance;

    fn deg(d: f64) -> f64 {
        d.to_radians()
    }

    #[test]
    fn test_straight_is_passthrough() {
        let coords = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }];
        assert_eq!(densify(&coords, LineType::Straight), coords);
    }

    #[test]
    fn test_segment_count() {
        let a = Coord { x: 0.0, y: 0.0 };
        assert_eq!(segment_count(a, Coord { x: deg(0.5), y: 0.0 }), 0);
        assert_eq!(segment_count(a, Coord { x: deg(10.0), y: 0.0 }), 10);
        // Plafonné
        assert_eq!(segment_count(a, Coord { x: deg(179.0), y: deg(80.0) }), MAX_SEGMENTS);
        // Le chemin court traverse l'antiméridien
        let n = segment_count(Coord { x: deg(175.0), y: 0.0 }, Coord { x: deg(-175.0), y: 0.0 });
        assert_eq!(n, 10);
    }

    #[test]
    fn test_great_circle_stays_on_arc() {
        let from = Coord { x: deg(-70.0), y: deg(40.0) };
        let to = Coord { x: deg(10.0), y: deg(50.0) };
        let line = densify(&[from, to], LineType::GreatCircle);
        assert!(line.len() > 2);
        assert_eq!(line[0], from);
        assert_eq!(*line.last().unwrap(), to);

        let total = great_circle_distance(from, to);
        for p in &line[1..line.len() - 1] {
            let d = great_circle_distance(from, *p) + great_circle_distance(*p, to);
            assert!((d - total).abs() < 1e-9, "point off the arc: {:?}", p);
        }
        // Une orthodromie vers l'est passe au nord de la loxodromie
        let middle = line[line.len() / 2];
        assert!(middle.y > deg(50.0));
    }

    #[test]
    fn test_rhumb_line_constant_bearing() {
        let from = Coord { x: deg(-10.0), y: deg(-20.0) };
        let to = Coord { x: deg(30.0), y: deg(25.0) };
        let line = densify(&[from, to], LineType::Rhumb);
        let n = line.len();
        assert!(n > 10);
        // Cap constant : le rapport Δλ / Δψ reste le même sur chaque pas
        let slope = |a: Coord, b: Coord| (b.x - a.x) / (isometric_latitude(b.y) - isometric_latitude(a.y));
        let reference = slope(from, to);
        for pair in line.windows(2) {
            assert!((slope(pair[0], pair[1]) - reference).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rhumb_along_parallel_across_antimeridian() {
        let from = Coord { x: deg(170.0), y: deg(10.0) };
        let to = Coord { x: deg(-170.0), y: deg(10.0) };
        let line = densify(&[from, to], LineType::Rhumb);
        assert_eq!(line.len(), 22);
        for p in &line {
            assert_eq!(p.y, deg(10.0));
            assert!(p.x.abs() >= deg(170.0) - 1e-12, "went the long way: {}", p.x);
        }
    }

    #[test]
    fn test_rhumb_along_meridian() {
        let from = Coord { x: deg(5.0), y: deg(-10.0) };
        let to = Coord { x: deg(5.0), y: deg(10.0) };
        let line = densify(&[from, to], LineType::Rhumb);
        assert_eq!(line.len(), 22);
        assert!(line.iter().all(|p| p.x == deg(5.0)));
        assert!(line.windows(2).all(|w| w[1].y > w[0].y));
    }
}
