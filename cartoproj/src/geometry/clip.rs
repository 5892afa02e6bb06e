//! Découpage à la calotte sphérique visible d'une projection azimutale
//!
//! La calotte est l'ensemble des points à une distance angulaire au plus
//! `max_angle` du centre. Les sommets de bord sont placés exactement sur le
//! cercle limite, selon l'azimut (vu du centre) du point d'intersection
//! interpolé en longitude/latitude.

use std::f64::consts::TAU;

use geo::Coord;
use tracing::{debug, warn};

use super::spherical::{azimuth, cos_distance, destination, wrap_longitude};
use super::wrap::{close, open_ring};

/// Tolérance sur la distance angulaire : un point sur le cercle limite est conservé
pub const CLIP_TOLERANCE: f64 = 1e-12;

/// Pas angulaire (un degré) des arcs de cercle limite insérés dans les anneaux
const ARC_STEP: f64 = TAU / 360.0;

/// Calotte sphérique : centre (λ, φ) en radians et rayon angulaire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cap {
    center: Coord,
    max_angle: f64,
    sin_phi0: f64,
    cos_phi0: f64,
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    /// Index du segment (sommet de départ)
    segment: usize,
    entering: bool,
    point: Coord,
    azimuth: f64,
}

impl Cap {
    pub fn new(center: Coord, max_angle: f64) -> Self {
        let (sin_phi0, cos_phi0) = center.y.sin_cos();
        Self {
            center,
            max_angle,
            sin_phi0,
            cos_phi0,
        }
    }

    pub fn center(&self) -> Coord {
        self.center
    }

    pub fn max_angle(&self) -> f64 {
        self.max_angle
    }

    /// Distance angulaire entre le centre et `p`
    pub fn distance(&self, p: Coord) -> f64 {
        cos_distance(self.center.x, self.sin_phi0, self.cos_phi0, p)
            .clamp(-1.0, 1.0)
            .acos()
    }

    pub fn contains(&self, p: Coord) -> bool {
        self.distance(p) <= self.max_angle + CLIP_TOLERANCE
    }

    /// Découpe une ligne ; chaque passage hors de la calotte ouvre une nouvelle partie
    pub fn clip_line(&self, coords: &[Coord]) -> Vec<Vec<Coord>> {
        let mut parts = Vec::new();
        let mut current: Vec<Coord> = Vec::new();
        let mut previous: Option<(Coord, f64)> = None;
        for &p in coords {
            let c = self.distance(p);
            let inside = c <= self.max_angle + CLIP_TOLERANCE;
            if let Some((q, cq)) = previous {
                let was_inside = cq <= self.max_angle + CLIP_TOLERANCE;
                if was_inside && !inside {
                    current.push(self.boundary_point(q, cq, p, c));
                    parts.push(std::mem::take(&mut current));
                } else if !was_inside && inside {
                    current.push(self.boundary_point(p, c, q, cq));
                }
            }
            if inside {
                current.push(p);
            }
            previous = Some((p, c));
        }
        parts.push(current);
        parts.retain(|p| p.len() > 1);
        parts
    }

    /// Découpe un anneau fermé ; le résultat peut compter zéro, un ou plusieurs anneaux
    pub fn clip_ring(&self, ring: &[Coord]) -> Vec<Vec<Coord>> {
        let unique = open_ring(ring);
        if unique.len() < 3 {
            return Vec::new();
        }
        let distances: Vec<f64> = unique.iter().map(|p| self.distance(*p)).collect();
        let inside_count = distances
            .iter()
            .filter(|c| **c <= self.max_angle + CLIP_TOLERANCE)
            .count();

        if inside_count == unique.len() {
            return vec![close(unique.to_vec())];
        }
        if inside_count == 0 {
            return self.clip_outside_ring(unique, &distances);
        }

        // Assemblage dans le sens antihoraire (vu depuis le centre), puis retour au sens d'origine
        if self.signed_area(unique) < 0.0 {
            let reversed: Vec<Coord> = unique.iter().rev().copied().collect();
            let distances: Vec<f64> = distances.into_iter().rev().collect();
            return self
                .clip_crossing_ring(&reversed, &distances)
                .into_iter()
                .map(|mut r| {
                    r.reverse();
                    r
                })
                .collect();
        }
        self.clip_crossing_ring(unique, &distances)
    }

    /// Anneau entièrement hors de la calotte : il est soit ignoré, soit il
    /// entoure le centre et la calotte entière est conservée.
    fn clip_outside_ring(&self, unique: &[Coord], distances: &[f64]) -> Vec<Vec<Coord>> {
        let winding: f64 = (0..unique.len())
            .map(|k| {
                let a = azimuth(self.center, unique[k]);
                let b = azimuth(self.center, unique[(k + 1) % unique.len()]);
                wrap_longitude(b - a)
            })
            .sum();
        let mean_distance = distances.iter().sum::<f64>() / distances.len() as f64;
        if winding.abs() > std::f64::consts::PI && mean_distance < std::f64::consts::FRAC_PI_2 {
            debug!("ring encloses the whole cap");
            let mut circle: Vec<Coord> = (0..360)
                .map(|k| destination(self.center, self.max_angle, -(k as f64) * ARC_STEP))
                .collect();
            // Azimuts décroissants : sens antihoraire, comme un anneau d'enroulement négatif
            if winding > 0.0 {
                circle.reverse();
            }
            return vec![close(circle)];
        }
        Vec::new()
    }

    fn clip_crossing_ring(&self, unique: &[Coord], distances: &[f64]) -> Vec<Vec<Coord>> {
        let n = unique.len();
        let limit = self.max_angle + CLIP_TOLERANCE;
        let crossings: Vec<Crossing> = (0..n)
            .filter_map(|k| {
                let next = (k + 1) % n;
                let (a, ca) = (unique[k], distances[k]);
                let (b, cb) = (unique[next], distances[next]);
                let point = match (ca <= limit, cb <= limit) {
                    (true, false) => self.boundary_point(a, ca, b, cb),
                    (false, true) => self.boundary_point(b, cb, a, ca),
                    _ => return None,
                };
                Some(Crossing {
                    segment: k,
                    entering: cb <= limit,
                    point,
                    azimuth: azimuth(self.center, point),
                })
            })
            .collect();

        let m = crossings.len();
        let mut used = vec![false; m];
        let mut rings = Vec::new();
        for start in 0..m {
            if crossings[start].entering || used[start] {
                continue;
            }
            let mut ring = Vec::new();
            let mut exit = start;
            let mut closed = false;
            for _ in 0..m {
                used[exit] = true;
                let Some(entry) = self.next_entry(&crossings, exit) else {
                    break;
                };
                self.push_arc(&mut ring, crossings[exit].azimuth, crossings[entry].azimuth);
                used[entry] = true;
                // Les entrées et les sorties alternent le long de l'anneau
                let next_exit = (entry + 1) % m;
                ring.push(crossings[entry].point);
                ring.extend(ring_slice(unique, crossings[entry].segment, crossings[next_exit].segment));
                ring.push(crossings[next_exit].point);
                if next_exit == start {
                    closed = true;
                    break;
                }
                exit = next_exit;
            }
            if !closed {
                warn!(crossings = m, "hemisphere clip traversal did not close");
            }
            if ring.len() > 2 {
                rings.push(close(ring));
            }
        }
        rings
    }

    /// Entrée atteinte en parcourant le cercle limite dans le sens antihoraire
    /// (azimuts décroissants) depuis la sortie `exit`
    fn next_entry(&self, crossings: &[Crossing], exit: usize) -> Option<usize> {
        let from = crossings[exit].azimuth;
        crossings
            .iter()
            .enumerate()
            .filter(|(_, c)| c.entering)
            .map(|(i, c)| (i, (from - c.azimuth).rem_euclid(TAU)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Points du cercle limite strictement entre deux azimuts, par azimuts décroissants
    fn push_arc(&self, ring: &mut Vec<Coord>, from: f64, to: f64) {
        let sweep = (from - to).rem_euclid(TAU);
        let steps = (sweep / ARC_STEP).ceil() as usize;
        ring.extend((1..steps).map(|k| {
            destination(self.center, self.max_angle, from - k as f64 * ARC_STEP)
        }));
    }

    /// Point du cercle limite sur le segment entre `inner` (dedans) et `outer` (dehors)
    fn boundary_point(&self, inner: Coord, c_inner: f64, outer: Coord, c_outer: f64) -> Coord {
        let denom = c_outer - c_inner;
        let u = if denom > 0.0 {
            ((self.max_angle - c_inner) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let interpolated = Coord {
            x: inner.x + u * wrap_longitude(outer.x - inner.x),
            y: inner.y + u * (outer.y - inner.y),
        };
        let az = azimuth(self.center, interpolated);
        destination(self.center, self.max_angle, az)
    }

    /// Aire signée dans le plan azimutal équidistant local (x vers l'est, y vers le nord)
    fn signed_area(&self, ring: &[Coord]) -> f64 {
        let planar: Vec<(f64, f64)> = ring
            .iter()
            .map(|p| {
                let c = self.distance(*p);
                let az = azimuth(self.center, *p);
                (c * az.sin(), c * az.cos())
            })
            .collect();
        let n = planar.len();
        (0..n)
            .map(|k| {
                let (x1, y1) = planar[k];
                let (x2, y2) = planar[(k + 1) % n];
                x1 * y2 - x2 * y1
            })
            .sum::<f64>()
            / 2.0
    }
}

/// Sommets suivant le segment `from` jusqu'au sommet de départ du segment `to` inclus
fn ring_slice(ring: &[Coord], from: usize, to: usize) -> impl Iterator<Item = Coord> + '_ {
    let n = ring.len();
    let count = (to + n - from) % n;
    (1..=count).map(move |j| ring[(from + j) % n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn deg(lon: f64, lat: f64) -> Coord {
        Coord {
            x: lon.to_radians(),
            y: lat.to_radians(),
        }
    }

    fn hemisphere() -> Cap {
        Cap::new(Coord { x: 0.0, y: 0.0 }, FRAC_PI_2)
    }

    #[test]
    fn test_contains_boundary() {
        let cap = hemisphere();
        assert!(cap.contains(Coord { x: FRAC_PI_2, y: 0.0 }));
        assert!(!cap.contains(Coord { x: FRAC_PI_2 + 1e-6, y: 0.0 }));
        assert!(cap.contains(Coord { x: 0.0, y: FRAC_PI_2 }));
    }

    #[test]
    fn test_clip_line_exits_and_reenters() {
        let cap = Cap::new(Coord { x: 0.0, y: 0.0 }, 20f64.to_radians());
        let line = vec![deg(0.0, 0.0), deg(30.0, 0.0), deg(40.0, 0.0), deg(10.0, 0.0)];
        let parts = cap.clip_line(&line);
        assert_eq!(parts.len(), 2);
        let exit = parts[0].last().unwrap();
        assert!((exit.x - 20f64.to_radians()).abs() < 1e-12);
        assert!(exit.y.abs() < 1e-12);
        let entry = parts[1].first().unwrap();
        assert!((entry.x - 20f64.to_radians()).abs() < 1e-12);
        assert_eq!(*parts[1].last().unwrap(), deg(10.0, 0.0));
    }

    #[test]
    fn test_clip_line_fully_outside() {
        let cap = Cap::new(Coord { x: 0.0, y: 0.0 }, 0.1);
        assert!(cap.clip_line(&[deg(90.0, 0.0), deg(100.0, 0.0)]).is_empty());
    }

    #[test]
    fn test_clip_ring_inside_kept() {
        let cap = hemisphere();
        let ring = vec![deg(0.0, 0.0), deg(10.0, 0.0), deg(10.0, 10.0), deg(0.0, 0.0)];
        let rings = cap.clip_ring(&ring);
        assert_eq!(rings, vec![ring]);
    }

    #[test]
    fn test_clip_ring_outside_dropped() {
        let cap = Cap::new(Coord { x: 0.0, y: 0.0 }, 0.5);
        let ring = vec![deg(100.0, 0.0), deg(110.0, 0.0), deg(110.0, 10.0), deg(100.0, 0.0)];
        assert!(cap.clip_ring(&ring).is_empty());
    }

    #[test]
    fn test_clip_ring_straddling_boundary() {
        let cap = hemisphere();
        // Carré de 80° à 100° de longitude, à cheval sur le bord de l'hémisphère
        let ring = vec![
            deg(80.0, -10.0),
            deg(100.0, -10.0),
            deg(100.0, 10.0),
            deg(80.0, 10.0),
            deg(80.0, -10.0),
        ];
        let rings = cap.clip_ring(&ring);
        assert_eq!(rings.len(), 1);
        let r = &rings[0];
        assert_eq!(r.first(), r.last());
        for p in r {
            assert!(cap.distance(*p) <= FRAC_PI_2 + 1e-9, "vertex outside cap: {:?}", p);
        }
        // Deux sommets de bord et au moins un point d'arc intermédiaire
        let on_boundary = r[..r.len() - 1]
            .iter()
            .filter(|p| (cap.distance(**p) - FRAC_PI_2).abs() < 1e-9)
            .count();
        assert!(on_boundary >= 3);
    }

    #[test]
    fn test_clip_ring_orientation_preserved() {
        let cap = hemisphere();
        let mut ring = vec![
            deg(80.0, -10.0),
            deg(100.0, -10.0),
            deg(100.0, 10.0),
            deg(80.0, 10.0),
            deg(80.0, -10.0),
        ];
        let ccw = cap.clip_ring(&ring);
        ring.reverse();
        let cw = cap.clip_ring(&ring);
        assert!(cap.signed_area(open_ring(&ccw[0])) > 0.0);
        assert!(cap.signed_area(open_ring(&cw[0])) < 0.0);
    }

    #[test]
    fn test_clip_ring_enclosing_cap() {
        let cap = Cap::new(Coord { x: 0.0, y: 0.0 }, 0.2);
        let ring = vec![
            deg(-30.0, -30.0),
            deg(30.0, -30.0),
            deg(30.0, 30.0),
            deg(-30.0, 30.0),
            deg(-30.0, -30.0),
        ];
        let rings = cap.clip_ring(&ring);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 361);
        assert!(rings[0].iter().all(|p| (cap.distance(*p) - 0.2).abs() < 1e-9));
    }

    #[test]
    fn test_polar_cap_clip() {
        // Calotte centrée sur le pôle nord, rayon 3π/4
        let cap = Cap::new(Coord { x: 0.0, y: FRAC_PI_2 }, 3.0 * PI / 4.0);
        assert!(cap.contains(deg(0.0, -44.0)));
        assert!(!cap.contains(deg(0.0, -46.0)));
        let parts = cap.clip_line(&[deg(10.0, 0.0), deg(10.0, -80.0)]);
        assert_eq!(parts.len(), 1);
        let end = parts[0].last().unwrap();
        assert!((end.y + FRAC_PI_2 / 2.0).abs() < 1e-9);
        assert!((end.x - 10f64.to_radians()).abs() < 1e-9);
    }
}
