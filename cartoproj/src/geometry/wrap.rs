//! Découpage des lignes et des anneaux à l'antiméridien (λ0 ± π)
//!
//! Les longitudes sont d'abord exprimées relativement au méridien central,
//! dans [-π, π]. Un segment traverse la coupure lorsque l'écart relatif entre
//! ses extrémités dépasse π. Chaque traversée insère deux sommets de bord, un
//! de chaque côté, à la latitude interpolée.

use std::f64::consts::{FRAC_PI_2, PI};

use geo::Coord;
use tracing::{debug, warn};

use super::spherical::wrap_longitude;

/// Écart au méridien de coupure des sommets de bord
pub const SEAM_EPSILON: f64 = 1e-9;

/// Écart au pôle du parallèle de fermeture des anneaux polaires
pub const POLE_EPSILON: f64 = 1e-5;

/// Nombre de pas le long du parallèle de fermeture polaire
const POLE_STEPS: usize = 72;

const EDGE: f64 = PI - SEAM_EPSILON;

/// Traversée de la coupure entre deux sommets consécutifs
#[derive(Debug, Clone, Copy)]
struct Crossing {
    /// Index du segment (sommet de départ)
    segment: usize,
    lat: f64,
    /// Côté (+1 est, -1 ouest) du sommet de départ
    from_side: f64,
}

/// Portion d'anneau comprise entre deux traversées, d'un seul côté de la coupure
#[derive(Debug)]
struct Arc {
    side: f64,
    start_lat: f64,
    end_lat: f64,
    coords: Vec<Coord>,
}

/// Découpe une ligne en parties qui ne traversent pas la coupure
pub fn wrap_line(coords: &[Coord], lon0: f64) -> Vec<Vec<Coord>> {
    let rel = to_relative(coords, lon0, false);
    let mut parts = Vec::new();
    let mut current: Vec<Coord> = Vec::with_capacity(rel.len());
    for (i, &c) in rel.iter().enumerate() {
        if i > 0 {
            if let Some(x) = crossing(i - 1, rel[i - 1], c) {
                current.push(edge(x.from_side, x.lat));
                parts.push(std::mem::take(&mut current));
                current.push(edge(-x.from_side, x.lat));
            }
        }
        current.push(c);
    }
    parts.push(current);
    if parts.len() > 1 {
        debug!(parts = parts.len(), "line split at antimeridian");
    }
    parts
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| to_absolute(p, lon0))
        .collect()
}

/// Découpe un anneau fermé en anneaux fermés qui ne traversent pas la coupure.
///
/// Un anneau traversant une seule fois la coupure entoure un pôle : il est
/// fermé le long du parallèle voisin du pôle situé du côté de sa latitude moyenne.
pub fn wrap_ring(ring: &[Coord], lon0: f64) -> Vec<Vec<Coord>> {
    let unique = open_ring(ring);
    if unique.len() < 3 {
        return vec![ring.to_vec()];
    }
    let rel = to_relative(unique, lon0, true);
    let crossings = ring_crossings(&rel);

    let rings = match crossings.len() {
        0 => vec![close(rel)],
        1 => vec![polar_ring(&rel, crossings[0])],
        n if n % 2 == 1 => {
            warn!(crossings = n, "odd number of antimeridian crossings, ring left unsplit");
            return vec![ring.to_vec()];
        }
        n => {
            debug!(crossings = n, "ring split at antimeridian");
            if unwrapped_signed_area(&rel) < 0.0 {
                // Assemblage en sens antihoraire, puis retour au sens d'origine
                let mut reversed = rel;
                reversed.reverse();
                let crossings = ring_crossings(&reversed);
                split_ring(&reversed, &crossings)
                    .into_iter()
                    .map(|mut r| {
                        r.reverse();
                        r
                    })
                    .collect()
            } else {
                split_ring(&rel, &crossings)
            }
        }
    };
    rings.into_iter().map(|r| to_absolute(r, lon0)).collect()
}

/// Longitudes relatives à `lon0`. Les sommets posés sur la coupure sont
/// rattachés au côté du sommet non ambigu précédent.
fn to_relative(coords: &[Coord], lon0: f64, cyclic: bool) -> Vec<Coord> {
    let mut rel: Vec<Coord> = coords
        .iter()
        .map(|c| Coord {
            x: wrap_longitude(c.x - lon0),
            y: c.y,
        })
        .filter(|c| c.x.is_finite() && c.y.is_finite())
        .collect();

    let mut unambiguous = rel.iter().map(|c| c.x).filter(|x| x.abs() < EDGE);
    let reference = if cyclic {
        unambiguous.last()
    } else {
        unambiguous.next()
    };
    let mut side = reference.map_or(1.0, f64::signum);
    for c in rel.iter_mut() {
        if c.x.abs() >= EDGE {
            c.x = side * EDGE;
        } else {
            side = c.x.signum();
        }
    }
    rel
}

fn to_absolute(coords: Vec<Coord>, lon0: f64) -> Vec<Coord> {
    coords
        .into_iter()
        .map(|c| Coord {
            x: wrap_longitude(c.x + lon0),
            y: c.y,
        })
        .collect()
}

fn crossing(segment: usize, a: Coord, b: Coord) -> Option<Crossing> {
    if (b.x - a.x).abs() <= PI {
        return None;
    }
    let side = a.x.signum();
    let bx = b.x + 2.0 * PI * side;
    let t = (side * PI - a.x) / (bx - a.x);
    Some(Crossing {
        segment,
        lat: a.y + t * (b.y - a.y),
        from_side: side,
    })
}

fn ring_crossings(rel: &[Coord]) -> Vec<Crossing> {
    let n = rel.len();
    (0..n)
        .filter_map(|k| crossing(k, rel[k], rel[(k + 1) % n]))
        .collect()
}

fn edge(side: f64, lat: f64) -> Coord {
    Coord {
        x: side * EDGE,
        y: lat,
    }
}

/// Sommets suivant le segment `from` jusqu'au sommet de départ du segment `to` inclus
fn ring_slice(rel: &[Coord], from: usize, to: usize) -> impl Iterator<Item = Coord> + '_ {
    let n = rel.len();
    let count = match (to + n - from) % n {
        0 => n,
        c => c,
    };
    (1..=count).map(move |j| rel[(from + j) % n])
}

/// Assemble les arcs d'un anneau orienté dans le sens antihoraire.
///
/// Côté est, la coupure est parcourue vers le nord ; côté ouest, vers le sud.
fn split_ring(rel: &[Coord], crossings: &[Crossing]) -> Vec<Vec<Coord>> {
    let m = crossings.len();
    let arcs: Vec<Arc> = (0..m)
        .map(|i| {
            let start = crossings[i];
            let end = crossings[(i + 1) % m];
            let mut coords = vec![edge(-start.from_side, start.lat)];
            coords.extend(ring_slice(rel, start.segment, end.segment));
            coords.push(edge(end.from_side, end.lat));
            Arc {
                side: -start.from_side,
                start_lat: start.lat,
                end_lat: end.lat,
                coords,
            }
        })
        .collect();

    let mut used = vec![false; arcs.len()];
    let mut rings = Vec::new();
    for first in 0..arcs.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut ring = arcs[first].coords.clone();
        let mut current = first;
        for _ in 0..arcs.len() {
            match next_arc(&arcs, &used, first, current) {
                Some(next) if next == first => break,
                Some(next) => {
                    used[next] = true;
                    ring.extend_from_slice(&arcs[next].coords);
                    current = next;
                }
                None => {
                    warn!(arc = current, "no matching arc along the antimeridian, ring closed as is");
                    break;
                }
            }
        }
        rings.push(close(ring));
    }
    rings
}

/// Arc dont le départ est le plus proche de la fin de `current`, en suivant la coupure
fn next_arc(arcs: &[Arc], used: &[bool], first: usize, current: usize) -> Option<usize> {
    let side = arcs[current].side;
    let end = arcs[current].end_lat;
    arcs.iter()
        .enumerate()
        .filter(|(j, arc)| arc.side == side && (*j == first || !used[*j]))
        .map(|(j, arc)| (j, (arc.start_lat - end) * side))
        .filter(|(_, gap)| *gap >= -1e-12)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(j, _)| j)
}

/// Anneau traversant une fois la coupure : fermeture par le pôle
fn polar_ring(rel: &[Coord], crossing: Crossing) -> Vec<Coord> {
    let mean_lat = rel.iter().map(|c| c.y).sum::<f64>() / rel.len() as f64;
    let pole = if mean_lat < 0.0 {
        -(FRAC_PI_2 - POLE_EPSILON)
    } else {
        FRAC_PI_2 - POLE_EPSILON
    };
    let side = crossing.from_side;
    debug!(pole, "ring around a pole closed along the antimeridian");

    let mut ring = vec![edge(-side, crossing.lat)];
    ring.extend(ring_slice(rel, crossing.segment, crossing.segment));
    ring.push(edge(side, crossing.lat));
    ring.push(edge(side, pole));
    let step = 2.0 * EDGE / POLE_STEPS as f64;
    ring.extend((1..POLE_STEPS).map(|k| Coord {
        x: side * (EDGE - step * k as f64),
        y: pole,
    }));
    ring.push(edge(-side, pole));
    close(ring)
}

/// Aire signée (lon/lat) avec des longitudes déroulées le long de l'anneau
fn unwrapped_signed_area(rel: &[Coord]) -> f64 {
    let n = rel.len();
    let mut x = rel[0].x;
    let mut twice_area = 0.0;
    for k in 0..n {
        let a = rel[k];
        let b = rel[(k + 1) % n];
        let next_x = x + wrap_longitude(b.x - a.x);
        twice_area += x * b.y - next_x * a.y;
        x = next_x;
    }
    twice_area / 2.0
}

/// Sommets distincts d'un anneau (sans le sommet de fermeture)
pub(crate) fn open_ring(ring: &[Coord]) -> &[Coord] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

pub(crate) fn close(mut ring: Vec<Coord>) -> Vec<Coord> {
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}
