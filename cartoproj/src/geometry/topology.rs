//! Reconstruction des polygones (trous, multipolygones) à partir d'anneaux projetés

use geo::{Area, Contains, InteriorPoint, LineString, Polygon};
use tracing::trace;

/// Organise des anneaux fermés en polygones avec trous.
///
/// Les anneaux sont triés par aire décroissante ; chacun est rattaché au plus
/// petit anneau déjà vu qui contient un de ses points intérieurs. La parité de
/// la profondeur d'inclusion décide entre enveloppe et trou.
pub fn organize_rings(rings: Vec<LineString>) -> Vec<Polygon> {
    if rings.is_empty() {
        return Vec::new();
    }

    let mut rings: Vec<(f64, Polygon)> = rings
        .into_iter()
        .map(|ring| {
            let polygon = Polygon::new(ring, vec![]);
            (polygon.unsigned_area(), polygon)
        })
        .collect();
    if rings.len() == 1 {
        return rings.into_iter().map(|(_, p)| p).collect();
    }
    rings.sort_by(|a, b| b.0.total_cmp(&a.0));

    // Pour chaque anneau : parent direct et profondeur
    let mut parent: Vec<Option<usize>> = vec![None; rings.len()];
    let mut depth: Vec<usize> = vec![0; rings.len()];
    for i in 1..rings.len() {
        let Some(inside) = rings[i].1.interior_point() else {
            continue;
        };
        if let Some(j) = (0..i).rev().find(|&j| rings[j].1.contains(&inside)) {
            parent[i] = Some(j);
            depth[i] = depth[j] + 1;
        }
    }

    // Les enveloppes sont aux profondeurs paires, leurs trous juste en dessous
    let mut shells: Vec<Option<(LineString, Vec<LineString>)>> = vec![None; rings.len()];
    let mut holes: Vec<(usize, LineString)> = Vec::new();
    for (i, (_, polygon)) in rings.into_iter().enumerate() {
        let (exterior, _) = polygon.into_inner();
        match parent[i] {
            Some(j) if depth[i] % 2 == 1 => holes.push((j, exterior)),
            _ => shells[i] = Some((exterior, Vec::new())),
        }
    }
    trace!(holes = holes.len(), "rings organised");
    for (j, hole) in holes {
        if let Some((_, interiors)) = shells[j].as_mut() {
            interiors.push(hole);
        }
    }

    shells
        .into_iter()
        .flatten()
        .map(|(exterior, interiors)| Polygon::new(exterior, interiors))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn square(x: f64, y: f64, size: f64) -> LineString {
        LineString::new(vec![
            Coord { x, y },
            Coord { x: x + size, y },
            Coord { x: x + size, y: y + size },
            Coord { x, y: y + size },
            Coord { x, y },
        ])
    }

    #[test]
    fn test_organize_single_ring() {
        let polygons = organize_rings(vec![square(0.0, 0.0, 1.0)]);
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].interiors().is_empty());
    }

    #[test]
    fn test_hole_assigned_to_shell() {
        // Le trou est fourni avant son enveloppe
        let polygons = organize_rings(vec![square(2.0, 2.0, 1.0), square(0.0, 0.0, 10.0)]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].interiors().len(), 1);
        assert_eq!(polygons[0].exterior(), &square(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_island_in_hole_is_new_shell() {
        let polygons = organize_rings(vec![
            square(0.0, 0.0, 10.0),
            square(2.0, 2.0, 6.0),
            square(4.0, 4.0, 1.0),
            square(20.0, 0.0, 1.0),
        ]);
        assert_eq!(polygons.len(), 3);
        let with_hole = polygons.iter().filter(|p| !p.interiors().is_empty()).count();
        assert_eq!(with_hole, 1);
    }

    #[test]
    fn test_disjoint_rings() {
        let polygons = organize_rings(vec![square(0.0, 0.0, 1.0), square(5.0, 0.0, 2.0)]);
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.interiors().is_empty()));
    }
}
