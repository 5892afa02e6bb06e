//! Transformation de géométries entières
//!
//! Dans le sens direct, chaque ligne ou anneau passe par :
//! 1. la densification (loxodromie ou orthodromie) ;
//! 2. la coupure à l'antiméridien (familles géographique, cylindrique, conique) ;
//! 3. le découpage à la calotte de validité (familles azimutale et conique) ;
//! 4. la projection sommet par sommet.
//!
//! Les anneaux découpés sont ensuite réassemblés en polygones par inclusion.
//! Le sens inverse applique seulement la projection inverse sommet par sommet.

pub mod clip;
pub mod densify;
pub mod spherical;
pub mod topology;
pub mod wrap;

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use tracing::{debug, warn};

use crate::projection::{Direction, Projection};

/// Transforme une géométrie ; la géométrie d'entrée n'est jamais modifiée.
///
/// Une géométrie simple peut devenir multiple (coupure, découpage) ; une
/// géométrie entièrement éliminée devient une collection multiple vide de
/// même dimension.
pub fn transform(projection: &Projection, geometry: &Geometry, direction: Direction) -> Geometry {
    Pipeline {
        projection,
        direction,
    }
    .geometry(geometry)
}

struct Pipeline<'a> {
    projection: &'a Projection,
    direction: Direction,
}

impl Pipeline<'_> {
    fn geometry(&self, geometry: &Geometry) -> Geometry {
        match geometry {
            Geometry::Point(p) => match self.coord(p.0) {
                Some(c) => Geometry::Point(Point(c)),
                None => Geometry::MultiPoint(MultiPoint::new(vec![])),
            },
            Geometry::MultiPoint(mp) => Geometry::MultiPoint(
                mp.iter().filter_map(|p| self.coord(p.0)).map(Point).collect(),
            ),
            Geometry::Line(line) => {
                self.single_line(&LineString::new(vec![line.start, line.end]))
            }
            Geometry::LineString(ls) => self.single_line(ls),
            Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString::new(
                mls.iter().flat_map(|ls| self.line(ls)).collect(),
            )),
            Geometry::Polygon(polygon) => self.single_polygon(polygon),
            Geometry::Rect(rect) => self.single_polygon(&rect.to_polygon()),
            Geometry::Triangle(triangle) => self.single_polygon(&triangle.to_polygon()),
            Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon::new(
                mp.iter().flat_map(|p| self.polygon(p)).collect(),
            )),
            Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(
                GeometryCollection::new_from(gc.iter().map(|g| self.geometry(g)).collect()),
            ),
        }
    }

    fn coord(&self, c: Coord) -> Option<Coord> {
        match self.direction {
            Direction::Forward => self.projection.forward(c),
            Direction::Inverse => self.projection.inverse(c),
        }
    }

    fn project(&self, coords: &[Coord]) -> Vec<Coord> {
        coords.iter().filter_map(|c| self.coord(*c)).collect()
    }

    fn single_line(&self, ls: &LineString) -> Geometry {
        let mut parts = self.line(ls);
        if parts.len() == 1 {
            Geometry::LineString(parts.remove(0))
        } else {
            Geometry::MultiLineString(MultiLineString::new(parts))
        }
    }

    fn single_polygon(&self, polygon: &Polygon) -> Geometry {
        let mut polygons = self.polygon(polygon);
        if polygons.len() == 1 {
            Geometry::Polygon(polygons.remove(0))
        } else {
            Geometry::MultiPolygon(MultiPolygon::new(polygons))
        }
    }

    /// Parties projetées d'une ligne (au moins deux sommets chacune)
    fn line(&self, ls: &LineString) -> Vec<LineString> {
        let pieces = match self.direction {
            Direction::Forward => self.prepare_line(&ls.0),
            Direction::Inverse => vec![ls.0.clone()],
        };
        pieces
            .iter()
            .map(|piece| self.project(piece))
            .filter(|coords| coords.len() >= 2)
            .map(LineString::new)
            .collect()
    }

    fn prepare_line(&self, coords: &[Coord]) -> Vec<Vec<Coord>> {
        let dense = densify::densify(coords, self.projection.densify_line_type());
        let mut pieces = match self.projection.wrap_meridian() {
            Some(lon0) => wrap::wrap_line(&dense, lon0),
            None => vec![dense],
        };
        if let Some(cap) = self.projection.cap() {
            pieces = pieces.iter().flat_map(|p| cap.clip_line(p)).collect();
        }
        pieces
    }

    fn prepare_ring(&self, coords: &[Coord]) -> Vec<Vec<Coord>> {
        let dense = densify::densify(coords, self.projection.densify_line_type());
        let mut pieces = match self.projection.wrap_meridian() {
            Some(lon0) => wrap::wrap_ring(&dense, lon0),
            None => vec![dense],
        };
        if let Some(cap) = self.projection.cap() {
            pieces = pieces.iter().flat_map(|p| cap.clip_ring(p)).collect();
        }
        pieces
    }

    /// Projette un anneau préparé ; `None` s'il ne reste pas de quoi fermer un anneau
    fn ring(&self, coords: &[Coord]) -> Option<LineString> {
        let projected = wrap::close(self.project(wrap::open_ring(coords)));
        if projected.len() < 4 {
            warn!(
                projection = self.projection.name(),
                coords = projected.len(),
                "ring dropped: fewer than 4 coordinates after projection"
            );
            return None;
        }
        Some(LineString::new(projected))
    }

    fn polygon(&self, polygon: &Polygon) -> Vec<Polygon> {
        if self.direction == Direction::Inverse {
            return self.inverse_polygon(polygon);
        }

        let exterior = self.prepare_ring(&polygon.exterior().0);
        let interiors: Vec<Vec<Vec<Coord>>> = polygon
            .interiors()
            .iter()
            .map(|ring| self.prepare_ring(&ring.0))
            .collect();

        // Aucun anneau découpé : la structure d'origine est conservée
        if exterior.len() == 1 && interiors.iter().all(|pieces| pieces.len() == 1) {
            let Some(shell) = self.ring(&exterior[0]) else {
                return Vec::new();
            };
            let holes = interiors
                .iter()
                .filter_map(|pieces| self.ring(&pieces[0]))
                .collect();
            return vec![Polygon::new(shell, holes)];
        }

        let rings: Vec<LineString> = exterior
            .iter()
            .chain(interiors.iter().flatten())
            .filter_map(|piece| self.ring(piece))
            .collect();
        debug!(
            projection = self.projection.name(),
            rings = rings.len(),
            "polygon split, rebuilding from rings"
        );
        topology::organize_rings(rings)
    }

    fn inverse_polygon(&self, polygon: &Polygon) -> Vec<Polygon> {
        let Some(shell) = self.ring(&polygon.exterior().0) else {
            return Vec::new();
        };
        let holes = polygon
            .interiors()
            .iter()
            .filter_map(|ring| self.ring(&ring.0))
            .collect();
        vec![Polygon::new(shell, holes)]
    }
}
