//! Transformation parallèle de features GeoJSON
//!
//! Les coordonnées géographiques sont lues et écrites en degrés ; la
//! bibliothèque travaille en radians. Chaque worker rayon lit la même
//! projection (immuable) et renvoie son issue ; le rapport est agrégé ensuite.

use std::time::Instant;

use anyhow::{Context, Result};
use geo::{Coord, Geometry, HasDimensions, MapCoords};
use geojson::{feature::Id, GeoJson, JsonObject};
use rayon::prelude::*;
use tracing::{debug, info};

use cartoproj::{Direction, Projection};

use crate::report::{FeatureError, FeatureOutcome, TransformReport};

/// Feature transformée, prête à être exportée
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFeature {
    pub id: Option<String>,
    pub geometry: Geometry,
    pub properties: Option<JsonObject>,
}

/// Lit une FeatureCollection, une Feature ou une géométrie seule
pub fn read_features(text: &str) -> Result<Vec<geojson::Feature>> {
    let geojson = text.parse::<GeoJson>().context("Failed to parse GeoJSON")?;
    Ok(match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![geojson::Feature::from(geometry)],
    })
}

/// Transforme toutes les features en parallèle.
///
/// `precision` est le nombre de décimales conservées en sortie.
pub fn transform_features(
    features: Vec<geojson::Feature>,
    projection: &Projection,
    direction: Direction,
    precision: u8,
) -> (Vec<OutputFeature>, TransformReport) {
    let start = Instant::now();
    let direction_name = match direction {
        Direction::Forward => "forward",
        Direction::Inverse => "inverse",
    };
    let mut report = TransformReport::new(projection.name(), direction_name);

    info!(
        features = features.len(),
        projection = projection.name(),
        direction = direction_name,
        "Transforming features"
    );

    let results: Vec<_> = features
        .into_par_iter()
        .enumerate()
        .map(|(index, feature)| transform_feature(index, feature, projection, direction, precision))
        .collect();

    let mut output = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok((feature, geometry_type, outcome)) => {
                report.record(geometry_type, outcome);
                output.push(feature);
            }
            Err(error) => {
                debug!(index = error.index, reason = %error.message, "Feature skipped");
                report.record_error(error);
            }
        }
    }

    report.set_duration(start.elapsed());
    report.finalize();
    (output, report)
}

fn transform_feature(
    index: usize,
    feature: geojson::Feature,
    projection: &Projection,
    direction: Direction,
    precision: u8,
) -> std::result::Result<(OutputFeature, &'static str, FeatureOutcome), FeatureError> {
    let feature_id = feature.id.map(|id| match id {
        Id::String(s) => s,
        Id::Number(n) => n.to_string(),
    });
    let fail = |message: String| FeatureError {
        index,
        feature_id: feature_id.clone(),
        message,
    };

    let geometry = feature
        .geometry
        .ok_or_else(|| fail("missing geometry".to_string()))?;
    let input: Geometry = Geometry::try_from(geometry).map_err(|e| fail(e.to_string()))?;
    let geometry_type = geometry_type(&input);

    let projected = match direction {
        Direction::Forward => {
            let radians = input.map_coords(|c| Coord {
                x: c.x.to_radians(),
                y: c.y.to_radians(),
            });
            projection.transform(&radians, Direction::Forward)
        }
        Direction::Inverse => projection
            .transform(&input, Direction::Inverse)
            .map_coords(|c| Coord {
                x: c.x.to_degrees(),
                y: c.y.to_degrees(),
            }),
    };

    let outcome = if projected.is_empty() {
        FeatureOutcome::Empty
    } else if part_count(&projected) > part_count(&input) {
        FeatureOutcome::Split
    } else {
        FeatureOutcome::Transformed
    };

    Ok((
        OutputFeature {
            id: feature_id,
            geometry: round_geometry_coords(&projected, precision),
            properties: feature.properties,
        },
        geometry_type,
        outcome,
    ))
}

/// Arrondit toutes les coordonnées à `decimals` décimales
pub fn round_geometry_coords(geom: &Geometry, decimals: u8) -> Geometry {
    let factor = 10_f64.powi(decimals as i32);
    geom.map_coords(|c| Coord {
        x: (c.x * factor).round() / factor,
        y: (c.y * factor).round() / factor,
    })
}

fn part_count(geom: &Geometry) -> usize {
    match geom {
        Geometry::MultiPoint(mp) => mp.0.len(),
        Geometry::MultiLineString(mls) => mls.0.len(),
        Geometry::MultiPolygon(mp) => mp.0.len(),
        Geometry::GeometryCollection(gc) => gc.0.iter().map(part_count).sum(),
        _ => 1,
    }
}

fn geometry_type(geom: &Geometry) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectionConfig;
    use geo::{LineString, Point};

    fn mercator() -> Projection {
        ProjectionConfig::from_preset("world-mercator").unwrap().build().unwrap()
    }

    #[test]
    fn test_read_features_variants() {
        let collection = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":null},
            {"type":"Feature","geometry":null,"properties":{"name":"void"}}
        ]}"#;
        assert_eq!(read_features(collection).unwrap().len(), 2);
        let single = r#"{"type":"Point","coordinates":[1.0,2.0]}"#;
        assert_eq!(read_features(single).unwrap().len(), 1);
        assert!(read_features("{not json").is_err());
    }

    #[test]
    fn test_forward_point_in_degrees() {
        let features = read_features(r#"{"type":"Point","coordinates":[180.0,0.0]}"#).unwrap();
        let (output, report) = transform_features(features, &mercator(), Direction::Forward, 2);
        assert_eq!(report.features_transformed, 1);
        let Geometry::Point(p) = output[0].geometry else {
            panic!("expected a point, got {:?}", output[0].geometry);
        };
        assert!((p.x().abs() - 20037508.34).abs() < 0.01, "{:?}", p);
        assert_eq!(p.y(), 0.0);
    }

    #[test]
    fn test_split_empty_and_skipped_are_counted() {
        let collection = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":7,"geometry":{"type":"LineString","coordinates":[[170.0,10.0],[-170.0,20.0]]},"properties":null},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[0.0,-60.0]},"properties":null},
            {"type":"Feature","id":"none","geometry":null,"properties":null}
        ]}"#;
        let ortho = ProjectionConfig::from_preset("north-polar-ortho").unwrap().build().unwrap();

        let (output, report) = transform_features(
            read_features(collection).unwrap(),
            &mercator(),
            Direction::Forward,
            2,
        );
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].id.as_deref(), Some("7"));
        assert_eq!(report.features_split, 1);
        assert_eq!(report.features_skipped, 1);
        assert_eq!(report.errors[0].feature_id.as_deref(), Some("none"));

        let (_, report) = transform_features(
            read_features(collection).unwrap(),
            &ortho,
            Direction::Forward,
            2,
        );
        assert_eq!(report.features_empty, 1);
    }

    #[test]
    fn test_inverse_returns_degrees() {
        let projection = mercator();
        let projected = projection
            .forward(Coord { x: 12f64.to_radians(), y: 45f64.to_radians() })
            .unwrap();
        let feature = geojson::Feature::from(geojson::Geometry::new(geojson::Value::from(
            &Geometry::Point(Point::from(projected)),
        )));
        let (output, _) = transform_features(vec![feature], &projection, Direction::Inverse, 7);
        let Geometry::Point(p) = output[0].geometry else {
            panic!("expected a point");
        };
        assert!((p.x() - 12.0).abs() < 1e-7 && (p.y() - 45.0).abs() < 1e-7, "{:?}", p);
    }

    #[test]
    fn test_round_geometry_coords() {
        let line = Geometry::LineString(LineString::from(vec![(1.23456, 2.34567), (3.0, 4.0)]));
        let rounded = round_geometry_coords(&line, 2);
        assert_eq!(
            rounded,
            Geometry::LineString(LineString::from(vec![(1.23, 2.35), (3.0, 4.0)]))
        );
    }
}
