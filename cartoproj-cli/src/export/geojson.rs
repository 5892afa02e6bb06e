//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use crate::transform::OutputFeature;

/// Exporte des features dans un fichier GeoJSON
pub fn export_to_geojson(features: &[OutputFeature], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_feature_collection(&mut writer, features)?;
    writer.flush()?;
    Ok(())
}

/// Écrit une FeatureCollection complète
pub fn write_feature_collection<W: Write>(writer: &mut W, features: &[OutputFeature]) -> Result<()> {
    // Header FeatureCollection
    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    for (i, feature) in features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, feature)?;
    }

    // Footer
    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &OutputFeature) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","#)?;
    if let Some(id) = &feature.id {
        write!(writer, r#""id":"{}","#, escape_json(id))?;
    }

    // Geometry via geozero
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    feature
        .geometry
        .process_geom(&mut geom_writer)
        .context("Failed to encode geometry to GeoJSON")?;
    writer.write_all(&geom_buf)?;

    // Properties (valeurs JSON quelconques, recopiées telles quelles)
    write!(writer, r#","properties":"#)?;
    match &feature.properties {
        Some(properties) => serde_json::to_writer(&mut *writer, properties)?,
        None => write!(writer, "null")?,
    }
    write!(writer, "}}")?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, MultiLineString, Point};
    use std::io::Cursor;

    #[test]
    fn test_write_feature() {
        let feature = OutputFeature {
            id: Some("test_123".to_string()),
            geometry: Geometry::Point(Point::new(1.0, 2.0)),
            properties: None,
        };

        let mut buffer = Cursor::new(Vec::new());
        write_feature(&mut buffer, &feature).unwrap();

        let json = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(json.contains(r#""id":"test_123""#));
        assert!(json.contains(r#""type":"Feature""#));
        assert!(json.contains(r#""properties":null"#));
        // geozero écrit "Point" directement
        assert!(json.contains("Point") || json.contains("coordinates"));
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_collection_is_valid_geojson() {
        let properties = serde_json::json!({"name": "Île", "rank": 3})
            .as_object()
            .cloned();
        let features = vec![
            OutputFeature {
                id: None,
                geometry: Geometry::Point(Point::new(5.0, 47.0)),
                properties,
            },
            OutputFeature {
                id: Some("empty".to_string()),
                geometry: Geometry::MultiLineString(MultiLineString::new(vec![])),
                properties: None,
            },
        ];

        let mut buffer = Vec::new();
        write_feature_collection(&mut buffer, &features).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let parsed: ::geojson::GeoJson = text.parse().unwrap();
        let ::geojson::GeoJson::FeatureCollection(collection) = parsed else {
            panic!("expected a FeatureCollection: {}", text);
        };
        assert_eq!(collection.features.len(), 2);
        let name = collection.features[0].property("name").unwrap();
        assert_eq!(name, "Île");
    }

    #[test]
    fn test_export_to_geojson() {
        let features = vec![OutputFeature {
            id: Some("001".to_string()),
            geometry: Geometry::Point(Point::new(5.0, 47.0)),
            properties: None,
        }];

        let output_path = std::env::temp_dir().join("cartoproj_test_export.geojson");

        export_to_geojson(&features, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains(r#""id":"001""#));

        std::fs::remove_file(output_path).ok();
    }
}
