//! Export vers WKT avec geozero, une géométrie par ligne

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::wkt::WktWriter;
use geozero::GeozeroGeometry;

use crate::transform::OutputFeature;

/// Exporte les géométries dans un fichier texte
pub fn export_to_wkt(features: &[OutputFeature], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_wkt_lines(&mut writer, features)?;
    writer.flush()?;
    Ok(())
}

/// Écrit `WKT` ou `id<TAB>WKT` pour chaque feature
pub fn write_wkt_lines<W: Write>(writer: &mut W, features: &[OutputFeature]) -> Result<()> {
    let mut wkt_buf = Vec::new();
    for feature in features {
        wkt_buf.clear();
        {
            let mut wkt_writer = WktWriter::new(&mut wkt_buf);
            feature
                .geometry
                .process_geom(&mut wkt_writer)
                .context("Failed to encode geometry to WKT")?;
        }
        if let Some(id) = &feature.id {
            write!(writer, "{}\t", id)?;
        }
        writer.write_all(&wkt_buf)?;
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, LineString, Point};

    #[test]
    fn test_one_line_per_feature() {
        let features = vec![
            OutputFeature {
                id: Some("a".to_string()),
                geometry: Geometry::Point(Point::new(1.5, -2.0)),
                properties: None,
            },
            OutputFeature {
                id: None,
                geometry: Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
                properties: None,
            },
        ];
        let mut buffer = Vec::new();
        write_wkt_lines(&mut buffer, &features).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("a\tPOINT"), "{}", lines[0]);
        assert!(lines[1].starts_with("LINESTRING"), "{}", lines[1]);
    }
}
