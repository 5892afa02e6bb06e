//! Modules d'export (GeoJSON, WKT)

pub mod geojson;
pub mod wkt;

pub use self::geojson::export_to_geojson;
pub use self::wkt::export_to_wkt;
