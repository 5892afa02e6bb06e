//! # cartoproj-cli
//!
//! Reprojection de fichiers GeoJSON avec le moteur `cartoproj`.
//!
//! ## Features
//!
//! - Projection depuis un `.prj`/WKT, un preset embarqué ou une configuration JSON
//! - Transformation forward (degrés → projeté) et inverse, en parallèle
//! - Export GeoJSON ou WKT
//! - Rapport de transformation (JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! cartoproj forward --preset world-mercator --input pays.geojson --output pays_3395.geojson
//! cartoproj inverse --wkt lambert93.prj --input parcelles.geojson --format wkt
//! cartoproj describe --config projections.json --name alaska
//! ```

pub mod config;
pub mod export;
pub mod report;
pub mod transform;

pub use config::{Config, ProjectionConfig};
pub use report::{TransformReport, TransformStatus};
pub use transform::{read_features, transform_features, OutputFeature};
