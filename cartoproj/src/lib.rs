//! # cartoproj
//!
//! Moteur de projections cartographiques : passage de coordonnées
//! géographiques (radians) à des coordonnées planes, et retour.
//!
//! ## Features
//!
//! - Seize projections (cylindriques, transverse et oblique, azimutales,
//!   coniques, polyconique, Robinson, géographique),
//!   valeurs immuables reconstruites à chaque changement de paramètre
//! - Ellipsoïdes et unités (linéaires et angulaires) nommés
//! - Transformation de géométries `geo` : densification, coupure à
//!   l'antiméridien, découpage au domaine visible, recomposition des polygones
//! - Lecture et écriture WKT (`GEOGCS`/`PROJCS` des fichiers `.prj`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartoproj::{parse_projection, Direction};
//! use geo::{Geometry, Point};
//!
//! let projection = parse_projection(&std::fs::read_to_string("zone.prj")?)?;
//! let point = Geometry::Point(Point::new(0.04, 0.85));
//! let projected = projection.transform(&point, Direction::Forward);
//! ```

pub mod ellipsoid;
pub mod error;
pub mod format;
pub mod geometry;
pub mod params;
pub mod projection;
pub mod units;
pub mod wkt;

pub use ellipsoid::Ellipsoid;
pub use error::{ProjectionError, Result};
pub use format::decode_prj;
pub use params::ProjectionParameters;
pub use projection::{
    AlbersEqualAreaConic, AzimuthalEqualArea, AzimuthalEquidistant, CylindricalEqualArea,
    Direction, EquidistantConic, Family, Frame, Geographic, Gnomonic, LambertConformalConic,
    LineType, Mercator, Miller, ObliqueMercator, Orthographic, Polyconic, Projection, Robinson,
    Stereographic, TransverseMercator,
};
pub use units::{AngularUnit, LinearUnit};
pub use wkt::{WktElement, WktFormat, WktValue};

use std::path::Path;

/// Lit une projection depuis un texte WKT (séparateur `,`)
pub fn parse_projection(text: &str) -> Result<Projection> {
    WktFormat::default().parse_projection(text)
}

/// Écrit une projection en WKT (séparateur `,`)
pub fn format_projection(projection: &Projection) -> Result<String> {
    WktFormat::default().format_projection(projection)
}

/// Lit un fichier `.prj`
pub fn read_prj(path: &Path) -> std::result::Result<Projection, PrjError> {
    let bytes = std::fs::read(path)?;
    Ok(parse_projection(&decode_prj(&bytes))?)
}

/// Erreur de lecture d'un fichier `.prj`
#[derive(Debug, thiserror::Error)]
pub enum PrjError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
