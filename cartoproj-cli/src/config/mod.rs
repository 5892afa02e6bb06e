//! Configuration des projections (presets embarqués ou fichier JSON)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use cartoproj::params::{
    AZIMUTH, CENTRAL_MERIDIAN, FALSE_EASTING, FALSE_NORTHING, LATITUDE_OF_ORIGIN, SCALE_FACTOR,
    STANDARD_PARALLEL_1, STANDARD_PARALLEL_2,
};
use cartoproj::{
    decode_prj, AngularUnit, Ellipsoid, LineType, LinearUnit, Projection, ProjectionParameters,
};

/// Fichier de configuration : projections nommées
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(flatten)]
    pub projections: BTreeMap<String, ProjectionConfig>,
}

/// Description d'une projection, angles en degrés
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectionConfig {
    /// Nom WKT (`Mercator_1SP`) ou alias court (`mercator`, `lcc`...)
    pub projection: String,

    /// Nom d'un ellipsoïde du registre
    #[serde(default = "default_ellipsoid")]
    pub ellipsoid: String,

    #[serde(default)]
    pub center_lon: f64,

    #[serde(default)]
    pub center_lat: f64,

    /// Nom d'une unité linéaire du registre
    #[serde(default = "default_units")]
    pub units: String,

    #[serde(default)]
    pub false_easting: f64,

    #[serde(default)]
    pub false_northing: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_parallel_1: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_parallel_2: Option<f64>,

    /// Azimut de la ligne centrale (Mercator oblique)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,

    /// straight, rhumb ou great-circle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_type: Option<String>,
}

fn default_ellipsoid() -> String {
    "WGS_84".to_string()
}

fn default_units() -> String {
    "Meter".to_string()
}

/// Noms des presets embarqués
pub const PRESETS: [&str; 10] = [
    "world-mercator",
    "world-miller",
    "world-equal-area",
    "world-robinson",
    "utm-31n",
    "europe-omerc",
    "north-polar-ortho",
    "south-polar-stereo",
    "europe-lcc",
    "usa-albers",
];

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Presets embarqués
    pub fn presets() -> Result<Self> {
        serde_json::from_str(include_str!("presets/world.json"))
            .context("Failed to parse embedded presets")
    }

    /// Récupère une projection par son nom
    pub fn get(&self, name: &str) -> Result<&ProjectionConfig> {
        self.projections.get(name).with_context(|| {
            let known: Vec<&str> = self.projections.keys().map(String::as_str).collect();
            format!("Unknown projection entry: {}. Use: {}", name, known.join(", "))
        })
    }
}

impl ProjectionConfig {
    /// Charge un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        if !PRESETS.contains(&preset) {
            anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", "));
        }
        Ok(Config::presets()?.get(preset)?.clone())
    }

    /// Sac de paramètres équivalent, en degrés et dans l'unité configurée
    pub fn parameters(&self) -> Result<ProjectionParameters> {
        let units = LinearUnit::from_name(&self.units)
            .with_context(|| format!("Unknown linear unit: {}", self.units))?;
        let mut params = ProjectionParameters::new(AngularUnit::DEGREE, units);
        params.add_parameter(CENTRAL_MERIDIAN, self.center_lon);
        params.add_parameter(LATITUDE_OF_ORIGIN, self.center_lat);
        params.add_parameter(FALSE_EASTING, self.false_easting);
        params.add_parameter(FALSE_NORTHING, self.false_northing);
        if let Some(k) = self.scale_factor {
            params.add_dimensionless_parameter(SCALE_FACTOR, k);
        }
        if let Some(phi1) = self.standard_parallel_1 {
            params.add_parameter(STANDARD_PARALLEL_1, phi1);
        }
        if let Some(phi2) = self.standard_parallel_2 {
            params.add_parameter(STANDARD_PARALLEL_2, phi2);
        }
        if let Some(alpha) = self.azimuth {
            params.add_parameter(AZIMUTH, alpha);
        }
        Ok(params)
    }

    /// Construit la projection par le même chemin que la lecture WKT
    pub fn build(&self) -> Result<Projection> {
        let ellipsoid = Ellipsoid::from_name(&self.ellipsoid)
            .with_context(|| format!("Unknown ellipsoid: {}", self.ellipsoid))?;
        let projection = Projection::from_parameters(&self.projection, ellipsoid, &self.parameters()?)
            .with_context(|| format!("Invalid projection configuration: {}", self.projection))?;
        match &self.line_type {
            Some(name) => Ok(projection.with_line_type(parse_line_type(name)?)),
            None => Ok(projection),
        }
    }
}

/// Lit une projection depuis un fichier `.prj` ou un texte WKT littéral
pub fn load_wkt(source: &str) -> Result<Projection> {
    let path = Path::new(source);
    if path.is_file() {
        let bytes = std::fs::read(path)
            .context(format!("Failed to read projection file: {}", path.display()))?;
        return cartoproj::parse_projection(&decode_prj(&bytes))
            .context(format!("Invalid projection file: {}", path.display()));
    }
    cartoproj::parse_projection(source).context("Invalid WKT projection")
}

/// Lit un type de ligne (straight, rhumb, great-circle)
pub fn parse_line_type(name: &str) -> Result<LineType> {
    LineType::from_name(name)
        .with_context(|| format!("Unknown line type: {}. Use: straight, rhumb, great-circle", name))
}
