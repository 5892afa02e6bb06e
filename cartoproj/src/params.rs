//! Sac de paramètres nommés d'une projection
//!
//! Les noms sont stockés en minuscules. Les valeurs angulaires et linéaires sont
//! stockées dans les unités du sac et converties en radians / mètres à la lecture.
//! L'ordre d'insertion est conservé pour une écriture WKT déterministe.

use crate::error::{ProjectionError, Result};
use crate::units::{AngularUnit, LinearUnit};

pub const FALSE_EASTING: &str = "false_easting";
pub const FALSE_NORTHING: &str = "false_northing";
pub const LONGITUDE_OF_CENTER: &str = "longitude_of_center";
pub const CENTRAL_MERIDIAN: &str = "central_meridian";
pub const LATITUDE_OF_CENTER: &str = "latitude_of_center";
pub const LATITUDE_OF_ORIGIN: &str = "latitude_of_origin";
pub const STANDARD_PARALLEL_1: &str = "standard_parallel_1";
pub const STANDARD_PARALLEL_2: &str = "standard_parallel_2";
pub const SCALE_FACTOR: &str = "scale_factor";
pub const AZIMUTH: &str = "azimuth";

/// Alias de la longitude du centre, par ordre de priorité
pub const CENTER_LONGITUDE_ALIASES: [&str; 2] = [LONGITUDE_OF_CENTER, CENTRAL_MERIDIAN];

/// Alias de la latitude du centre, par ordre de priorité
pub const CENTER_LATITUDE_ALIASES: [&str; 3] =
    [LATITUDE_OF_CENTER, LATITUDE_OF_ORIGIN, STANDARD_PARALLEL_1];

/// Paramètres nommés, avec les unités dans lesquelles les valeurs sont exprimées
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParameters {
    angular_unit: AngularUnit,
    linear_unit: LinearUnit,
    values: Vec<(String, f64)>,
}

impl ProjectionParameters {
    pub fn new(angular_unit: AngularUnit, linear_unit: LinearUnit) -> Self {
        Self {
            angular_unit,
            linear_unit,
            values: Vec::new(),
        }
    }

    pub fn angular_unit(&self) -> &AngularUnit {
        &self.angular_unit
    }

    pub fn linear_unit(&self) -> &LinearUnit {
        &self.linear_unit
    }

    /// Itère sur les paramètres (nom en minuscules, valeur brute) dans l'ordre d'insertion
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }

    /// Ajoute (ou remplace) une valeur brute, sans conversion
    pub fn add_parameter(&mut self, name: &str, value: f64) {
        let key = name.to_lowercase();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
    }

    /// Retire un paramètre et renvoie sa valeur brute
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        let key = name.to_lowercase();
        let index = self.values.iter().position(|(k, _)| *k == key)?;
        Some(self.values.remove(index).1)
    }

    /// Valeur brute, dans les unités du sac
    pub fn parameter(&self, name: &str) -> Option<f64> {
        let key = name.to_lowercase();
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| *value)
    }

    /// Ajoute un angle exprimé dans `unit`, converti dans l'unité angulaire du sac
    pub fn add_angular_parameter(&mut self, name: &str, angle: f64, unit: &AngularUnit) {
        let value = unit.convert_to(angle, &self.angular_unit);
        self.add_parameter(name, value);
    }

    /// Ajoute une longueur exprimée dans `unit`, convertie dans l'unité linéaire du sac
    pub fn add_linear_parameter(&mut self, name: &str, length: f64, unit: &LinearUnit) {
        let value = unit.convert_to(length, &self.linear_unit);
        self.add_parameter(name, value);
    }

    pub fn add_dimensionless_parameter(&mut self, name: &str, value: f64) {
        self.add_parameter(name, value);
    }

    /// Angle en radians
    pub fn angular_parameter(&self, name: &str) -> Result<f64> {
        self.required(name)
            .map(|v| self.angular_unit.to_radians(v))
    }

    /// Longueur en mètres
    pub fn linear_parameter(&self, name: &str) -> Result<f64> {
        self.required(name).map(|v| self.linear_unit.to_metres(v))
    }

    pub fn dimensionless_parameter(&self, name: &str) -> Result<f64> {
        self.required(name)
    }

    /// Paramètre sans dimension optionnel, avec valeur par défaut
    pub fn dimensionless_parameter_or(&self, name: &str, default: f64) -> f64 {
        self.parameter(name).unwrap_or(default)
    }

    /// Longueur optionnelle en mètres, 0 si absente
    pub fn linear_parameter_or_zero(&self, name: &str) -> f64 {
        self.parameter(name)
            .map(|v| self.linear_unit.to_metres(v))
            .unwrap_or(0.0)
    }

    /// Longitude du centre en radians (`longitude_of_center`, puis `central_meridian`)
    pub fn center_longitude(&self) -> Result<f64> {
        self.first_angular(&CENTER_LONGITUDE_ALIASES)
    }

    /// Latitude du centre en radians
    /// (`latitude_of_center`, puis `latitude_of_origin`, puis `standard_parallel_1`)
    pub fn center_latitude(&self) -> Result<f64> {
        self.first_angular(&CENTER_LATITUDE_ALIASES)
    }

    fn first_angular(&self, aliases: &[&str]) -> Result<f64> {
        aliases
            .iter()
            .find_map(|name| self.parameter(name))
            .map(|v| self.angular_unit.to_radians(v))
            .ok_or_else(|| ProjectionError::missing(aliases.iter().copied()))
    }

    fn required(&self, name: &str) -> Result<f64> {
        self.parameter(name)
            .ok_or_else(|| ProjectionError::missing([name.to_lowercase()]))
    }
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self::new(AngularUnit::DEGREE, LinearUnit::METRE)
    }
}
