//! Unités linéaires et angulaires
//!
//! Chaque unité porte son facteur de conversion vers l'unité SI (mètre ou radian).
//! Les unités connues sont exposées comme constantes et via `from_name`.

use std::borrow::Cow;
use std::f64::consts::PI;

use crate::error::{ProjectionError, Result};

/// Unité de longueur (facteur vers le mètre)
#[derive(Debug, Clone, PartialEq)]
pub struct LinearUnit {
    name: Cow<'static, str>,
    metres: f64,
}

/// Unité d'angle (facteur vers le radian)
#[derive(Debug, Clone, PartialEq)]
pub struct AngularUnit {
    name: Cow<'static, str>,
    radians: f64,
}

impl LinearUnit {
    pub const METRE: LinearUnit = Self::known("Meter", 1.0);
    pub const KILOMETRE: LinearUnit = Self::known("Kilometer", 1000.0);
    pub const FOOT: LinearUnit = Self::known("Foot", 0.3048);
    pub const US_SURVEY_FOOT: LinearUnit = Self::known("Foot_US", 1200.0 / 3937.0);
    pub const FOOT_CLARKE: LinearUnit = Self::known("Foot_Clarke", 12.0 / 39.370432);
    pub const FOOT_INDIAN: LinearUnit = Self::known("Foot_Indian", 12.0 / 39.370141);
    pub const FOOT_MODIFIED_AMERICAN: LinearUnit =
        Self::known("Foot_Modified_American", 12.0004584 / 39.37);
    pub const LINK: LinearUnit = Self::known("Link", 7.92 / 39.370432);
    pub const YARD: LinearUnit = Self::known("Yard", 0.9144);
    pub const FATHOM: LinearUnit = Self::known("Fathom", 1.8288);
    pub const STATUTE_MILE: LinearUnit = Self::known("Statute_Mile", 1609.344);

    const fn known(name: &'static str, metres: f64) -> Self {
        Self {
            name: Cow::Borrowed(name),
            metres,
        }
    }

    /// Crée une unité à partir d'un nom et d'un nombre de mètres par unité
    pub fn new(name: impl Into<String>, metres: f64) -> Result<Self> {
        let name = name.into();
        if !metres.is_finite() || metres <= 0.0 {
            return Err(ProjectionError::invalid_unit(
                name,
                format!("conversion factor must be finite and positive, got {}", metres),
            ));
        }
        Ok(Self {
            name: Cow::Owned(name),
            metres,
        })
    }

    /// Toutes les unités linéaires connues
    pub fn all() -> &'static [LinearUnit] {
        &LINEAR_UNITS
    }

    /// Recherche une unité connue par nom (insensible à la casse et aux séparateurs)
    pub fn from_name(name: &str) -> Option<LinearUnit> {
        let wanted = normalize_name(name);
        LINEAR_UNITS
            .iter()
            .find(|u| normalize_name(&u.name) == wanted || linear_alias(&wanted) == Some(u))
            .cloned()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nombre de mètres dans une unité
    pub fn metres(&self) -> f64 {
        self.metres
    }

    pub fn to_metres(&self, value: f64) -> f64 {
        value * self.metres
    }

    pub fn from_metres(&self, value: f64) -> f64 {
        value / self.metres
    }

    /// Convertit une valeur exprimée dans `self` vers l'unité `target`
    pub fn convert_to(&self, value: f64, target: &LinearUnit) -> f64 {
        if self.metres == target.metres {
            value
        } else {
            target.from_metres(self.to_metres(value))
        }
    }
}

impl AngularUnit {
    pub const RADIAN: AngularUnit = Self::known("Radian", 1.0);
    pub const DEGREE: AngularUnit = Self::known("Degree", PI / 180.0);
    pub const GRAD: AngularUnit = Self::known("Grad", PI / 200.0);
    pub const ARC_MINUTE: AngularUnit = Self::known("Minute", PI / 10800.0);
    pub const ARC_SECOND: AngularUnit = Self::known("Second", PI / 648000.0);

    const fn known(name: &'static str, radians: f64) -> Self {
        Self {
            name: Cow::Borrowed(name),
            radians,
        }
    }

    /// Crée une unité à partir d'un nom et d'un nombre de radians par unité
    pub fn new(name: impl Into<String>, radians: f64) -> Result<Self> {
        let name = name.into();
        if !radians.is_finite() || radians <= 0.0 {
            return Err(ProjectionError::invalid_unit(
                name,
                format!("conversion factor must be finite and positive, got {}", radians),
            ));
        }
        Ok(Self {
            name: Cow::Owned(name),
            radians,
        })
    }

    pub fn all() -> &'static [AngularUnit] {
        &ANGULAR_UNITS
    }

    pub fn from_name(name: &str) -> Option<AngularUnit> {
        let wanted = normalize_name(name);
        ANGULAR_UNITS
            .iter()
            .find(|u| normalize_name(&u.name) == wanted)
            .cloned()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nombre de radians dans une unité
    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn to_radians(&self, value: f64) -> f64 {
        value * self.radians
    }

    pub fn from_radians(&self, value: f64) -> f64 {
        value / self.radians
    }

    pub fn convert_to(&self, value: f64, target: &AngularUnit) -> f64 {
        if self.radians == target.radians {
            value
        } else {
            target.from_radians(self.to_radians(value))
        }
    }
}

static LINEAR_UNITS: [LinearUnit; 11] = [
    LinearUnit::METRE,
    LinearUnit::KILOMETRE,
    LinearUnit::FOOT,
    LinearUnit::US_SURVEY_FOOT,
    LinearUnit::FOOT_CLARKE,
    LinearUnit::FOOT_INDIAN,
    LinearUnit::FOOT_MODIFIED_AMERICAN,
    LinearUnit::LINK,
    LinearUnit::YARD,
    LinearUnit::FATHOM,
    LinearUnit::STATUTE_MILE,
];

static ANGULAR_UNITS: [AngularUnit; 5] = [
    AngularUnit::RADIAN,
    AngularUnit::DEGREE,
    AngularUnit::GRAD,
    AngularUnit::ARC_MINUTE,
    AngularUnit::ARC_SECOND,
];

/// Orthographes courantes (anglais britannique / américain, abréviations)
fn linear_alias(normalized: &str) -> Option<&'static LinearUnit> {
    let index = match normalized {
        "m" | "metre" | "metres" | "meters" => 0,
        "km" | "kilometre" | "kilometres" | "kilometers" => 1,
        "ft" | "feet" | "internationalfoot" => 2,
        "usft" | "ussurveyfoot" | "footus" | "usfoot" => 3,
        "mi" | "mile" | "miles" => 10,
        _ => return None,
    };
    LINEAR_UNITS.get(index)
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foot_conversion() {
        let ft = LinearUnit::FOOT;
        assert!((ft.to_metres(1.0) - 0.3048).abs() < 1e-15);
        assert!((ft.from_metres(0.3048) - 1.0).abs() < 1e-15);
        let us = LinearUnit::US_SURVEY_FOOT;
        let v = ft.convert_to(1000.0, &us);
        assert!((v - 999.998).abs() < 1e-6, "v={}", v);
    }

    #[test]
    fn test_degree_conversion() {
        let deg = AngularUnit::DEGREE;
        assert!((deg.to_radians(180.0) - PI).abs() < 1e-15);
        assert!((AngularUnit::GRAD.convert_to(100.0, &deg) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_factor_rejected() {
        assert!(LinearUnit::new("Bogus", 0.0).is_err());
        assert!(LinearUnit::new("Bogus", f64::NAN).is_err());
        assert!(AngularUnit::new("Bogus", -1.0).is_err());
        assert!(LinearUnit::new("Foot_Gold_Coast", 0.3047997101815088).is_ok());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(LinearUnit::from_name("meter"), Some(LinearUnit::METRE));
        assert_eq!(LinearUnit::from_name("metres"), Some(LinearUnit::METRE));
        assert_eq!(LinearUnit::from_name("Foot US"), Some(LinearUnit::US_SURVEY_FOOT));
        assert_eq!(LinearUnit::from_name("ft"), Some(LinearUnit::FOOT));
        assert_eq!(AngularUnit::from_name("DEGREE"), Some(AngularUnit::DEGREE));
        assert!(LinearUnit::from_name("parsec").is_none());
    }
}
