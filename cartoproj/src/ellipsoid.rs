//! Définitions des ellipsoïdes
//!
//! Un ellipsoïde est défini par son demi-grand axe (mètres) et sa première
//! excentricité au carré. Les grandeurs dérivées sont calculées à la demande.

use std::borrow::Cow;

use crate::error::{ProjectionError, Result};
use crate::units::{normalize_name, LinearUnit};

/// Ellipsoïde de référence
#[derive(Debug, Clone)]
pub struct Ellipsoid {
    name: Cow<'static, str>,
    semi_major_axis: f64,
    eccentricity_squared: f64,
}

macro_rules! ellipsoids {
    ($($ident:ident => ($name:literal, $a:expr, $e2:expr)),* $(,)?) => {
        impl Ellipsoid {
            $(
                pub const $ident: Ellipsoid = Ellipsoid {
                    name: Cow::Borrowed($name),
                    semi_major_axis: $a,
                    eccentricity_squared: $e2,
                };
            )*
        }

        static REGISTRY: &[Ellipsoid] = &[$(Ellipsoid::$ident),*];
    };
}

ellipsoids! {
    AIRY_1830 => ("Airy 1830", 6377563.396, 0.00667054),
    AIRY_1849 => ("Airy Modified 1849", 6377340.189, 0.00667054),
    AUSTRALIAN_NATIONAL => ("Australian National", 6378160.0, 0.006694542),
    BESSEL_1841 => ("Bessel 1841", 6377397.155, 0.006674372),
    BESSEL_MODIFIED => ("Bessel Modified", 6377492.018, 0.006674372),
    BESSEL_NAMIBIA => ("Bessel Namibia", 6377483.865, 0.006674372),
    CLARKE_1858 => ("Clarke 1858", 20926348.0 * (12.0 / 39.370432), 0.006785146),
    CLARKE_1866 => ("Clarke 1866", 6378206.4, 0.006768658),
    CLARKE_1866_MICHIGAN => ("Clarke 1866 Michigan", 20926631.53 * (12.0004584 / 39.37), 0.006768658),
    CLARKE_1880 => ("Clarke 1880", 6378249.0, 0.006803511),
    CLARKE_1880_ARC => ("Clarke 1880 (Arc)", 6378249.145, 0.006803481),
    CLARKE_1880_BENOIT => ("Clarke 1880 (Benoit)", 6378300.79, 0.006803483),
    CLARKE_1880_IGN => ("Clarke 1880 (IGN)", 6378249.2, 0.006803488),
    CLARKE_1880_RGS => ("Clarke 1880 (RGS)", 6378249.145, 0.006803511),
    CLARKE_1880_SGA_1922 => ("Clarke 1880 (SGA 1922)", 6378249.2, 0.006803489),
    EVEREST_1937 => ("Everest 1830 (1937 Adjustment)", 6377276.345, 0.006637847),
    EVEREST_1967 => ("Everest 1830 (1967 Definition)", 6377298.556, 0.006637847),
    EVEREST_1975 => ("Everest 1830 (1975 Definition)", 6377301.243, 0.006637846),
    EVEREST_MODIFIED => ("Everest 1830 Modified", 6377304.063, 0.006637847),
    FISHER_1960_MERCURY => ("Fisher 1960 Mercury", 6378166.0, 0.006693422),
    FISCHER_1960_MODIFIED => ("Fischer 1960 Modified", 6378155.0, 0.006693422),
    FISHER_1968 => ("Fisher 1968", 6378150.0, 0.006693422),
    GEM_10C => ("GEM 10C", 6378137.0, 0.00669438),
    GRS_1967 => ("GRS 1967", 6378160.0, 0.006694605),
    GRS_1980 => ("GRS 1980", 6378137.0, 0.00669438),
    HELMERT_1906 => ("Helmert 1906", 6378200.0, 0.006693422),
    HOUGH => ("Hough", 6378270.0, 0.00672267),
    INDONESIAN_NATIONAL => ("Indonesian National", 6378160.0, 0.006694609),
    INTERNATIONAL_1924 => ("International 1924", 6378388.0, 0.00672267),
    INTERNATIONAL_1967 => ("International 1967", 6378160.0, 0.006694542),
    KRASSOVSKY => ("Krassovsky 1940", 6378245.0, 0.006693422),
    NAD_1927 => ("NAD 1927", 6378206.4, 0.006768658),
    NAD_1983 => ("NAD 1983", 6378137.0, 0.00669438),
    NWL_10D => ("NWL 10D", 6378135.0, 0.006694318),
    NWL_9D => ("NWL 9D", 6378145.0, 0.006694542),
    OSU86F => ("OSU86F", 6378136.2, 0.00669438),
    OSU91A => ("OSU91A", 6378136.3, 0.00669438),
    PLESSIS_1817 => ("Plessis 1817", 6376523.0, 0.006469544),
    SOUTH_AMERICAN_1969 => ("South American 1969", 6378160.0, 0.006694542),
    STRUVE_1860 => ("Struve 1860", 6378297.0, 0.00677436),
    WAR_OFFICE => ("War Office", 6378300.583, 0.006745343),
    WGS_60 => ("WGS 60", 6378165.0, 0.006693422),
    WGS_66 => ("WGS 66", 6378145.0, 0.006694542),
    WGS_72 => ("WGS 72", 6378135.0, 0.006694318),
    WGS_84 => ("WGS 84", 6378137.0, 0.00669438),
    SPHERE => ("Sphere", 6370997.0, 0.0),
}

impl Ellipsoid {
    /// Crée un ellipsoïde à partir du demi-grand axe (mètres) et de e²
    pub fn new(
        name: impl Into<String>,
        semi_major_axis: f64,
        eccentricity_squared: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !semi_major_axis.is_finite() || semi_major_axis <= 0.0 {
            return Err(ProjectionError::invalid_ellipsoid(
                name,
                format!("semi-major axis must be positive, got {}", semi_major_axis),
            ));
        }
        if !(0.0..1.0).contains(&eccentricity_squared) {
            return Err(ProjectionError::invalid_ellipsoid(
                name,
                format!(
                    "squared eccentricity must be in [0, 1), got {}",
                    eccentricity_squared
                ),
            ));
        }
        Ok(Self {
            name: Cow::Owned(name),
            semi_major_axis,
            eccentricity_squared,
        })
    }

    /// Crée un ellipsoïde dont le demi-grand axe est exprimé dans une autre unité
    pub fn with_units(
        name: impl Into<String>,
        semi_major_axis: f64,
        units: &LinearUnit,
        eccentricity_squared: f64,
    ) -> Result<Self> {
        Self::new(name, units.to_metres(semi_major_axis), eccentricity_squared)
    }

    /// Crée un ellipsoïde à partir de l'inverse de l'aplatissement (1/f).
    ///
    /// Un inverse nul ou infini désigne une sphère, selon la convention ESRI.
    pub fn from_inverse_flattening(
        name: impl Into<String>,
        semi_major_axis: f64,
        inverse_flattening: f64,
    ) -> Result<Self> {
        let e2 = if inverse_flattening == 0.0 || inverse_flattening.is_infinite() {
            0.0
        } else {
            let f = 1.0 / inverse_flattening;
            2.0 * f - f * f
        };
        Self::new(name, semi_major_axis, e2)
    }

    /// Tous les ellipsoïdes prédéfinis
    pub fn all() -> &'static [Ellipsoid] {
        REGISTRY
    }

    /// Recherche un ellipsoïde prédéfini (insensible à la casse et aux séparateurs)
    pub fn from_name(name: &str) -> Option<Ellipsoid> {
        let wanted = normalize_name(name);
        REGISTRY
            .iter()
            .find(|e| normalize_name(&e.name) == wanted)
            .cloned()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Demi-grand axe (rayon équatorial) en mètres
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Première excentricité au carré
    pub fn eccentricity_squared(&self) -> f64 {
        self.eccentricity_squared
    }

    /// Première excentricité
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_squared.sqrt()
    }

    /// f = 1 - √(1 - e²), écrit sans soustraction de termes voisins
    pub fn flattening(&self) -> f64 {
        self.eccentricity_squared / (1.0 + (1.0 - self.eccentricity_squared).sqrt())
    }

    /// Inverse de l'aplatissement, infini pour une sphère
    pub fn inverse_flattening(&self) -> f64 {
        1.0 / self.flattening()
    }

    /// Demi-petit axe (rayon polaire) en mètres
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity_squared).sqrt()
    }

    pub fn is_sphere(&self) -> bool {
        self.eccentricity_squared == 0.0
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS_84
    }
}

/// Deux ellipsoïdes sont égaux s'ils ont les mêmes constantes, quel que soit leur nom
impl PartialEq for Ellipsoid {
    fn eq(&self, other: &Self) -> bool {
        self.semi_major_axis == other.semi_major_axis
            && self.eccentricity_squared == other.eccentricity_squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_constants() {
        let e = Ellipsoid::WGS_84;
        assert_eq!(e.semi_major_axis(), 6378137.0);
        assert!((e.eccentricity() - 0.0818191908).abs() < 1e-7);
        assert!((e.inverse_flattening() - 298.257).abs() < 0.01);
        assert!((e.semi_minor_axis() - 6356752.3).abs() < 1.0);
    }

    #[test]
    fn test_from_inverse_flattening() {
        let e = Ellipsoid::from_inverse_flattening("WGS_1984", 6378137.0, 298.257223563).unwrap();
        assert!((e.eccentricity_squared() - 0.00669437999014).abs() < 1e-13);
        assert!((e.inverse_flattening() - 298.257223563).abs() < 1e-6);

        let sphere = Ellipsoid::from_inverse_flattening("Sphere", 6370997.0, 0.0).unwrap();
        assert!(sphere.is_sphere());
        assert!(sphere.inverse_flattening().is_infinite());
    }

    #[test]
    fn test_invalid_rejected() {
        assert!(Ellipsoid::new("flat", 0.0, 0.0).is_err());
        assert!(Ellipsoid::new("neg", -1.0, 0.0).is_err());
        assert!(Ellipsoid::new("e2", 6378137.0, 1.0).is_err());
        assert!(Ellipsoid::new("e2", 6378137.0, -0.1).is_err());
        assert!(Ellipsoid::new("nan", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(Ellipsoid::from_name("wgs_84"), Some(Ellipsoid::WGS_84));
        assert_eq!(
            Ellipsoid::from_name("Clarke 1866").map(|e| e.semi_major_axis()),
            Some(6378206.4)
        );
        assert!(Ellipsoid::from_name("Mars 2000").is_none());
        assert_eq!(Ellipsoid::all().len(), 46);
        assert!((Ellipsoid::CLARKE_1858.semi_major_axis() - 6378293.639).abs() < 0.01);
    }

    #[test]
    fn test_equality_ignores_name() {
        let custom = Ellipsoid::new("GRS80 copy", 6378137.0, 0.00669438).unwrap();
        assert_eq!(custom, Ellipsoid::GRS_1980);
        assert_ne!(Ellipsoid::WGS_84, Ellipsoid::SPHERE);
    }
}
