//! Projections cartographiques
//!
//! Chaque variante est un type immuable qui porte ses constantes précalculées.
//! Les variantes planes partagent le trait [`Planar`] (centre, unités, origine
//! fictive via [`Frame`]) ; la projection géographique a son propre type car
//! elle produit des angles et non des longueurs.
//!
//! [`Projection`] réunit toutes les variantes derrière un seul type. Toute
//! modification (centre, ellipsoïde, unités) construit une nouvelle valeur et
//! recalcule les constantes ; une configuration dégénérée est refusée à ce
//! moment-là.

mod azimuthal;
mod conic;
mod cylindrical;
mod frame;
mod geographic;
pub(crate) mod latitude;
mod transverse;

use std::f64::consts::FRAC_PI_2;

use geo::{Coord, Geometry};

pub use azimuthal::{
    AzimuthalEqualArea, AzimuthalEquidistant, Gnomonic, Orthographic, Stereographic,
};
pub use conic::{AlbersEqualAreaConic, EquidistantConic, LambertConformalConic, Polyconic};
pub use cylindrical::{CylindricalEqualArea, Mercator, Miller, Robinson};
pub use frame::Frame;
pub use geographic::Geographic;
pub use transverse::{ObliqueMercator, TransverseMercator};

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::geometry::clip::Cap;
use crate::params::ProjectionParameters;
use crate::units::{normalize_name, AngularUnit, LinearUnit};

/// Interprétation des segments entre deux sommets géographiques
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineType {
    /// Segment droit dans le plan projeté (aucune densification)
    #[default]
    Straight,
    /// Loxodromie (cap constant)
    Rhumb,
    /// Orthodromie (plus court chemin sur la sphère)
    GreatCircle,
}

impl LineType {
    pub fn from_name(name: &str) -> Option<LineType> {
        match normalize_name(name).as_str() {
            "straight" => Some(LineType::Straight),
            "rhumb" | "loxodrome" => Some(LineType::Rhumb),
            "greatcircle" | "orthodrome" => Some(LineType::GreatCircle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineType::Straight => "straight",
            LineType::Rhumb => "rhumb",
            LineType::GreatCircle => "great-circle",
        }
    }
}

/// Sens d'une transformation de géométrie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Géographique (radians) vers projeté
    Forward,
    /// Projeté vers géographique (radians)
    Inverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Geographic,
    Cylindrical,
    Azimuthal,
    Conic,
}

/// Contrat commun des projections planes.
///
/// Une variante fournit les formules brutes (mètres, relatives au centre) ;
/// le changement d'unité, l'origine fictive et les paramètres nommés sont
/// pris en charge ici.
pub(crate) trait Planar: Clone {
    const NAME: &'static str;
    const FAMILY: Family;
    /// Noms sous lesquels le centre est écrit dans le sac de paramètres
    const LONGITUDE_PARAMETER: &'static str;
    const LATITUDE_PARAMETER: &'static str;

    fn frame(&self) -> &Frame;

    fn frame_mut(&mut self) -> &mut Frame;

    /// Nouvelle instance de la même variante sur un autre cadre, constantes recalculées
    fn rebuild(&self, frame: Frame) -> Result<Self>;

    /// (λ, φ) en radians vers (x, y) en mètres, sans origine fictive
    fn raw_forward(&self, lon: f64, lat: f64) -> Coord;

    /// (x, y) en mètres, sans origine fictive, vers (λ, φ) en radians
    fn raw_inverse(&self, x: f64, y: f64) -> Coord;

    /// Paramètres propres à la variante, ajoutés après le centre
    fn extra_parameters(&self, _params: &mut ProjectionParameters) {}

    /// Calotte de validité des formules
    fn cap(&self) -> Option<Cap> {
        None
    }

    /// Coupure des lignes à l'antiméridien opposé au centre avant projection
    fn wraps_antimeridian(&self) -> bool {
        !matches!(Self::FAMILY, Family::Azimuthal)
    }

    /// Type de ligne réellement densifié (certaines variantes rendent déjà droites leurs lignes)
    fn densify_line_type(&self) -> LineType {
        self.frame().line_type()
    }

    fn forward(&self, p: Coord) -> Coord {
        self.frame().offset(self.raw_forward(p.x, p.y))
    }

    fn inverse(&self, p: Coord) -> Coord {
        let m = self.frame().unoffset(p);
        self.raw_inverse(m.x, m.y)
    }

    fn parameters(&self) -> ProjectionParameters {
        let mut params = self
            .frame()
            .parameters(Self::LONGITUDE_PARAMETER, Self::LATITUDE_PARAMETER);
        self.extra_parameters(&mut params);
        params
    }

    fn with_line_type(&self, line_type: LineType) -> Self {
        let mut projection = self.clone();
        let frame = projection.frame().clone().with_line_type(line_type);
        *projection.frame_mut() = frame;
        projection
    }
}

/// Marge angulaire de l'inverse : les sommets du bord de la calotte reviennent à l'arrondi près
const INVERSE_TOLERANCE: f64 = 1e-9;

/// Calotte centrée sur le pôle du sommet d'un cône (hémisphère du signe de `n`)
pub(crate) fn apex_cap(lon0: f64, n: f64) -> Cap {
    let pole = FRAC_PI_2.copysign(n);
    Cap::new(Coord { x: lon0, y: pole }, 3.0 * std::f64::consts::FRAC_PI_4)
}

/// Une projection configurée, toutes variantes confondues
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Geographic(Geographic),
    CylindricalEqualArea(CylindricalEqualArea),
    Miller(Miller),
    Mercator(Mercator),
    AzimuthalEquidistant(AzimuthalEquidistant),
    Gnomonic(Gnomonic),
    Orthographic(Orthographic),
    AzimuthalEqualArea(AzimuthalEqualArea),
    Stereographic(Stereographic),
    LambertConformalConic(LambertConformalConic),
    AlbersEqualAreaConic(AlbersEqualAreaConic),
    TransverseMercator(TransverseMercator),
    ObliqueMercator(ObliqueMercator),
    Robinson(Robinson),
    EquidistantConic(EquidistantConic),
    Polyconic(Polyconic),
}

/// Applique la même expression à la variante plane, une autre à la géographique
macro_rules! dispatch {
    ($self:expr, $p:ident => $planar:expr, $g:ident => $geographic:expr) => {
        match $self {
            Projection::Geographic($g) => $geographic,
            Projection::CylindricalEqualArea($p) => $planar,
            Projection::Miller($p) => $planar,
            Projection::Mercator($p) => $planar,
            Projection::AzimuthalEquidistant($p) => $planar,
            Projection::Gnomonic($p) => $planar,
            Projection::Orthographic($p) => $planar,
            Projection::AzimuthalEqualArea($p) => $planar,
            Projection::Stereographic($p) => $planar,
            Projection::LambertConformalConic($p) => $planar,
            Projection::AlbersEqualAreaConic($p) => $planar,
            Projection::TransverseMercator($p) => $planar,
            Projection::ObliqueMercator($p) => $planar,
            Projection::Robinson($p) => $planar,
            Projection::EquidistantConic($p) => $planar,
            Projection::Polyconic($p) => $planar,
        }
    };
}

/// Comme `dispatch!`, mais remballe le résultat dans la même variante
macro_rules! rebuild {
    ($self:expr, $p:ident => $planar:expr, $g:ident => $geographic:expr) => {
        match $self {
            Projection::Geographic($g) => $geographic.map(Projection::Geographic),
            Projection::CylindricalEqualArea($p) => $planar.map(Projection::CylindricalEqualArea),
            Projection::Miller($p) => $planar.map(Projection::Miller),
            Projection::Mercator($p) => $planar.map(Projection::Mercator),
            Projection::AzimuthalEquidistant($p) => $planar.map(Projection::AzimuthalEquidistant),
            Projection::Gnomonic($p) => $planar.map(Projection::Gnomonic),
            Projection::Orthographic($p) => $planar.map(Projection::Orthographic),
            Projection::AzimuthalEqualArea($p) => $planar.map(Projection::AzimuthalEqualArea),
            Projection::Stereographic($p) => $planar.map(Projection::Stereographic),
            Projection::LambertConformalConic($p) => $planar.map(Projection::LambertConformalConic),
            Projection::AlbersEqualAreaConic($p) => $planar.map(Projection::AlbersEqualAreaConic),
            Projection::TransverseMercator($p) => $planar.map(Projection::TransverseMercator),
            Projection::ObliqueMercator($p) => $planar.map(Projection::ObliqueMercator),
            Projection::Robinson($p) => $planar.map(Projection::Robinson),
            Projection::EquidistantConic($p) => $planar.map(Projection::EquidistantConic),
            Projection::Polyconic($p) => $planar.map(Projection::Polyconic),
        }
    };
}

/// Construit une variante plane d'après son nom WKT
macro_rules! planar_from_name {
    ($key:expr, $ellipsoid:expr, $params:expr, $($variant:ident),+ $(,)?) => {
        $(
            if $key == normalize_name(<$variant as Planar>::NAME) {
                return Ok(Projection::$variant($variant::from_parameters($ellipsoid, $params)?));
            }
        )+
    };
}

/// Noms courts acceptés en plus des noms WKT
const NAME_ALIASES: [(&str, &str); 19] = [
    ("latlong", Geographic::NAME),
    ("geographic", Geographic::NAME),
    ("mercator", Mercator::NAME),
    ("miller", Miller::NAME),
    ("equalarea", CylindricalEqualArea::NAME),
    ("aeqd", AzimuthalEquidistant::NAME),
    ("laea", AzimuthalEqualArea::NAME),
    ("stere", Stereographic::NAME),
    ("lcc", LambertConformalConic::NAME),
    ("lambertconformalconic", LambertConformalConic::NAME),
    ("albers", AlbersEqualAreaConic::NAME),
    ("tmerc", TransverseMercator::NAME),
    ("hotineobliquemercator", ObliqueMercator::NAME),
    ("hotineobliquemercatorazimuthnaturalorigin", ObliqueMercator::NAME),
    ("omerc", ObliqueMercator::NAME),
    ("robin", Robinson::NAME),
    ("eqdc", EquidistantConic::NAME),
    ("poly", Polyconic::NAME),
    ("americanpolyconic", Polyconic::NAME),
];

fn name_of<P: Planar>(_: &P) -> &'static str {
    P::NAME
}

fn family_of<P: Planar>(_: &P) -> Family {
    P::FAMILY
}

impl Projection {
    /// Noms WKT de toutes les variantes
    pub fn names() -> [&'static str; 16] {
        [
            Geographic::NAME,
            CylindricalEqualArea::NAME,
            Miller::NAME,
            Mercator::NAME,
            AzimuthalEquidistant::NAME,
            Gnomonic::NAME,
            Orthographic::NAME,
            AzimuthalEqualArea::NAME,
            Stereographic::NAME,
            LambertConformalConic::NAME,
            AlbersEqualAreaConic::NAME,
            TransverseMercator::NAME,
            ObliqueMercator::NAME,
            Robinson::NAME,
            EquidistantConic::NAME,
            Polyconic::NAME,
        ]
    }

    /// Construit la variante nommée `name` (nom WKT ou alias court, sans
    /// tenir compte de la casse ni des séparateurs) à partir d'un sac de paramètres.
    pub fn from_parameters(
        name: &str,
        ellipsoid: Ellipsoid,
        params: &ProjectionParameters,
    ) -> Result<Self> {
        let mut key = normalize_name(name);
        if let Some((_, full)) = NAME_ALIASES.iter().find(|(alias, _)| *alias == key) {
            key = normalize_name(full);
        }
        if key == normalize_name(Geographic::NAME) {
            return Ok(Projection::Geographic(Geographic::from_parameters(
                ellipsoid, params,
            )?));
        }
        planar_from_name!(
            key,
            ellipsoid,
            params,
            CylindricalEqualArea,
            Miller,
            Mercator,
            AzimuthalEquidistant,
            Gnomonic,
            Orthographic,
            AzimuthalEqualArea,
            Stereographic,
            LambertConformalConic,
            AlbersEqualAreaConic,
            TransverseMercator,
            ObliqueMercator,
            Robinson,
            EquidistantConic,
            Polyconic,
        );
        Err(ProjectionError::UnsupportedProjection(name.to_string()))
    }

    /// Nom WKT de la variante
    pub fn name(&self) -> &'static str {
        dispatch!(self, p => name_of(p), _g => Geographic::NAME)
    }

    pub fn family(&self) -> Family {
        dispatch!(self, p => family_of(p), _g => Family::Geographic)
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        dispatch!(self, p => p.frame().ellipsoid(), g => g.ellipsoid())
    }

    /// Centre (λ0, φ0) en radians
    pub fn center(&self) -> Coord {
        dispatch!(self, p => p.frame().center(), g => g.center())
    }

    pub fn line_type(&self) -> LineType {
        dispatch!(self, p => p.frame().line_type(), g => g.line_type())
    }

    /// Unité des coordonnées projetées ; `None` pour la projection géographique
    pub fn linear_unit(&self) -> Option<&LinearUnit> {
        dispatch!(self, p => Some(p.frame().units()), _g => None)
    }

    /// Unité des coordonnées de sortie de la projection géographique
    pub fn angular_unit(&self) -> Option<&AngularUnit> {
        dispatch!(self, _p => None, g => Some(g.unit()))
    }

    pub fn false_easting(&self) -> f64 {
        dispatch!(self, p => p.frame().false_easting(), _g => 0.0)
    }

    pub fn false_northing(&self) -> f64 {
        dispatch!(self, p => p.frame().false_northing(), _g => 0.0)
    }

    /// Projette un point (λ, φ) en radians.
    ///
    /// `None` si le point est non fini, hors de la calotte de la variante ou
    /// si le résultat n'est pas fini (pôle d'une Mercator par exemple).
    pub fn forward(&self, p: Coord) -> Option<Coord> {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return None;
        }
        if let Some(cap) = self.cap() {
            if !cap.contains(p) {
                return None;
            }
        }
        let out = dispatch!(self, v => v.forward(p), g => g.forward(p));
        finite(out)
    }

    /// Point projeté vers (λ, φ) en radians ; `None` hors du domaine de la variante
    pub fn inverse(&self, p: Coord) -> Option<Coord> {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return None;
        }
        let out = finite(dispatch!(self, v => v.inverse(p), g => g.inverse(p)))?;
        match self.cap() {
            Some(cap) if cap.distance(out) > cap.max_angle() + INVERSE_TOLERANCE => None,
            _ => Some(out),
        }
    }

    /// Transforme une géométrie ; le résultat peut compter plusieurs parties
    pub fn transform(&self, geometry: &Geometry, direction: Direction) -> Geometry {
        crate::geometry::transform(self, geometry, direction)
    }

    /// Paramètres nommés ; les relire avec [`Projection::from_parameters`] et
    /// le même nom redonne une projection équivalente
    pub fn parameters(&self) -> ProjectionParameters {
        dispatch!(self, p => p.parameters(), g => g.parameters())
    }

    pub fn with_center(&self, center: Coord) -> Result<Self> {
        rebuild!(self,
            p => p.rebuild(p.frame().clone().with_center(center)),
            g => g.with_center(center))
    }

    pub fn with_ellipsoid(&self, ellipsoid: Ellipsoid) -> Result<Self> {
        rebuild!(self,
            p => p.rebuild(p.frame().clone().with_ellipsoid(ellipsoid)),
            g => g.with_ellipsoid(ellipsoid))
    }

    /// Change l'unité linéaire (les fausses coordonnées sont converties)
    pub fn with_units(&self, units: LinearUnit) -> Result<Self> {
        rebuild!(self,
            p => p.rebuild(p.frame().clone().with_units(units)),
            _g => Err(ProjectionError::invalid_unit(
                units.name(),
                "a geographic projection has no linear unit",
            )))
    }

    /// Change l'unité angulaire de sortie (projection géographique seulement)
    pub fn with_angular_unit(&self, unit: AngularUnit) -> Result<Self> {
        rebuild!(self,
            _p => Err(ProjectionError::invalid_unit(
                unit.name(),
                "a projected coordinate system has no angular output unit",
            )),
            g => g.with_unit(unit))
    }

    /// Change l'origine fictive, exprimée dans l'unité linéaire de la projection
    pub fn with_false_origin(&self, false_easting: f64, false_northing: f64) -> Result<Self> {
        rebuild!(self,
            p => p.rebuild(p.frame().clone().with_false_origin(false_easting, false_northing)),
            _g => Err(ProjectionError::degenerate(
                Geographic::NAME,
                "a geographic projection has no false origin",
            )))
    }

    pub fn with_line_type(&self, line_type: LineType) -> Self {
        match self {
            Projection::Geographic(g) => Projection::Geographic(g.with_line_type(line_type)),
            Projection::CylindricalEqualArea(p) => {
                Projection::CylindricalEqualArea(p.with_line_type(line_type))
            }
            Projection::Miller(p) => Projection::Miller(p.with_line_type(line_type)),
            Projection::Mercator(p) => Projection::Mercator(p.with_line_type(line_type)),
            Projection::AzimuthalEquidistant(p) => {
                Projection::AzimuthalEquidistant(p.with_line_type(line_type))
            }
            Projection::Gnomonic(p) => Projection::Gnomonic(p.with_line_type(line_type)),
            Projection::Orthographic(p) => Projection::Orthographic(p.with_line_type(line_type)),
            Projection::AzimuthalEqualArea(p) => {
                Projection::AzimuthalEqualArea(p.with_line_type(line_type))
            }
            Projection::Stereographic(p) => Projection::Stereographic(p.with_line_type(line_type)),
            Projection::LambertConformalConic(p) => {
                Projection::LambertConformalConic(p.with_line_type(line_type))
            }
            Projection::AlbersEqualAreaConic(p) => {
                Projection::AlbersEqualAreaConic(p.with_line_type(line_type))
            }
            Projection::TransverseMercator(p) => {
                Projection::TransverseMercator(p.with_line_type(line_type))
            }
            Projection::ObliqueMercator(p) => Projection::ObliqueMercator(p.with_line_type(line_type)),
            Projection::Robinson(p) => Projection::Robinson(p.with_line_type(line_type)),
            Projection::EquidistantConic(p) => {
                Projection::EquidistantConic(p.with_line_type(line_type))
            }
            Projection::Polyconic(p) => Projection::Polyconic(p.with_line_type(line_type)),
        }
    }

    /// Calotte hors de laquelle les points ne sont pas projetés
    pub fn cap(&self) -> Option<Cap> {
        dispatch!(self, p => p.cap(), _g => None)
    }

    /// Méridien central de la coupure d'antiméridien, pour les variantes qui coupent
    pub fn wrap_meridian(&self) -> Option<f64> {
        dispatch!(self,
            p => p.wraps_antimeridian().then(|| p.frame().center().x),
            g => Some(g.center().x))
    }

    /// Type de ligne à densifier avant projection
    pub fn densify_line_type(&self) -> LineType {
        dispatch!(self, p => p.densify_line_type(), g => g.line_type())
    }
}

fn finite(p: Coord) -> Option<Coord> {
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}

macro_rules! impl_from {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Projection {
                fn from(value: $variant) -> Self {
                    Projection::$variant(value)
                }
            }
        )+
    };
}

impl_from!(
    Geographic,
    CylindricalEqualArea,
    Miller,
    Mercator,
    AzimuthalEquidistant,
    Gnomonic,
    Orthographic,
    AzimuthalEqualArea,
    Stereographic,
    LambertConformalConic,
    AlbersEqualAreaConic,
    TransverseMercator,
    ObliqueMercator,
    Robinson,
    EquidistantConic,
    Polyconic,
);
