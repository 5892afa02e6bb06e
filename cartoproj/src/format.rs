//! Projections en WKT (variante ESRI des fichiers `.prj`)
//!
//! Une projection géographique s'écrit `GEOGCS[...]`, une projection plane
//! `PROJCS[..., GEOGCS[...], PROJECTION[...], PARAMETER[...]..., UNIT[...]]`.
//! La latitude du centre d'une projection géographique n'a pas de place dans
//! `GEOGCS` : elle est perdue à l'écriture (seul `PRIMEM` porte le centre).

use tracing::{debug, trace};

use crate::ellipsoid::Ellipsoid;
use crate::error::{ProjectionError, Result};
use crate::params::{ProjectionParameters, CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN};
use crate::projection::{Geographic, Projection};
use crate::units::{AngularUnit, LinearUnit};
use crate::wkt::{WktElement, WktFormat};

const GEOGCS: &str = "GEOGCS";
const PROJCS: &str = "PROJCS";

/// Tolérance relative pour reconnaître une unité connue d'après son facteur
const UNIT_TOLERANCE: f64 = 1e-9;

impl WktFormat {
    /// Lit une projection depuis un texte WKT
    pub fn parse_projection(&self, text: &str) -> Result<Projection> {
        projection_from_wkt(self.parse(text)?)
    }

    /// Écrit une projection en WKT
    pub fn format_projection(&self, projection: &Projection) -> Result<String> {
        self.format(&projection_to_wkt(projection))
    }
}

/// Décode le contenu d'un fichier `.prj` : UTF-8 si valide, sinon Windows-1252
pub fn decode_prj(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match simdutf8::basic::from_utf8(bytes) {
        Ok(text) => text.trim().to_string(),
        Err(_) => {
            debug!("prj is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.trim().to_string()
        }
    }
}

/// Construit la projection décrite par un élément `GEOGCS` ou `PROJCS`
pub fn projection_from_wkt(mut element: WktElement) -> Result<Projection> {
    let keyword = element.keyword().to_string();
    match keyword.as_str() {
        GEOGCS => {
            let geographic = GeographicCs::read(element)?;
            let mut params = ProjectionParameters::new(geographic.unit.clone(), LinearUnit::METRE);
            params.add_parameter(CENTRAL_MERIDIAN, geographic.prime_meridian);
            params.add_parameter(LATITUDE_OF_ORIGIN, 0.0);
            Ok(Projection::Geographic(Geographic::from_parameters(
                geographic.ellipsoid,
                &params,
            )?))
        }
        PROJCS => {
            let name = element.next_string(false)?;
            let geogcs = element
                .next_element(GEOGCS, true)?
                .ok_or_else(|| ProjectionError::missing(["PROJCS[GEOGCS]"]))?;
            let geographic = GeographicCs::read(geogcs)?;
            let projection_name = element
                .next_element("PROJECTION", true)?
                .ok_or_else(|| ProjectionError::missing(["PROJCS[PROJECTION]"]))?
                .next_string(true)?
                .unwrap_or_default();
            let units = match element.next_element("UNIT", false)? {
                Some(unit) => read_linear_unit(unit)?,
                None => LinearUnit::METRE,
            };
            let mut params = ProjectionParameters::new(geographic.unit, units);
            while let Some(mut parameter) = element.next_element("PARAMETER", false)? {
                let key = parameter.next_string(true)?.unwrap_or_default();
                let value = parameter.next_number(true)?.unwrap_or_default();
                params.add_parameter(&key, value);
            }
            trace!(
                name = name.as_deref().unwrap_or(""),
                projection = %projection_name,
                parameters = params.len(),
                "PROJCS read"
            );
            Projection::from_parameters(&projection_name, geographic.ellipsoid, &params)
        }
        other => Err(ProjectionError::UnsupportedProjection(other.to_string())),
    }
}

/// Élément WKT décrivant une projection
pub fn projection_to_wkt(projection: &Projection) -> WktElement {
    let ellipsoid = projection.ellipsoid();
    match projection {
        Projection::Geographic(g) => {
            geographic_cs(ellipsoid, g.unit(), g.unit().from_radians(g.center().x))
        }
        _ => {
            let units = projection.linear_unit().cloned().unwrap_or(LinearUnit::METRE);
            let mut projcs = WktElement::new(PROJCS)
                .text(projection.name())
                .element(geographic_cs(ellipsoid, &AngularUnit::DEGREE, 0.0))
                .element(WktElement::new("PROJECTION").text(projection.name()));
            for (name, value) in projection.parameters().iter() {
                projcs = projcs.element(
                    WktElement::new("PARAMETER")
                        .text(title_case(name))
                        .number(value),
                );
            }
            projcs.element(
                WktElement::new("UNIT")
                    .text(units.name())
                    .number(units.metres()),
            )
        }
    }
}

fn geographic_cs(ellipsoid: &Ellipsoid, unit: &AngularUnit, prime_meridian: f64) -> WktElement {
    let name = ellipsoid.name().replace(' ', "_");
    let inverse_flattening = if ellipsoid.is_sphere() {
        0.0
    } else {
        ellipsoid.inverse_flattening()
    };
    let primem = if prime_meridian == 0.0 { "Greenwich" } else { "Custom" };
    WktElement::new(GEOGCS)
        .text(format!("GCS_{}", name))
        .element(
            WktElement::new("DATUM").text(format!("D_{}", name)).element(
                WktElement::new("SPHEROID")
                    .text(ellipsoid.name())
                    .number(ellipsoid.semi_major_axis())
                    .number(inverse_flattening),
            ),
        )
        .element(WktElement::new("PRIMEM").text(primem).number(prime_meridian))
        .element(WktElement::new("UNIT").text(unit.name()).number(unit.radians()))
}

/// Contenu utile d'un `GEOGCS`
struct GeographicCs {
    ellipsoid: Ellipsoid,
    /// Dans l'unité angulaire du `GEOGCS`
    prime_meridian: f64,
    unit: AngularUnit,
}

impl GeographicCs {
    fn read(mut geogcs: WktElement) -> Result<Self> {
        let mut datum = geogcs
            .next_element("DATUM", true)?
            .ok_or_else(|| ProjectionError::missing(["GEOGCS[DATUM]"]))?;
        let mut spheroid = datum
            .next_element("SPHEROID", true)?
            .ok_or_else(|| ProjectionError::missing(["DATUM[SPHEROID]"]))?;
        let name = spheroid.next_string(false)?.unwrap_or_else(|| "Custom".into());
        let a = spheroid.next_number(true)?.unwrap_or_default();
        let inverse_flattening = spheroid.next_number(true)?.unwrap_or_default();
        let ellipsoid = Ellipsoid::from_inverse_flattening(name, a, inverse_flattening)?;

        let prime_meridian = match geogcs.next_element("PRIMEM", false)? {
            Some(mut primem) => primem.next_number(true)?.unwrap_or_default(),
            None => 0.0,
        };
        let unit = match geogcs.next_element("UNIT", false)? {
            Some(unit) => read_angular_unit(unit)?,
            None => AngularUnit::DEGREE,
        };
        Ok(Self {
            ellipsoid,
            prime_meridian,
            unit,
        })
    }
}

/// Unité connue si le nom et le facteur concordent, sinon unité nommée telle quelle
fn read_angular_unit(mut unit: WktElement) -> Result<AngularUnit> {
    let name = unit.next_string(true)?.unwrap_or_default();
    let radians = unit.next_number(true)?.unwrap_or_default();
    match AngularUnit::from_name(&name) {
        Some(known) if close_to(known.radians(), radians) => Ok(known),
        _ => AngularUnit::new(name, radians),
    }
}

fn read_linear_unit(mut unit: WktElement) -> Result<LinearUnit> {
    let name = unit.next_string(true)?.unwrap_or_default();
    let metres = unit.next_number(true)?.unwrap_or_default();
    match LinearUnit::from_name(&name) {
        Some(known) if close_to(known.metres(), metres) => Ok(known),
        _ => LinearUnit::new(name, metres),
    }
}

fn close_to(known: f64, value: f64) -> bool {
    (known - value).abs() <= known * UNIT_TOLERANCE
}

/// `false_easting` -> `False_Easting`
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}
