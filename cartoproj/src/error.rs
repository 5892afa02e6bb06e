//! Types d'erreurs pour le crate cartoproj

use thiserror::Error;

/// Erreurs de construction, de paramétrage et de grammaire WKT
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Ellipsoïde invalide (a <= 0, e² hors de [0, 1), valeurs non finies)
    #[error("Invalid ellipsoid {name}: {reason}")]
    InvalidEllipsoid { name: String, reason: String },

    /// Configuration dégénérée détectée à la construction
    #[error("Degenerate {projection} projection: {reason}")]
    Degenerate {
        projection: &'static str,
        reason: String,
    },

    /// Paramètre requis absent (tous les alias essayés sont listés)
    #[error("Missing required parameter: {}", .names.join(" | "))]
    MissingParameter { names: Vec<String> },

    /// Facteur de conversion d'unité invalide
    #[error("Invalid unit {name}: {reason}")]
    InvalidUnit { name: String, reason: String },

    /// Erreur de grammaire WKT, avec la position (en caractères) dans le texte
    #[error("WKT parse error at position {position}: {reason}")]
    Parse { position: usize, reason: String },

    /// Projection ou élément racine non supporté
    #[error("Unsupported projection: {0}")]
    UnsupportedProjection(String),

    /// Contenu WKT impossible à écrire
    #[error("Unsupported WKT content: {0}")]
    UnsupportedContent(String),
}

impl ProjectionError {
    /// Crée une erreur de grammaire à une position donnée
    pub fn parse_error(position: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            position,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de paramètre manquant à partir des noms essayés
    pub fn missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingParameter {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Crée une erreur d'ellipsoïde invalide
    pub fn invalid_ellipsoid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEllipsoid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de configuration dégénérée
    pub fn degenerate(projection: &'static str, reason: impl Into<String>) -> Self {
        Self::Degenerate {
            projection,
            reason: reason.into(),
        }
    }

    /// Crée une erreur d'unité invalide
    pub fn invalid_unit(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUnit {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Alias de résultat pour le crate
pub type Result<T> = std::result::Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_lists_aliases() {
        let err = ProjectionError::missing(["latitude_of_center", "latitude_of_origin"]);
        assert_eq!(
            err.to_string(),
            "Missing required parameter: latitude_of_center | latitude_of_origin"
        );
    }

    #[test]
    fn test_parse_error_position() {
        let err = ProjectionError::parse_error(12, "expected closing quote");
        assert!(matches!(err, ProjectionError::Parse { position: 12, .. }));
        assert!(err.to_string().contains("position 12"));
    }
}
