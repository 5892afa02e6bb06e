//! Rapport de transformation
//!
//! Compteurs par feature, erreurs non fatales, statut final. Les compteurs
//! sont agrégés après le traitement parallèle.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

/// Statut global de la transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransformStatus {
    /// Toutes les features transformées
    Success,
    /// Certaines features ignorées (géométrie absente ou invalide)
    PartialSuccess,
    /// Aucune feature transformée
    Failed,
}

/// Issue de la transformation d'une feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureOutcome {
    /// Géométrie transformée en une seule partie
    Transformed,
    /// Géométrie coupée en plusieurs parties (antiméridien, calotte)
    Split,
    /// Géométrie entièrement hors du domaine de la projection
    Empty,
}

/// Feature ignorée, avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct FeatureError {
    /// Position de la feature dans l'entrée
    pub index: usize,
    /// Identifiant de la feature (optionnel)
    pub feature_id: Option<String>,
    /// Message d'erreur
    pub message: String,
}

/// Rapport complet
#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    /// Nom de la projection
    pub projection: String,
    /// forward ou inverse
    pub direction: String,
    /// Durée de la transformation
    pub duration_secs: f64,
    /// Statut global
    pub status: TransformStatus,

    /// Nombre de features lues
    pub features_read: usize,
    /// Nombre de features transformées (une ou plusieurs parties)
    pub features_transformed: usize,
    /// Nombre de features coupées en plusieurs parties
    pub features_split: usize,
    /// Nombre de features devenues vides
    pub features_empty: usize,
    /// Nombre de features ignorées
    pub features_skipped: usize,

    /// Nombre de features par type de géométrie d'entrée
    pub by_geometry_type: BTreeMap<String, usize>,

    /// Liste des erreurs
    pub errors: Vec<FeatureError>,
}

impl TransformReport {
    /// Crée un rapport pour une projection et un sens donnés
    pub fn new(projection: &str, direction: &str) -> Self {
        Self {
            projection: projection.to_string(),
            direction: direction.to_string(),
            duration_secs: 0.0,
            status: TransformStatus::Success,
            features_read: 0,
            features_transformed: 0,
            features_split: 0,
            features_empty: 0,
            features_skipped: 0,
            by_geometry_type: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Enregistre l'issue d'une feature
    pub fn record(&mut self, geometry_type: &str, outcome: FeatureOutcome) {
        self.features_read += 1;
        *self
            .by_geometry_type
            .entry(geometry_type.to_string())
            .or_default() += 1;
        match outcome {
            FeatureOutcome::Transformed => self.features_transformed += 1,
            FeatureOutcome::Split => {
                self.features_transformed += 1;
                self.features_split += 1;
            }
            FeatureOutcome::Empty => self.features_empty += 1,
        }
    }

    /// Enregistre une feature ignorée
    pub fn record_error(&mut self, error: FeatureError) {
        self.features_read += 1;
        self.features_skipped += 1;
        self.errors.push(error);
    }

    /// Définit la durée de la transformation
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_errors = self.features_skipped > 0;
        let has_success = self.features_transformed > 0 || self.features_empty > 0;

        self.status = if has_errors && has_success {
            TransformStatus::PartialSuccess
        } else if has_errors {
            TransformStatus::Failed
        } else {
            TransformStatus::Success
        };
    }

    /// Affiche le rapport sur la sortie d'erreur (la sortie standard peut porter les données)
    pub fn display(&self) {
        eprintln!("\n{}", "=".repeat(60));
        eprintln!("TRANSFORM REPORT - {} ({})", self.projection, self.direction);
        eprintln!("{}", "=".repeat(60));

        eprintln!("\nStatus: {:?}", self.status);
        eprintln!("Duration: {:.2}s", self.duration_secs);

        eprintln!("\n--- SUMMARY ---");
        eprintln!(
            "Features: {} read, {} transformed ({} split), {} empty, {} skipped",
            self.features_read,
            self.features_transformed,
            self.features_split,
            self.features_empty,
            self.features_skipped
        );

        if !self.by_geometry_type.is_empty() {
            eprintln!("\n--- BY GEOMETRY TYPE ---");
            for (geometry_type, count) in &self.by_geometry_type {
                eprintln!("  {}: {}", geometry_type, count);
            }
        }

        if !self.errors.is_empty() {
            eprintln!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                match &e.feature_id {
                    Some(id) => eprintln!("  [#{}:{}] {}", e.index, id, e.message),
                    None => eprintln!("  [#{}] {}", e.index, e.message),
                }
            }
            if self.errors.len() > 20 {
                eprintln!("  ... and {} more", self.errors.len() - 20);
            }
        }

        eprintln!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} {}: {} transformed, {} empty, {} skipped",
            self.projection,
            self.direction,
            self.features_transformed,
            self.features_empty,
            self.features_skipped
        )
    }
}
