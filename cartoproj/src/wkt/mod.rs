//! Arbre WKT générique et codec texte
//!
//! Un élément est un mot-clé suivi d'une liste ordonnée de nombres, de chaînes
//! et de sous-éléments : `KEYWORD["texte", 1.5, SUB[...]]`.
//!
//! Les accesseurs `next_*` retirent le premier contenu correspondant, ce qui
//! permet de décoder un élément dans l'ordre sans se soucier des positions.

mod parser;
mod writer;

use crate::error::{ProjectionError, Result};

/// Contenu d'un élément WKT
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue {
    Number(f64),
    Text(String),
    Element(WktElement),
}

/// Élément WKT : mot-clé (en majuscules) et contenus ordonnés
#[derive(Debug, Clone, PartialEq)]
pub struct WktElement {
    keyword: String,
    contents: Vec<WktValue>,
}

/// Codec WKT. Le séparateur d'écriture est configurable ; la lecture accepte
/// `,` et `;`. Les nombres utilisent toujours le point décimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WktFormat {
    separator: char,
}

impl Default for WktFormat {
    fn default() -> Self {
        Self { separator: ',' }
    }
}

impl WktFormat {
    /// Codec écrivant `separator` entre les contenus (`,` ou `;`)
    pub fn with_separator(separator: char) -> Self {
        let separator = if separator == ';' { ';' } else { ',' };
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

/// Parse un texte WKT avec le codec par défaut
pub fn parse(text: &str) -> Result<WktElement> {
    WktFormat::default().parse(text)
}

/// Écrit un élément WKT avec le codec par défaut
pub fn format(element: &WktElement) -> Result<String> {
    WktFormat::default().format(element)
}

impl WktElement {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_uppercase(),
            contents: Vec::new(),
        }
    }

    pub fn with_contents(keyword: &str, contents: Vec<WktValue>) -> Self {
        Self {
            keyword: keyword.to_uppercase(),
            contents,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn contents(&self) -> &[WktValue] {
        &self.contents
    }

    pub fn push(&mut self, value: WktValue) {
        self.contents.push(value);
    }

    /// Ajoute un nombre (chaînable)
    pub fn number(mut self, value: f64) -> Self {
        self.contents.push(WktValue::Number(value));
        self
    }

    /// Ajoute une chaîne (chaînable)
    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.contents.push(WktValue::Text(value.into()));
        self
    }

    /// Ajoute un sous-élément (chaînable)
    pub fn element(mut self, value: WktElement) -> Self {
        self.contents.push(WktValue::Element(value));
        self
    }

    /// Retire et retourne le premier nombre
    pub fn next_number(&mut self, required: bool) -> Result<Option<f64>> {
        let found = self
            .contents
            .iter()
            .position(|v| matches!(v, WktValue::Number(_)));
        match found.map(|index| self.contents.remove(index)) {
            Some(WktValue::Number(n)) => Ok(Some(n)),
            _ => self.absent(required, "number"),
        }
    }

    /// Retire et retourne la première chaîne
    pub fn next_string(&mut self, required: bool) -> Result<Option<String>> {
        let found = self
            .contents
            .iter()
            .position(|v| matches!(v, WktValue::Text(_)));
        match found.map(|index| self.contents.remove(index)) {
            Some(WktValue::Text(s)) => Ok(Some(s)),
            _ => self.absent(required, "string"),
        }
    }

    /// Retire et retourne le premier sous-élément de mot-clé `key`
    pub fn next_element(&mut self, key: &str, required: bool) -> Result<Option<WktElement>> {
        let found = self.contents.iter().position(
            |v| matches!(v, WktValue::Element(e) if e.keyword.eq_ignore_ascii_case(key)),
        );
        match found.map(|index| self.contents.remove(index)) {
            Some(WktValue::Element(e)) => Ok(Some(e)),
            _ => self.absent(required, &key.to_uppercase()),
        }
    }

    fn absent<T>(&self, required: bool, what: &str) -> Result<Option<T>> {
        if required {
            Err(ProjectionError::missing([format!(
                "{}[{}]",
                self.keyword, what
            )]))
        } else {
            Ok(None)
        }
    }
}
