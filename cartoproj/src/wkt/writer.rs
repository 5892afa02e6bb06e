//! Écriture de texte WKT

use super::{WktElement, WktFormat, WktValue};
use crate::error::{ProjectionError, Result};

/// Nombre maximal de décimales écrites
const MAX_FRACTION_DIGITS: usize = 12;

impl WktFormat {
    /// Écrit un élément sur une seule ligne. Échoue sur un nombre non fini.
    pub fn format(&self, element: &WktElement) -> Result<String> {
        let mut out = String::new();
        self.write_element(element, &mut out)?;
        Ok(out)
    }

    fn write_element(&self, element: &WktElement, out: &mut String) -> Result<()> {
        out.push_str(element.keyword());
        if element.contents().is_empty() {
            return Ok(());
        }
        out.push('[');
        for (i, value) in element.contents().iter().enumerate() {
            if i > 0 {
                out.push(self.separator);
            }
            match value {
                WktValue::Element(child) => self.write_element(child, out)?,
                WktValue::Text(text) => {
                    out.push('"');
                    out.push_str(&text.replace('"', "\"\""));
                    out.push('"');
                }
                WktValue::Number(n) => out.push_str(&format_number(*n)?),
            }
        }
        out.push(']');
        Ok(())
    }
}

/// Format décimal fixe, sans séparateur de milliers, 1 à 12 décimales
pub fn format_number(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(ProjectionError::UnsupportedContent(format!(
            "non-finite number {}",
            value
        )));
    }
    let mut text = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed_len = text.trim_end_matches('0').len();
    text.truncate(trimmed_len);
    if text.ends_with('.') {
        text.push('0');
    }
    if text == "-0.0" {
        text.remove(0);
    }
    Ok(text)
}
