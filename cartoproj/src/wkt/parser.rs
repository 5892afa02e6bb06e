//! Lecture de texte WKT

use memchr::memchr;

use super::{WktElement, WktFormat, WktValue};
use crate::error::{ProjectionError, Result};

const OPEN_BRACKETS: &[u8] = b"[(";
const CLOSE_BRACKETS: &[u8] = b"])";
const SEPARATORS: &[u8] = b",;";

/// Profondeur d'imbrication maximale des éléments
const MAX_DEPTH: usize = 64;

impl WktFormat {
    /// Parse un élément WKT complet. Seuls des blancs peuvent suivre l'élément racine.
    pub fn parse(&self, text: &str) -> Result<WktElement> {
        let mut parser = Parser { text, pos: 0 };
        let element = parser.element(0)?;
        parser.skip_whitespace();
        if parser.pos < text.len() {
            return Err(parser.error_at(parser.pos, "unexpected trailing content"));
        }
        Ok(element)
    }
}

struct Parser<'a> {
    text: &'a str,
    /// Position courante, en octets
    pos: usize,
}

impl<'a> Parser<'a> {
    fn element(&mut self, depth: usize) -> Result<WktElement> {
        self.skip_whitespace();
        let keyword_start = self.pos;
        if depth >= MAX_DEPTH {
            return Err(self.error_at(keyword_start, "elements nested too deeply"));
        }
        let keyword_len: usize = self.text[keyword_start..]
            .chars()
            .take_while(|c| is_identifier_part(*c))
            .map(char::len_utf8)
            .sum();
        if keyword_len == 0 {
            return Err(self.error_at(keyword_start, "empty keyword"));
        }
        let keyword = &self.text[keyword_start..keyword_start + keyword_len];
        self.pos = keyword_start + keyword_len;

        // Élément nu, sans crochets
        let Some(open) = self.optional(OPEN_BRACKETS) else {
            return Ok(WktElement::new(keyword));
        };

        let mut contents = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                return Err(self.error_at(self.text.len(), "unexpected end of input"));
            };
            if c == '"' {
                contents.push(WktValue::Text(self.quoted()?));
            } else if is_identifier_start(c) {
                contents.push(WktValue::Element(self.element(depth + 1)?));
            } else {
                contents.push(WktValue::Number(self.number()?));
            }
            if self.optional(SEPARATORS).is_none() {
                break;
            }
        }

        match self.optional(CLOSE_BRACKETS) {
            Some(close) if close == open => Ok(WktElement::with_contents(keyword, contents)),
            Some(_) => Err(self.error_at(self.pos - 1, "mismatched closing bracket")),
            None if self.pos >= self.text.len() => {
                Err(self.error_at(self.text.len(), "unexpected end of input"))
            }
            None => Err(self.error_at(self.pos, "expected closing bracket")),
        }
    }

    /// Chaîne entre guillemets ; `""` représente un guillemet littéral
    fn quoted(&mut self) -> Result<String> {
        let bytes = self.text.as_bytes();
        let start = self.pos + 1;
        let mut out = String::new();
        let mut cursor = start;
        loop {
            let Some(offset) = memchr(b'"', &bytes[cursor..]) else {
                return Err(self.error_at(start, "expected closing quote"));
            };
            let quote = cursor + offset;
            out.push_str(&self.text[cursor..quote]);
            if bytes.get(quote + 1) == Some(&b'"') {
                out.push('"');
                cursor = quote + 2;
            } else {
                self.pos = quote + 1;
                return Ok(out);
            }
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        let rest = &self.text.as_bytes()[start..];
        let negative = rest.first() == Some(&b'-');
        let skip = usize::from(negative || rest.first() == Some(&b'+'));
        let unsigned = &rest[skip..];
        // fast_float accepte "inf"/"nan" : on exige un chiffre, ou un point suivi d'un chiffre
        let leading_digit = match unsigned {
            [b'.', next, ..] => next.is_ascii_digit(),
            [first, ..] => first.is_ascii_digit(),
            [] => false,
        };
        if !leading_digit {
            return Err(self.error_at(start, "unparseable number"));
        }
        match fast_float::parse_partial::<f64, _>(unsigned) {
            Ok((value, consumed)) if consumed > 0 => {
                self.pos = start + skip + consumed;
                Ok(if negative { -value } else { value })
            }
            _ => Err(self.error_at(start, "unparseable number")),
        }
    }

    /// Consomme un caractère de `set` après d'éventuels blancs ; retourne son index dans `set`
    fn optional(&mut self, set: &[u8]) -> Option<usize> {
        self.skip_whitespace();
        let byte = *self.text.as_bytes().get(self.pos)?;
        let index = set.iter().position(|&b| b == byte)?;
        self.pos += 1;
        Some(index)
    }

    fn skip_whitespace(&mut self) {
        let skipped: usize = self.text[self.pos..]
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        self.pos += skipped;
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Erreur positionnée en caractères (et non en octets)
    fn error_at(&self, byte_pos: usize, reason: &str) -> ProjectionError {
        let end = byte_pos.min(self.text.len());
        let position = self.text[..end].chars().count();
        ProjectionError::parse_error(position, reason)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<WktElement> {
        WktFormat::default().parse(text)
    }

    fn position(err: ProjectionError) -> usize {
        match err {
            ProjectionError::Parse { position, .. } => position,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_geogcs() {
        let text = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;
        let mut e = parse(text).unwrap();
        assert_eq!(e.keyword(), "GEOGCS");
        assert_eq!(e.contents().len(), 4);
        let mut datum = e.next_element("DATUM", true).unwrap().unwrap();
        let mut spheroid = datum.next_element("SPHEROID", true).unwrap().unwrap();
        assert_eq!(spheroid.next_number(true).unwrap(), Some(6378137.0));
        assert_eq!(spheroid.next_number(true).unwrap(), Some(298.257223563));
    }

    #[test]
    fn test_parse_whitespace_parens_and_semicolons() {
        let e = parse(" unit ( \"Foot_US\" ; 0.3048006096012192 ) \n").unwrap();
        assert_eq!(e.keyword(), "UNIT");
        assert_eq!(
            e.contents(),
            &[
                WktValue::Text("Foot_US".into()),
                WktValue::Number(0.3048006096012192)
            ]
        );
    }

    #[test]
    fn test_parse_bare_keyword_and_numbers() {
        let e = parse("AXIS[\"Lat\",NORTH,-1.5e2,+3]").unwrap();
        assert_eq!(e.contents()[1], WktValue::Element(WktElement::new("NORTH")));
        assert_eq!(e.contents()[2], WktValue::Number(-150.0));
        assert_eq!(e.contents()[3], WktValue::Number(3.0));
    }

    #[test]
    fn test_parse_signed_leading_dot() {
        let e = parse("PARAMETER[\"x\",-.5,+.5,.5,-0.25]").unwrap();
        assert_eq!(
            &e.contents()[1..],
            &[
                WktValue::Number(-0.5),
                WktValue::Number(0.5),
                WktValue::Number(0.5),
                WktValue::Number(-0.25)
            ]
        );
        assert!(parse("PARAMETER[\"x\",-.]").is_err());
        assert!(parse("PARAMETER[\"x\",--1]").is_err());
        assert!(parse("PARAMETER[\"x\",-inf]").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| format!("{}1{}", "A[".repeat(levels), "]".repeat(levels));
        assert!(parse(&nested(MAX_DEPTH)).is_ok());
        let err = parse(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"), "{}", err);
        assert_eq!(position(err), 2 * MAX_DEPTH);
        assert!(parse(&nested(100_000)).is_err());
    }

    #[test]
    fn test_parse_escaped_quote() {
        let e = parse(r#"NAME["say ""hi""",""]"#).unwrap();
        assert_eq!(e.contents()[0], WktValue::Text("say \"hi\"".into()));
        assert_eq!(e.contents()[1], WktValue::Text(String::new()));
    }

    #[test]
    fn test_error_empty_keyword() {
        assert_eq!(position(parse("  [1]").unwrap_err()), 2);
    }

    #[test]
    fn test_error_mismatched_bracket() {
        let err = parse("UNIT[\"m\",1)").unwrap_err();
        assert_eq!(position(err), 10);
    }

    #[test]
    fn test_error_missing_bracket() {
        let err = parse("UNIT[\"m\",1").unwrap_err();
        assert!(err.to_string().contains("unexpected end of input"));
        assert_eq!(position(err), 10);
    }

    #[test]
    fn test_error_unterminated_string() {
        let err = parse("UNIT[\"metre,1]").unwrap_err();
        assert!(err.to_string().contains("expected closing quote"));
        assert_eq!(position(err), 6);
    }

    #[test]
    fn test_error_unparseable_number() {
        let err = parse("UNIT[\"m\",.]").unwrap_err();
        assert!(err.to_string().contains("unparseable number"));
        assert_eq!(position(err), 9);
    }

    #[test]
    fn test_error_position_counts_characters() {
        // "é" occupe deux octets mais une seule position
        let err = parse("NAME[\"é\",-]").unwrap_err();
        assert_eq!(position(err), 9);
    }

    #[test]
    fn test_error_trailing_content() {
        assert!(parse("UNIT[\"m\",1] extra").is_err());
    }
}
