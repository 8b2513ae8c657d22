// Marker parser: splits template text into literals and `:name` markers

use crate::error::TemplateError;

use super::ast::{Marker, TemplatePart};

/// Single left-to-right scan over the template characters
///
/// Positions are character offsets, not byte offsets, so error positions line
/// up with what a reader counts in the template.
pub struct TemplateParser {
    input: Vec<char>,
    pos: usize,
}

impl TemplateParser {
    pub fn parse(template: &str) -> Result<Vec<TemplatePart>, TemplateError> {
        let mut parser = Self {
            input: template.chars().collect(),
            pos: 0,
        };
        parser.parse_template()
    }

    fn parse_template(&mut self) -> Result<Vec<TemplatePart>, TemplateError> {
        let mut parts = Vec::new();
        let mut literal_buf = String::new();

        while let Some(ch) = self.peek_char() {
            if ch != ':' {
                literal_buf.push(ch);
                self.pos += 1;
                continue;
            }

            if self.peek_ahead(1) == Some(':') {
                // Escaped colon - add single : to literal
                self.pos += 2;
                literal_buf.push(':');
                continue;
            }

            if !literal_buf.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal_buf)));
            }
            parts.push(TemplatePart::Marker(self.parse_marker()?));
        }

        if !literal_buf.is_empty() {
            parts.push(TemplatePart::Literal(literal_buf));
        }

        Ok(parts)
    }

    fn parse_marker(&mut self) -> Result<Marker, TemplateError> {
        let start = self.pos;
        self.pos += 1; // consume :

        let mut name = String::new();
        while let Some(ch) = self.peek_char() {
            if !is_name_char(ch) {
                break;
            }
            name.push(ch);
            self.pos += 1;
        }

        if name.is_empty() {
            return Err(TemplateError::MalformedMarker { position: start });
        }

        let omissible = self.peek_char() == Some('?');
        if omissible {
            self.pos += 1;
        }

        Ok(Marker::new(name).with_omissible(omissible))
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
}
